//! 分诊决策树
//!
//! 由问题节点和叶子节点组成的不可变二叉树，启动时构建一次，
//! 之后被所有导航器共享只读访问。

use std::fmt;
use std::sync::Arc;
use triage_core::{Classification, Result, TriageError};

const QUESTION_CRITICAL: &str =
    "Paciente apresenta parada respiratória/cardíaca ou está inconsciente?";
const QUESTION_ALERT_SIGNS: &str =
    "Sinais de alerta (ex: dor no peito, sangramento severo, confusão mental?)";
const QUESTION_MODERATE_SYMPTOMS: &str =
    "Sintomas moderados (ex: febre alta, vômito persistente, dor moderada?)";
const QUESTION_MINOR_COMPLAINT: &str =
    "Queixa aguda leve (ex: dor leve, pequenos ferimentos, sintomas de resfriado?)";

/// 决策树节点
///
/// 问题节点恰好有两个子节点，叶子节点只携带一个分诊等级。
#[derive(Debug)]
pub enum TriageNode {
    Question {
        question: String,
        yes_child: Arc<TriageNode>,
        no_child: Arc<TriageNode>,
    },
    Leaf(Classification),
}

impl TriageNode {
    /// 通用构造函数，校验“问题或叶子二选一”的规则
    pub fn new(
        question: Option<&str>,
        classification: Option<Classification>,
        yes_child: Option<Arc<TriageNode>>,
        no_child: Option<Arc<TriageNode>>,
    ) -> Result<Self> {
        let question = question.map(str::trim).filter(|q| !q.is_empty());

        match (question, classification) {
            (Some(_), Some(_)) => Err(TriageError::Validation(
                "a node cannot be both a question and a classification".to_string(),
            )),
            (None, None) => Err(TriageError::Validation(
                "a node must be either a question or a classification".to_string(),
            )),
            (Some(question), None) => match (yes_child, no_child) {
                (Some(yes_child), Some(no_child)) => Ok(TriageNode::Question {
                    question: question.to_string(),
                    yes_child,
                    no_child,
                }),
                _ => Err(TriageError::Validation(format!(
                    "question node '{}' must have both yes and no children",
                    question
                ))),
            },
            (None, Some(classification)) => {
                if yes_child.is_some() || no_child.is_some() {
                    return Err(TriageError::Validation(format!(
                        "leaf node {} cannot have children",
                        classification.name()
                    )));
                }
                Ok(TriageNode::Leaf(classification))
            }
        }
    }

    /// 创建问题节点
    pub fn question(
        question: &str,
        yes_child: Arc<TriageNode>,
        no_child: Arc<TriageNode>,
    ) -> Result<Arc<Self>> {
        Self::new(Some(question), None, Some(yes_child), Some(no_child)).map(Arc::new)
    }

    /// 创建叶子节点
    pub fn leaf(classification: Classification) -> Arc<Self> {
        Arc::new(TriageNode::Leaf(classification))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TriageNode::Leaf(_))
    }

    pub fn question_text(&self) -> Option<&str> {
        match self {
            TriageNode::Question { question, .. } => Some(question),
            TriageNode::Leaf(_) => None,
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            TriageNode::Leaf(classification) => Some(*classification),
            TriageNode::Question { .. } => None,
        }
    }

    pub fn yes_child(&self) -> Option<&Arc<TriageNode>> {
        match self {
            TriageNode::Question { yes_child, .. } => Some(yes_child),
            TriageNode::Leaf(_) => None,
        }
    }

    pub fn no_child(&self) -> Option<&Arc<TriageNode>> {
        match self {
            TriageNode::Question { no_child, .. } => Some(no_child),
            TriageNode::Leaf(_) => None,
        }
    }

    /// 前序遍历所有节点
    pub fn nodes(&self) -> Vec<&TriageNode> {
        let mut visited = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visited.push(node);
            if let TriageNode::Question { yes_child, no_child, .. } = node {
                stack.push(no_child.as_ref());
                stack.push(yes_child.as_ref());
            }
        }
        visited
    }

    /// 树的深度（单个叶子为 0）
    pub fn depth(&self) -> usize {
        match self {
            TriageNode::Leaf(_) => 0,
            TriageNode::Question { yes_child, no_child, .. } => {
                1 + yes_child.depth().max(no_child.depth())
            }
        }
    }
}

impl fmt::Display for TriageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriageNode::Question { question, .. } => write!(f, "[Question: '{}']", question),
            TriageNode::Leaf(classification) => write!(f, "[Leaf: {}]", classification),
        }
    }
}

/// 构建曼彻斯特分诊决策树
///
/// 自底向上一次性构建。任何节点构造失败都意味着固定规则本身有缺陷，
/// 整棵树放弃构建并以系统错误返回。
pub fn build_tree() -> Result<Arc<TriageNode>> {
    tracing::debug!("Building triage decision tree");

    assemble_tree().map_err(|e| {
        tracing::error!("Critical error while building triage tree: {}", e);
        TriageError::System(format!("failed to build triage tree: {}", e))
    })
}

fn assemble_tree() -> Result<Arc<TriageNode>> {
    let leaf_red = TriageNode::leaf(Classification::Red);
    let leaf_orange = TriageNode::leaf(Classification::Orange);
    let leaf_yellow = TriageNode::leaf(Classification::Yellow);
    let leaf_green = TriageNode::leaf(Classification::Green);
    let leaf_blue = TriageNode::leaf(Classification::Blue);

    let minor_complaint = TriageNode::question(QUESTION_MINOR_COMPLAINT, leaf_green, leaf_blue)?;
    let moderate_symptoms =
        TriageNode::question(QUESTION_MODERATE_SYMPTOMS, leaf_yellow, minor_complaint)?;
    let alert_signs = TriageNode::question(QUESTION_ALERT_SIGNS, leaf_orange, moderate_symptoms)?;
    let root = TriageNode::question(QUESTION_CRITICAL, leaf_red, alert_signs)?;

    tracing::info!("Triage decision tree built with depth {}", root.depth());
    Ok(root)
}
