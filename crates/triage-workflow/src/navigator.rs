//! 决策树导航器
//!
//! 逐个接收是/否回答，从根节点走到叶子节点得到分诊等级。
//! 只能向下走，不支持回退。

use crate::tree::TriageNode;
use std::sync::Arc;
use triage_core::Classification;

/// 分诊导航器
///
/// 通过 `Arc` 共享决策树，多个导航器可在不同任务中并发使用同一棵树。
#[derive(Debug, Clone)]
pub struct TriageNavigator {
    current: Arc<TriageNode>,
    answers_given: usize,
}

impl TriageNavigator {
    /// 从根节点开始新的导航
    pub fn new(root: Arc<TriageNode>) -> Self {
        Self {
            current: root,
            answers_given: 0,
        }
    }

    /// 当前问题，到达叶子节点后返回 `None`
    pub fn current_question(&self) -> Option<&str> {
        self.current.question_text()
    }

    /// 根据回答移动到对应子节点，已到达叶子节点时不做任何操作
    pub fn advance(&mut self, answer: bool) {
        let next = match self.current.as_ref() {
            TriageNode::Leaf(_) => return,
            TriageNode::Question { yes_child, no_child, .. } => {
                if answer {
                    Arc::clone(yes_child)
                } else {
                    Arc::clone(no_child)
                }
            }
        };

        tracing::debug!("Triage answer {} moves to {}", answer, next);
        self.current = next;
        self.answers_given += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_leaf()
    }

    /// 最终分诊等级，未完成时返回 `None`
    pub fn final_classification(&self) -> Option<Classification> {
        self.current.classification()
    }

    /// 已回答的问题数
    pub fn answers_given(&self) -> usize {
        self.answers_given
    }
}
