//! 患者登记流程
//!
//! 患者创建、决策树问答和入队三个步骤的组合。回答由调用方通过
//! [`AnswerProvider`] 提供，等待回答发生在调用方而不是导航器内部。

use crate::navigator::TriageNavigator;
use crate::tree::TriageNode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use triage_core::{Classification, Patient, Result, TriageError};
use uuid::Uuid;

/// 分诊问题回答来源
#[async_trait]
pub trait AnswerProvider: Send {
    /// 回答一个是/否问题
    async fn answer(&mut self, question: &str) -> Result<bool>;
}

/// 预先给定的回答序列
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnswers {
    answers: VecDeque<bool>,
}

impl ScriptedAnswers {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait]
impl AnswerProvider for ScriptedAnswers {
    async fn answer(&mut self, question: &str) -> Result<bool> {
        self.answers.pop_front().ok_or_else(|| {
            TriageError::Validation(format!("no answer left for question '{}'", question))
        })
    }
}

/// 进行中的分诊会话
///
/// 丢弃会话不会在仓库中留下任何记录。
#[derive(Debug, Clone)]
pub struct TriageSession {
    patient: Patient,
    navigator: TriageNavigator,
}

impl TriageSession {
    pub fn new(patient: Patient, tree: Arc<TriageNode>) -> Self {
        Self {
            patient,
            navigator: TriageNavigator::new(tree),
        }
    }

    pub fn current_question(&self) -> Option<&str> {
        self.navigator.current_question()
    }

    pub fn answer(&mut self, answer: bool) {
        self.navigator.advance(answer);
    }

    pub fn is_finished(&self) -> bool {
        self.navigator.is_finished()
    }

    pub fn classification(&self) -> Option<Classification> {
        self.navigator.final_classification()
    }

    /// 用回答来源把问答走到叶子节点
    pub async fn run(&mut self, answers: &mut dyn AnswerProvider) -> Result<Classification> {
        while let Some(question) = self.current_question() {
            let question = question.to_string();
            let answer = answers.answer(&question).await?;
            self.answer(answer);
        }

        self.classification().ok_or_else(|| {
            TriageError::InvalidState("triage finished without a classification".to_string())
        })
    }

    /// 拆分为患者和最终等级，未完成时返回 `InvalidState`
    pub fn into_result(self) -> Result<(Patient, Classification)> {
        match self.navigator.final_classification() {
            Some(classification) => Ok((self.patient, classification)),
            None => Err(TriageError::InvalidState(format!(
                "triage for '{}' is not finished",
                self.patient.name()
            ))),
        }
    }
}

/// 登记结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub classification: Classification,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(patient: &Patient, classification: Classification) -> Self {
        Self {
            patient_id: patient.id(),
            patient_name: patient.name().to_string(),
            classification,
            registered_at: patient.registered_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;

    #[tokio::test]
    async fn test_run_with_scripted_answers() {
        let patient = Patient::new("Ana").unwrap();
        let mut session = TriageSession::new(patient, build_tree().unwrap());
        let mut answers = ScriptedAnswers::new([false, false, true]);

        let classification = session.run(&mut answers).await.unwrap();
        assert_eq!(classification, Classification::Yellow);
        assert_eq!(answers.remaining(), 0);
    }

    #[tokio::test]
    async fn test_run_out_of_answers() {
        let patient = Patient::new("Ana").unwrap();
        let mut session = TriageSession::new(patient, build_tree().unwrap());
        let mut answers = ScriptedAnswers::new([false]);

        let result = session.run(&mut answers).await;
        assert!(matches!(result, Err(TriageError::Validation(_))));
        assert!(!session.is_finished());
    }

    #[test]
    fn test_unfinished_session_into_result() {
        let session = TriageSession::new(Patient::new("Bia").unwrap(), build_tree().unwrap());
        assert!(matches!(session.into_result(), Err(TriageError::InvalidState(_))));
    }

    #[test]
    fn test_stepwise_session() {
        let mut session = TriageSession::new(Patient::new("Caio").unwrap(), build_tree().unwrap());
        session.answer(false);
        session.answer(true);
        assert!(session.is_finished());

        let (patient, classification) = session.into_result().unwrap();
        assert_eq!(patient.name(), "Caio");
        assert_eq!(classification, Classification::Orange);
    }
}
