//! 分诊引擎
//!
//! 协调决策树、登记流程和队列仓库的核心引擎

use crate::{
    registration::{AnswerProvider, Registration, TriageSession},
    repository::{QueueRepository, QueueStatus},
    tree::{build_tree, TriageNode},
};
use std::sync::Arc;
use triage_core::{Patient, Result, TriageError};

/// 分诊引擎
///
/// 决策树在创建时构建一次，之后所有会话共享。仓库内部错误只记录日志，
/// 对调用方统一返回 `TriageError::System`。
#[derive(Debug, Clone)]
pub struct TriageEngine {
    tree: Arc<TriageNode>,
    repository: Arc<dyn QueueRepository>,
}

impl TriageEngine {
    /// 创建新的分诊引擎
    pub fn new(repository: Arc<dyn QueueRepository>) -> Result<Self> {
        let tree = build_tree()?;
        Ok(Self::with_tree(tree, repository))
    }

    /// 使用已构建的决策树创建引擎
    pub fn with_tree(tree: Arc<TriageNode>, repository: Arc<dyn QueueRepository>) -> Self {
        Self { tree, repository }
    }

    /// 校验姓名并开始分诊会话
    pub fn start_registration(&self, name: &str) -> Result<TriageSession> {
        let patient = Patient::new(name).map_err(|e| {
            tracing::warn!("Rejected patient name: {}", e);
            e
        })?;

        tracing::info!("Starting triage for patient '{}'", patient.name());
        Ok(TriageSession::new(patient, Arc::clone(&self.tree)))
    }

    /// 完成分诊会话并将患者入队
    pub async fn complete_registration(&self, session: TriageSession) -> Result<Registration> {
        let (patient, classification) = session.into_result()?;
        let registration = Registration::new(&patient, classification);

        self.repository
            .add_patient(patient, classification)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to add patient '{}' to {} queue: {}",
                    registration.patient_name,
                    classification.name(),
                    e
                );
                TriageError::System("failed to save patient to queue".to_string())
            })?;

        tracing::info!(
            "Registered patient '{}' as {}",
            registration.patient_name,
            classification
        );
        Ok(registration)
    }

    /// 登记患者：校验姓名、问答、入队
    pub async fn register_patient(
        &self,
        name: &str,
        answers: &mut dyn AnswerProvider,
    ) -> Result<Registration> {
        let mut session = self.start_registration(name)?;
        session.run(answers).await?;
        self.complete_registration(session).await
    }

    /// 叫下一位患者
    pub async fn call_next_patient(&self) -> Result<Option<Patient>> {
        let patient = self.repository.get_next_patient().await.map_err(|e| {
            tracing::error!("Failed to get next patient: {}", e);
            TriageError::System("failed to call next patient".to_string())
        })?;

        match &patient {
            Some(p) => tracing::info!("Next patient: '{}'", p.name()),
            None => tracing::info!("All queues are empty, no patient to call"),
        }
        Ok(patient)
    }

    /// 获取各队列状态
    pub async fn queue_status(&self) -> Result<QueueStatus> {
        self.repository.get_status().await.map_err(|e| {
            tracing::error!("Failed to get queue status: {}", e);
            TriageError::System("failed to get queue status".to_string())
        })
    }

    /// 获取决策树
    pub fn tree(&self) -> &Arc<TriageNode> {
        &self.tree
    }
}
