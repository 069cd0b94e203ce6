//! # Manchester Triage
//!
//! 曼彻斯特分诊协议模拟器的统一入口，重新导出核心模型和分诊工作流。

pub use triage_core::{Classification, Patient, Result, TriageError};
pub use triage_workflow::{
    build_tree, AnswerProvider, InMemoryQueueRepository, QueueRepository, QueueStatus,
    Registration, ScriptedAnswers, TriageEngine, TriageNavigator, TriageNode, TriageSession,
};
