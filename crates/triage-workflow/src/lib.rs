//! # 分诊工作流模块
//!
//! 提供完整的曼彻斯特分诊流程，包括：
//! - 决策树：固定的是/否问题树，叶子为分诊等级
//! - 导航器：逐个回答问题直到得到分诊等级
//! - 队列仓库：按等级分桶，严格按优先级叫号，同级先到先服务
//! - 登记流程与引擎：组合患者创建、问答和入队

pub mod engine;
pub mod navigator;
pub mod queue;
pub mod registration;
pub mod repository;
pub mod tree;

// 重新导出主要类型
pub use engine::TriageEngine;
pub use navigator::TriageNavigator;
pub use queue::PatientQueue;
pub use registration::{AnswerProvider, Registration, ScriptedAnswers, TriageSession};
pub use repository::{InMemoryQueueRepository, QueueRepository, QueueStatus};
pub use tree::{build_tree, TriageNode};
