//! 错误定义模块

use thiserror::Error;

/// 分诊系统统一错误类型
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("验证错误: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效参数: {0}")]
    InvalidArgument(String),

    #[error("队列为空，无法出队")]
    EmptyQueue,

    #[error("无效状态: {0}")]
    InvalidState(String),

    #[error("系统内部错误: {0}")]
    System(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TriageError {
    /// 是否为输入校验错误（可直接展示给操作员）
    pub fn is_validation(&self) -> bool {
        matches!(self, TriageError::Validation(_))
    }
}

/// 分诊系统统一结果类型
pub type Result<T> = std::result::Result<T, TriageError>;
