//! # 分诊管理模块
//!
//! 提供配置管理和日志初始化等运维功能

pub mod config;
pub mod logging;

pub use config::{ConfigManager, ConsoleConfig, LoggingConfig, StatusFormat, TriageConfig};
pub use logging::init_logging;
