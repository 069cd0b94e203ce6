//! # Triage Core
//!
//! 分诊系统的核心模块，提供分诊等级、患者模型、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;

pub use error::{Result, TriageError};
pub use models::*;
