//! 配置管理
//!
//! 按“默认值 → 配置文件 → 环境变量”的顺序叠加配置并验证

use std::sync::Arc;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};
use tracing::{info, error};
use config::{Config, Environment, File};

use crate::logging::is_valid_level;

/// 环境变量前缀，例如 `TRIAGE__LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "TRIAGE";

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<TriageConfig>>,
    /// 配置文件路径
    config_path: Option<String>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 分诊系统完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TriageConfig {
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 控制台配置
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 是否输出颜色
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

/// 控制台配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    /// 启动时显示标题
    pub show_banner: bool,
    /// 队列状态输出格式
    pub status_format: StatusFormat,
    /// 每次操作后等待回车
    pub pause_after_action: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            show_banner: true,
            status_format: StatusFormat::Table,
            pause_after_action: false,
        }
    }
}

/// 队列状态输出格式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFormat {
    Table,
    Json,
}

impl ConfigManager {
    /// 创建配置管理器，`config_path` 为空时只使用默认值和环境变量
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: config_path.map(str::to_string),
            validator,
        })
    }

    /// 从文件和环境变量加载配置
    fn load_config(config_path: Option<&str>) -> Result<TriageConfig> {
        let defaults = Config::try_from(&TriageConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration sources")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// 获取配置
    pub async fn get_config(&self) -> TriageConfig {
        let config = self.config.read().await;
        config.clone()
    }

    /// 更新配置
    pub async fn update_config(&self, new_config: TriageConfig) -> Result<()> {
        if let Err(e) = self.validator.validate(&new_config) {
            error!("Configuration update rejected: {}", e);
            return Err(e);
        }

        let mut config = self.config.write().await;
        *config = new_config;

        info!("Configuration updated successfully");
        Ok(())
    }

    /// 重新加载配置
    pub async fn reload_config(&self) -> Result<()> {
        let new_config = Self::load_config(self.config_path.as_deref())?;
        self.update_config(new_config).await?;

        info!("Configuration reloaded");
        Ok(())
    }

    /// 以TOML格式导出当前配置
    pub async fn to_toml(&self) -> Result<String> {
        let config = self.config.read().await;
        toml::to_string_pretty(&*config).context("Failed to serialize configuration")
    }

    pub fn config_path(&self) -> Option<&str> {
        self.config_path.as_deref()
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: String,
    /// 验证函数
    validator: fn(&TriageConfig) -> Result<()>,
    /// 错误消息
    error_message: String,
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "logging.level".to_string(),
                validator: |config| {
                    if is_valid_level(&config.logging.level) {
                        Ok(())
                    } else {
                        Err(anyhow::anyhow!("Unknown log level '{}'", config.logging.level))
                    }
                },
                error_message: "Invalid log level".to_string(),
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &TriageConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                return Err(anyhow::anyhow!(
                    "{} ({}): {}",
                    rule.error_message,
                    rule.field_path,
                    e
                ));
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};
    use uuid::Uuid;

    /// 环境变量是进程级状态，读取配置的测试需串行执行
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_temp_config(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("triage-config-{}.toml", Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_defaults_without_file() {
        let _env = env_guard();
        let manager = ConfigManager::new(None).unwrap();
        let config = manager.get_config().await;
        assert_eq!(config.console.status_format, StatusFormat::Table);
        assert!(config.console.show_banner);
        assert!(manager.config_path().is_none());
    }

    #[tokio::test]
    async fn test_file_overrides_defaults() {
        let _env = env_guard();
        let path = write_temp_config(
            "[logging]\nlevel = \"debug\"\nansi = false\n\n\
             [console]\nshow_banner = false\nstatus_format = \"json\"\n\
             pause_after_action = true\n",
        );
        let manager = ConfigManager::new(path.to_str()).unwrap();
        let config = manager.get_config().await;
        std::fs::remove_file(&path).ok();

        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.ansi);
        assert_eq!(config.console.status_format, StatusFormat::Json);
        assert!(config.console.pause_after_action);
    }

    #[test]
    fn test_missing_file_is_error() {
        let _env = env_guard();
        let result = ConfigManager::new(Some("/nonexistent/triage-config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validator_rejects_unknown_level() {
        let mut config = TriageConfig::default();
        config.logging.level = "loud".to_string();
        assert!(ConfigValidator::new().validate(&config).is_err());

        config.logging.level = "WARN".to_string();
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_config() {
        let _env = env_guard();
        let manager = ConfigManager::new(None).unwrap();
        let mut config = manager.get_config().await;
        config.logging.level = "verbose".to_string();
        assert!(manager.update_config(config).await.is_err());
        assert_ne!(manager.get_config().await.logging.level, "verbose");
    }

    #[tokio::test]
    async fn test_reload_keeps_valid_config() {
        let _env = env_guard();
        let manager = ConfigManager::new(None).unwrap();
        manager.reload_config().await.unwrap();
        assert_eq!(manager.get_config().await, TriageConfig::default());
    }

    #[tokio::test]
    async fn test_to_toml_contains_sections() {
        let _env = env_guard();
        let manager = ConfigManager::new(None).unwrap();
        let toml = manager.to_toml().await.unwrap();
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("status_format = \"table\""));
    }

    #[tokio::test]
    async fn test_environment_overrides_defaults() {
        let _env = env_guard();
        std::env::set_var("TRIAGE__CONSOLE__STATUS_FORMAT", "json");
        std::env::set_var("TRIAGE__LOGGING__LEVEL", "debug");

        let result = ConfigManager::new(None);

        std::env::remove_var("TRIAGE__CONSOLE__STATUS_FORMAT");
        std::env::remove_var("TRIAGE__LOGGING__LEVEL");

        let config = result.unwrap().get_config().await;
        assert_eq!(config.console.status_format, StatusFormat::Json);
        assert_eq!(config.logging.level, "debug");
        assert!(config.console.show_banner);
    }

    #[tokio::test]
    async fn test_environment_overrides_file() {
        let _env = env_guard();
        let path = write_temp_config("[logging]\nlevel = \"warn\"\nansi = true\n");
        std::env::set_var("TRIAGE__LOGGING__LEVEL", "trace");

        let result = ConfigManager::new(path.to_str());

        std::env::remove_var("TRIAGE__LOGGING__LEVEL");
        std::fs::remove_file(&path).ok();

        let config = result.unwrap().get_config().await;
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_invalid_level_from_environment_is_rejected() {
        let _env = env_guard();
        std::env::set_var("TRIAGE__LOGGING__LEVEL", "loud");
        let result = ConfigManager::new(None);
        std::env::remove_var("TRIAGE__LOGGING__LEVEL");

        let message = result.unwrap_err().to_string();
        assert!(message.contains("logging.level"));
    }
}
