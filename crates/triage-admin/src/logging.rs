//! 日志初始化
//!
//! 过滤级别优先取 `RUST_LOG`，其次取命令行参数，最后取配置文件。

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// 判断字符串是否为合法的日志级别
pub fn is_valid_level(level: &str) -> bool {
    level.parse::<Level>().is_ok() || level.eq_ignore_ascii_case("off")
}

/// 计算最终使用的日志级别
pub fn resolve_level<'a>(config: &'a LoggingConfig, override_level: Option<&'a str>) -> &'a str {
    override_level.unwrap_or(&config.level)
}

/// 初始化全局日志订阅器，日志写到 stderr，与控制台交互输出分开
pub fn init_logging(config: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let level = resolve_level(config, override_level);
    if !is_valid_level(level) {
        return Err(anyhow::anyhow!("Unknown log level '{}'", level));
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow::anyhow!("Invalid log filter: {}", e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Logging initialized at level {}", level);
    Ok(())
}
