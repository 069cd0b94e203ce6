//! 分诊控制台主程序

mod console;

use anyhow::{Context, Result};
use clap::Parser;
use console::Console;
use std::sync::Arc;
use tracing::{error, info};
use triage_admin::{init_logging, ConfigManager, StatusFormat};
use triage_workflow::{InMemoryQueueRepository, TriageEngine};

/// 分诊控制台命令行参数
#[derive(Parser, Debug)]
#[command(name = "triage-console")]
#[command(about = "曼彻斯特分诊协议模拟器 (控制台)")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别（覆盖配置文件）
    #[arg(short, long)]
    log_level: Option<String>,

    /// 以JSON格式输出队列状态
    #[arg(long)]
    json_status: bool,

    /// 输出生效的配置后退出
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = ConfigManager::new(args.config.as_deref())?;
    let mut config = config_manager.get_config().await;

    // 初始化日志
    init_logging(&config.logging, args.log_level.as_deref())?;
    match config_manager.config_path() {
        Some(path) => info!("Configuration loaded from: {}", path),
        None => info!("Configuration loaded from defaults and environment"),
    }

    if args.dump_config {
        print!("{}", config_manager.to_toml().await?);
        return Ok(());
    }

    if args.json_status {
        config.console.status_format = StatusFormat::Json;
    }

    info!("启动分诊控制台...");

    let repository = Arc::new(InMemoryQueueRepository::new());
    let engine = TriageEngine::new(repository)
        .context("系统无法启动: 决策树构建失败")?;

    info!("系统已就绪");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut console = Console::new(engine, config.console, stdin, std::io::stdout());

    if let Err(e) = console.run().await {
        error!("控制台异常退出: {}", e);
        return Err(e);
    }

    Ok(())
}
