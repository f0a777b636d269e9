// apps/ec_cli/src/main.rs

//! EmbedContact 命令行界面
//!
//! 构建场景、驱动重算编排器并输出诊断。外部流体求解器不在本工具
//! 范围内，原始场在各步之间保持不变。

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

/// EmbedContact 嵌入边界接触线工具
#[derive(Parser)]
#[command(name = "ec_cli", version, about = "Embedded-boundary contact-line VOF core")]
struct Cli {
    /// 日志级别
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 运行重算
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

impl Commands {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Run(args) => commands::run::execute(args),
            Self::Info(args) => commands::info::execute(args),
            Self::Validate(args) => commands::validate::execute(args),
        }
    }
}

/// 安装全局日志订阅者
fn init_logging(level: LogLevel) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::from(level))
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("无法初始化日志: {e}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;
    cli.command.execute()
}
