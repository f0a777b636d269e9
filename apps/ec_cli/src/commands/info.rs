// apps/ec_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、默认配置和标签编码。

use anyhow::Result;
use clap::Args;
use ec_config::SceneConfig;
use ec_physics::CellTag;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示默认配置（JSON）
    #[arg(long)]
    pub defaults: bool,

    /// 显示标签编码
    #[arg(long)]
    pub tags: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== EmbedContact 信息 ===");

    if args.defaults {
        print_default_config()?;
    }

    if args.tags {
        print_tag_codes();
    }

    if !args.defaults && !args.tags {
        println!("EmbedContact CLI 版本: {}", env!("CARGO_PKG_VERSION"));
        println!();
        print_tag_codes();
        println!();
        print_default_config()?;
    }

    Ok(())
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let config = SceneConfig::default();
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!("网格步长: {}", config.delta());
    Ok(())
}

fn print_tag_codes() {
    println!("=== 单元标签 ===");
    for tag in CellTag::ALL {
        println!(
            "  {} {:<16} 高度函数: {}",
            tag.code(),
            tag.name(),
            if tag.has_heights() { "是" } else { "否" }
        );
    }
}
