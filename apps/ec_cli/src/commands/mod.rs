// apps/ec_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use ec_config::SceneConfig;
use std::path::Path;

/// 读取场景配置；未指定文件时使用默认场景
pub fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}
