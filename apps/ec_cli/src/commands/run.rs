// apps/ec_cli/src/commands/run.rs

//! 运行重算命令
//!
//! 构建场景，执行一次 `on_init` 和若干次 `on_step`。
//! 原始场在各步之间不变，因此发布结果必须逐位一致。

use super::load_config;
use anyhow::{bail, Context, Result};
use clap::Args;
use ec_physics::builder::SceneBuilder;
use ec_physics::{InterfaceOutputs, StepReport};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 重算次数（覆盖配置）
    #[arg(short, long)]
    pub steps: Option<usize>,

    /// 网格分辨率 nx = ny（覆盖配置）
    #[arg(long)]
    pub nx: Option<usize>,

    /// 接触角 [度]（覆盖全部界面）
    #[arg(long)]
    pub angle: Option<f64>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== EmbedContact 重算启动 ===");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(nx) = args.nx {
        config.grid.nx = nx;
        config.grid.ny = nx;
    }
    if let Some(angle) = args.angle {
        for interface in &mut config.interfaces {
            interface.contact_angle_deg = angle;
        }
    }
    let steps = args.steps.unwrap_or(config.steps);

    info!(
        "网格: {}×{}, 域长 {}, 坐标系 {:?}",
        config.grid.nx, config.grid.ny, config.grid.length, config.coordinates
    );

    let mut scene = SceneBuilder::new(config).build().context("构建场景失败")?;
    info!("小单元清理: {} 个单元并入固体", scene.removed_cells);

    let raw = scene.raw_fields.clone();
    let refs: Vec<&[f64]> = raw.iter().map(Vec::as_slice).collect();

    let start = Instant::now();
    let reports = scene.orchestrator.on_init(&refs).context("初始化失败")?;
    log_reports(0, &reports);

    let initial: Vec<InterfaceOutputs> = (0..scene.orchestrator.n_interfaces())
        .filter_map(|k| scene.orchestrator.outputs(k).cloned())
        .collect();

    for step in 1..=steps {
        let reports = scene
            .orchestrator
            .on_step(&refs)
            .with_context(|| format!("第 {} 步重算失败", step))?;
        log_reports(step, &reports);

        for (k, expected) in initial.iter().enumerate() {
            if scene.orchestrator.outputs(k) != Some(expected) {
                bail!("第 {} 步输出与初始化结果不一致（界面 {}）", step, k);
            }
        }
    }

    let elapsed = start.elapsed();
    info!("=== 重算完成 ===");
    info!("总步数: {}", steps);
    info!("计算时间: {:.3} s", elapsed.as_secs_f64());
    info!(
        "平均每次重算: {:.3} ms",
        elapsed.as_secs_f64() * 1000.0 / (steps + 1) as f64
    );
    Ok(())
}

fn log_reports(step: usize, reports: &[StepReport]) {
    for report in reports {
        info!("step {}: {}", step, report);
        if report.fallbacks > 0 {
            warn!("step {}: [{}] {} 个接触单元回退", step, report.interface, report.fallbacks);
        }
        if report.clamped > 0 {
            warn!("step {}: [{}] {} 个输入被钳位", step, report.interface, report.clamped);
        }
    }
}
