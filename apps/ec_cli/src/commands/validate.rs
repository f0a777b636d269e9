// apps/ec_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 验证配置文件、构建网格与嵌入几何并检查其一致性。

use anyhow::{bail, Context, Result};
use clap::Args;
use ec_config::SceneConfig;
use ec_foundation::ValidationReport;
use ec_mesh::{EmbeddedGeometry, GeometryOracle, StencilMesh, StructuredMesh};
use ec_physics::builder::scene_builder::shape_from_config;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn merge_report(&mut self, report: &ValidationReport) {
        for e in &report.errors {
            self.add_error(e.to_string());
        }
        for w in &report.warnings {
            self.add_warning(w.to_string());
        }
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== EmbedContact 配置验证 ===");

    let Some(config_path) = &args.config else {
        println!("用法: ec_cli validate --config <配置文件> [--strict]");
        return Ok(());
    };

    let mut result = ValidationResult::default();
    if let Some(config) = validate_config(config_path, &mut result)? {
        validate_geometry(&config, &mut result)?;
    }
    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) -> Result<Option<SceneConfig>> {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).context("无法读取配置文件")?;
    let config: SceneConfig = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("JSON 解析错误: {}", e));
            return Ok(None);
        }
    };

    if let Err(e) = config.validate() {
        result.add_error(e.to_string());
        return Ok(None);
    }
    if config.pipeline.column_half_width * 2 + 1 > config.grid.nx.min(config.grid.ny) {
        result.add_warning(format!(
            "高度列长度 {} 超过网格尺寸，列会被镜像折回",
            config.pipeline.column_half_width * 2 + 1
        ));
    }

    println!("  ✓ 配置文件格式有效");
    Ok(Some(config))
}

fn validate_geometry(config: &SceneConfig, result: &mut ValidationResult) -> Result<()> {
    println!("\n检查网格与嵌入几何");

    let grid = &config.grid;
    let mesh = StructuredMesh::from_length(
        grid.nx,
        grid.ny,
        grid.length,
        [grid.origin[0], grid.origin[1]].into(),
    )
    .context("无法构建网格")?;
    result.merge_report(&mesh.validate_links());

    let geometry = match &config.solid {
        Some(shape) => {
            let mut geometry = EmbeddedGeometry::from_level_set(&mesh, &shape_from_config(shape));
            let removed = geometry.clean_small_cells(&mesh, config.clean_threshold);
            if removed > 0 {
                println!("  小单元清理: {} 个单元并入固体", removed);
            }
            geometry
        }
        None => EmbeddedGeometry::fluid_only(mesh.n_cells()),
    };
    result.merge_report(&geometry.validate(&mesh));

    if geometry.solid_count() == mesh.n_cells() {
        result.add_error("整个计算域都是固体");
    }
    println!(
        "  单元: {}，固体: {}，切割: {}",
        mesh.n_cells(),
        geometry.solid_count(),
        geometry.cut_count()
    );
    Ok(())
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
