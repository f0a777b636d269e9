// crates/ec_config/src/lib.rs

//! EmbedContact Config Layer (Layer 4)
//!
//! 配置层，描述一个完整的计算场景：网格、坐标系、嵌入固体、
//! 被追踪的界面及其接触角、流水线数值参数和边界规则。
//!
//! # 模块概览
//!
//! - [`scene`]: `SceneConfig` 场景配置（JSON）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: ec_cli      ─> uses SceneConfig
//! Layer 4: ec_config   ─> SceneConfig, ConfigError (本层)
//! Layer 3: ec_physics  ─> SceneBuilder: SceneConfig -> 编排器
//! Layer 2: ec_mesh
//! Layer 1: ec_foundation
//! ```
//!
//! # 设计原则
//!
//! 1. **无泛型**: 本层所有类型都不包含泛型参数
//! 2. **纯数据**: 坐标使用 `[f64; 2]`，不依赖几何库
//! 3. **默认场景可运行**: `SceneConfig::default()` 即液滴在圆柱上铺展的算例

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod scene;

/// 层级标识
pub const LAYER: u8 = 4;

pub use error::ConfigError;
pub use scene::{
    BoundaryConfig, BoundaryKind, CoordinateSystem, GridConfig, InterfaceConfig, PipelineConfig,
    SceneConfig, ShapeConfig,
};
