// crates/ec_physics/src/lib.rs

//! 嵌入边界接触线核心
//!
//! 对部分被静止固体占据的二维笛卡尔网格，每步计算：
//! - 单元分类标签 (classifier)
//! - 与固体和给定接触角几何一致的扩展体积分数场 (contact)
//! - 基于扩展场的高度函数、法向、界面位置与曲率 (height)
//!
//! # 模块概览
//!
//! - [`types`]: 标签、法向来源、接触角、流水线参数
//! - [`snapshot`]: 输入快照与 3×3 模板采样
//! - [`plic`]: 单元内直线界面的面积/偏移量换算与多边形裁剪
//! - [`reconstruct`]: 嵌入边界法向、界面法向与无约束平面
//! - [`classifier`]: 单元分类
//! - [`contact`]: 接触角一致的扩展场
//! - [`height`]: 高度函数
//! - [`diagnostics`]: 标签计数与液体体积
//! - [`pipeline`]: 流水线与重算编排器
//! - [`builder`]: 由场景配置构建编排器
//!
//! # 数据流
//!
//! ```text
//! GeometryOracle + 原始场
//!         │
//!         ▼
//! FractionSnapshot ──> classify ──> build_extended_field ──> compute_heights
//!                                                              │
//!                         RecomputeOrchestrator <──────────────┘ (全部界面成功后发布)
//! ```
//!
//! # 设计原则
//!
//! 1. **无全局状态**: 所有数据由编排器持有
//! 2. **纯函数阶段**: 每个阶段只读不可变输入，返回新分配的结果
//! 3. **逐单元数据并行**: 单元之间无依赖，结果按单元顺序收集

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod classifier;
pub mod contact;
pub mod diagnostics;
pub mod height;
pub mod pipeline;
pub mod plic;
pub mod reconstruct;
pub mod snapshot;
pub mod types;

// 重导出常用类型
pub use builder::{BuildError, Scene, SceneBuilder};
pub use classifier::{classify, classify_cell};
pub use contact::{build_extended_field, ContactFailure, ExtendedField};
pub use diagnostics::{liquid_volume, StepReport, TagCounts};
pub use height::{compute_heights, HeightFields};
pub use pipeline::{
    run_pipeline, InterfaceOutputs, LifecycleState, PipelineRun, RecomputeOrchestrator,
    TrackedInterface,
};
pub use plic::{line_alpha, line_area, Plane, Polygon};
pub use snapshot::{FractionSnapshot, SnapshotView};
pub use types::{CellTag, ContactAngle, CoordinateSystem, NormalSource, PipelineParams};
