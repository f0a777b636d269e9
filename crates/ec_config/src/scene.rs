// crates/ec_config/src/scene.rs

//! SceneConfig - 场景配置
//!
//! 一个场景包含：均匀网格、坐标系、可选的嵌入固体、若干被追踪的界面、
//! 流水线数值参数、被追踪场的边界规则和重算次数。所有字段都有默认值，
//! 默认场景为轴对称液滴在圆柱上铺展（64×64，接触角 30°）。
//!
//! 长度按液滴算例无量纲化：圆柱半径为 1，计算域边长为 5。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;

// ============================================================
// 场景
// ============================================================

/// 场景配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 网格
    #[serde(default)]
    pub grid: GridConfig,

    /// 坐标系
    #[serde(default = "default_coordinates")]
    pub coordinates: CoordinateSystem,

    /// 嵌入固体，`null` 表示无固体
    #[serde(default = "default_solid")]
    pub solid: Option<ShapeConfig>,

    /// 小单元清理阈值，`cs` 低于该值的切割单元并入固体
    #[serde(default = "default_clean_threshold")]
    pub clean_threshold: f64,

    /// 被追踪的界面
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<InterfaceConfig>,

    /// 流水线数值参数
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 被追踪场的边界规则
    #[serde(default)]
    pub boundaries: BoundaryConfig,

    /// 初始化之后的重算次数
    #[serde(default = "default_steps")]
    pub steps: usize,
}

fn default_coordinates() -> CoordinateSystem {
    CoordinateSystem::Axisymmetric
}
fn default_solid() -> Option<ShapeConfig> {
    Some(ShapeConfig::Circle {
        center: [0.0, 1.0],
        radius: 1.0,
        inside: false,
    })
}
fn default_clean_threshold() -> f64 {
    1e-2
}
fn default_interfaces() -> Vec<InterfaceConfig> {
    vec![InterfaceConfig::default()]
}
fn default_steps() -> usize {
    10
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            coordinates: default_coordinates(),
            solid: default_solid(),
            clean_threshold: default_clean_threshold(),
            interfaces: default_interfaces(),
            pipeline: PipelineConfig::default(),
            boundaries: BoundaryConfig::default(),
            steps: default_steps(),
        }
    }
}

impl SceneConfig {
    /// 从 JSON 字符串解析并校验
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 网格步长
    pub fn delta(&self) -> f64 {
        self.grid.length / self.grid.nx as f64
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.pipeline.validate()?;

        if let Some(solid) = &self.solid {
            solid.validate("solid")?;
        }
        if !(0.0..1.0).contains(&self.clean_threshold) {
            return Err(ConfigError::invalid(
                "clean_threshold",
                self.clean_threshold,
                "必须在 [0, 1) 范围内",
            ));
        }

        if self.interfaces.is_empty() {
            return Err(ConfigError::Missing("interfaces".into()));
        }
        let mut names = HashSet::new();
        for (k, interface) in self.interfaces.iter().enumerate() {
            interface.validate(k)?;
            if !names.insert(interface.name.as_str()) {
                return Err(ConfigError::invalid(
                    format!("interfaces[{}].name", k),
                    &interface.name,
                    "界面名称重复",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================
// 网格与坐标系
// ============================================================

/// 均匀网格配置（正方形单元，`Δ = length / nx`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// x 方向单元数
    #[serde(default = "default_cells")]
    pub nx: usize,
    /// y 方向单元数
    #[serde(default = "default_cells")]
    pub ny: usize,
    /// 左下角坐标
    #[serde(default)]
    pub origin: [f64; 2],
    /// x 方向域长
    #[serde(default = "default_length")]
    pub length: f64,
}

fn default_cells() -> usize {
    64
}
fn default_length() -> f64 {
    5.0
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: default_cells(),
            ny: default_cells(),
            origin: [0.0, 0.0],
            length: default_length(),
        }
    }
}

impl GridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.nx == 0 || self.ny == 0 {
            return Err(ConfigError::invalid(
                "grid",
                format!("{}x{}", self.nx, self.ny),
                "单元数必须为正",
            ));
        }
        if !(self.length > 0.0 && self.length.is_finite()) {
            return Err(ConfigError::invalid("grid.length", self.length, "域长必须为正"));
        }
        if !self.origin.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::invalid(
                "grid.origin",
                format!("{:?}", self.origin),
                "原点必须为有限值",
            ));
        }
        Ok(())
    }
}

/// 坐标系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// 平面笛卡尔坐标
    #[default]
    Cartesian,
    /// 轴对称子午面，y 为径向坐标，体积按 y 加权
    Axisymmetric,
}

// ============================================================
// 形状与界面
// ============================================================

/// 形状（水平集），正值一侧为区域内部
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    /// 圆
    Circle {
        /// 圆心
        center: [f64; 2],
        /// 半径
        radius: f64,
        /// 正值区域是否为圆内
        #[serde(default = "default_inside")]
        inside: bool,
    },
    /// 半平面，`normal` 指向正值一侧
    HalfPlane {
        /// 边界上一点
        point: [f64; 2],
        /// 法向
        normal: [f64; 2],
    },
}

fn default_inside() -> bool {
    true
}

impl ShapeConfig {
    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        match self {
            Self::Circle { center, radius, .. } => {
                if !(*radius > 0.0 && radius.is_finite()) {
                    return Err(ConfigError::invalid(
                        format!("{}.radius", key),
                        radius,
                        "半径必须为正",
                    ));
                }
                if !center.iter().all(|v| v.is_finite()) {
                    return Err(ConfigError::invalid(
                        format!("{}.center", key),
                        format!("{:?}", center),
                        "圆心必须为有限值",
                    ));
                }
            }
            Self::HalfPlane { point, normal } => {
                let norm = (normal[0] * normal[0] + normal[1] * normal[1]).sqrt();
                if !(norm > 0.0 && norm.is_finite()) {
                    return Err(ConfigError::invalid(
                        format!("{}.normal", key),
                        format!("{:?}", normal),
                        "法向不能为零",
                    ));
                }
                if !point.iter().all(|v| v.is_finite()) {
                    return Err(ConfigError::invalid(
                        format!("{}.point", key),
                        format!("{:?}", point),
                        "点坐标必须为有限值",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// 被追踪的界面
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// 界面名称
    #[serde(default = "default_interface_name")]
    pub name: String,

    /// 参考相初始区域
    #[serde(default = "default_droplet")]
    pub shape: ShapeConfig,

    /// 接触角 [度]，在参考相内测量
    #[serde(default = "default_contact_angle")]
    pub contact_angle_deg: f64,

    /// 是否计算高度函数
    #[serde(default = "default_true")]
    pub heights: bool,

    /// 初始场是否乘以 `cs`（固体内部不含参考相）
    #[serde(default = "default_true")]
    pub mask_by_solid: bool,
}

fn default_interface_name() -> String {
    "f".to_string()
}
fn default_droplet() -> ShapeConfig {
    ShapeConfig::Circle {
        center: [0.0, 2.913],
        radius: 1.006,
        inside: true,
    }
}
fn default_contact_angle() -> f64 {
    30.0
}
fn default_true() -> bool {
    true
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            name: default_interface_name(),
            shape: default_droplet(),
            contact_angle_deg: default_contact_angle(),
            heights: true,
            mask_by_solid: true,
        }
    }
}

impl InterfaceConfig {
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("interfaces[{}].name", index),
                "\"\"",
                "界面名称不能为空",
            ));
        }
        if !(0.0..=180.0).contains(&self.contact_angle_deg) {
            return Err(ConfigError::invalid(
                format!("interfaces[{}].contact_angle_deg", index),
                self.contact_angle_deg,
                "接触角必须在 [0, 180] 度范围内",
            ));
        }
        self.shape.validate(&format!("interfaces[{}].shape", index))
    }
}

// ============================================================
// 流水线参数
// ============================================================

/// 流水线数值参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 纯相判定容差
    #[serde(default = "default_vof_eps")]
    pub vof_eps: f64,
    /// 固体判定容差
    #[serde(default = "default_solid_eps")]
    pub solid_eps: f64,
    /// 面积匹配容差（单元面积为 1 的单位）
    #[serde(default = "default_area_tolerance")]
    pub area_tolerance: f64,
    /// 二分法最大迭代次数
    #[serde(default = "default_max_bisection_iters")]
    pub max_bisection_iters: usize,
    /// 界面与壁面切向判定容差
    #[serde(default = "default_tangent_eps")]
    pub tangent_eps: f64,
    /// 高度列半宽（列长 `2 * half_width + 1`）
    #[serde(default = "default_column_half_width")]
    pub column_half_width: usize,
    /// 是否启用并行
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// 并行阈值（单元数）
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_vof_eps() -> f64 {
    1e-6
}
fn default_solid_eps() -> f64 {
    1e-9
}
fn default_area_tolerance() -> f64 {
    1e-10
}
fn default_max_bisection_iters() -> usize {
    64
}
fn default_tangent_eps() -> f64 {
    1e-9
}
fn default_column_half_width() -> usize {
    3
}
fn default_parallel_threshold() -> usize {
    1000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vof_eps: default_vof_eps(),
            solid_eps: default_solid_eps(),
            area_tolerance: default_area_tolerance(),
            max_bisection_iters: default_max_bisection_iters(),
            tangent_eps: default_tangent_eps(),
            column_half_width: default_column_half_width(),
            parallel: true,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl PipelineConfig {
    /// 验证参数有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.vof_eps > 0.0 && self.vof_eps < 0.5) {
            return Err(ConfigError::invalid(
                "pipeline.vof_eps",
                self.vof_eps,
                "必须在 (0, 0.5) 范围内",
            ));
        }
        if !(self.solid_eps >= 0.0 && self.solid_eps < 0.5) {
            return Err(ConfigError::invalid(
                "pipeline.solid_eps",
                self.solid_eps,
                "必须在 [0, 0.5) 范围内",
            ));
        }
        if !(self.area_tolerance > 0.0 && self.area_tolerance < 1e-2) {
            return Err(ConfigError::invalid(
                "pipeline.area_tolerance",
                self.area_tolerance,
                "必须在 (0, 1e-2) 范围内",
            ));
        }
        if self.max_bisection_iters == 0 {
            return Err(ConfigError::invalid(
                "pipeline.max_bisection_iters",
                self.max_bisection_iters,
                "必须为正",
            ));
        }
        if !(self.tangent_eps >= 0.0 && self.tangent_eps < 1.0) {
            return Err(ConfigError::invalid(
                "pipeline.tangent_eps",
                self.tangent_eps,
                "必须在 [0, 1) 范围内",
            ));
        }
        if self.column_half_width == 0 {
            return Err(ConfigError::invalid(
                "pipeline.column_half_width",
                self.column_half_width,
                "必须为正",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 边界
// ============================================================

/// 单个边界面的规则
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// 零梯度
    #[default]
    Neumann,
    /// 固定值
    Dirichlet(f64),
}

/// 被追踪场四个边界面的规则
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// -x 边界
    #[serde(default)]
    pub left: BoundaryKind,
    /// +x 边界
    #[serde(default)]
    pub right: BoundaryKind,
    /// -y 边界
    #[serde(default = "default_bottom")]
    pub bottom: BoundaryKind,
    /// +y 边界
    #[serde(default)]
    pub top: BoundaryKind,
}

fn default_bottom() -> BoundaryKind {
    BoundaryKind::Dirichlet(0.0)
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            left: BoundaryKind::Neumann,
            right: BoundaryKind::Neumann,
            bottom: default_bottom(),
            top: BoundaryKind::Neumann,
        }
    }
}
