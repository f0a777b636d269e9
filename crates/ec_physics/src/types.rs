// crates/ec_physics/src/types.rs

//! 核心类型定义
//!
//! - [`CellTag`]: 单元分类标签，整数编码 1..=8 保持稳定
//! - [`NormalSource`]: 发布法向的来源
//! - [`ContactAngle`]: 接触角场（均匀或逐单元）
//! - [`PipelineParams`]: 流水线数值参数

use ec_config::PipelineConfig;
use ec_foundation::error::{EcError, EcResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use ec_config::CoordinateSystem;

// ============================================================
// 单元标签
// ============================================================

/// 单元分类标签
///
/// 每步每个单元恰好一个标签，由该步输入快照唯一确定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellTag {
    /// 纯固体
    Solid = 1,
    /// 模板内无界面
    NoInterface = 2,
    /// 标准 PLIC 单元
    Standard = 3,
    /// 两相接触单元（切割单元内有界面）
    Contact2Phase = 4,
    /// 三相接触单元（固体、两种流体交于单元内一点）
    Contact3Phase = 5,
    /// 远离固体的纯界面单元
    InterfaceOnly = 6,
    /// 无界面穿过的切割单元
    BoundaryEmbed = 7,
    /// 特殊单元（孤立、退化输入或接触求解失败）
    Special = 8,
}

impl CellTag {
    /// 全部标签，按编码排序
    pub const ALL: [CellTag; 8] = [
        CellTag::Solid,
        CellTag::NoInterface,
        CellTag::Standard,
        CellTag::Contact2Phase,
        CellTag::Contact3Phase,
        CellTag::InterfaceOnly,
        CellTag::BoundaryEmbed,
        CellTag::Special,
    ];

    /// 整数编码
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 由整数编码构造
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get((code as usize).checked_sub(1)?).copied()
    }

    /// 是否为接触单元
    #[inline]
    pub fn is_contact(self) -> bool {
        matches!(self, Self::Contact2Phase | Self::Contact3Phase)
    }

    /// 是否计算高度函数
    #[inline]
    pub fn has_heights(self) -> bool {
        matches!(
            self,
            Self::Standard | Self::Contact2Phase | Self::Contact3Phase | Self::InterfaceOnly
        )
    }

    /// 标签名称
    pub fn name(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::NoInterface => "no_interface",
            Self::Standard => "standard",
            Self::Contact2Phase => "contact_2phase",
            Self::Contact3Phase => "contact_3phase",
            Self::InterfaceOnly => "interface_only",
            Self::BoundaryEmbed => "boundary_embed",
            Self::Special => "special",
        }
    }
}

impl fmt::Display for CellTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

/// 发布法向的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalSource {
    /// 无
    #[default]
    None,
    /// 高度函数
    HeightFunction,
    /// 接触角约束平面（高度函数无效时的接触单元）
    ContactPlane,
}

// ============================================================
// 接触角
// ============================================================

/// 接触角场 [度]，在参考相内测量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContactAngle {
    /// 全域均匀
    Uniform(f64),
    /// 逐单元
    PerCell(Vec<f64>),
}

impl ContactAngle {
    /// 单元 `cell` 处的接触角 [度]
    #[inline]
    pub fn degrees(&self, cell: usize) -> f64 {
        match self {
            Self::Uniform(theta) => *theta,
            Self::PerCell(values) => values[cell],
        }
    }

    /// 校验：长度匹配且每个角度在 [0, 180] 内
    pub fn validate(&self, n_cells: usize) -> EcResult<()> {
        match self {
            Self::Uniform(theta) => EcError::check_range("contact_angle", *theta, 0.0, 180.0),
            Self::PerCell(values) => {
                EcError::check_size("contact_angle", n_cells, values.len())?;
                values
                    .iter()
                    .try_for_each(|&theta| EcError::check_range("contact_angle", theta, 0.0, 180.0))
            }
        }
    }
}

impl Default for ContactAngle {
    fn default() -> Self {
        Self::Uniform(90.0)
    }
}

// ============================================================
// 流水线参数
// ============================================================

/// 流水线数值参数
///
/// 面积、偏移量均以单元边长为 1 的单位计。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// 纯相判定容差
    pub vof_eps: f64,
    /// 固体判定容差
    pub solid_eps: f64,
    /// 面积匹配容差
    pub area_tolerance: f64,
    /// 二分法最大迭代次数
    pub max_bisection_iters: usize,
    /// 界面与壁面切向判定容差
    pub tangent_eps: f64,
    /// 高度列半宽
    pub column_half_width: usize,
    /// 是否启用并行
    pub parallel: bool,
    /// 并行阈值（单元数）
    pub parallel_threshold: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for PipelineParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            vof_eps: config.vof_eps,
            solid_eps: config.solid_eps,
            area_tolerance: config.area_tolerance,
            max_bisection_iters: config.max_bisection_iters,
            tangent_eps: config.tangent_eps,
            column_half_width: config.column_half_width,
            parallel: config.parallel,
            parallel_threshold: config.parallel_threshold,
        }
    }
}

impl PipelineParams {
    /// 设置纯相判定容差
    pub fn with_vof_eps(mut self, eps: f64) -> Self {
        self.vof_eps = eps;
        self
    }

    /// 设置固体判定容差
    pub fn with_solid_eps(mut self, eps: f64) -> Self {
        self.solid_eps = eps;
        self
    }

    /// 设置高度列半宽
    pub fn with_column_half_width(mut self, half_width: usize) -> Self {
        self.column_half_width = half_width;
        self
    }

    /// 设置并行开关
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 设置并行阈值
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// 单元数为 `n_cells` 时是否并行
    #[inline]
    pub fn use_parallel(&self, n_cells: usize) -> bool {
        self.parallel && n_cells >= self.parallel_threshold
    }

    /// 验证参数有效性
    pub fn validate(&self) -> EcResult<()> {
        let config = PipelineConfig {
            vof_eps: self.vof_eps,
            solid_eps: self.solid_eps,
            area_tolerance: self.area_tolerance,
            max_bisection_iters: self.max_bisection_iters,
            tangent_eps: self.tangent_eps,
            column_half_width: self.column_half_width,
            parallel: self.parallel,
            parallel_threshold: self.parallel_threshold,
        };
        config
            .validate()
            .map_err(|e| EcError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_codes_stable() {
        for (k, tag) in CellTag::ALL.iter().enumerate() {
            assert_eq!(tag.code() as usize, k + 1);
            assert_eq!(CellTag::from_code(tag.code()), Some(*tag));
        }
        assert_eq!(CellTag::from_code(0), None);
        assert_eq!(CellTag::from_code(9), None);
        assert_eq!(CellTag::Contact3Phase.code(), 5);
    }

    #[test]
    fn test_height_eligibility() {
        let eligible: Vec<_> = CellTag::ALL.iter().filter(|t| t.has_heights()).collect();
        assert_eq!(eligible.len(), 4);
        assert!(!CellTag::Solid.has_heights());
        assert!(!CellTag::BoundaryEmbed.has_heights());
        assert!(CellTag::Contact2Phase.is_contact());
    }

    #[test]
    fn test_contact_angle_validate() {
        assert!(ContactAngle::Uniform(30.0).validate(4).is_ok());
        assert!(ContactAngle::Uniform(-1.0).validate(4).is_err());
        assert!(ContactAngle::Uniform(f64::NAN).validate(4).is_err());
        assert!(ContactAngle::PerCell(vec![10.0; 3]).validate(4).is_err());
        assert!(ContactAngle::PerCell(vec![10.0, 200.0]).validate(2).is_err());
        let per_cell = ContactAngle::PerCell(vec![10.0, 170.0]);
        assert!(per_cell.validate(2).is_ok());
        assert_eq!(per_cell.degrees(1), 170.0);
    }

    #[test]
    fn test_params_builders() {
        let params = PipelineParams::default()
            .with_parallel(false)
            .with_column_half_width(2);
        assert!(params.validate().is_ok());
        assert!(!params.use_parallel(1_000_000));
        assert!(PipelineParams::default().with_vof_eps(0.0).validate().is_err());
        assert!(PipelineParams::default().use_parallel(5000));
        assert!(!PipelineParams::default().use_parallel(10));
    }
}
