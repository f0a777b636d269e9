// crates/ec_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 网格邻接检查和几何场检查都把发现的问题写入 [`ValidationReport`]，
//! 由调用方决定错误是否致命。
//!
//! # 示例
//!
//! ```
//! use ec_foundation::validation::{ValidationReport, check_fraction};
//!
//! let mut report = ValidationReport::new();
//! check_fraction(&mut report, "solid_fraction", 3, 1.2);
//! assert!(report.has_warnings());
//! assert!(report.is_valid());
//! ```

use crate::error::{EcError, EcResult};
use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// 有错误时转换为网格错误，消息取第一条错误
    pub fn into_mesh_result(self) -> EcResult<ValidationReport> {
        match self.errors.first() {
            Some(first) => Err(EcError::invalid_mesh(format!(
                "{} (共 {} 个错误)",
                first,
                self.error_count()
            ))),
            None => Ok(self),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段名称
        field: &'static str,
        /// 所在单元 ID
        cell_id: usize,
        /// 非有限的数值
        value: f64,
    },
    /// 拓扑错误（邻接缺失、越界、不对称）
    TopologyError {
        /// 错误描述
        message: String,
        /// 可选的单元 ID
        element_id: Option<usize>,
    },
    /// 一致性错误
    ConsistencyError {
        /// 错误描述
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                field,
                cell_id,
                value,
            } => write!(f, "单元{}: 字段{}={} (非有限值)", cell_id, field, value),
            Self::TopologyError { message, element_id } => match element_id {
                Some(id) => write!(f, "单元{}: 拓扑错误: {}", id, message),
                None => write!(f, "拓扑错误: {}", message),
            },
            Self::ConsistencyError { message } => write!(f, "一致性错误: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone)]
pub enum ValidationWarning {
    /// 分数越出 [0, 1]，使用时会被钳位
    FractionOutOfRange {
        /// 字段名称
        field: &'static str,
        /// 单元 ID
        cell_id: usize,
        /// 实际值
        value: f64,
    },
    /// 相邻单元共享面的面积分数不一致
    FaceMismatch {
        /// 单元 ID
        cell_id: usize,
        /// 相邻单元 ID
        neighbor_id: usize,
        /// 两侧数值之差
        difference: f64,
    },
    /// 自定义警告
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FractionOutOfRange {
                field,
                cell_id,
                value,
            } => write!(f, "单元{}: 字段{}={} 超出[0, 1]，将被钳位", cell_id, field, value),
            Self::FaceMismatch {
                cell_id,
                neighbor_id,
                difference,
            } => write!(
                f,
                "单元{}与单元{}: 共享面分数相差 {:.3e}",
                cell_id, neighbor_id, difference
            ),
            Self::Custom { message } => write!(f, "{}", message),
        }
    }
}

// ============================================================================
// 验证辅助函数
// ============================================================================

/// 检查分数值：非有限记为错误，越出 [0, 1] 记为警告
///
/// 返回值是否可以原样使用。
pub fn check_fraction(
    report: &mut ValidationReport,
    field: &'static str,
    cell_id: usize,
    value: f64,
) -> bool {
    if !value.is_finite() {
        report.add_error(ValidationError::NonFinite {
            field,
            cell_id,
            value,
        });
        return false;
    }
    if !(0.0..=1.0).contains(&value) {
        report.add_warning(ValidationWarning::FractionOutOfRange {
            field,
            cell_id,
            value,
        });
        return false;
    }
    true
}
