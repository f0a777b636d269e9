// crates/ec_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `EcError` 枚举和 `EcResult` 类型别名。
//!
//! 核心计算流程中的数值退化（分类歧义、接触角求解失败、高度列不连续、
//! 分数越界）都在本地处理，不产生错误。只有结构性问题（网格邻接关系损坏、
//! 字段长度不匹配、配置无效）才通过 `EcError` 返回。
//!
//! # 示例
//!
//! ```
//! use ec_foundation::error::{EcError, EcResult};
//!
//! fn read_config() -> EcResult<()> {
//!     Err(EcError::config("场景配置缺少网格尺寸"))
//! }
//! assert!(read_config().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type EcResult<T> = Result<T, EcError>;

/// EmbedContact 错误类型
#[derive(Error, Debug)]
pub enum EcError {
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl EcError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 是否为结构性网格错误
    pub fn is_mesh_error(&self) -> bool {
        matches!(self, Self::InvalidMesh { .. })
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl EcError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> EcResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查值是否在范围内（NaN 视为越界）
    #[inline]
    pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> EcResult<()> {
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(Self::out_of_range(field, value, min, max))
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> EcResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EcError::config("测试配置错误");
        assert!(err.to_string().contains("配置错误"));
    }

    #[test]
    fn test_variant_messages() {
        let err = EcError::size_mismatch("raw_fraction", 16, 15);
        assert!(err.to_string().contains("raw_fraction"));
        let err = EcError::out_of_range("contact_angle", 200.0, 0.0, 180.0);
        assert!(err.to_string().contains("180"));
        let err = EcError::invalid_input("名称重复");
        assert!(matches!(err, EcError::InvalidInput { .. }));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let err = EcError::index_out_of_bounds("Cell", 10, 5);
        let msg = err.to_string();
        assert!(msg.contains("Cell"));
        assert!(msg.contains("10"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_check_size() {
        assert!(EcError::check_size("test", 10, 10).is_ok());
        assert!(EcError::check_size("test", 10, 5).is_err());
    }

    #[test]
    fn test_check_range_rejects_nan() {
        assert!(EcError::check_range("angle", 30.0, 0.0, 180.0).is_ok());
        assert!(EcError::check_range("angle", -1.0, 0.0, 180.0).is_err());
        assert!(EcError::check_range("angle", f64::NAN, 0.0, 180.0).is_err());
    }

    #[test]
    fn test_check_index() {
        assert!(EcError::check_index("Cell", 5, 10).is_ok());
        assert!(EcError::check_index("Cell", 10, 10).is_err());
    }

    #[test]
    fn test_mesh_error_kind() {
        assert!(EcError::invalid_mesh("断开的邻接").is_mesh_error());
        assert!(!EcError::config("x").is_mesh_error());
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: i32) -> EcResult<()> {
            ensure!(value > 0, EcError::invalid_input("value must be positive"));
            Ok(())
        }

        assert!(check(1).is_ok());
        assert!(check(-1).is_err());
    }
}
