// crates/ec_foundation/src/lib.rs

//! EmbedContact Foundation Layer
//!
//! 基础层，提供整个工作区共用的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `EcError` / `EcResult`
//! - [`validation`]: 验证报告（错误 + 警告）
//! - [`numerics`]: 补偿求和与体积分数钳位
//!
//! # 示例
//!
//! ```
//! use ec_foundation::{EcError, EcResult, numerics::clamp_fraction};
//!
//! fn check(n: usize) -> EcResult<()> {
//!     EcError::check_size("raw_fraction", 16, n)
//! }
//!
//! assert!(check(16).is_ok());
//! assert_eq!(clamp_fraction(1.2), 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod numerics;
pub mod validation;

pub use error::{EcError, EcResult};
pub use numerics::KahanSum;
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{EcError, EcResult};
    pub use crate::numerics::{clamp_fraction, KahanSum};
    pub use crate::validation::{ValidationError, ValidationReport, ValidationWarning};
    pub use crate::ensure;
}
