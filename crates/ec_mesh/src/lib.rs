// crates/ec_mesh/src/lib.rs

//! EmbedContact 网格层
//!
//! 为核心计算流程提供网格与几何输入：
//!
//! - [`direction`]: 坐标轴与单元面方向
//! - [`topology`]: `StencilMesh` 邻接访问 trait 与邻接校验
//! - [`structured`]: 均匀笛卡尔网格
//! - [`neighbor_table`]: 由外部驱动提供的显式邻接表网格
//! - [`stencil`]: 带边界规则的模板取值
//! - [`geometry`]: 嵌入边界几何（体积/面积分数）
//! - [`fractions`]: 由水平集计算单元体积分数与面分数
//!
//! # 示例
//!
//! ```
//! use ec_mesh::{StructuredMesh, StencilMesh, Side};
//! use glam::DVec2;
//!
//! let mesh = StructuredMesh::new(4, 3, 0.5, DVec2::ZERO).unwrap();
//! let c = mesh.index(1, 1);
//! assert_eq!(mesh.neighbor(c, Side::Right), Some(mesh.index(2, 1)));
//! assert!(mesh.validate_links().is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod direction;
pub mod fractions;
pub mod geometry;
pub mod neighbor_table;
pub mod stencil;
pub mod structured;
pub mod topology;

pub use direction::{Axis, Side};
pub use fractions::{cell_fractions, volume_fractions, CellFractions, LevelSet, Shape};
pub use geometry::{EmbeddedGeometry, GeometryOracle};
pub use neighbor_table::NeighborTable;
pub use stencil::{BoundaryValue, FieldBoundary, StencilView};
pub use structured::StructuredMesh;
pub use topology::{StencilMesh, Walk};
