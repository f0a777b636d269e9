// crates/ec_mesh/src/neighbor_table.rs

//! 显式邻接表网格
//!
//! 由外部驱动（自适应网格、分区求解器）提供每个单元四个方向的邻接。
//! 构造时不做校验，结构检查由 [`StencilMesh::validate_links`] 完成，
//! 编排器在 `new` 中调用它拒绝损坏的邻接。

use crate::direction::Side;
use crate::structured::StructuredMesh;
use crate::topology::StencilMesh;
use ec_foundation::error::{EcError, EcResult};
use glam::DVec2;

/// 显式邻接表网格
#[derive(Debug, Clone)]
pub struct NeighborTable {
    links: Vec<[Option<usize>; 4]>,
    centers: Vec<DVec2>,
    delta: f64,
}

impl NeighborTable {
    /// 由邻接和单元中心创建
    pub fn new(links: Vec<[Option<usize>; 4]>, centers: Vec<DVec2>, delta: f64) -> EcResult<Self> {
        EcError::check_size("cell_centers", links.len(), centers.len())?;
        Ok(Self {
            links,
            centers,
            delta,
        })
    }

    /// 从结构化网格复制邻接
    pub fn from_structured(mesh: &StructuredMesh) -> Self {
        let n = mesh.n_cells();
        let links = (0..n)
            .map(|cell| Side::ALL.map(|side| mesh.neighbor(cell, side)))
            .collect();
        let centers = (0..n).map(|cell| mesh.cell_center(cell)).collect();
        Self {
            links,
            centers,
            delta: mesh.delta(),
        }
    }

    /// 覆盖单个邻接（不维护反向链接）
    pub fn set_link(&mut self, cell: usize, side: Side, neighbor: Option<usize>) -> EcResult<()> {
        EcError::check_index("Cell", cell, self.links.len())?;
        self.links[cell][side.index()] = neighbor;
        Ok(())
    }

    /// 全部邻接
    pub fn links(&self) -> &[[Option<usize>; 4]] {
        &self.links
    }
}

impl StencilMesh for NeighborTable {
    #[inline]
    fn n_cells(&self) -> usize {
        self.links.len()
    }

    #[inline]
    fn neighbor(&self, cell: usize, side: Side) -> Option<usize> {
        self.links.get(cell).and_then(|l| l[side.index()])
    }

    #[inline]
    fn cell_center(&self, cell: usize) -> DVec2 {
        self.centers[cell]
    }

    #[inline]
    fn delta(&self) -> f64 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_structured() {
        let mesh = StructuredMesh::new(4, 3, 0.25, DVec2::ZERO).unwrap();
        let table = NeighborTable::from_structured(&mesh);
        assert_eq!(table.n_cells(), 12);
        for cell in 0..12 {
            for side in Side::ALL {
                assert_eq!(table.neighbor(cell, side), mesh.neighbor(cell, side));
            }
            assert_eq!(table.walk(cell, 2, -3), mesh.walk(cell, 2, -3));
        }
        assert!(table.validate_links().is_valid());
    }

    #[test]
    fn test_detects_broken_links() {
        let mesh = StructuredMesh::new(3, 3, 1.0, DVec2::ZERO).unwrap();
        let mut table = NeighborTable::from_structured(&mesh);
        table.set_link(4, Side::Right, Some(3)).unwrap();
        assert!(!table.validate_links().is_valid());

        let mut table = NeighborTable::from_structured(&mesh);
        table.set_link(0, Side::Left, Some(99)).unwrap();
        assert!(!table.validate_links().is_valid());

        let mut table = NeighborTable::from_structured(&mesh);
        table.set_link(2, Side::Top, Some(2)).unwrap();
        assert!(!table.validate_links().is_valid());
    }

    #[test]
    fn test_size_mismatch() {
        let result = NeighborTable::new(vec![[None; 4]; 3], vec![DVec2::ZERO; 2], 1.0);
        assert!(result.is_err());
        let mut table = NeighborTable::new(vec![[None; 4]], vec![DVec2::ZERO], 1.0).unwrap();
        assert!(table.set_link(5, Side::Left, None).is_err());
    }
}
