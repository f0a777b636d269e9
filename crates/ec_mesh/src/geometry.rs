// crates/ec_mesh/src/geometry.rs

//! 嵌入边界几何
//!
//! 几何由外部提供，核心只读取两类量：
//! - 单元流体可达体积分数 `cs`（0 为纯固体，1 为无固体）
//! - 每个面的流体可达面积分数 `fs`
//!
//! [`EmbeddedGeometry`] 是默认实现，可由水平集构造，并支持
//! 小单元清理（过小的切割单元并入固体）。

use crate::direction::Side;
use crate::fractions::{cell_fractions, LevelSet};
use crate::structured::StructuredMesh;
use crate::topology::StencilMesh;
use ec_foundation::error::{EcError, EcResult};
use ec_foundation::validation::{
    check_fraction, ValidationError, ValidationReport, ValidationWarning,
};
use tracing::debug;

/// 共享面两侧分数允许的差值
const FACE_MISMATCH_TOLERANCE: f64 = 1e-9;

/// 几何查询 trait
pub trait GeometryOracle: Send + Sync {
    /// 单元数量
    fn n_cells(&self) -> usize;

    /// 流体可达体积分数 `cs`
    fn solid_fraction(&self, cell: usize) -> f64;

    /// 流体可达面积分数 `fs`
    fn face_fraction(&self, cell: usize, side: Side) -> f64;

    /// 校验几何与网格的一致性
    ///
    /// 单元数不一致与非有限分数为错误；分数越界与共享面两侧
    /// 分数不一致为警告。
    fn validate(&self, mesh: &dyn StencilMesh) -> ValidationReport {
        let mut report = ValidationReport::new();
        let n = self.n_cells();
        if n != mesh.n_cells() {
            report.add_error(ValidationError::ConsistencyError {
                message: format!("几何单元数 {} 与网格单元数 {} 不一致", n, mesh.n_cells()),
            });
            return report;
        }
        for cell in 0..n {
            check_fraction(&mut report, "solid_fraction", cell, self.solid_fraction(cell));
            for side in Side::ALL {
                let fs = self.face_fraction(cell, side);
                check_fraction(&mut report, "face_fraction", cell, fs);
                match mesh.neighbor(cell, side) {
                    Some(nb) if nb > cell && nb < n => {
                        let difference = (fs - self.face_fraction(nb, side.opposite())).abs();
                        if difference > FACE_MISMATCH_TOLERANCE {
                            report.add_warning(ValidationWarning::FaceMismatch {
                                cell_id: cell,
                                neighbor_id: nb,
                                difference,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        report
    }
}

/// 嵌入边界几何（SoA 存储）
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedGeometry {
    volume: Vec<f64>,
    faces: Vec<[f64; 4]>,
}

impl EmbeddedGeometry {
    /// 无固体的几何
    pub fn fluid_only(n_cells: usize) -> Self {
        Self {
            volume: vec![1.0; n_cells],
            faces: vec![[1.0; 4]; n_cells],
        }
    }

    /// 由已有的分数场创建
    pub fn from_fields(volume: Vec<f64>, faces: Vec<[f64; 4]>) -> EcResult<Self> {
        EcError::check_size("face_fractions", volume.len(), faces.len())?;
        Ok(Self { volume, faces })
    }

    /// 由水平集创建，`φ > 0` 为流体可达区域
    pub fn from_level_set<L: LevelSet + ?Sized>(mesh: &StructuredMesh, level_set: &L) -> Self {
        let fractions = cell_fractions(mesh, level_set);
        Self {
            volume: fractions.volume,
            faces: fractions.faces,
        }
    }

    /// 体积分数
    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    /// 面分数
    pub fn faces(&self) -> &[[f64; 4]] {
        &self.faces
    }

    /// 固体单元数量
    pub fn solid_count(&self) -> usize {
        self.volume.iter().filter(|&&v| v <= 0.0).count()
    }

    /// 切割单元数量
    pub fn cut_count(&self) -> usize {
        self.volume.iter().filter(|&&v| v > 0.0 && v < 1.0).count()
    }

    fn make_solid(&mut self, cell: usize) {
        self.volume[cell] = 0.0;
        self.faces[cell] = [0.0; 4];
    }

    /// 小单元清理
    ///
    /// `0 < cs < threshold` 的单元变为固体；与固体单元相邻的面关闭；
    /// 没有任何开放面的单元变为固体。重复直到不再变化，
    /// 返回变为固体的单元数。
    pub fn clean_small_cells<M: StencilMesh + ?Sized>(&mut self, mesh: &M, threshold: f64) -> usize {
        let n = self.volume.len().min(mesh.n_cells());
        let mut removed = 0;

        for cell in 0..n {
            let cs = self.volume[cell];
            if cs > 0.0 && cs < threshold {
                self.make_solid(cell);
                removed += 1;
            }
        }

        loop {
            let mut changed = false;
            for cell in 0..n {
                if self.volume[cell] > 0.0 {
                    continue;
                }
                for side in Side::ALL {
                    if let Some(nb) = mesh.neighbor(cell, side) {
                        let face = &mut self.faces[nb][side.opposite().index()];
                        if *face > 0.0 {
                            *face = 0.0;
                        }
                    }
                }
            }
            for cell in 0..n {
                if self.volume[cell] > 0.0 && self.faces[cell].iter().all(|&f| f <= 0.0) {
                    self.make_solid(cell);
                    removed += 1;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        debug!(removed, threshold, "小单元清理完成");
        removed
    }
}

impl GeometryOracle for EmbeddedGeometry {
    #[inline]
    fn n_cells(&self) -> usize {
        self.volume.len()
    }

    #[inline]
    fn solid_fraction(&self, cell: usize) -> f64 {
        self.volume[cell]
    }

    #[inline]
    fn face_fraction(&self, cell: usize, side: Side) -> f64 {
        self.faces[cell][side.index()]
    }
}
