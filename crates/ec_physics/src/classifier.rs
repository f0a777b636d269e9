// crates/ec_physics/src/classifier.rs

//! 单元分类器
//!
//! 每个单元的标签是输入快照在其 3×3 模板上的纯函数，按优先级
//! 取第一条命中的规则：
//!
//! | 优先级 | 标签 | 条件 |
//! |---|---|---|
//! | 0 | Special | 单元输入含非有限值 |
//! | 1 | Solid | `cs ≤ solid_eps` |
//! | 2 | NoInterface | 模板内所有非固体单元为同一纯相 |
//! | 3 | BoundaryEmbed | 切割单元，无界面穿过 |
//! | 4 | Contact3Phase | 切割单元，有界面穿过，有可达邻居，模板含接触邻居，接触点在单元内 |
//! | 5 | Contact2Phase | 切割单元，有界面穿过，有可达邻居 |
//! | 6 | InterfaceOnly | 非切割单元，有界面穿过，有可达邻居，模板内无切割/固体单元 |
//! | 7 | Standard | 其它纯相或有可达邻居的非切割单元 |
//! | 8 | Special | 其余情况 |
//!
//! 界面穿过单元：单元为混合相，或单元为纯相且某个开放面
//! （`fs > solid_eps`）另一侧的邻居为相反的纯相。
//!
//! 接触邻居：域内的非退化切割单元，且有界面穿过。固体单元的
//! 有无只取决于壁面落在网格上的位置，不参与 2 相/3 相的判定。

use crate::reconstruct::{contact_point_in_cell, fluid_region, least_squares_normal, plane_in_region};
use crate::snapshot::{pure_phase, SnapshotView, Stencil3};
use crate::types::{CellTag, PipelineParams};
use ec_mesh::{Side, StencilMesh};
use rayon::prelude::*;
use tracing::debug;

/// 对全部单元分类
pub fn classify<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    params: &PipelineParams,
) -> Vec<CellTag> {
    let n = view.snapshot().n_cells();
    let tags: Vec<CellTag> = if params.use_parallel(n) {
        (0..n)
            .into_par_iter()
            .map(|cell| classify_cell(view, cell, params))
            .collect()
    } else {
        (0..n).map(|cell| classify_cell(view, cell, params)).collect()
    };
    debug!(n_cells = n, "单元分类完成");
    tags
}

/// 单个单元的分类
pub fn classify_cell<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    cell: usize,
    params: &PipelineParams,
) -> CellTag {
    let snap = view.snapshot();
    let (solid_eps, vof_eps) = (params.solid_eps, params.vof_eps);

    if snap.is_degenerate(cell) {
        return CellTag::Special;
    }
    if snap.is_solid(cell) {
        return CellTag::Solid;
    }

    let stencil = view.stencil3(cell);
    if uniform_pure_stencil(&stencil, solid_eps, vof_eps) {
        return CellTag::NoInterface;
    }

    let cut = snap.is_cut(cell);
    let crossed = interface_crosses(view, &stencil, cell, params);
    if cut && !crossed {
        return CellTag::BoundaryEmbed;
    }

    let accessible = stencil
        .neighbors()
        .any(|(_, sample)| sample.is_accessible(solid_eps));

    if cut {
        if !accessible {
            return CellTag::Special;
        }
        if has_contact_neighbor(view, &stencil, params)
            && three_phase_point(view, &stencil, cell, params)
        {
            return CellTag::Contact3Phase;
        }
        return CellTag::Contact2Phase;
    }

    if crossed && accessible {
        let clean = stencil
            .neighbors()
            .all(|(_, sample)| !sample.is_solid(solid_eps) && !sample.is_cut(solid_eps));
        if clean {
            return CellTag::InterfaceOnly;
        }
    }

    if pure_phase(snap.phase(cell), vof_eps).is_some() || accessible {
        CellTag::Standard
    } else {
        CellTag::Special
    }
}

/// 模板内所有非固体单元是否为同一纯相
fn uniform_pure_stencil(stencil: &Stencil3, solid_eps: f64, vof_eps: f64) -> bool {
    let mut reference = None;
    for di in -1..=1 {
        for dj in -1..=1 {
            let sample = stencil.get(di, dj);
            if sample.is_solid(solid_eps) {
                continue;
            }
            match (pure_phase(sample.phase, vof_eps), reference) {
                (None, _) => return false,
                (Some(p), None) => reference = Some(p),
                (Some(p), Some(r)) if p != r => return false,
                _ => {}
            }
        }
    }
    true
}

/// 流体-流体界面是否穿过单元
fn interface_crosses<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    stencil: &Stencil3,
    cell: usize,
    params: &PipelineParams,
) -> bool {
    let snap = view.snapshot();
    let own = match pure_phase(snap.phase(cell), params.vof_eps) {
        None => return true,
        Some(p) => p,
    };
    Side::ALL.iter().any(|&side| {
        if snap.face(cell, side) <= params.solid_eps {
            return false;
        }
        let (di, dj) = side.offset();
        let sample = stencil.get(di, dj);
        !sample.is_solid(params.solid_eps)
            && pure_phase(sample.phase, params.vof_eps) == Some(!own)
    })
}

/// 模板内是否存在被界面穿过的切割邻居
fn has_contact_neighbor<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    stencil: &Stencil3,
    params: &PipelineParams,
) -> bool {
    let snap = view.snapshot();
    stencil.neighbors().any(|(_, sample)| match sample.cell {
        Some(nb) if snap.is_cut(nb) && !snap.is_degenerate(nb) => {
            interface_crosses(view, &view.stencil3(nb), nb, params)
        }
        _ => false,
    })
}

/// 无约束界面与壁面的交点是否落在单元内
fn three_phase_point<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    stencil: &Stencil3,
    cell: usize,
    params: &PipelineParams,
) -> bool {
    let snap = view.snapshot();
    let Some(region) = fluid_region(snap.faces(cell), snap.cs(cell), params.solid_eps) else {
        return false;
    };
    let Some(wall) = region.wall else {
        return false;
    };
    let Some(m) = least_squares_normal(stencil, params.solid_eps) else {
        return false;
    };
    match plane_in_region(m, snap.raw(cell), &region, params) {
        Some(interface) => contact_point_in_cell(&interface, &wall),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::FractionSnapshot;
    use ec_mesh::{EmbeddedGeometry, FieldBoundary, StructuredMesh};
    use glam::DVec2;

    fn classify_fields(
        mesh: &StructuredMesh,
        geometry: &EmbeddedGeometry,
        raw: &[f64],
    ) -> Vec<CellTag> {
        let params = PipelineParams::default().with_parallel(false);
        let snap = FractionSnapshot::capture(geometry, raw, &params).unwrap();
        let view = SnapshotView::new(mesh, &snap, FieldBoundary::neumann());
        classify(&view, &params)
    }

    #[test]
    fn test_uniform_field_is_no_interface() {
        let mesh = StructuredMesh::new(4, 4, 1.0, DVec2::ZERO).unwrap();
        let geometry = EmbeddedGeometry::fluid_only(16);
        let tags = classify_fields(&mesh, &geometry, &[1.0; 16]);
        assert!(tags.iter().all(|&t| t == CellTag::NoInterface));
    }

    #[test]
    fn test_solid_and_degenerate() {
        let mesh = StructuredMesh::new(3, 1, 1.0, DVec2::ZERO).unwrap();
        let geometry = EmbeddedGeometry::from_fields(
            vec![0.0, 1.0, 1.0],
            vec![[0.0; 4], [0.0, 1.0, 1.0, 1.0], [1.0; 4]],
        )
        .unwrap();
        let tags = classify_fields(&mesh, &geometry, &[0.0, f64::NAN, 0.0]);
        assert_eq!(tags[0], CellTag::Solid);
        assert_eq!(tags[1], CellTag::Special);
    }

    #[test]
    fn test_flat_interface_tags() {
        // 界面 y = 4.5，下方为参考相
        let mesh = StructuredMesh::new(6, 9, 1.0, DVec2::ZERO).unwrap();
        let geometry = EmbeddedGeometry::fluid_only(mesh.n_cells());
        let raw: Vec<f64> = (0..mesh.n_cells())
            .map(|c| match mesh.ij(c).1 {
                j if j < 4 => 1.0,
                4 => 0.5,
                _ => 0.0,
            })
            .collect();
        let tags = classify_fields(&mesh, &geometry, &raw);
        assert_eq!(tags[mesh.index(2, 4)], CellTag::InterfaceOnly);
        assert_eq!(tags[mesh.index(2, 3)], CellTag::Standard);
        assert_eq!(tags[mesh.index(2, 0)], CellTag::NoInterface);
        assert_eq!(tags[mesh.index(2, 8)], CellTag::NoInterface);
    }

    #[test]
    fn test_isolated_mixed_cut_cell_is_special() {
        // 单元 1 为切割单元，两侧均为固体
        let mesh = StructuredMesh::new(3, 1, 1.0, DVec2::ZERO).unwrap();
        let geometry = EmbeddedGeometry::from_fields(
            vec![0.0, 0.5, 0.0],
            vec![[0.0; 4], [0.0, 0.0, 0.0, 1.0], [0.0; 4]],
        )
        .unwrap();
        let tags = classify_fields(&mesh, &geometry, &[0.0, 0.25, 0.0]);
        assert_eq!(tags[1], CellTag::Special);
    }
}
