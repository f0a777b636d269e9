// crates/ec_physics/src/contact.rs

//! 接触角一致的扩展体积分数场
//!
//! # 两遍算法
//!
//! 第一遍（仅接触单元，逐单元独立）：
//! 1. 嵌入边界法向 `ns`（指向固体）及壁面偏移
//! 2. 无约束界面法向 `m = -∇phase`
//! 3. 约束法向 `n = cosθ · n_w + sinθ · t`，`n_w = -ns`，`t ⟂ ns` 且 `m · t > 0`
//! 4. 二分求偏移量，使流体可达多边形内的参考相面积等于原始分数
//! 5. 扩展分数为该平面截取的整单元面积
//!
//! 求解失败时改用无约束平面，单元回标为 `Special` 并计入回退数。
//!
//! 第二遍（全部单元，只读第一遍结果）：
//! - 接触单元取第一遍的值
//! - `BoundaryEmbed` 单元：原始分数加上固体部分内的参考相面积，
//!   后者由模板内最近的源平面平移得到
//! - 其余单元取原始分数

use crate::plic::Plane;
use crate::reconstruct::{
    fluid_region, least_squares_normal, plane_in_region, unconstrained_plane,
};
use crate::snapshot::{pure_phase, SnapshotView};
use crate::types::{CellTag, ContactAngle, PipelineParams};
use ec_mesh::StencilMesh;
use glam::DVec2;
use rayon::prelude::*;
use tracing::{debug, warn};

/// 源平面搜索顺序：先面邻居，后对角邻居
const SOURCE_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// 扩展场构建结果
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedField {
    /// 扩展体积分数，全部单元在 [0, 1] 内
    pub values: Vec<f64>,
    /// 接触单元的约束平面（单元局部坐标）
    pub planes: Vec<Option<Plane>>,
    /// 回标之后的标签
    pub tags: Vec<CellTag>,
    /// 接触求解回退的单元数
    pub fallbacks: usize,
}

/// 接触单元求解失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFailure {
    /// 无法确定壁面法向
    NoWallNormal,
    /// 流体可达区域为空
    NoFluidArea,
    /// 无法确定界面法向
    NoInterfaceNormal,
    /// 界面与壁面平行，切向无法定向
    TangentialInterface,
    /// 二分法未收敛
    NotConverged,
}

/// 第一遍单元结果
#[derive(Debug, Clone, Copy)]
enum PassOne {
    Skip,
    Solved { plane: Plane, value: f64 },
    Fallback { value: f64, reason: ContactFailure },
}

/// 构建扩展体积分数场
pub fn build_extended_field<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    tags: &[CellTag],
    contact_angle: &ContactAngle,
    params: &PipelineParams,
) -> ExtendedField {
    let n = view.snapshot().n_cells();
    let parallel = params.use_parallel(n);

    // 第一遍：接触单元
    let pass_one = |cell: usize| {
        if !tags[cell].is_contact() {
            return PassOne::Skip;
        }
        match solve_contact_cell(view, cell, contact_angle.degrees(cell), params) {
            Ok((plane, value)) => PassOne::Solved { plane, value },
            Err(reason) => PassOne::Fallback {
                value: fallback_value(view, cell, params),
                reason,
            },
        }
    };
    let first: Vec<PassOne> = if parallel {
        (0..n).into_par_iter().map(pass_one).collect()
    } else {
        (0..n).map(pass_one).collect()
    };

    let planes: Vec<Option<Plane>> = first
        .iter()
        .map(|r| match r {
            PassOne::Solved { plane, .. } => Some(*plane),
            _ => None,
        })
        .collect();

    let mut tags_out = tags.to_vec();
    let mut fallbacks = 0;
    for (cell, result) in first.iter().enumerate() {
        if let PassOne::Fallback { reason, .. } = result {
            tags_out[cell] = CellTag::Special;
            fallbacks += 1;
            debug!(cell, ?reason, "接触单元回退到无约束平面");
        }
    }

    // 第二遍：全部单元
    let pass_two = |cell: usize| match first[cell] {
        PassOne::Solved { value, .. } | PassOne::Fallback { value, .. } => value,
        PassOne::Skip => match tags[cell] {
            CellTag::BoundaryEmbed => boundary_embed_value(view, cell, &planes, params),
            _ => view.snapshot().raw(cell),
        },
    };
    let values: Vec<f64> = if parallel {
        (0..n).into_par_iter().map(pass_two).collect()
    } else {
        (0..n).map(pass_two).collect()
    };

    if fallbacks > 0 {
        warn!(fallbacks, "接触角求解失败，部分单元回退为 Special");
    }
    debug!(
        contact_planes = planes.iter().filter(|p| p.is_some()).count(),
        "扩展场构建完成"
    );

    ExtendedField {
        values,
        planes,
        tags: tags_out,
        fallbacks,
    }
}

/// 接触单元的约束平面与扩展分数
pub fn solve_contact_cell<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    cell: usize,
    theta_deg: f64,
    params: &PipelineParams,
) -> Result<(Plane, f64), ContactFailure> {
    let snap = view.snapshot();
    let region = fluid_region(snap.faces(cell), snap.cs(cell), params.solid_eps)
        .ok_or(ContactFailure::NoWallNormal)?;
    let wall = region.wall.ok_or(ContactFailure::NoWallNormal)?;
    if region.area() <= params.area_tolerance {
        return Err(ContactFailure::NoFluidArea);
    }

    let m = least_squares_normal(&view.stencil3(cell), params.solid_eps)
        .ok_or(ContactFailure::NoInterfaceNormal)?;

    let ns = wall.normal;
    let t0 = DVec2::new(-ns.y, ns.x);
    let along = m.dot(t0);
    if along.abs() <= params.tangent_eps {
        return Err(ContactFailure::TangentialInterface);
    }
    let t = if along > 0.0 { t0 } else { -t0 };

    let theta = theta_deg.to_radians();
    let normal = -ns * theta.cos() + t * theta.sin();

    let plane = plane_in_region(normal, snap.raw(cell), &region, params)
        .ok_or(ContactFailure::NotConverged)?;
    Ok((plane, plane.cell_area().clamp(0.0, 1.0)))
}

/// 接触求解失败时的扩展分数：无约束平面的整单元面积，法向无法确定时取原始分数
fn fallback_value<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    cell: usize,
    params: &PipelineParams,
) -> f64 {
    match unconstrained_plane(view, cell, params) {
        Some(plane) => plane.cell_area().clamp(0.0, 1.0),
        None => view.snapshot().raw(cell),
    }
}

/// `BoundaryEmbed` 单元的扩展分数
fn boundary_embed_value<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    cell: usize,
    planes: &[Option<Plane>],
    params: &PipelineParams,
) -> f64 {
    let snap = view.snapshot();
    let raw = snap.raw(cell);
    let cs = snap.cs(cell);

    let own_phase = || {
        let full = pure_phase(snap.phase(cell), params.vof_eps).unwrap_or(snap.phase(cell) >= 0.5);
        let p = if full { 1.0 } else { 0.0 };
        (raw + p * (1.0 - cs)).clamp(0.0, 1.0)
    };

    let Some(solid_part) = fluid_region(snap.faces(cell), cs, params.solid_eps)
        .and_then(|region| region.solid_part())
    else {
        return own_phase();
    };

    match source_plane(view, cell, planes, params) {
        Some(plane) => (raw + solid_part.clip(&plane).area()).clamp(0.0, 1.0),
        None => own_phase(),
    }
}

/// 模板内最近的源平面，已平移到本单元坐标
///
/// 先找接触平面，再找混合相邻居的无约束平面；每一类内先面邻居后对角邻居。
fn source_plane<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    cell: usize,
    planes: &[Option<Plane>],
    params: &PipelineParams,
) -> Option<Plane> {
    let neighbors: Vec<((i32, i32), usize)> = SOURCE_OFFSETS
        .iter()
        .filter_map(|&(di, dj)| {
            let walk = view.mesh().walk(cell, di, dj);
            walk.exit.is_none().then_some(((di, dj), walk.cell))
        })
        .collect();

    let contact = neighbors
        .iter()
        .find_map(|&((di, dj), nb)| planes[nb].map(|p| p.shifted(di, dj)));
    if contact.is_some() {
        return contact;
    }

    let snap = view.snapshot();
    neighbors.iter().find_map(|&((di, dj), nb)| {
        if snap.is_solid(nb) || pure_phase(snap.phase(nb), params.vof_eps).is_some() {
            return None;
        }
        unconstrained_plane(view, nb, params).map(|p| p.shifted(di, dj))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::plic::clipped_area;
    use crate::snapshot::FractionSnapshot;
    use ec_mesh::{EmbeddedGeometry, FieldBoundary, StructuredMesh};

    /// 壁面 y = 0.5（第 0 行为切割单元，`cs = 0.5`），竖直界面 x = 4.3，左侧为参考相
    fn vertical_contact_setup() -> (StructuredMesh, EmbeddedGeometry, Vec<f64>) {
        let mesh = StructuredMesh::new(8, 6, 1.0, DVec2::ZERO).unwrap();
        let geometry = EmbeddedGeometry::from_level_set(&mesh, &|p: DVec2| p.y - 0.5);
        let raw = (0..mesh.n_cells())
            .map(|c| {
                let center = mesh.cell_center(c);
                let liquid = Plane::new(DVec2::X, 4.3 - center.x);
                let fluid = Plane::new(DVec2::NEG_Y, center.y - 0.5);
                clipped_area(&[liquid, fluid])
            })
            .collect();
        (mesh, geometry, raw)
    }

    fn build(
        mesh: &StructuredMesh,
        geometry: &EmbeddedGeometry,
        raw: &[f64],
        theta: f64,
    ) -> ExtendedField {
        let params = PipelineParams::default().with_parallel(false);
        let snap = FractionSnapshot::capture(geometry, raw, &params).unwrap();
        let view = SnapshotView::new(mesh, &snap, FieldBoundary::neumann());
        let tags = classify(&view, &params);
        build_extended_field(&view, &tags, &ContactAngle::Uniform(theta), &params)
    }

    #[test]
    fn test_right_angle_contact() {
        let (mesh, geometry, raw) = vertical_contact_setup();
        let field = build(&mesh, &geometry, &raw, 90.0);
        let c = mesh.index(4, 0);
        assert_eq!(field.tags[c], CellTag::Contact2Phase);
        let plane = field.planes[c].unwrap();
        assert!((plane.normal - DVec2::X).length() < 1e-12);
        assert!((field.values[c] - 0.3).abs() < 1e-9);
        assert_eq!(field.fallbacks, 0);
    }

    #[test]
    fn test_boundary_embed_extends_from_contact_plane() {
        let (mesh, geometry, raw) = vertical_contact_setup();
        let field = build(&mesh, &geometry, &raw, 90.0);
        // 界面左侧的切割单元：固体部分全部为参考相
        let left = mesh.index(3, 0);
        assert_eq!(field.tags[left], CellTag::BoundaryEmbed);
        assert!((field.values[left] - 1.0).abs() < 1e-9);
        // 右侧：固体部分不含参考相
        let right = mesh.index(5, 0);
        assert_eq!(field.tags[right], CellTag::BoundaryEmbed);
        assert!(field.values[right].abs() < 1e-9);
    }

    #[test]
    fn test_values_in_unit_range() {
        let (mesh, geometry, raw) = vertical_contact_setup();
        for theta in [0.0, 15.0, 60.0, 135.0, 180.0] {
            let field = build(&mesh, &geometry, &raw, theta);
            assert!(field.values.iter().all(|v| (0.0..=1.0).contains(v)));
            assert_eq!(field.tags.len(), mesh.n_cells());
        }
    }
}
