// crates/ec_physics/src/reconstruct.rs

//! 法向估计与无约束界面重构
//!
//! ## 嵌入边界法向
//!
//! `ns = (fs_L - fs_R, fs_B - fs_T)` 归一化，指向固体。对直线壁面精确。
//!
//! ## 界面法向
//!
//! `m = -∇phase`，在 3×3 模板的可达邻居上做 1/d² 加权最小二乘；
//! 矩阵奇异时回退到加权差分和。
//!
//! ## 无约束平面
//!
//! 非切割单元用解析反解，切割单元在流体可达多边形内二分求偏移量。

use crate::plic::{alpha_for_area, line_alpha, segment_in_cell, Plane, Polygon};
use crate::snapshot::{SnapshotView, Stencil3};
use crate::types::PipelineParams;
use ec_mesh::{Side, StencilMesh};
use glam::DVec2;

/// 最小二乘矩阵奇异判定
const DET_MIN: f64 = 1e-12;

/// 梯度为零判定
const GRADIENT_EPS: f64 = 1e-12;

/// 单元内流体可达区域
#[derive(Debug, Clone, Copy)]
pub struct FluidRegion {
    /// 流体可达多边形（单元局部坐标）
    pub polygon: Polygon,
    /// 壁面：`wall.eval(x) ≤ 0` 为流体侧，法向指向固体；非切割单元为 None
    pub wall: Option<Plane>,
}

impl FluidRegion {
    /// 流体可达面积
    #[inline]
    pub fn area(&self) -> f64 {
        self.polygon.area()
    }

    /// 单元内的固体部分
    pub fn solid_part(&self) -> Option<Polygon> {
        self.wall
            .map(|wall| Polygon::unit_cell().clip(&wall.complement()))
    }
}

/// 嵌入边界法向（指向固体）
pub fn embedded_normal(faces: [f64; 4]) -> Option<DVec2> {
    let ns = DVec2::new(
        faces[Side::Left.index()] - faces[Side::Right.index()],
        faces[Side::Bottom.index()] - faces[Side::Top.index()],
    );
    (ns.length() > GRADIENT_EPS).then(|| ns.normalize())
}

/// 单元的流体可达区域
///
/// 切割单元由嵌入边界法向和 `cs` 确定壁面；法向无法确定时返回 None。
pub fn fluid_region(faces: [f64; 4], cs: f64, solid_eps: f64) -> Option<FluidRegion> {
    if cs <= solid_eps {
        return None;
    }
    if cs >= 1.0 - solid_eps {
        return Some(FluidRegion {
            polygon: Polygon::unit_cell(),
            wall: None,
        });
    }
    let ns = embedded_normal(faces)?;
    let wall = Plane::from_fraction(ns, cs);
    Some(FluidRegion {
        polygon: Polygon::unit_cell().clip(&wall),
        wall: Some(wall),
    })
}

#[inline]
fn solve_2x2(a11: f64, a12: f64, a22: f64, b1: f64, b2: f64) -> Option<(f64, f64)> {
    let det = a11 * a22 - a12 * a12;
    if det.abs() < DET_MIN {
        return None;
    }
    let inv = 1.0 / det;
    let x1 = (a22 * b1 - a12 * b2) * inv;
    let x2 = (a11 * b2 - a12 * b1) * inv;
    if x1.is_finite() && x2.is_finite() {
        Some((x1, x2))
    } else {
        None
    }
}

/// 界面法向 `m = -∇phase`（单位向量），梯度为零时返回 None
pub fn least_squares_normal(stencil: &Stencil3, solid_eps: f64) -> Option<DVec2> {
    let phi_c = stencil.get(0, 0).phase;
    let (mut a11, mut a12, mut a22, mut b1, mut b2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let mut fallback = DVec2::ZERO;

    for ((di, dj), sample) in stencil.neighbors() {
        if !sample.is_accessible(solid_eps) {
            continue;
        }
        let (dx, dy) = (di as f64, dj as f64);
        let dphi = sample.phase - phi_c;
        let w = 1.0 / (dx * dx + dy * dy);
        a11 += w * dx * dx;
        a12 += w * dx * dy;
        a22 += w * dy * dy;
        b1 += w * dx * dphi;
        b2 += w * dy * dphi;
        fallback += DVec2::new(dx, dy) * (w * dphi);
    }

    let gradient = match solve_2x2(a11, a12, a22, b1, b2) {
        Some((gx, gy)) => DVec2::new(gx, gy),
        None => fallback,
    };
    (gradient.length() > GRADIENT_EPS).then(|| -gradient.normalize())
}

/// 单元的无约束 PLIC 平面
pub fn unconstrained_plane<M: StencilMesh + ?Sized>(
    view: &SnapshotView<'_, M>,
    cell: usize,
    params: &PipelineParams,
) -> Option<Plane> {
    let snap = view.snapshot();
    let region = fluid_region(snap.faces(cell), snap.cs(cell), params.solid_eps)?;
    let m = least_squares_normal(&view.stencil3(cell), params.solid_eps)?;
    plane_in_region(m, snap.raw(cell), &region, params)
}

/// 在流体可达区域内求法向为 `normal`、参考相面积为 `raw` 的平面
pub fn plane_in_region(
    normal: DVec2,
    raw: f64,
    region: &FluidRegion,
    params: &PipelineParams,
) -> Option<Plane> {
    match region.wall {
        None => Some(Plane::new(normal, line_alpha(raw, normal))),
        Some(_) => {
            let target = raw.min(region.area());
            alpha_for_area(
                normal,
                target,
                &region.polygon,
                params.area_tolerance,
                params.max_bisection_iters,
            )
            .map(|alpha| Plane::new(normal, alpha))
        }
    }
}

/// 界面与壁面的交点是否位于单元内
pub fn contact_point_in_cell(interface: &Plane, wall: &Plane) -> bool {
    match segment_in_cell(wall) {
        Some((a, b)) => interface.eval(a) * interface.eval(b) <= 0.0,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_normal_points_into_solid() {
        // 固体在下方：底面关闭，顶面开放
        let ns = embedded_normal([0.5, 0.5, 0.0, 1.0]).unwrap();
        assert!((ns - DVec2::NEG_Y).length() < 1e-15);
        assert!(embedded_normal([1.0; 4]).is_none());
    }

    #[test]
    fn test_fluid_region_half_cell() {
        let region = fluid_region([0.5, 0.5, 0.0, 1.0], 0.5, 1e-9).unwrap();
        assert!((region.area() - 0.5).abs() < 1e-12);
        let wall = region.wall.unwrap();
        assert!(wall.alpha.abs() < 1e-12);
        assert!((region.solid_part().unwrap().area() - 0.5).abs() < 1e-12);
        assert!(fluid_region([1.0; 4], 1.0, 1e-9).unwrap().wall.is_none());
        assert!(fluid_region([0.0; 4], 0.0, 1e-9).is_none());
    }

    #[test]
    fn test_contact_point() {
        let wall = Plane::new(DVec2::NEG_Y, 0.0);
        assert!(contact_point_in_cell(&Plane::new(DVec2::X, -0.2), &wall));
        assert!(!contact_point_in_cell(&Plane::new(DVec2::X, 0.7), &wall));
    }

    #[test]
    fn test_plane_in_region() {
        let params = PipelineParams::default();
        let region = fluid_region([0.5, 0.5, 0.0, 1.0], 0.5, 1e-9).unwrap();
        let plane = plane_in_region(DVec2::X, 0.15, &region, &params).unwrap();
        assert!((plane.alpha + 0.2).abs() < 1e-9);
        assert!((plane.cell_area() - 0.3).abs() < 1e-9);
    }
}
