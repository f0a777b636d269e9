// crates/ec_mesh/src/fractions.rs

//! 由水平集计算单元体积分数与面分数
//!
//! 区域定义为 `φ > 0`。在网格顶点处采样 φ，沿单元边线性插值得到
//! 零等值线与边的交点（分段线性边界），再由 marching-squares 多边形
//! 的鞋带公式求单元内的面积。
//!
//! # 用途
//!
//! - 嵌入固体几何：`φ > 0` 为流体可达区域
//! - 初始 VOF 场：`φ > 0` 为参考相

use crate::direction::Side;
use crate::structured::StructuredMesh;
use crate::topology::StencilMesh;
use glam::DVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 单元数超过该值时并行计算
const PARALLEL_THRESHOLD: usize = 4096;

/// 水平集函数
pub trait LevelSet: Sync {
    /// 点 `p` 处的函数值，正值表示在区域内
    fn value(&self, p: DVec2) -> f64;
}

impl<F> LevelSet for F
where
    F: Fn(DVec2) -> f64 + Sync,
{
    #[inline]
    fn value(&self, p: DVec2) -> f64 {
        self(p)
    }
}

/// 常用形状
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// 圆；`inside = true` 时圆内为正，否则圆外为正
    Circle {
        /// 圆心
        center: DVec2,
        /// 半径
        radius: f64,
        /// 正值区域是否为圆内
        inside: bool,
    },
    /// 半平面，`normal` 指向正值一侧
    HalfPlane {
        /// 边界上一点
        point: DVec2,
        /// 法向
        normal: DVec2,
    },
}

impl LevelSet for Shape {
    fn value(&self, p: DVec2) -> f64 {
        match *self {
            Shape::Circle {
                center,
                radius,
                inside,
            } => {
                let d = radius - (p - center).length();
                if inside {
                    d
                } else {
                    -d
                }
            }
            Shape::HalfPlane { point, normal } => (p - point).dot(normal.normalize_or_zero()),
        }
    }
}

/// 单元分数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFractions {
    /// 体积分数
    pub volume: Vec<f64>,
    /// 面分数，按 [`Side::index`] 排列
    pub faces: Vec<[f64; 4]>,
}

/// 线段上 `φ > 0` 部分所占比例
#[inline]
fn edge_fraction(a: f64, b: f64) -> f64 {
    match (a > 0.0, b > 0.0) {
        (true, true) => 1.0,
        (false, false) => 0.0,
        (true, false) => a / (a - b),
        (false, true) => b / (b - a),
    }
}

/// 单位正方形内 `φ > 0` 的面积
///
/// 角点逆时针排列：(0,0), (1,0), (1,1), (0,1)。
fn square_fraction(phi: [f64; 4]) -> f64 {
    const CORNERS: [DVec2; 4] = [
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(0.0, 1.0),
    ];
    let positive = phi.map(|v| v > 0.0);
    if positive.iter().all(|&p| p) {
        return 1.0;
    }
    if !positive.iter().any(|&p| p) {
        return 0.0;
    }

    let mut poly = [DVec2::ZERO; 8];
    let mut n = 0;
    for k in 0..4 {
        let next = (k + 1) % 4;
        if positive[k] {
            poly[n] = CORNERS[k];
            n += 1;
        }
        if positive[k] != positive[next] {
            let t = phi[k] / (phi[k] - phi[next]);
            poly[n] = CORNERS[k].lerp(CORNERS[next], t);
            n += 1;
        }
    }

    let mut twice_area = 0.0;
    for k in 0..n {
        let (p, q) = (poly[k], poly[(k + 1) % n]);
        twice_area += p.perp_dot(q);
    }
    (0.5 * twice_area).clamp(0.0, 1.0)
}

/// 计算每个单元 `φ > 0` 的体积分数与面分数
pub fn cell_fractions<L: LevelSet + ?Sized>(mesh: &StructuredMesh, level_set: &L) -> CellFractions {
    let (nx, ny) = (mesh.nx(), mesh.ny());
    let n_vertices = (nx + 1) * (ny + 1);
    let sample = |v: usize| level_set.value(mesh.vertex(v % (nx + 1), v / (nx + 1)));
    let phi: Vec<f64> = if n_vertices >= PARALLEL_THRESHOLD {
        (0..n_vertices).into_par_iter().map(sample).collect()
    } else {
        (0..n_vertices).map(sample).collect()
    };

    let per_cell = |cell: usize| {
        let (i, j) = mesh.ij(cell);
        let at = |vi: usize, vj: usize| phi[vj * (nx + 1) + vi];
        let corners = [at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)];
        let mut faces = [0.0; 4];
        faces[Side::Left.index()] = edge_fraction(corners[0], corners[3]);
        faces[Side::Right.index()] = edge_fraction(corners[1], corners[2]);
        faces[Side::Bottom.index()] = edge_fraction(corners[0], corners[1]);
        faces[Side::Top.index()] = edge_fraction(corners[3], corners[2]);
        (square_fraction(corners), faces)
    };

    let n = mesh.n_cells();
    let cells: Vec<(f64, [f64; 4])> = if n >= PARALLEL_THRESHOLD {
        (0..n).into_par_iter().map(per_cell).collect()
    } else {
        (0..n).map(per_cell).collect()
    };

    let (volume, faces) = cells.into_iter().unzip();
    CellFractions { volume, faces }
}

/// 只计算体积分数
pub fn volume_fractions<L: LevelSet + ?Sized>(mesh: &StructuredMesh, level_set: &L) -> Vec<f64> {
    cell_fractions(mesh, level_set).volume
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_mesh(n: usize) -> StructuredMesh {
        StructuredMesh::new(n, n, 1.0, DVec2::ZERO).unwrap()
    }

    #[test]
    fn test_half_plane_exact() {
        let mesh = unit_mesh(4);
        // y < 1.25 为正
        let shape = Shape::HalfPlane {
            point: DVec2::new(0.0, 1.25),
            normal: DVec2::new(0.0, -1.0),
        };
        let f = cell_fractions(&mesh, &shape);
        assert_eq!(f.volume[mesh.index(2, 0)], 1.0);
        assert!((f.volume[mesh.index(2, 1)] - 0.25).abs() < 1e-12);
        assert_eq!(f.volume[mesh.index(2, 2)], 0.0);
        let faces = f.faces[mesh.index(2, 1)];
        assert!((faces[Side::Left.index()] - 0.25).abs() < 1e-12);
        assert_eq!(faces[Side::Bottom.index()], 1.0);
        assert_eq!(faces[Side::Top.index()], 0.0);
    }

    #[test]
    fn test_diagonal_line() {
        let mesh = unit_mesh(1);
        let f = volume_fractions(&mesh, &|p: DVec2| 1.0 - p.x - p.y);
        assert!((f[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_circle_area_converges() {
        let n = 64;
        let mesh = StructuredMesh::new(n, n, 4.0 / n as f64, DVec2::splat(-2.0)).unwrap();
        let circle = Shape::Circle {
            center: DVec2::ZERO,
            radius: 1.0,
            inside: true,
        };
        let area: f64 = volume_fractions(&mesh, &circle).iter().sum::<f64>() * mesh.cell_volume();
        assert!((area - std::f64::consts::PI).abs() < 1e-2);

        let outside = Shape::Circle {
            center: DVec2::ZERO,
            radius: 1.0,
            inside: false,
        };
        let rest: f64 = volume_fractions(&mesh, &outside).iter().sum::<f64>() * mesh.cell_volume();
        assert!((area + rest - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_fractions_in_unit_range() {
        let mesh = StructuredMesh::new(80, 80, 0.05, DVec2::ZERO).unwrap();
        let f = cell_fractions(&mesh, &|p: DVec2| (3.0 * p.x).sin() + (2.0 * p.y).cos());
        assert!(f.volume.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(f.faces.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
    }
}
