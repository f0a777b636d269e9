// crates/ec_physics/src/plic.rs

//! PLIC 几何
//!
//! 所有量都在单元局部坐标下计算：单元中心为原点，边长为 1，
//! 即单元为 `[-0.5, 0.5]²`。平面 `Plane { normal, alpha }` 表示
//! 半平面 `normal · x ≤ alpha`，该侧为参考相，`normal` 指向参考相外。
//!
//! # 内容
//!
//! - 整单元的解析面积与反解（`line_area` / `line_alpha`）
//! - 凸多边形的半平面裁剪（Sutherland–Hodgman）
//! - 在任意凸区域内按目标面积求偏移量的二分法
//! - 直线与单元边界的交线段

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 多边形顶点容量：正方形经最多 8 次半平面裁剪
const POLYGON_CAPACITY: usize = 12;

/// 法向退化判定
const NORMAL_EPS: f64 = 1e-12;

// ============================================================
// 平面
// ============================================================

/// 单元局部坐标下的界面直线
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// 单位法向，指向参考相外
    pub normal: DVec2,
    /// 偏移量
    pub alpha: f64,
}

impl Plane {
    /// 创建平面
    #[inline]
    pub fn new(normal: DVec2, alpha: f64) -> Self {
        Self { normal, alpha }
    }

    /// 由法向与整单元体积分数构造
    pub fn from_fraction(normal: DVec2, fraction: f64) -> Self {
        Self::new(normal, line_alpha(fraction, normal))
    }

    /// 带符号的函数值，`≤ 0` 为参考相一侧
    #[inline]
    pub fn eval(&self, x: DVec2) -> f64 {
        self.normal.dot(x) - self.alpha
    }

    /// 把相邻单元（相对偏移 `(di, dj)`）的平面换算到本单元坐标
    #[inline]
    pub fn shifted(&self, di: i32, dj: i32) -> Self {
        Self::new(
            self.normal,
            self.alpha + self.normal.dot(DVec2::new(di as f64, dj as f64)),
        )
    }

    /// 取反：保留另一侧
    #[inline]
    pub fn complement(&self) -> Self {
        Self::new(-self.normal, -self.alpha)
    }

    /// 平面截取的整单元面积
    #[inline]
    pub fn cell_area(&self) -> f64 {
        line_area(self.normal, self.alpha)
    }
}

// ============================================================
// 解析面积
// ============================================================

/// 整单元内 `n · x ≤ alpha` 的面积
pub fn line_area(n: DVec2, alpha: f64) -> f64 {
    let s = n.x.abs() + n.y.abs();
    if s < NORMAL_EPS {
        return if alpha >= 0.0 { 1.0 } else { 0.0 };
    }
    let (mut nx, mut ny, mut a) = (n.x / s, n.y / s, alpha / s);

    // 平移到以左下角为原点的坐标
    a += 0.5 * (nx + ny);
    if nx < 0.0 {
        a -= nx;
        nx = -nx;
    }
    if ny < 0.0 {
        a -= ny;
        ny = -ny;
    }

    if a <= 0.0 {
        return 0.0;
    }
    if a >= nx + ny {
        return 1.0;
    }

    let area = if nx < 1e-10 {
        a / ny
    } else if ny < 1e-10 {
        a / nx
    } else {
        let mut v = a * a;
        let ax = a - nx;
        if ax > 0.0 {
            v -= ax * ax;
        }
        let ay = a - ny;
        if ay > 0.0 {
            v -= ay * ay;
        }
        v / (2.0 * nx * ny)
    };
    area.clamp(0.0, 1.0)
}

/// `line_area` 的反函数：整单元面积为 `fraction` 时的偏移量
pub fn line_alpha(fraction: f64, n: DVec2) -> f64 {
    let s = n.x.abs() + n.y.abs();
    if s < NORMAL_EPS {
        return 0.0;
    }
    let (nx, ny) = (n.x / s, n.y / s);
    let c = fraction.clamp(0.0, 1.0);

    let (mut n1, mut n2) = (nx.abs(), ny.abs());
    if n1 > n2 {
        std::mem::swap(&mut n1, &mut n2);
    }

    let v1 = 0.5 * n1;
    let mut alpha = if c <= v1 / n2 {
        (2.0 * c * n1 * n2).sqrt()
    } else if c <= 1.0 - v1 / n2 {
        c * n2 + v1
    } else {
        n1 + n2 - (2.0 * n1 * n2 * (1.0 - c)).sqrt()
    };

    if nx < 0.0 {
        alpha += nx;
    }
    if ny < 0.0 {
        alpha += ny;
    }
    (alpha - 0.5 * (nx + ny)) * s
}

// ============================================================
// 凸多边形
// ============================================================

/// 定长凸多边形（逆时针）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polygon {
    vertices: [DVec2; POLYGON_CAPACITY],
    len: usize,
}

impl Polygon {
    /// 单元正方形 `[-0.5, 0.5]²`
    pub fn unit_cell() -> Self {
        let mut vertices = [DVec2::ZERO; POLYGON_CAPACITY];
        vertices[0] = DVec2::new(-0.5, -0.5);
        vertices[1] = DVec2::new(0.5, -0.5);
        vertices[2] = DVec2::new(0.5, 0.5);
        vertices[3] = DVec2::new(-0.5, 0.5);
        Self { vertices, len: 4 }
    }

    /// 顶点
    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices[..self.len]
    }

    /// 是否退化为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len < 3
    }

    fn push(&mut self, p: DVec2) {
        if self.len < POLYGON_CAPACITY {
            self.vertices[self.len] = p;
            self.len += 1;
        }
    }

    /// 保留 `plane.eval(x) ≤ 0` 的部分
    pub fn clip(&self, plane: &Plane) -> Self {
        let mut out = Self {
            vertices: [DVec2::ZERO; POLYGON_CAPACITY],
            len: 0,
        };
        let n = self.len;
        for k in 0..n {
            let p = self.vertices[k];
            let q = self.vertices[(k + 1) % n];
            let gp = plane.eval(p);
            let gq = plane.eval(q);
            if gp <= 0.0 {
                out.push(p);
            }
            if (gp < 0.0 && gq > 0.0) || (gp > 0.0 && gq < 0.0) {
                out.push(p + (q - p) * (gp / (gp - gq)));
            }
        }
        out
    }

    /// 面积（鞋带公式）
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let v = self.vertices();
        let twice: f64 = (0..v.len())
            .map(|k| v[k].perp_dot(v[(k + 1) % v.len()]))
            .sum();
        (0.5 * twice).max(0.0)
    }

    /// 形心
    pub fn centroid(&self) -> Option<DVec2> {
        let area = self.area();
        if area <= 0.0 {
            return None;
        }
        let v = self.vertices();
        let mut c = DVec2::ZERO;
        for k in 0..v.len() {
            let (p, q) = (v[k], v[(k + 1) % v.len()]);
            c += (p + q) * p.perp_dot(q);
        }
        Some(c / (6.0 * area))
    }
}

/// 单元正方形与若干半平面交集的面积
pub fn clipped_area(planes: &[Plane]) -> f64 {
    planes
        .iter()
        .fold(Polygon::unit_cell(), |poly, plane| poly.clip(plane))
        .area()
}

/// 在凸区域 `region` 内求偏移量，使 `normal · x ≤ alpha` 的面积等于 `target`
///
/// 返回满足面积条件的最小偏移量；区域面积不足或未收敛时返回 None。
pub fn alpha_for_area(
    normal: DVec2,
    target: f64,
    region: &Polygon,
    tolerance: f64,
    max_iters: usize,
) -> Option<f64> {
    let region_area = region.area();
    if target < -tolerance || target > region_area + tolerance {
        return None;
    }
    let half = 0.5 * (normal.x.abs() + normal.y.abs());
    let area_at = |alpha: f64| region.clip(&Plane::new(normal, alpha)).area();

    let (mut lo, mut hi) = (-half, half);
    for _ in 0..max_iters {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if area_at(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    ((area_at(hi) - target).abs() <= tolerance).then_some(hi)
}

// ============================================================
// 线段
// ============================================================

/// 直线 `plane.eval(x) = 0` 在单元内的线段
pub fn segment_in_cell(plane: &Plane) -> Option<(DVec2, DVec2)> {
    let cell = Polygon::unit_cell();
    let v = cell.vertices();
    let mut points = [DVec2::ZERO; 8];
    let mut count = 0;
    for k in 0..4 {
        let (p, q) = (v[k], v[(k + 1) % 4]);
        let (gp, gq) = (plane.eval(p), plane.eval(q));
        if gp == 0.0 {
            points[count] = p;
            count += 1;
        }
        if (gp < 0.0 && gq > 0.0) || (gp > 0.0 && gq < 0.0) {
            points[count] = p + (q - p) * (gp / (gp - gq));
            count += 1;
        }
    }

    let mut best = None;
    let mut best_len = 1e-14;
    for a in 0..count {
        for b in (a + 1)..count {
            let len = (points[a] - points[b]).length();
            if len > best_len {
                best_len = len;
                best = Some((points[a], points[b]));
            }
        }
    }
    best
}

/// 保留线段中 `plane.eval(x) ≤ 0` 的部分
pub fn clip_segment(segment: (DVec2, DVec2), plane: &Plane) -> Option<(DVec2, DVec2)> {
    let (p, q) = segment;
    let (gp, gq) = (plane.eval(p), plane.eval(q));
    match (gp <= 0.0, gq <= 0.0) {
        (true, true) => Some((p, q)),
        (false, false) => None,
        _ => {
            let x = p + (q - p) * (gp / (gp - gq));
            if gp <= 0.0 {
                Some((p, x))
            } else {
                Some((x, q))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_line_area_axis_aligned() {
        assert!((line_area(DVec2::X, -0.2) - 0.3).abs() < EPS);
        assert!((line_area(DVec2::NEG_Y, 0.0) - 0.5).abs() < EPS);
        assert_eq!(line_area(DVec2::Y, 0.6), 1.0);
        assert_eq!(line_area(DVec2::Y, -0.6), 0.0);
    }

    #[test]
    fn test_line_area_matches_clipping() {
        for k in 0..24 {
            let angle = k as f64 * std::f64::consts::PI / 12.0 + 0.1;
            let n = DVec2::new(angle.cos(), angle.sin());
            for alpha in [-0.6, -0.3, -0.05, 0.0, 0.2, 0.45] {
                let exact = clipped_area(&[Plane::new(n, alpha)]);
                assert!((line_area(n, alpha) - exact).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_line_alpha_inverts_line_area() {
        for k in 0..16 {
            let angle = k as f64 * 0.4 + 0.05;
            let n = DVec2::new(angle.cos(), angle.sin());
            for c in [0.01, 0.2, 0.5, 0.77, 0.99] {
                let alpha = line_alpha(c, n);
                assert!((line_area(n, alpha) - c).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_shifted_plane_describes_same_line() {
        let plane = Plane::new(DVec2::new(0.6, 0.8), 0.1);
        let shifted = plane.shifted(1, -1);
        // 邻居局部坐标 x_nb = x - (1, -1)
        let x = DVec2::new(0.3, -0.2);
        assert!((shifted.eval(x) - plane.eval(x - DVec2::new(1.0, -1.0))).abs() < EPS);
    }

    #[test]
    fn test_polygon_clip_and_centroid() {
        let half = Polygon::unit_cell().clip(&Plane::new(DVec2::NEG_Y, 0.0));
        assert!((half.area() - 0.5).abs() < EPS);
        let c = half.centroid().unwrap();
        assert!((c - DVec2::new(0.0, 0.25)).length() < EPS);
        let empty = half.clip(&Plane::new(DVec2::Y, -0.1));
        assert!(empty.is_empty());
        assert_eq!(empty.area(), 0.0);
    }

    #[test]
    fn test_alpha_for_area_in_region() {
        // 上半单元内，竖直界面左侧面积 0.15
        let region = Polygon::unit_cell().clip(&Plane::new(DVec2::NEG_Y, 0.0));
        let alpha = alpha_for_area(DVec2::X, 0.15, &region, 1e-10, 64).unwrap();
        assert!((alpha + 0.2).abs() < 1e-9);
        assert!(alpha_for_area(DVec2::X, 0.6, &region, 1e-10, 64).is_none());
        // 迭代次数过少时不收敛
        assert!(alpha_for_area(DVec2::X, 0.15 + 1e-7, &region, 1e-12, 3).is_none());
    }

    #[test]
    fn test_segment_in_cell() {
        let (a, b) = segment_in_cell(&Plane::new(DVec2::Y, 0.0)).unwrap();
        assert!(((a - b).length() - 1.0).abs() < EPS);
        assert!(segment_in_cell(&Plane::new(DVec2::Y, 0.7)).is_none());

        // 穿过角点的对角线
        let n = DVec2::new(1.0, 1.0).normalize();
        let (a, b) = segment_in_cell(&Plane::new(n, 0.0)).unwrap();
        assert!(((a - b).length() - 2f64.sqrt()).abs() < 1e-12);

        let clipped = clip_segment((a, b), &Plane::new(DVec2::X, 0.0)).unwrap();
        assert!(clipped.0.x <= 1e-15 && clipped.1.x <= 1e-15);
    }
}
