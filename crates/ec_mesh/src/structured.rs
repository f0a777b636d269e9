// crates/ec_mesh/src/structured.rs

//! 均匀笛卡尔网格
//!
//! 单元按行优先编号：`cell = j * nx + i`，`i` 沿 x、`j` 沿 y。
//! 所有单元为边长 `delta` 的正方形，`origin` 为左下角顶点坐标。

use crate::direction::Side;
use crate::topology::StencilMesh;
use ec_foundation::error::{EcError, EcResult};
use glam::DVec2;

/// 均匀笛卡尔网格
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredMesh {
    nx: usize,
    ny: usize,
    delta: f64,
    origin: DVec2,
}

impl StructuredMesh {
    /// 创建网格
    ///
    /// # 错误
    ///
    /// 单元数为零、步长非正或原点非有限时返回 `InvalidMesh`。
    pub fn new(nx: usize, ny: usize, delta: f64, origin: DVec2) -> EcResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(EcError::invalid_mesh(format!(
                "网格尺寸必须为正: nx={}, ny={}",
                nx, ny
            )));
        }
        if !(delta > 0.0 && delta.is_finite()) {
            return Err(EcError::invalid_mesh(format!("网格步长无效: {}", delta)));
        }
        if !origin.is_finite() {
            return Err(EcError::invalid_mesh("网格原点非有限"));
        }
        Ok(Self {
            nx,
            ny,
            delta,
            origin,
        })
    }

    /// 由 x 方向域长创建（正方形单元，`delta = length / nx`）
    pub fn from_length(nx: usize, ny: usize, length: f64, origin: DVec2) -> EcResult<Self> {
        if nx == 0 {
            return Err(EcError::invalid_mesh("nx 必须为正"));
        }
        Self::new(nx, ny, length / nx as f64, origin)
    }

    /// x 方向单元数
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// y 方向单元数
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// 左下角坐标
    #[inline]
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    /// 由 (i, j) 得到单元编号
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    /// 由单元编号得到 (i, j)
    #[inline]
    pub fn ij(&self, cell: usize) -> (usize, usize) {
        (cell % self.nx, cell / self.nx)
    }

    /// 顶点 (vi, vj) 的坐标，`vi ∈ 0..=nx`，`vj ∈ 0..=ny`
    #[inline]
    pub fn vertex(&self, vi: usize, vj: usize) -> DVec2 {
        self.origin + DVec2::new(vi as f64, vj as f64) * self.delta
    }

    /// 单元的四个顶点，逆时针，从左下角开始
    pub fn cell_vertices(&self, cell: usize) -> [DVec2; 4] {
        let (i, j) = self.ij(cell);
        [
            self.vertex(i, j),
            self.vertex(i + 1, j),
            self.vertex(i + 1, j + 1),
            self.vertex(i, j + 1),
        ]
    }

    /// 包含点 `p` 的单元（域外返回 None）
    pub fn locate(&self, p: DVec2) -> Option<usize> {
        let local = (p - self.origin) / self.delta;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (i, j) = (local.x.floor() as usize, local.y.floor() as usize);
        (i < self.nx && j < self.ny).then(|| self.index(i, j))
    }
}

impl StencilMesh for StructuredMesh {
    #[inline]
    fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    fn neighbor(&self, cell: usize, side: Side) -> Option<usize> {
        if cell >= self.n_cells() {
            return None;
        }
        let (i, j) = self.ij(cell);
        match side {
            Side::Left => (i > 0).then(|| cell - 1),
            Side::Right => (i + 1 < self.nx).then(|| cell + 1),
            Side::Bottom => (j > 0).then(|| cell - self.nx),
            Side::Top => (j + 1 < self.ny).then(|| cell + self.nx),
        }
    }

    #[inline]
    fn cell_center(&self, cell: usize) -> DVec2 {
        let (i, j) = self.ij(cell);
        self.origin + DVec2::new(i as f64 + 0.5, j as f64 + 0.5) * self.delta
    }

    #[inline]
    fn delta(&self) -> f64 {
        self.delta
    }
}
