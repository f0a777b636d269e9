// crates/ec_physics/src/snapshot.rs

//! 输入快照
//!
//! 每次重算开始时把几何与被追踪场复制一次：分数钳位到 [0, 1]，
//! 非有限值记为退化（替代值为 0），并统计被钳位的数量。
//! 之后各阶段只读取快照和前一阶段的输出。

use crate::types::PipelineParams;
use ec_foundation::error::{EcError, EcResult};
use ec_foundation::numerics::{clamp_fraction, needs_clamp};
use ec_mesh::{BoundaryValue, FieldBoundary, GeometryOracle, Side, StencilMesh};

/// 不可变输入快照（SoA）
#[derive(Debug, Clone)]
pub struct FractionSnapshot {
    cs: Vec<f64>,
    faces: Vec<[f64; 4]>,
    raw: Vec<f64>,
    phase: Vec<f64>,
    degenerate: Vec<bool>,
    clamped: usize,
    degenerate_count: usize,
    solid_eps: f64,
    vof_eps: f64,
}

impl FractionSnapshot {
    /// 从几何与原始场创建快照
    pub fn capture<G: GeometryOracle + ?Sized>(
        geometry: &G,
        raw: &[f64],
        params: &PipelineParams,
    ) -> EcResult<Self> {
        let n = geometry.n_cells();
        EcError::check_size("raw_fraction", n, raw.len())?;

        let mut cs = Vec::with_capacity(n);
        let mut faces = Vec::with_capacity(n);
        let mut raw_clamped = Vec::with_capacity(n);
        let mut degenerate = Vec::with_capacity(n);
        let mut clamped = 0;

        for cell in 0..n {
            let mut bad = false;
            let mut take = |value: f64| {
                if !value.is_finite() {
                    bad = true;
                }
                if needs_clamp(value) {
                    clamped += 1;
                }
                clamp_fraction(value)
            };
            let c = take(geometry.solid_fraction(cell));
            let f = Side::ALL.map(|side| take(geometry.face_fraction(cell, side)));
            let r = take(raw[cell]);
            cs.push(c);
            faces.push(f);
            raw_clamped.push(r);
            degenerate.push(bad);
        }

        let phase = cs
            .iter()
            .zip(&raw_clamped)
            .map(|(&c, &r)| phase_of(r, c, params.solid_eps))
            .collect();
        let degenerate_count = degenerate.iter().filter(|&&d| d).count();

        Ok(Self {
            cs,
            faces,
            raw: raw_clamped,
            phase,
            degenerate,
            clamped,
            degenerate_count,
            solid_eps: params.solid_eps,
            vof_eps: params.vof_eps,
        })
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cs.len()
    }

    /// 流体可达体积分数
    #[inline]
    pub fn cs(&self, cell: usize) -> f64 {
        self.cs[cell]
    }

    /// 面分数
    #[inline]
    pub fn face(&self, cell: usize, side: Side) -> f64 {
        self.faces[cell][side.index()]
    }

    /// 单元四个面分数
    #[inline]
    pub fn faces(&self, cell: usize) -> [f64; 4] {
        self.faces[cell]
    }

    /// 原始分数（占整个单元的比例）
    #[inline]
    pub fn raw(&self, cell: usize) -> f64 {
        self.raw[cell]
    }

    /// 全部原始分数
    pub fn raw_field(&self) -> &[f64] {
        &self.raw
    }

    /// 相分数（占流体可达体积的比例）
    #[inline]
    pub fn phase(&self, cell: usize) -> f64 {
        self.phase[cell]
    }

    /// 输入是否含非有限值
    #[inline]
    pub fn is_degenerate(&self, cell: usize) -> bool {
        self.degenerate[cell]
    }

    /// 被钳位的输入数量
    pub fn clamped_count(&self) -> usize {
        self.clamped
    }

    /// 退化单元数量
    pub fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }

    /// 固体判定容差
    #[inline]
    pub fn solid_eps(&self) -> f64 {
        self.solid_eps
    }

    /// 纯相判定容差
    #[inline]
    pub fn vof_eps(&self) -> f64 {
        self.vof_eps
    }

    /// 是否纯固体
    #[inline]
    pub fn is_solid(&self, cell: usize) -> bool {
        self.cs[cell] <= self.solid_eps
    }

    /// 是否切割单元
    #[inline]
    pub fn is_cut(&self, cell: usize) -> bool {
        let c = self.cs[cell];
        c > self.solid_eps && c < 1.0 - self.solid_eps
    }
}

/// 由原始分数和 `cs` 求相分数
#[inline]
pub fn phase_of(raw: f64, cs: f64, solid_eps: f64) -> f64 {
    if cs > solid_eps {
        (raw / cs).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// 纯相判定：`Some(true)` 满，`Some(false)` 空，`None` 混合
#[inline]
pub fn pure_phase(phase: f64, vof_eps: f64) -> Option<bool> {
    if phase <= vof_eps {
        Some(false)
    } else if phase >= 1.0 - vof_eps {
        Some(true)
    } else {
        None
    }
}

// ============================================================
// 模板采样
// ============================================================

/// 模板采样点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// 计算域内的目标单元；越界时为 None
    pub cell: Option<usize>,
    /// 提供数值的单元（越界时为镜像单元）
    pub source: usize,
    /// 流体可达体积分数（总是取镜像值）
    pub cs: f64,
    /// 原始分数
    pub raw: f64,
    /// 相分数
    pub phase: f64,
}

impl Sample {
    /// 是否为固体
    #[inline]
    pub fn is_solid(&self, solid_eps: f64) -> bool {
        self.cs <= solid_eps
    }

    /// 是否为切割单元
    #[inline]
    pub fn is_cut(&self, solid_eps: f64) -> bool {
        self.cs > solid_eps && self.cs < 1.0 - solid_eps
    }

    /// 是否为计算域内可达（非固体）单元
    #[inline]
    pub fn is_accessible(&self, solid_eps: f64) -> bool {
        self.cell.is_some() && !self.is_solid(solid_eps)
    }
}

/// 3×3 模板，按 `[di + 1][dj + 1]` 存储
#[derive(Debug, Clone, Copy)]
pub struct Stencil3 {
    samples: [[Sample; 3]; 3],
}

impl Stencil3 {
    /// 偏移 (di, dj) 处的采样，`di, dj ∈ {-1, 0, 1}`
    #[inline]
    pub fn get(&self, di: i32, dj: i32) -> &Sample {
        &self.samples[(di + 1) as usize][(dj + 1) as usize]
    }

    /// 除中心外的八个邻居及其偏移
    pub fn neighbors(&self) -> impl Iterator<Item = ((i32, i32), &Sample)> + '_ {
        (-1..=1)
            .flat_map(|di| (-1..=1).map(move |dj| (di, dj)))
            .filter(|&(di, dj)| di != 0 || dj != 0)
            .map(move |(di, dj)| ((di, dj), self.get(di, dj)))
    }
}

/// 快照上的模板访问视图
pub struct SnapshotView<'a, M: StencilMesh + ?Sized> {
    mesh: &'a M,
    snapshot: &'a FractionSnapshot,
    boundary: FieldBoundary,
}

impl<'a, M: StencilMesh + ?Sized> SnapshotView<'a, M> {
    /// 创建视图
    pub fn new(mesh: &'a M, snapshot: &'a FractionSnapshot, boundary: FieldBoundary) -> Self {
        Self {
            mesh,
            snapshot,
            boundary,
        }
    }

    /// 网格
    #[inline]
    pub fn mesh(&self) -> &'a M {
        self.mesh
    }

    /// 快照
    #[inline]
    pub fn snapshot(&self) -> &'a FractionSnapshot {
        self.snapshot
    }

    /// 被追踪场的边界规则
    #[inline]
    pub fn boundary(&self) -> FieldBoundary {
        self.boundary
    }

    /// 偏移 (di, dj) 处的采样
    ///
    /// 越界时 `cs` 取镜像值；原始分数按边界规则取值，
    /// Dirichlet 值解释为相分数。
    pub fn sample(&self, cell: usize, di: i32, dj: i32) -> Sample {
        let walk = self.mesh.walk(cell, di, dj);
        let snap = self.snapshot;
        let cs = snap.cs(walk.cell);
        match walk.exit.map(|side| self.boundary.get(side)) {
            None => Sample {
                cell: Some(walk.cell),
                source: walk.cell,
                cs,
                raw: snap.raw(walk.cell),
                phase: snap.phase(walk.cell),
            },
            Some(BoundaryValue::Neumann) => Sample {
                cell: None,
                source: walk.cell,
                cs,
                raw: snap.raw(walk.cell),
                phase: snap.phase(walk.cell),
            },
            Some(BoundaryValue::Dirichlet(value)) => {
                let phase = if cs > snap.solid_eps() {
                    clamp_fraction(value)
                } else {
                    0.0
                };
                Sample {
                    cell: None,
                    source: walk.cell,
                    cs,
                    raw: phase * cs,
                    phase,
                }
            }
        }
    }

    /// 以 `cell` 为中心的 3×3 模板
    pub fn stencil3(&self, cell: usize) -> Stencil3 {
        let samples =
            [-1, 0, 1].map(|di| [-1, 0, 1].map(|dj| self.sample(cell, di, dj)));
        Stencil3 { samples }
    }
}
