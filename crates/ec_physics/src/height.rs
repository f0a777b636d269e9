// crates/ec_physics/src/height.rs

//! 高度函数
//!
//! 沿坐标轴对 `2·hw + 1` 个单元的扩展分数求和得到高度（单元长度单位）。
//! 列有效要求：每个单元非固体，两端为相反的纯相。
//!
//! 主轴取扩展场中心差分梯度绝对值较大的分量（相等时取 x），
//! 失败再试另一条轴。中心列与两条侧列均有效且朝向一致时给出
//! 法向、界面位置和曲率。
//!
//! 接触单元高度无效但有约束平面时，发布平面法向与接触平面中点，
//! 来源记为 `ContactPlane`，`valid` 保持 false。

use crate::contact::ExtendedField;
use crate::plic::{clip_segment, segment_in_cell, Plane};
use crate::reconstruct::fluid_region;
use crate::snapshot::{pure_phase, FractionSnapshot};
use crate::types::{CellTag, NormalSource, PipelineParams};
use ec_foundation::numerics::clamp_fraction;
use ec_mesh::{Axis, BoundaryValue, FieldBoundary, StencilMesh, StencilView};
use glam::DVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 高度函数输出（SoA）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeightFields {
    /// x 方向列高度
    pub height_x: Vec<Option<f64>>,
    /// y 方向列高度
    pub height_y: Vec<Option<f64>>,
    /// 单位法向，指向参考相外
    pub normal: Vec<Option<DVec2>>,
    /// 界面位置（全局坐标）
    pub origin: Vec<Option<DVec2>>,
    /// 曲率
    pub curvature: Vec<Option<f64>>,
    /// 高度函数是否有效
    pub valid: Vec<bool>,
    /// 法向来源
    pub source: Vec<NormalSource>,
}

impl HeightFields {
    /// 指定轴的列高度
    pub fn height(&self, axis: Axis) -> &[Option<f64>] {
        match axis {
            Axis::X => &self.height_x,
            Axis::Y => &self.height_y,
        }
    }

    /// 有效单元数
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            height_x: Vec::with_capacity(n),
            height_y: Vec::with_capacity(n),
            normal: Vec::with_capacity(n),
            origin: Vec::with_capacity(n),
            curvature: Vec::with_capacity(n),
            valid: Vec::with_capacity(n),
            source: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, cell: CellHeight) {
        self.height_x.push(cell.heights[Axis::X.index()]);
        self.height_y.push(cell.heights[Axis::Y.index()]);
        self.normal.push(cell.normal);
        self.origin.push(cell.origin);
        self.curvature.push(cell.curvature);
        self.valid.push(cell.valid);
        self.source.push(cell.source);
    }
}

/// 单元结果
#[derive(Debug, Clone, Copy, Default)]
struct CellHeight {
    heights: [Option<f64>; 2],
    normal: Option<DVec2>,
    origin: Option<DVec2>,
    curvature: Option<f64>,
    valid: bool,
    source: NormalSource,
}

/// 一条有效列
#[derive(Debug, Clone, Copy)]
struct Column {
    /// 列高度
    height: f64,
    /// 界面相对中心单元的偏移（单元长度）
    offset: f64,
    /// +1：参考相在低端；-1：参考相在高端
    sign: f64,
}

struct HeightContext<'a, M: StencilMesh + ?Sized> {
    mesh: &'a M,
    values: StencilView<'a, M>,
    tags: &'a [CellTag],
    boundary: FieldBoundary,
    half_width: i32,
    vof_eps: f64,
}

impl<M: StencilMesh + ?Sized> HeightContext<'_, M> {
    /// 列中一个单元的值；固体单元返回 None
    fn column_value(&self, cell: usize, di: i32, dj: i32) -> Option<f64> {
        let walk = self.mesh.walk(cell, di, dj);
        if self.tags[walk.cell] == CellTag::Solid {
            return None;
        }
        match walk.exit.map(|side| self.boundary.get(side)) {
            Some(BoundaryValue::Dirichlet(v)) => Some(clamp_fraction(v)),
            _ => Some(self.values.sample(cell, di, dj)),
        }
    }

    /// 沿 `axis`、侧向偏移 `lateral` 的列
    fn column(&self, cell: usize, axis: Axis, lateral: i32) -> Option<Column> {
        let (li, lj) = axis.other().offset(lateral);
        let hw = self.half_width;
        let mut height = 0.0;
        let mut low = 0.0;
        let mut high = 0.0;
        for k in -hw..=hw {
            let (ai, aj) = axis.offset(k);
            let v = self.column_value(cell, ai + li, aj + lj)?;
            if k == -hw {
                low = v;
            }
            if k == hw {
                high = v;
            }
            height += v;
        }

        let half = hw as f64 + 0.5;
        match (pure_phase(low, self.vof_eps), pure_phase(high, self.vof_eps)) {
            (Some(true), Some(false)) => Some(Column {
                height,
                offset: height - half,
                sign: 1.0,
            }),
            (Some(false), Some(true)) => Some(Column {
                height,
                offset: half - height,
                sign: -1.0,
            }),
            _ => None,
        }
    }

    /// 主轴在前的试探顺序
    fn axis_order(&self, cell: usize) -> [Axis; 2] {
        let gx = self.values.sample(cell, 1, 0) - self.values.sample(cell, -1, 0);
        let gy = self.values.sample(cell, 0, 1) - self.values.sample(cell, 0, -1);
        if gy.abs() > gx.abs() {
            [Axis::Y, Axis::X]
        } else {
            [Axis::X, Axis::Y]
        }
    }

    fn compute_cell(&self, cell: usize) -> CellHeight {
        let mut out = CellHeight::default();
        if !self.tags[cell].has_heights() {
            return out;
        }

        let centers = Axis::ALL.map(|axis| self.column(cell, axis, 0));
        out.heights = centers.map(|c| c.map(|col| col.height));

        let delta = self.mesh.delta();
        for axis in self.axis_order(cell) {
            let Some(center) = centers[axis.index()] else {
                continue;
            };
            let (Some(minus), Some(plus)) =
                (self.column(cell, axis, -1), self.column(cell, axis, 1))
            else {
                continue;
            };
            if minus.sign != center.sign || plus.sign != center.sign {
                continue;
            }

            let s = center.sign;
            let dz = 0.5 * (plus.offset - minus.offset);
            let ddz = plus.offset - 2.0 * center.offset + minus.offset;
            let (ea, et) = (axis.unit(), axis.other().unit());
            let normal = (s * (ea - dz * et)).normalize();
            let curvature = -s * ddz / (delta * (1.0 + dz * dz).powf(1.5));

            out.normal = Some(normal);
            out.origin = Some(self.mesh.cell_center(cell) + ea * (center.offset * delta));
            out.curvature = Some(curvature);
            out.valid = true;
            out.source = NormalSource::HeightFunction;
            return out;
        }
        out
    }
}

/// 计算全部单元的高度函数
pub fn compute_heights<M: StencilMesh + ?Sized>(
    mesh: &M,
    snapshot: &FractionSnapshot,
    extended: &ExtendedField,
    boundary: FieldBoundary,
    params: &PipelineParams,
) -> HeightFields {
    let n = mesh.n_cells();
    let ctx = HeightContext {
        mesh,
        values: StencilView::new(mesh, &extended.values, boundary),
        tags: &extended.tags,
        boundary,
        half_width: params.column_half_width as i32,
        vof_eps: params.vof_eps,
    };

    let per_cell = |cell: usize| {
        let mut out = ctx.compute_cell(cell);
        if !out.valid && extended.tags[cell].is_contact() {
            if let Some(plane) = extended.planes[cell] {
                contact_plane_correction(mesh, snapshot, cell, &plane, params, &mut out);
            }
        }
        out
    };
    let cells: Vec<CellHeight> = if params.use_parallel(n) {
        (0..n).into_par_iter().map(per_cell).collect()
    } else {
        (0..n).map(per_cell).collect()
    };

    let mut fields = HeightFields::with_capacity(n);
    for cell in cells {
        fields.push(cell);
    }
    debug!(
        n_cells = n,
        valid = fields.valid_count(),
        "高度函数计算完成"
    );
    fields
}

/// 接触角高度修正：用约束平面代替无效的高度函数
fn contact_plane_correction<M: StencilMesh + ?Sized>(
    mesh: &M,
    snapshot: &FractionSnapshot,
    cell: usize,
    plane: &Plane,
    params: &PipelineParams,
    out: &mut CellHeight,
) {
    out.normal = Some(plane.normal);
    out.source = NormalSource::ContactPlane;

    let segment = segment_in_cell(plane).and_then(|seg| {
        match fluid_region(snapshot.faces(cell), snapshot.cs(cell), params.solid_eps)
            .and_then(|region| region.wall)
        {
            Some(wall) => clip_segment(seg, &wall),
            None => Some(seg),
        }
    });
    out.origin = segment.map(|(a, b)| {
        mesh.cell_center(cell) + 0.5 * (a + b) * mesh.delta()
    });
}
