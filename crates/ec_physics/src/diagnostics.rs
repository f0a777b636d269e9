// crates/ec_physics/src/diagnostics.rs

//! 每步诊断：标签计数与液体体积
//!
//! 体积按固定大小分块做 Kahan 求和，再按块序合并，
//! 结果与线程数无关。

use crate::types::{CellTag, CoordinateSystem};
use ec_foundation::numerics::KahanSum;
use ec_mesh::StencilMesh;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 体积求和的分块大小
const VOLUME_CHUNK: usize = 1024;

/// 各标签的单元数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagCounts([usize; 8]);

impl TagCounts {
    /// 统计标签
    pub fn from_tags(tags: &[CellTag]) -> Self {
        let mut counts = [0; 8];
        for tag in tags {
            counts[(tag.code() - 1) as usize] += 1;
        }
        Self(counts)
    }

    /// 某个标签的数量
    #[inline]
    pub fn get(&self, tag: CellTag) -> usize {
        self.0[(tag.code() - 1) as usize]
    }

    /// 总数
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

impl fmt::Display for TagCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in CellTag::ALL {
            let count = self.get(tag);
            if count == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}={}", tag.name(), count)?;
            first = false;
        }
        Ok(())
    }
}

/// 参考相体积
///
/// 轴对称坐标下以单元中心 y（半径）为权重。
pub fn liquid_volume<M: StencilMesh + ?Sized>(
    mesh: &M,
    raw: &[f64],
    coordinates: CoordinateSystem,
    parallel: bool,
) -> f64 {
    let cell_volume = mesh.cell_volume();
    let chunk_sum = |(k, chunk): (usize, &[f64])| {
        let mut sum = KahanSum::new();
        for (offset, &value) in chunk.iter().enumerate() {
            let cell = k * VOLUME_CHUNK + offset;
            let weight = match coordinates {
                CoordinateSystem::Cartesian => 1.0,
                CoordinateSystem::Axisymmetric => mesh.cell_center(cell).y,
            };
            sum.add(value * weight * cell_volume);
        }
        sum.value()
    };

    let partials: Vec<f64> = if parallel {
        raw.par_chunks(VOLUME_CHUNK).enumerate().map(chunk_sum).collect()
    } else {
        raw.chunks(VOLUME_CHUNK).enumerate().map(chunk_sum).collect()
    };
    KahanSum::sum_iter(partials)
}

/// 单个界面一步的诊断
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// 界面名称
    pub interface: String,
    /// 标签计数
    pub counts: TagCounts,
    /// 接触求解回退数
    pub fallbacks: usize,
    /// 被钳位的输入数
    pub clamped: usize,
    /// 退化输入单元数
    pub degenerate: usize,
    /// 高度函数有效单元数
    pub valid_heights: usize,
    /// 参考相体积
    pub volume: f64,
    /// 与初始体积之比；初始体积为零时为 1
    pub volume_ratio: f64,
}

impl StepReport {
    /// 由初始体积计算体积比
    pub fn ratio(volume: f64, initial: f64) -> f64 {
        if initial > 0.0 {
            volume / initial
        } else {
            1.0
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | fallbacks={} clamped={} valid_heights={} volume={:.6e} ratio={:.9}",
            self.interface,
            self.counts,
            self.fallbacks,
            self.clamped,
            self.valid_heights,
            self.volume,
            self.volume_ratio
        )
    }
}
