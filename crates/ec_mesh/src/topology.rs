// crates/ec_mesh/src/topology.rs

//! 网格邻接抽象
//!
//! 核心算法只通过 [`StencilMesh`] 访问网格：单元数、四个方向的邻接、
//! 单元中心和网格步长。模板偏移通过逐步沿邻接链行走得到，
//! 越出计算域时按对称（镜像）规则折回。

use crate::direction::Side;
use ec_foundation::validation::{ValidationError, ValidationReport};
use glam::DVec2;

/// 模板行走结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walk {
    /// 目标单元；越界时为镜像单元
    pub cell: usize,
    /// 第一次越出计算域所经过的边界面
    pub exit: Option<Side>,
}

/// 网格邻接 trait
pub trait StencilMesh: Send + Sync {
    /// 单元数量
    fn n_cells(&self) -> usize;

    /// 单元在 `side` 方向的相邻单元，计算域边界返回 None
    fn neighbor(&self, cell: usize, side: Side) -> Option<usize>;

    /// 单元中心坐标
    fn cell_center(&self, cell: usize) -> DVec2;

    /// 网格步长（正方形单元边长）
    fn delta(&self) -> f64;

    /// 单元体积（二维为面积）
    fn cell_volume(&self) -> f64 {
        self.delta() * self.delta()
    }

    /// 从 `cell` 出发偏移 (di, dj) 个单元
    ///
    /// 先沿 x 再沿 y 行走。越出计算域时按镜像规则折回：
    /// 越界 k 步对应边界单元向内 k-1 步的单元。
    fn walk(&self, cell: usize, di: i32, dj: i32) -> Walk {
        let mut exit = None;
        let mut current = cell;
        for (steps, positive_side, negative_side) in
            [(di, Side::Right, Side::Left), (dj, Side::Top, Side::Bottom)]
        {
            if steps == 0 {
                continue;
            }
            let side = if steps > 0 { positive_side } else { negative_side };
            let total = steps.unsigned_abs() as usize;
            let mut taken = 0;
            while taken < total {
                match self.neighbor(current, side) {
                    Some(next) => {
                        current = next;
                        taken += 1;
                    }
                    None => break,
                }
            }
            if taken < total {
                exit.get_or_insert(side);
                let overshoot = total - taken;
                let back = side.opposite();
                for _ in 1..overshoot {
                    match self.neighbor(current, back) {
                        Some(next) => current = next,
                        None => break,
                    }
                }
            }
        }
        Walk {
            cell: current,
            exit,
        }
    }

    /// 校验邻接关系：索引在范围内、无自环、双向对称
    fn validate_links(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let n = self.n_cells();
        if n == 0 {
            report.add_error(ValidationError::TopologyError {
                message: "网格不含任何单元".into(),
                element_id: None,
            });
            return report;
        }
        if !(self.delta() > 0.0 && self.delta().is_finite()) {
            report.add_error(ValidationError::ConsistencyError {
                message: format!("网格步长无效: {}", self.delta()),
            });
        }
        for cell in 0..n {
            for side in Side::ALL {
                let Some(nb) = self.neighbor(cell, side) else {
                    continue;
                };
                if nb >= n {
                    report.add_error(ValidationError::TopologyError {
                        message: format!("{:?} 邻接 {} 超出范围 0..{}", side, nb, n),
                        element_id: Some(cell),
                    });
                } else if nb == cell {
                    report.add_error(ValidationError::TopologyError {
                        message: format!("{:?} 邻接指向自身", side),
                        element_id: Some(cell),
                    });
                } else if self.neighbor(nb, side.opposite()) != Some(cell) {
                    report.add_error(ValidationError::TopologyError {
                        message: format!(
                            "{:?} 邻接 {} 缺少反向 {:?} 链接",
                            side,
                            nb,
                            side.opposite()
                        ),
                        element_id: Some(cell),
                    });
                }
            }
        }
        report
    }
}
