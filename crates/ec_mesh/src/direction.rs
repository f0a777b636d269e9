// crates/ec_mesh/src/direction.rs

//! 坐标轴与单元面方向

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// x 方向
    X,
    /// y 方向
    Y,
}

impl Axis {
    /// 全部坐标轴
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// 数组下标
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }

    /// 另一条坐标轴
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// 单位向量
    #[inline]
    pub fn unit(self) -> DVec2 {
        match self {
            Self::X => DVec2::X,
            Self::Y => DVec2::Y,
        }
    }

    /// 沿本轴移动 `step` 个单元的 (di, dj) 偏移
    #[inline]
    pub fn offset(self, step: i32) -> (i32, i32) {
        match self {
            Self::X => (step, 0),
            Self::Y => (0, step),
        }
    }

    /// 取向量在本轴上的分量
    #[inline]
    pub fn component(self, v: DVec2) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
        }
    }
}

/// 单元面方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// -x 面
    Left,
    /// +x 面
    Right,
    /// -y 面
    Bottom,
    /// +y 面
    Top,
}

impl Side {
    /// 全部四个面，顺序与 `index()` 一致
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Bottom, Side::Top];

    /// 数组下标
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Top => 3,
        }
    }

    /// 对面
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
        }
    }

    /// 面法向所在坐标轴
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Bottom | Self::Top => Axis::Y,
        }
    }

    /// 是否指向坐标正方向
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Right | Self::Top)
    }

    /// 由坐标轴和方向构造
    #[inline]
    pub fn from_axis(axis: Axis, positive: bool) -> Self {
        match (axis, positive) {
            (Axis::X, false) => Self::Left,
            (Axis::X, true) => Self::Right,
            (Axis::Y, false) => Self::Bottom,
            (Axis::Y, true) => Self::Top,
        }
    }

    /// 跨过本面到相邻单元的 (di, dj) 偏移
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Bottom => (0, -1),
            Self::Top => (0, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_roundtrip() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(Side::from_axis(side.axis(), side.is_positive()), side);
            assert_eq!(Side::ALL[side.index()], side);
        }
    }

    #[test]
    fn test_axis_helpers() {
        assert_eq!(Axis::X.other(), Axis::Y);
        assert_eq!(Axis::Y.offset(-2), (0, -2));
        assert_eq!(Axis::X.component(DVec2::new(3.0, 4.0)), 3.0);
    }
}
