// crates/ec_mesh/src/stencil.rs

//! 带边界规则的模板取值
//!
//! 模板偏移越出计算域时，按所穿过的边界面的规则取值：
//! - `Neumann`：镜像单元的值（零法向梯度）
//! - `Dirichlet(v)`：固定值 `v`
//!
//! 固体体积分数总是使用 Neumann 规则。

use crate::direction::Side;
use crate::topology::StencilMesh;
use serde::{Deserialize, Serialize};

/// 单个边界面的取值规则
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryValue {
    /// 零梯度
    #[default]
    Neumann,
    /// 固定值
    Dirichlet(f64),
}

/// 四个边界面的取值规则
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldBoundary {
    /// -x 边界
    #[serde(default)]
    pub left: BoundaryValue,
    /// +x 边界
    #[serde(default)]
    pub right: BoundaryValue,
    /// -y 边界
    #[serde(default)]
    pub bottom: BoundaryValue,
    /// +y 边界
    #[serde(default)]
    pub top: BoundaryValue,
}

impl FieldBoundary {
    /// 四面均为 Neumann
    pub fn neumann() -> Self {
        Self::default()
    }

    /// 设置某一面的规则
    pub fn with_side(mut self, side: Side, value: BoundaryValue) -> Self {
        match side {
            Side::Left => self.left = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
            Side::Top => self.top = value,
        }
        self
    }

    /// 获取某一面的规则
    #[inline]
    pub fn get(&self, side: Side) -> BoundaryValue {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Top => self.top,
        }
    }
}

/// 标量场的模板访问视图
pub struct StencilView<'a, M: StencilMesh + ?Sized> {
    mesh: &'a M,
    field: &'a [f64],
    boundary: FieldBoundary,
}

impl<'a, M: StencilMesh + ?Sized> StencilView<'a, M> {
    /// 创建视图，`field.len()` 须等于 `mesh.n_cells()`
    pub fn new(mesh: &'a M, field: &'a [f64], boundary: FieldBoundary) -> Self {
        debug_assert_eq!(field.len(), mesh.n_cells());
        Self {
            mesh,
            field,
            boundary,
        }
    }

    /// 取 `cell` 偏移 (di, dj) 处的值
    #[inline]
    pub fn sample(&self, cell: usize, di: i32, dj: i32) -> f64 {
        let walk = self.mesh.walk(cell, di, dj);
        match walk.exit.map(|side| self.boundary.get(side)) {
            Some(BoundaryValue::Dirichlet(v)) => v,
            _ => self.field[walk.cell],
        }
    }

    /// 取值及目标单元是否位于计算域内
    #[inline]
    pub fn sample_with_cell(&self, cell: usize, di: i32, dj: i32) -> (f64, Option<usize>) {
        let walk = self.mesh.walk(cell, di, dj);
        match walk.exit.map(|side| self.boundary.get(side)) {
            Some(BoundaryValue::Dirichlet(v)) => (v, None),
            Some(BoundaryValue::Neumann) => (self.field[walk.cell], None),
            None => (self.field[walk.cell], Some(walk.cell)),
        }
    }

    /// 底层网格
    pub fn mesh(&self) -> &'a M {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::StructuredMesh;
    use glam::DVec2;

    #[test]
    fn test_neumann_and_dirichlet() {
        let mesh = StructuredMesh::new(3, 2, 1.0, DVec2::ZERO).unwrap();
        let field: Vec<f64> = (0..6).map(|c| c as f64).collect();
        let neumann = StencilView::new(&mesh, &field, FieldBoundary::neumann());
        assert_eq!(neumann.sample(0, -1, 0), 0.0);
        assert_eq!(neumann.sample(0, 0, -2), 3.0);
        assert_eq!(neumann.sample(1, 1, 1), 5.0);

        let bc = FieldBoundary::neumann().with_side(Side::Bottom, BoundaryValue::Dirichlet(0.0));
        let view = StencilView::new(&mesh, &field, bc);
        assert_eq!(view.sample(4, 0, -2), 0.0);
        assert_eq!(view.sample(4, 0, -1), 1.0);
        assert_eq!(view.sample_with_cell(4, 0, -1), (1.0, Some(1)));
        assert_eq!(view.sample_with_cell(1, 0, -1), (0.0, None));
    }

    #[test]
    fn test_boundary_serde() {
        let bc = FieldBoundary::neumann().with_side(Side::Top, BoundaryValue::Dirichlet(1.0));
        let json = serde_json::to_string(&bc).unwrap();
        let back: FieldBoundary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bc);
        let partial: FieldBoundary = serde_json::from_str(r#"{"bottom":{"dirichlet":0.0}}"#).unwrap();
        assert_eq!(partial.get(Side::Bottom), BoundaryValue::Dirichlet(0.0));
        assert_eq!(partial.get(Side::Left), BoundaryValue::Neumann);
    }
}
