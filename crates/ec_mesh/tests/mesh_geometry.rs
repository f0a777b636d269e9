// crates/ec_mesh/tests/mesh_geometry.rs

//! 网格层集成测试
//!
//! 覆盖结构化网格与显式邻接表的一致性、镜像行走，
//! 以及由水平集构造的嵌入几何。

use ec_mesh::{
    EmbeddedGeometry, GeometryOracle, NeighborTable, Shape, Side, StencilMesh, StructuredMesh,
};
use glam::DVec2;

// ============================================================
// 邻接与行走
// ============================================================

#[test]
fn test_walk_stays_in_domain() {
    let mesh = StructuredMesh::new(7, 5, 0.1, DVec2::ZERO).unwrap();
    for cell in 0..mesh.n_cells() {
        for di in -3..=3 {
            for dj in -3..=3 {
                let w = mesh.walk(cell, di, dj);
                assert!(w.cell < mesh.n_cells());
                let (i, j) = mesh.ij(cell);
                let inside_x = (0..7).contains(&(i as i32 + di));
                let inside_y = (0..5).contains(&(j as i32 + dj));
                assert_eq!(w.exit.is_none(), inside_x && inside_y);
            }
        }
    }
}

#[test]
fn test_mirror_walk_is_symmetric() {
    // 越界偏移 k 与 1-k 落在同一单元
    let mesh = StructuredMesh::new(6, 1, 1.0, DVec2::ZERO).unwrap();
    let c = mesh.index(0, 0);
    for k in 1..=3 {
        assert_eq!(mesh.walk(c, -k, 0).cell, mesh.walk(c, k - 1, 0).cell);
    }
}

#[test]
fn test_neighbor_table_broken_link_detected() {
    let mesh = StructuredMesh::new(4, 4, 1.0, DVec2::ZERO).unwrap();
    let mut table = NeighborTable::from_structured(&mesh);
    assert!(table.validate_links().is_valid());

    table.set_link(mesh.index(1, 1), Side::Top, None).unwrap();
    let report = table.validate_links();
    assert!(!report.is_valid());
    assert!(report.into_mesh_result().unwrap_err().is_mesh_error());
}

// ============================================================
// 嵌入几何
// ============================================================

#[test]
fn test_cylinder_geometry_with_cleanup() {
    let n = 64;
    let mesh = StructuredMesh::from_length(n, n, 5.0, DVec2::ZERO).unwrap();
    let solid = Shape::Circle {
        center: DVec2::new(0.0, 1.0),
        radius: 1.0,
        inside: false,
    };
    let mut geometry = EmbeddedGeometry::from_level_set(&mesh, &solid);
    geometry.clean_small_cells(&mesh, 1e-2);

    for cell in 0..geometry.n_cells() {
        let cs = geometry.solid_fraction(cell);
        assert!(cs == 0.0 || cs >= 1e-2);
        if cs == 0.0 {
            for side in Side::ALL {
                assert_eq!(geometry.face_fraction(cell, side), 0.0);
                if let Some(nb) = mesh.neighbor(cell, side) {
                    assert_eq!(geometry.face_fraction(nb, side.opposite()), 0.0);
                }
            }
        }
    }
    assert!(geometry.cut_count() > 0);
    assert!(geometry.validate(&mesh).is_valid());
}
