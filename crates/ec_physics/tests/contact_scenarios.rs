// crates/ec_physics/tests/contact_scenarios.rs

//! 平直壁面上的接触线场景

use ec_mesh::{EmbeddedGeometry, FieldBoundary, StencilMesh, StructuredMesh};
use ec_physics::plic::clipped_area;
use ec_physics::{
    line_area, CellTag, ContactAngle, InterfaceOutputs, PipelineParams, Plane,
    RecomputeOrchestrator, TrackedInterface,
};
use glam::DVec2;

/// 壁面 `y = wall_y` 以下为固体
fn wall_geometry(mesh: &StructuredMesh, wall_y: f64) -> EmbeddedGeometry {
    EmbeddedGeometry::from_level_set(mesh, &move |p: DVec2| p.y - wall_y)
}

/// 参考相为 `n · (x - contact) ≤ 0` 且位于壁面以上的部分，逐单元精确积分
fn exact_raw(mesh: &StructuredMesh, wall_y: f64, normal: DVec2, contact: DVec2) -> Vec<f64> {
    (0..mesh.n_cells())
        .map(|c| {
            let center = mesh.cell_center(c);
            let liquid = Plane::new(normal, normal.dot(contact - center));
            let fluid = Plane::new(DVec2::NEG_Y, center.y - wall_y);
            clipped_area(&[liquid, fluid])
        })
        .collect()
}

fn run_once(
    mesh: StructuredMesh,
    geometry: EmbeddedGeometry,
    raw: &[f64],
    theta: f64,
) -> InterfaceOutputs {
    let params = PipelineParams::default().with_parallel(false);
    let mut orch = RecomputeOrchestrator::new(mesh, geometry, params).unwrap();
    orch.add_interface(
        TrackedInterface::new("f")
            .with_contact_angle(ContactAngle::Uniform(theta))
            .with_boundary(FieldBoundary::neumann()),
    )
    .unwrap();
    let reports = orch.on_init(&[raw]).unwrap();
    assert_eq!(reports[0].fallbacks, 0);
    orch.output("f").unwrap().clone()
}

#[test]
fn test_contact_angle_consistency_on_flat_wall() {
    let contact = DVec2::new(4.3, 2.5);
    for theta in [30.0_f64, 60.0, 90.0, 120.0, 150.0] {
        let mesh = StructuredMesh::new(9, 6, 1.0, DVec2::ZERO).unwrap();
        let geometry = wall_geometry(&mesh, 2.5);
        let t = theta.to_radians();
        let normal = DVec2::new(t.sin(), t.cos());
        let raw = exact_raw(&mesh, 2.5, normal, contact);

        let cell = mesh.index(4, 2);
        let center = mesh.cell_center(cell);
        let outputs = run_once(mesh, geometry, &raw, theta);

        assert!(outputs.tag(cell).is_contact(), "θ = {theta}: {}", outputs.tag(cell));
        if theta == 90.0 {
            // 两侧切割邻居均无界面穿过
            assert_eq!(outputs.tag(cell), CellTag::Contact2Phase);
        }
        let plane = outputs.plane(cell).unwrap();
        // 在参考相内从壁面法向 (0, 1) 量到界面法向
        let measured = plane.normal.dot(DVec2::Y).clamp(-1.0, 1.0).acos().to_degrees();
        assert!((measured - theta).abs() <= 1.0, "θ = {theta}, measured = {measured}");

        let expected = line_area(normal, normal.dot(contact - center));
        assert!((outputs.extended_fraction(cell) - expected).abs() < 1e-6);
    }
}

#[test]
fn test_right_angle_contact_at_domain_bottom() {
    let mesh = StructuredMesh::new(8, 6, 1.0, DVec2::ZERO).unwrap();
    let geometry = wall_geometry(&mesh, 0.5);
    let raw = exact_raw(&mesh, 0.5, DVec2::X, DVec2::new(4.3, 0.5));
    let cell = mesh.index(4, 0);
    let outputs = run_once(mesh, geometry, &raw, 90.0);

    assert_eq!(outputs.tag(cell), CellTag::Contact2Phase);
    let plane = outputs.plane(cell).unwrap();
    // 法向平行于壁面切向
    assert!(plane.normal.dot(DVec2::Y).abs() < 1e-12);
    assert!((plane.normal.x - 1.0).abs() < 1e-12);
    assert!((outputs.extended_fraction(cell) - 0.3).abs() < 1e-9);
}

#[test]
fn test_right_angle_contact_above_solid_rows() {
    // 同一竖直界面，壁面移到域内，下方两行为固体
    let mesh = StructuredMesh::new(8, 6, 1.0, DVec2::ZERO).unwrap();
    let geometry = wall_geometry(&mesh, 2.5);
    let raw = exact_raw(&mesh, 2.5, DVec2::X, DVec2::new(4.3, 2.5));
    let cell = mesh.index(4, 2);
    let below = mesh.index(4, 1);
    let outputs = run_once(mesh, geometry, &raw, 90.0);

    assert_eq!(outputs.tag(below), CellTag::Solid);
    assert_eq!(outputs.tag(cell), CellTag::Contact2Phase);
    let plane = outputs.plane(cell).unwrap();
    assert!(plane.normal.dot(DVec2::Y).abs() < 1e-12);
    assert!((outputs.extended_fraction(cell) - 0.3).abs() < 1e-9);
}

#[test]
fn test_film_parallel_to_wall_falls_back() {
    // 参考相为壁面上方 0.5 厚的平膜，界面与壁面平行，接触求解无解
    let mesh = StructuredMesh::new(8, 6, 1.0, DVec2::ZERO).unwrap();
    let geometry = wall_geometry(&mesh, 2.3);
    let raw = exact_raw(&mesh, 2.3, DVec2::Y, DVec2::new(0.0, 2.8));
    let cell = mesh.index(4, 2);
    assert!((raw[cell] - 0.5).abs() < 1e-12);

    let params = PipelineParams::default().with_parallel(false);
    let mut orch = RecomputeOrchestrator::new(mesh, geometry, params).unwrap();
    orch.add_interface(
        TrackedInterface::new("film")
            .with_contact_angle(ContactAngle::Uniform(60.0))
            .with_boundary(FieldBoundary::neumann()),
    )
    .unwrap();
    let reports = orch.on_init(&[&raw]).unwrap();
    assert!(reports[0].fallbacks > 0);

    let outputs = orch.output("film").unwrap();
    assert_eq!(outputs.tag(cell), CellTag::Special);
    assert_eq!(outputs.plane(cell), None);
    assert!(!outputs.heights.as_ref().unwrap().valid[cell]);
    assert!(outputs.extended.iter().all(|v| (0.0..=1.0).contains(v)));
    // 退回无约束平面：整单元内 y ≤ 0.3（局部坐标）
    assert!((outputs.extended_fraction(cell) - 0.8).abs() < 1e-9);
}

#[test]
fn test_three_phase_point_next_to_two_phase_cell() {
    // 界面过 (4.2, 2.5)，法向 (1, 1)/√2，参考相位于左下
    let mesh = StructuredMesh::new(9, 6, 1.0, DVec2::ZERO).unwrap();
    let geometry = wall_geometry(&mesh, 2.5);
    let normal = DVec2::new(1.0, 1.0).normalize();
    let raw = exact_raw(&mesh, 2.5, normal, DVec2::new(4.2, 2.5));
    let three = mesh.index(4, 2);
    let two = mesh.index(3, 2);
    let outputs = run_once(mesh, geometry, &raw, 45.0);

    assert_eq!(outputs.tag(three), CellTag::Contact3Phase);
    assert_eq!(outputs.tag(two), CellTag::Contact2Phase);
}

#[test]
fn test_solid_rows_and_boundary_embed() {
    let mesh = StructuredMesh::new(9, 6, 1.0, DVec2::ZERO).unwrap();
    let geometry = wall_geometry(&mesh, 2.5);
    let raw = exact_raw(&mesh, 2.5, DVec2::X, DVec2::new(4.3, 2.5));
    let outputs = run_once(mesh.clone(), geometry, &raw, 90.0);
    let heights = outputs.heights.as_ref().unwrap();

    for i in 0..9 {
        for j in 0..2 {
            let c = mesh.index(i, j);
            assert_eq!(outputs.tag(c), CellTag::Solid);
            assert!(!heights.valid[c]);
        }
    }
    // 接触平面左侧的切割单元：固体部分为参考相
    let left = mesh.index(3, 2);
    assert_eq!(outputs.tag(left), CellTag::BoundaryEmbed);
    assert!((outputs.extended_fraction(left) - 1.0).abs() < 1e-9);
}
