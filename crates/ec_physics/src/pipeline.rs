// crates/ec_physics/src/pipeline.rs

//! 重算流水线与编排器
//!
//! 每个被追踪界面每步执行：
//!
//! ```text
//! 原始场 ──> FractionSnapshot ──> classify ──> build_extended_field ──> compute_heights
//!                                   │                 │                      │
//!                                   ▼                 ▼                      ▼
//!                                 标签           扩展分数 + 平面         高度/法向/曲率
//! ```
//!
//! [`RecomputeOrchestrator`] 持有网格、几何、参数和界面列表；
//! 全部界面计算成功后才一起发布结果。

use crate::classifier::classify;
use crate::contact::build_extended_field;
use crate::diagnostics::{liquid_volume, StepReport, TagCounts};
use crate::height::{compute_heights, HeightFields};
use crate::plic::Plane;
use crate::snapshot::{FractionSnapshot, SnapshotView};
use crate::types::{CellTag, ContactAngle, CoordinateSystem, PipelineParams};
use ec_foundation::error::{EcError, EcResult};
use ec_foundation::ensure;
use ec_foundation::validation::ValidationReport;
use ec_mesh::{FieldBoundary, GeometryOracle, StencilMesh};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================================
// 界面与输出
// ============================================================

/// 被追踪的界面
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedInterface {
    /// 名称（唯一）
    pub name: String,
    /// 接触角场
    pub contact_angle: ContactAngle,
    /// 场边界规则
    pub boundary: FieldBoundary,
    /// 是否计算高度函数
    pub compute_heights: bool,
}

impl TrackedInterface {
    /// 创建界面：90° 接触角，四面 Neumann，计算高度函数
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact_angle: ContactAngle::default(),
            boundary: FieldBoundary::neumann(),
            compute_heights: true,
        }
    }

    /// 设置接触角
    pub fn with_contact_angle(mut self, angle: ContactAngle) -> Self {
        self.contact_angle = angle;
        self
    }

    /// 设置边界规则
    pub fn with_boundary(mut self, boundary: FieldBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// 设置是否计算高度函数
    pub fn with_heights(mut self, enabled: bool) -> Self {
        self.compute_heights = enabled;
        self
    }
}

/// 单个界面发布的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceOutputs {
    /// 单元标签
    pub tags: Vec<CellTag>,
    /// 扩展体积分数
    pub extended: Vec<f64>,
    /// 接触单元的约束平面
    pub planes: Vec<Option<Plane>>,
    /// 高度函数
    pub heights: Option<HeightFields>,
}

impl InterfaceOutputs {
    /// 单元标签
    #[inline]
    pub fn tag(&self, cell: usize) -> CellTag {
        self.tags[cell]
    }

    /// 扩展体积分数
    #[inline]
    pub fn extended_fraction(&self, cell: usize) -> f64 {
        self.extended[cell]
    }

    /// 约束平面
    #[inline]
    pub fn plane(&self, cell: usize) -> Option<Plane> {
        self.planes[cell]
    }
}

/// 单次流水线运行结果
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// 发布内容
    pub outputs: InterfaceOutputs,
    /// 接触求解回退数
    pub fallbacks: usize,
    /// 被钳位的输入数
    pub clamped: usize,
    /// 退化输入单元数
    pub degenerate: usize,
    /// 参考相体积
    pub volume: f64,
}

/// 对单个界面运行一次完整流水线
///
/// 纯函数：只读取参数，返回新分配的结果。
pub fn run_pipeline<M, G>(
    mesh: &M,
    geometry: &G,
    raw: &[f64],
    interface: &TrackedInterface,
    params: &PipelineParams,
    coordinates: CoordinateSystem,
) -> EcResult<PipelineRun>
where
    M: StencilMesh + ?Sized,
    G: GeometryOracle + ?Sized,
{
    EcError::check_size("raw_fraction", mesh.n_cells(), raw.len())?;
    let snapshot = FractionSnapshot::capture(geometry, raw, params)?;
    if snapshot.clamped_count() > 0 {
        warn!(
            interface = %interface.name,
            clamped = snapshot.clamped_count(),
            degenerate = snapshot.degenerate_count(),
            "输入分数超出 [0, 1]，已钳位"
        );
    }

    let view = SnapshotView::new(mesh, &snapshot, interface.boundary);
    let tags = classify(&view, params);
    let extended = build_extended_field(&view, &tags, &interface.contact_angle, params);
    let heights = interface
        .compute_heights
        .then(|| compute_heights(mesh, &snapshot, &extended, interface.boundary, params));

    let volume = liquid_volume(
        mesh,
        snapshot.raw_field(),
        coordinates,
        params.use_parallel(mesh.n_cells()),
    );
    debug!(interface = %interface.name, volume, "流水线完成");

    Ok(PipelineRun {
        fallbacks: extended.fallbacks,
        clamped: snapshot.clamped_count(),
        degenerate: snapshot.degenerate_count(),
        volume,
        outputs: InterfaceOutputs {
            tags: extended.tags,
            extended: extended.values,
            planes: extended.planes,
            heights,
        },
    })
}

// ============================================================
// 编排器
// ============================================================

/// 编排器生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// 尚未初始化
    Uninitialized,
    /// 运行中，已完成 `steps` 次步进重算
    Running {
        /// 步数
        steps: usize,
    },
}

struct InterfaceSlot {
    interface: TrackedInterface,
    outputs: Option<InterfaceOutputs>,
    initial_volume: f64,
}

/// 校验几何：单元数不一致为错误，其余问题记录警告
fn check_geometry<M: StencilMesh, G: GeometryOracle>(
    mesh: &M,
    geometry: &G,
) -> EcResult<ValidationReport> {
    EcError::check_size("solid_fraction", mesh.n_cells(), geometry.n_cells())?;
    let report = geometry.validate(mesh);
    if report.has_errors() {
        warn!(errors = report.error_count(), "几何含非有限分数，相关单元将标记为 Special");
    }
    if report.has_warnings() {
        warn!(warnings = report.warning_count(), "几何校验有警告");
    }
    Ok(report)
}

/// 重算编排器
pub struct RecomputeOrchestrator<M: StencilMesh, G: GeometryOracle> {
    mesh: M,
    geometry: G,
    params: PipelineParams,
    coordinates: CoordinateSystem,
    slots: Vec<InterfaceSlot>,
    state: LifecycleState,
}

impl<M: StencilMesh, G: GeometryOracle> RecomputeOrchestrator<M, G> {
    /// 创建编排器，校验参数、网格邻接和几何尺寸
    pub fn new(mesh: M, geometry: G, params: PipelineParams) -> EcResult<Self> {
        params.validate()?;
        let report = mesh.validate_links().into_mesh_result()?;
        if report.has_warnings() {
            warn!(warnings = report.warning_count(), "网格校验有警告");
        }
        check_geometry(&mesh, &geometry)?;
        info!(n_cells = mesh.n_cells(), delta = mesh.delta(), "编排器已创建");
        Ok(Self {
            mesh,
            geometry,
            params,
            coordinates: CoordinateSystem::default(),
            slots: Vec::new(),
            state: LifecycleState::Uninitialized,
        })
    }

    /// 设置坐标系
    pub fn with_coordinates(mut self, coordinates: CoordinateSystem) -> Self {
        self.coordinates = coordinates;
        self
    }

    /// 添加被追踪界面，返回其下标
    pub fn add_interface(&mut self, interface: TrackedInterface) -> EcResult<usize> {
        interface.contact_angle.validate(self.mesh.n_cells())?;
        ensure!(
            self.slots.iter().all(|s| s.interface.name != interface.name),
            EcError::invalid_input(format!("界面名称重复: {}", interface.name))
        );
        info!(name = %interface.name, "添加界面");
        self.slots.push(InterfaceSlot {
            interface,
            outputs: None,
            initial_volume: 0.0,
        });
        Ok(self.slots.len() - 1)
    }

    /// 初始化：第一次重算，记录初始体积
    pub fn on_init(&mut self, raw_fields: &[&[f64]]) -> EcResult<Vec<StepReport>> {
        let runs = self.compute_all(raw_fields)?;
        for (slot, run) in self.slots.iter_mut().zip(&runs) {
            slot.initial_volume = run.volume;
        }
        let reports = self.publish(runs);
        self.state = LifecycleState::Running { steps: 0 };
        info!(interfaces = self.slots.len(), "初始化完成");
        Ok(reports)
    }

    /// 步进：每个流体步之后重算
    pub fn on_step(&mut self, raw_fields: &[&[f64]]) -> EcResult<Vec<StepReport>> {
        let LifecycleState::Running { steps } = self.state else {
            return Err(EcError::invalid_input("on_step 前必须先调用 on_init"));
        };
        let runs = self.compute_all(raw_fields)?;
        let reports = self.publish(runs);
        self.state = LifecycleState::Running { steps: steps + 1 };
        debug!(step = steps + 1, "步进重算完成");
        Ok(reports)
    }

    /// 替换几何（网格自适应之后）并重新校验
    ///
    /// 单元数不一致时拒绝替换；分数问题只记录日志，
    /// 下一次重算时按钳位与退化单元规则处理。
    pub fn set_geometry(&mut self, geometry: G) -> EcResult<ValidationReport> {
        let report = check_geometry(&self.mesh, &geometry)?;
        self.geometry = geometry;
        info!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "几何已替换"
        );
        Ok(report)
    }

    fn compute_all(&self, raw_fields: &[&[f64]]) -> EcResult<Vec<PipelineRun>> {
        EcError::check_size("raw_fields", self.slots.len(), raw_fields.len())?;
        self.slots
            .iter()
            .zip(raw_fields)
            .map(|(slot, raw)| {
                run_pipeline(
                    &self.mesh,
                    &self.geometry,
                    raw,
                    &slot.interface,
                    &self.params,
                    self.coordinates,
                )
            })
            .collect()
    }

    fn publish(&mut self, runs: Vec<PipelineRun>) -> Vec<StepReport> {
        let mut reports = Vec::with_capacity(runs.len());
        for (slot, run) in self.slots.iter_mut().zip(runs) {
            let report = StepReport {
                interface: slot.interface.name.clone(),
                counts: TagCounts::from_tags(&run.outputs.tags),
                fallbacks: run.fallbacks,
                clamped: run.clamped,
                degenerate: run.degenerate,
                valid_heights: run
                    .outputs
                    .heights
                    .as_ref()
                    .map_or(0, HeightFields::valid_count),
                volume: run.volume,
                volume_ratio: StepReport::ratio(run.volume, slot.initial_volume),
            };
            if run.fallbacks > 0 {
                warn!(interface = %report.interface, fallbacks = run.fallbacks, "接触求解回退");
            }
            debug!(%report, "结果已发布");
            slot.outputs = Some(run.outputs);
            reports.push(report);
        }
        reports
    }

    /// 网格
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// 几何
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// 参数
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// 坐标系
    pub fn coordinates(&self) -> CoordinateSystem {
        self.coordinates
    }

    /// 生命周期状态
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// 界面数量
    pub fn n_interfaces(&self) -> usize {
        self.slots.len()
    }

    /// 全部界面
    pub fn interfaces(&self) -> impl Iterator<Item = &TrackedInterface> + '_ {
        self.slots.iter().map(|s| &s.interface)
    }

    /// 第 `index` 个界面最近发布的结果
    pub fn outputs(&self, index: usize) -> Option<&InterfaceOutputs> {
        self.slots.get(index).and_then(|s| s.outputs.as_ref())
    }

    /// 按名称取最近发布的结果
    pub fn output(&self, name: &str) -> Option<&InterfaceOutputs> {
        self.slots
            .iter()
            .find(|s| s.interface.name == name)
            .and_then(|s| s.outputs.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_mesh::{EmbeddedGeometry, StructuredMesh};
    use glam::DVec2;

    fn orchestrator() -> RecomputeOrchestrator<StructuredMesh, EmbeddedGeometry> {
        let mesh = StructuredMesh::new(8, 8, 1.0, DVec2::ZERO).unwrap();
        let geometry = EmbeddedGeometry::fluid_only(64);
        RecomputeOrchestrator::new(mesh, geometry, PipelineParams::default()).unwrap()
    }

    #[test]
    fn test_step_before_init() {
        let mut orch = orchestrator();
        orch.add_interface(TrackedInterface::new("f")).unwrap();
        let raw = vec![0.0; 64];
        assert!(orch.on_step(&[&raw]).is_err());
        assert_eq!(orch.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_lifecycle() {
        let mut orch = orchestrator();
        orch.add_interface(TrackedInterface::new("f")).unwrap();
        let raw = vec![1.0; 64];
        let reports = orch.on_init(&[&raw]).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].counts.get(CellTag::NoInterface), 64);
        assert_eq!(reports[0].volume_ratio, 1.0);
        orch.on_step(&[&raw]).unwrap();
        orch.on_step(&[&raw]).unwrap();
        assert_eq!(orch.state(), LifecycleState::Running { steps: 2 });
        assert!(orch.output("f").is_some());
        assert!(orch.output("g").is_none());
    }

    #[test]
    fn test_interface_validation() {
        let mut orch = orchestrator();
        orch.add_interface(TrackedInterface::new("f")).unwrap();
        assert!(orch.add_interface(TrackedInterface::new("f")).is_err());
        let bad = TrackedInterface::new("g").with_contact_angle(ContactAngle::Uniform(200.0));
        assert!(orch.add_interface(bad).is_err());
        let short = TrackedInterface::new("h").with_contact_angle(ContactAngle::PerCell(vec![90.0; 3]));
        assert!(orch.add_interface(short).is_err());
    }

    #[test]
    fn test_field_count_mismatch_publishes_nothing() {
        let mut orch = orchestrator();
        orch.add_interface(TrackedInterface::new("a")).unwrap();
        orch.add_interface(TrackedInterface::new("b")).unwrap();
        let raw = vec![1.0; 64];
        let short = vec![1.0; 10];
        assert!(orch.on_init(&[&raw]).is_err());
        assert!(orch.on_init(&[&raw, &short]).is_err());
        assert!(orch.outputs(0).is_none());
        assert_eq!(orch.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_set_geometry_size_check() {
        let mut orch = orchestrator();
        assert!(orch.set_geometry(EmbeddedGeometry::fluid_only(10)).is_err());
        assert!(orch.set_geometry(EmbeddedGeometry::fluid_only(64)).is_ok());
    }

    #[test]
    fn test_set_geometry_reports_fractions() {
        let mut orch = orchestrator();
        orch.add_interface(TrackedInterface::new("f")).unwrap();

        let mut volume = vec![1.0; 64];
        volume[3] = 1.2;
        let over = EmbeddedGeometry::from_fields(volume, vec![[1.0; 4]; 64]).unwrap();
        let report = orch.set_geometry(over).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);

        let mut volume = vec![1.0; 64];
        volume[5] = f64::NAN;
        let nan = EmbeddedGeometry::from_fields(volume, vec![[1.0; 4]; 64]).unwrap();
        let report = orch.set_geometry(nan).unwrap();
        assert!(report.has_errors());

        // 替换后的几何在下一次重算中按退化单元处理
        let raw = vec![1.0; 64];
        let reports = orch.on_init(&[&raw]).unwrap();
        assert_eq!(reports[0].degenerate, 1);
        assert_eq!(orch.output("f").unwrap().tag(5), CellTag::Special);
    }
}
