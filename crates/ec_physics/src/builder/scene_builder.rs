// crates/ec_physics/src/builder/scene_builder.rs

//! 场景构建器
//!
//! 实现从 JSON 场景配置到泛型编排器的桥梁。

use crate::pipeline::{RecomputeOrchestrator, TrackedInterface};
use crate::types::{ContactAngle, PipelineParams};
use ec_config::{BoundaryConfig, BoundaryKind, ConfigError, SceneConfig, ShapeConfig};
use ec_foundation::error::EcError;
use ec_mesh::{
    volume_fractions, BoundaryValue, EmbeddedGeometry, FieldBoundary, GeometryOracle, LevelSet,
    Shape, StencilMesh, StructuredMesh,
};
use glam::DVec2;
use tracing::info;

/// 构建错误
#[derive(Debug)]
pub enum BuildError {
    /// 配置验证失败
    Config(ConfigError),
    /// 网格或几何无效
    InvalidMesh(String),
    /// 编排器拒绝输入
    Core(EcError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Config(e) => write!(f, "配置错误: {}", e),
            BuildError::InvalidMesh(msg) => write!(f, "无效网格: {}", msg),
            BuildError::Core(e) => write!(f, "构建错误: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Config(e) => Some(e),
            BuildError::Core(e) => Some(e),
            BuildError::InvalidMesh(_) => None,
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        BuildError::Config(e)
    }
}

impl From<EcError> for BuildError {
    fn from(e: EcError) -> Self {
        if e.is_mesh_error() {
            BuildError::InvalidMesh(e.to_string())
        } else {
            BuildError::Core(e)
        }
    }
}

/// 构建好的场景
pub struct Scene {
    /// 编排器
    pub orchestrator: RecomputeOrchestrator<StructuredMesh, EmbeddedGeometry>,
    /// 每个界面的初始原始场
    pub raw_fields: Vec<Vec<f64>>,
    /// 小单元清理并入固体的单元数
    pub removed_cells: usize,
}

/// 场景构建器
///
/// # 示例
///
/// ```
/// use ec_config::SceneConfig;
/// use ec_physics::builder::SceneBuilder;
///
/// let mut config = SceneConfig::default();
/// config.grid.nx = 16;
/// config.grid.ny = 16;
/// let mut scene = SceneBuilder::new(config).build().unwrap();
/// let raw = scene.raw_fields.clone();
/// let refs: Vec<&[f64]> = raw.iter().map(Vec::as_slice).collect();
/// let reports = scene.orchestrator.on_init(&refs).unwrap();
/// assert_eq!(reports.len(), 1);
/// ```
pub struct SceneBuilder {
    config: SceneConfig,
    params: Option<PipelineParams>,
}

impl SceneBuilder {
    /// 创建构建器
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            params: None,
        }
    }

    /// 覆盖配置中的流水线参数
    pub fn with_params(mut self, params: PipelineParams) -> Self {
        self.params = Some(params);
        self
    }

    /// 构建场景
    pub fn build(self) -> Result<Scene, BuildError> {
        let config = self.config;
        config.validate()?;

        let grid = &config.grid;
        let mesh = StructuredMesh::from_length(grid.nx, grid.ny, grid.length, DVec2::from(grid.origin))?;

        let solid = config.solid.as_ref().map(shape_from_config);
        let (geometry, removed_cells) = match &solid {
            Some(shape) => {
                let mut geometry = EmbeddedGeometry::from_level_set(&mesh, shape);
                let removed = geometry.clean_small_cells(&mesh, config.clean_threshold);
                (geometry, removed)
            }
            None => (EmbeddedGeometry::fluid_only(mesh.n_cells()), 0),
        };
        let report = geometry.validate(&mesh);
        if report.has_errors() {
            return Err(BuildError::InvalidMesh(report.to_string()));
        }

        let params = self
            .params
            .unwrap_or_else(|| PipelineParams::from(&config.pipeline));
        let boundary = boundary_from_config(&config.boundaries);

        let mut raw_fields = Vec::with_capacity(config.interfaces.len());
        let mut interfaces = Vec::with_capacity(config.interfaces.len());
        for interface in &config.interfaces {
            let droplet = shape_from_config(&interface.shape);
            let mut raw = match (&solid, interface.mask_by_solid) {
                (Some(solid), true) => {
                    let solid = *solid;
                    volume_fractions(&mesh, &move |p: DVec2| droplet.value(p).min(solid.value(p)))
                }
                _ => volume_fractions(&mesh, &droplet),
            };
            for (r, &cs) in raw.iter_mut().zip(geometry.volume()) {
                *r = r.min(cs);
            }
            raw_fields.push(raw);
            interfaces.push(
                TrackedInterface::new(interface.name.clone())
                    .with_contact_angle(ContactAngle::Uniform(interface.contact_angle_deg))
                    .with_boundary(boundary)
                    .with_heights(interface.heights),
            );
        }

        info!(
            nx = mesh.nx(),
            ny = mesh.ny(),
            delta = mesh.delta(),
            solid_cells = geometry.solid_count(),
            cut_cells = geometry.cut_count(),
            removed_cells,
            "场景几何已构建"
        );

        let mut orchestrator =
            RecomputeOrchestrator::new(mesh, geometry, params)?.with_coordinates(config.coordinates);
        for interface in interfaces {
            orchestrator.add_interface(interface)?;
        }

        Ok(Scene {
            orchestrator,
            raw_fields,
            removed_cells,
        })
    }
}

/// 形状配置转换为水平集
pub fn shape_from_config(shape: &ShapeConfig) -> Shape {
    match *shape {
        ShapeConfig::Circle {
            center,
            radius,
            inside,
        } => Shape::Circle {
            center: DVec2::from(center),
            radius,
            inside,
        },
        ShapeConfig::HalfPlane { point, normal } => Shape::HalfPlane {
            point: DVec2::from(point),
            normal: DVec2::from(normal),
        },
    }
}

/// 边界配置转换为场边界规则
pub fn boundary_from_config(config: &BoundaryConfig) -> FieldBoundary {
    let convert = |kind: BoundaryKind| match kind {
        BoundaryKind::Neumann => BoundaryValue::Neumann,
        BoundaryKind::Dirichlet(v) => BoundaryValue::Dirichlet(v),
    };
    FieldBoundary {
        left: convert(config.left),
        right: convert(config.right),
        bottom: convert(config.bottom),
        top: convert(config.top),
    }
}
