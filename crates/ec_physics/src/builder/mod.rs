// crates/ec_physics/src/builder/mod.rs

//! 场景构建模块
//!
//! 把无泛型的 JSON 场景配置转换为具体的网格、几何与编排器。
//!
//! ```text
//! SceneConfig ──> SceneBuilder ──> Scene
//!                     │              ├─ RecomputeOrchestrator<StructuredMesh, EmbeddedGeometry>
//!                     │              └─ 初始原始场（每个界面一个）
//!                     ▼
//!        StructuredMesh + EmbeddedGeometry::from_level_set + clean_small_cells
//! ```

pub mod scene_builder;

pub use scene_builder::{BuildError, Scene, SceneBuilder};
