//! Scenario graph model and the checks and views built on it.

pub mod graph;
pub mod load;
pub mod node;
pub mod render;
pub mod summary;
pub mod validate;

pub use graph::ScenarioGraph;
pub use load::{load_scenario, LoadError};
pub use node::{Choice, Node, NodeKind};
pub use render::{render, RenderConfig, TreeEntry, TreeLine};
pub use summary::{choice_points, endings, ScenarioStats};
pub use validate::{validate, Issue, ValidationReport};
