// VM Impact Kernel
//
// Rule-driven impact analysis for planned virtual machine changes:
// given a machine and an action, report reboot, downtime and guest
// risk, whether the action is blocked, and what to do beforehand.

pub mod catalog;
pub mod context;
pub mod engine;
pub mod impact;
pub mod kb;
pub mod model;

pub use catalog::{SkuCatalog, SkuRecord, StaticSkuCatalog};
pub use engine::ImpactEngine;
pub use impact::ImpactReport;
pub use kb::KnowledgeBase;
pub use model::{Action, ActionKind, MachineDescription};
