mod entity;
mod id;
mod record;

pub use entity::{Actions, EntityKind};
pub use id::Id;
pub use record::{Category, Concept, CostType, MovementType, Record};
