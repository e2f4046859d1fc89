//! Rigid part hierarchies and their stable bake identities.

pub mod definition;
pub mod part;

pub use definition::ModelDefinition;
pub use part::{BakeablePart, Cuboid, Part, PartKey};
