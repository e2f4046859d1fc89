#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod baking;
pub mod errors;
pub mod model;
pub mod settings;

pub use baking::collector::{InstanceSlot, TransformCollector};
pub use baking::context::{FrameSlice, StreamingContext};
pub use baking::fences::SectionFences;
pub use baking::layout::{MODEL_STRUCT_SIZE, ModelRecord, PART_STRUCT_SIZE, PartRecord};
pub use baking::ring::SectionedRingBuffer;
pub use baking::vertex::BakedVertex;
pub use baking::walker::{BakeTarget, HierarchyWalker, PathDecision};
pub use errors::{BakeError, Result};
pub use model::{BakeablePart, Cuboid, ModelDefinition, Part, PartKey};
pub use settings::StreamSettings;
