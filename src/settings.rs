//! Streaming Buffer Configuration
//!
//! This module defines the construction-time configuration for the
//! transform-streaming subsystem.
//!
//! The settings are consumed once when a [`StreamingContext`] is created and
//! bound the GPU allocations for the life of the context: the section count
//! of the buffer ring and the capacity ceilings from which section byte
//! sizes are derived. Exceeding a ceiling at runtime is not an error — the
//! excess instances are routed through the CPU render path instead.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bakestream::{StreamSettings, StreamingContext};
//!
//! // Defaults: triple-buffered, 8192 instances, 16 parts per instance avg.
//! let ctx = StreamingContext::new(device, StreamSettings::default());
//!
//! // A smaller footprint for scenes with few animated models
//! let ctx = StreamingContext::new(device, StreamSettings {
//!     entity_limit: 256,
//!     ..Default::default()
//! });
//! ```
//!
//! [`StreamingContext`]: crate::baking::context::StreamingContext

use std::time::Duration;

use crate::baking::layout::{MODEL_STRUCT_SIZE, PART_STRUCT_SIZE};

/// Configuration for the streaming buffer ring and its capacity ceilings.
///
/// | Field                  | Description                                | Default |
/// |------------------------|--------------------------------------------|---------|
/// | `section_count`        | Ring sections (frames in flight + 1)       | `3`     |
/// | `entity_limit`         | Max simultaneously baked instances         | `8192`  |
/// | `avg_parts_per_entity` | Assumed average parts per instance         | `16`    |
/// | `fence_timeout`        | Bounded wait before fatal escalation       | `2 s`   |
///
/// With `section_count = 3`, the CPU writing frame *N* only ever waits on
/// the fence recorded for frame *N−2*'s draws, giving the GPU two frames of
/// slack before the CPU must stall.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Number of sections in each ring buffer. Must be at least 2; 3 is the
    /// recommended default for CPU/GPU overlap.
    pub section_count: u32,

    /// Maximum number of model instances baked per frame. Instances beyond
    /// this ceiling fall back to the CPU render path.
    pub entity_limit: u32,

    /// Assumed average part count per instance. Together with
    /// `entity_limit` this bounds the per-section part-record capacity; a
    /// frame may mix instances of any size as long as the total part count
    /// stays under `entity_limit * avg_parts_per_entity`.
    pub avg_parts_per_entity: u32,

    /// Upper bound on a single fence wait. A wait that exceeds this is
    /// treated as an unrecoverable driver stall and escalated as
    /// [`BakeError::FenceTimeout`](crate::errors::BakeError::FenceTimeout).
    pub fence_timeout: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            section_count: 3,
            entity_limit: 8192,
            avg_parts_per_entity: 16,
            fence_timeout: Duration::from_secs(2),
        }
    }
}

impl StreamSettings {
    /// Total part-record slots available in one section.
    #[inline]
    #[must_use]
    pub fn part_slot_capacity(&self) -> u32 {
        self.entity_limit * self.avg_parts_per_entity
    }

    /// Byte size of one part-buffer section.
    #[inline]
    #[must_use]
    pub fn part_section_size(&self) -> u64 {
        u64::from(self.part_slot_capacity()) * PART_STRUCT_SIZE
    }

    /// Byte size of one model-buffer section.
    #[inline]
    #[must_use]
    pub fn model_section_size(&self) -> u64 {
        u64::from(self.entity_limit) * MODEL_STRUCT_SIZE
    }
}
