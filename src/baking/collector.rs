use bytemuck::bytes_of;
use glam::{Mat4, Vec4};

use crate::baking::layout::{MODEL_STRUCT_SIZE, ModelRecord, PART_STRUCT_SIZE, PartRecord};
use crate::settings::StreamSettings;

/// A reserved id range for one baked instance within the current frame.
///
/// Handed out by [`TransformCollector::begin_instance`]; all records for
/// the instance are keyed by part id relative to `base_part`.
#[derive(Debug, Clone, Copy)]
pub struct InstanceSlot {
    /// Index of the instance's [`ModelRecord`] within the frame.
    pub index: u32,
    /// First absolute part-record slot owned by the instance.
    pub base_part: u32,
    /// Valid part ids are `0..part_count`.
    pub part_count: u32,
}

/// Per-frame scratch store mapping (instance, part id) → transform-or-absent.
///
/// Reset once at the start of each frame's collection phase. Reserving an
/// instance pre-fills its id range with absent markers, so any entry not
/// re-set this frame is implicitly absent when serialized — which is how
/// invisible subtrees propagate absence to every descendant slot.
///
/// Serialization is fixed-stride in ascending slot order (instance-major,
/// part-id-minor), giving the GPU an O(1) lookup at
/// `(base_part + id) * stride`. Absent slots are zero-written; see
/// [`PartRecord`] for why a zeroed record can never be mistaken for a pose.
#[derive(Debug)]
pub struct TransformCollector {
    entity_limit: u32,
    part_capacity: u32,
    entries: Vec<Option<Mat4>>,
    models: Vec<ModelRecord>,
}

impl TransformCollector {
    #[must_use]
    pub fn new(settings: &StreamSettings) -> Self {
        Self {
            entity_limit: settings.entity_limit,
            part_capacity: settings.part_slot_capacity(),
            entries: Vec::new(),
            models: Vec::new(),
        }
    }

    /// Clears all entries. Called once at the start of each frame.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.models.clear();
    }

    /// Reserves an id range and a model record for one instance.
    ///
    /// Returns `None` when either capacity ceiling (instance count or part
    /// slots) would be exceeded — the caller must route that instance
    /// through the CPU path instead of corrupting adjacent section memory.
    pub fn begin_instance(&mut self, part_count: u32, tint: Vec4) -> Option<InstanceSlot> {
        if self.models.len() as u32 >= self.entity_limit {
            return None;
        }
        let base_part = self.entries.len() as u32;
        if base_part + part_count > self.part_capacity {
            return None;
        }

        self.entries
            .extend(std::iter::repeat_n(None, part_count as usize));
        self.models
            .push(ModelRecord::new(tint, base_part, part_count));

        Some(InstanceSlot {
            index: self.models.len() as u32 - 1,
            base_part,
            part_count,
        })
    }

    /// Inserts or overwrites the transform for `part_id` within `slot`.
    ///
    /// An out-of-range id is a programming error: fatal in debug builds,
    /// ignored in release builds.
    pub fn record(&mut self, slot: InstanceSlot, part_id: u32, transform: Mat4) {
        self.set_entry(slot, part_id, Some(transform));
    }

    /// Marks `part_id` within `slot` as absent this frame.
    pub fn record_absent(&mut self, slot: InstanceSlot, part_id: u32) {
        self.set_entry(slot, part_id, None);
    }

    fn set_entry(&mut self, slot: InstanceSlot, part_id: u32, entry: Option<Mat4>) {
        debug_assert!(
            part_id < slot.part_count,
            "part id {part_id} outside the registered range 0..{}",
            slot.part_count
        );
        if part_id >= slot.part_count {
            return;
        }
        self.entries[(slot.base_part + part_id) as usize] = entry;
    }

    /// Visits every reserved slot in ascending order, absent markers
    /// included, as they will be serialized.
    pub fn for_each_entry(&self, mut visitor: impl FnMut(u32, Option<&Mat4>)) {
        for (slot, entry) in self.entries.iter().enumerate() {
            visitor(slot as u32, entry.as_ref());
        }
    }

    #[inline]
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.models.len() as u32
    }

    #[inline]
    #[must_use]
    pub fn part_slot_count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Bytes the part records occupy when serialized.
    #[inline]
    #[must_use]
    pub fn part_bytes_len(&self) -> u64 {
        self.entries.len() as u64 * PART_STRUCT_SIZE
    }

    /// Bytes the model records occupy when serialized.
    #[inline]
    #[must_use]
    pub fn model_bytes_len(&self) -> u64 {
        self.models.len() as u64 * MODEL_STRUCT_SIZE
    }

    /// Serializes all part records into `out` at the fixed stride.
    /// `out` must hold at least [`part_bytes_len`](Self::part_bytes_len).
    pub fn write_parts_into(&self, out: &mut [u8]) {
        let stride = PART_STRUCT_SIZE as usize;
        assert!(out.len() >= self.entries.len() * stride);

        for (slot, entry) in self.entries.iter().enumerate() {
            let record = PartRecord::from_entry(*entry);
            out[slot * stride..(slot + 1) * stride].copy_from_slice(bytes_of(&record));
        }
    }

    /// Serializes all model records into `out` at the fixed stride.
    /// `out` must hold at least [`model_bytes_len`](Self::model_bytes_len).
    pub fn write_models_into(&self, out: &mut [u8]) {
        let stride = MODEL_STRUCT_SIZE as usize;
        assert!(out.len() >= self.models.len() * stride);

        for (i, record) in self.models.iter().enumerate() {
            out[i * stride..(i + 1) * stride].copy_from_slice(bytes_of(record));
        }
    }
}
