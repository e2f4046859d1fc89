//! TransformCollector tests
//!
//! Tests for:
//! - Per-frame reset and implicit absence of un-recorded entries
//! - Instance reservation against both capacity ceilings
//! - Entry iteration in ascending slot order, absent markers included
//! - Fixed-stride serialization and its round trip (the zero-written
//!   absent convention)
//! - Model-record serialization (base offset / part count / tint)

use bakestream::baking::layout::{MODEL_STRUCT_SIZE, ModelRecord, PART_STRUCT_SIZE, PartRecord};
use bakestream::{StreamSettings, TransformCollector};
use glam::{Mat4, Vec3, Vec4};

// ============================================================================
// Helpers
// ============================================================================

fn small_settings() -> StreamSettings {
    StreamSettings {
        entity_limit: 4,
        avg_parts_per_entity: 4,
        ..Default::default()
    }
}

fn translation(x: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
}

// ============================================================================
// Reservation & Recording
// ============================================================================

#[test]
fn unrecorded_entries_are_implicitly_absent() {
    let mut collector = TransformCollector::new(&small_settings());
    let slot = collector.begin_instance(3, Vec4::ONE).unwrap();

    collector.record(slot, 1, translation(5.0));

    let mut entries = Vec::new();
    collector.for_each_entry(|i, e| entries.push((i, e.copied())));

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], (0, None));
    assert_eq!(entries[1], (1, Some(translation(5.0))));
    assert_eq!(entries[2], (2, None));
}

#[test]
fn reset_clears_all_entries() {
    let mut collector = TransformCollector::new(&small_settings());
    let slot = collector.begin_instance(2, Vec4::ONE).unwrap();
    collector.record(slot, 0, Mat4::IDENTITY);

    collector.reset();
    assert_eq!(collector.instance_count(), 0);
    assert_eq!(collector.part_slot_count(), 0);

    let mut visits = 0;
    collector.for_each_entry(|_, _| visits += 1);
    assert_eq!(visits, 0);
}

#[test]
fn recording_overwrites_and_absence_can_be_reasserted() {
    let mut collector = TransformCollector::new(&small_settings());
    let slot = collector.begin_instance(1, Vec4::ONE).unwrap();

    collector.record(slot, 0, translation(1.0));
    collector.record(slot, 0, translation(2.0));

    let mut last = None;
    collector.for_each_entry(|_, e| last = e.copied());
    assert_eq!(last, Some(translation(2.0)));

    collector.record_absent(slot, 0);
    collector.for_each_entry(|_, e| last = e.copied());
    assert_eq!(last, None);
}

#[test]
fn instances_reserve_disjoint_ascending_ranges() {
    let mut collector = TransformCollector::new(&small_settings());
    let a = collector.begin_instance(3, Vec4::ONE).unwrap();
    let b = collector.begin_instance(2, Vec4::ONE).unwrap();

    assert_eq!(a.base_part, 0);
    assert_eq!(b.base_part, 3);
    assert_eq!(collector.part_slot_count(), 5);
    assert_eq!(collector.instance_count(), 2);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "outside the registered range")]
fn out_of_range_id_is_fatal_in_debug() {
    let mut collector = TransformCollector::new(&small_settings());
    let slot = collector.begin_instance(2, Vec4::ONE).unwrap();
    collector.record(slot, 2, Mat4::IDENTITY);
}

// ============================================================================
// Capacity Ceilings
// ============================================================================

#[test]
fn instance_ceiling_refuses_the_excess() {
    let mut collector = TransformCollector::new(&small_settings());
    for _ in 0..4 {
        assert!(collector.begin_instance(1, Vec4::ONE).is_some());
    }
    assert!(collector.begin_instance(1, Vec4::ONE).is_none());
}

#[test]
fn part_slot_ceiling_refuses_the_excess() {
    // 4 entities x 4 average parts = 16 slots
    let mut collector = TransformCollector::new(&small_settings());
    assert!(collector.begin_instance(14, Vec4::ONE).is_some());
    assert!(collector.begin_instance(3, Vec4::ONE).is_none());
    // A smaller instance still fits the remaining slots.
    assert!(collector.begin_instance(2, Vec4::ONE).is_some());
    assert_eq!(collector.part_slot_count(), 16);
}

// ============================================================================
// Serialization Round Trip
// ============================================================================

#[test]
fn part_records_round_trip_through_the_documented_stride() {
    let mut collector = TransformCollector::new(&small_settings());
    let slot = collector.begin_instance(4, Vec4::ONE).unwrap();

    collector.record(slot, 0, translation(1.0));
    collector.record_absent(slot, 1);
    collector.record(slot, 2, Mat4::from_rotation_y(0.4) * translation(-2.0));
    // id 3 left implicitly absent

    assert_eq!(collector.part_bytes_len(), 4 * PART_STRUCT_SIZE);
    let mut records = vec![PartRecord::ABSENT; 4];
    collector.write_parts_into(bytemuck::cast_slice_mut(&mut records));

    let recovered: Vec<Option<Mat4>> = records.iter().map(PartRecord::entry).collect();

    let mut expected = Vec::new();
    collector.for_each_entry(|_, e| expected.push(e.copied()));
    assert_eq!(recovered, expected);
}

#[test]
fn absent_slots_are_zero_written() {
    let mut collector = TransformCollector::new(&small_settings());
    collector.begin_instance(2, Vec4::ONE).unwrap();

    // Dirty the destination to prove every absent byte gets overwritten.
    let mut bytes = vec![0xAB_u8; collector.part_bytes_len() as usize];
    collector.write_parts_into(&mut bytes);
    assert!(bytes.iter().all(|&b| b == 0));
}

#[test]
fn model_records_serialize_base_count_and_tint() {
    let mut collector = TransformCollector::new(&small_settings());
    let tint = Vec4::new(0.1, 0.2, 0.3, 1.0);
    collector.begin_instance(3, Vec4::ONE).unwrap();
    collector.begin_instance(2, tint).unwrap();

    assert_eq!(collector.model_bytes_len(), 2 * MODEL_STRUCT_SIZE);
    let mut records = vec![ModelRecord::default(); 2];
    collector.write_models_into(bytemuck::cast_slice_mut(&mut records));
    assert_eq!(records[0].base_part, 0);
    assert_eq!(records[0].part_count, 3);
    assert_eq!(records[1].base_part, 3);
    assert_eq!(records[1].part_count, 2);
    assert_eq!(records[1].tint, tint);
}
