//! ModelDefinition and Part tests
//!
//! Tests for:
//! - Dense depth-first id assignment and its stability across registrations
//! - Rotation composition pinned against the hand-expanded ZYX matrix
//! - Local matrix translation/rotation ordering
//! - Cuboid vertex emission and per-part id stamping
//! - Mesh building over the whole hierarchy

use bakestream::model::{BakeablePart, Cuboid, ModelDefinition, Part};
use glam::{Mat4, Vec2, Vec3, Vec4};

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-5;

fn mat4_approx(a: Mat4, b: Mat4) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() < EPSILON)
}

fn biped() -> ModelDefinition {
    let mut def = ModelDefinition::new("biped");
    let root = def.add_root("root", Part::new());
    let torso = def.add_child(root, "torso", Part::new());
    def.add_child(torso, "left_arm", Part::new());
    def.add_child(torso, "right_arm", Part::new());
    def.add_child(root, "head", Part::new());
    def
}

// ============================================================================
// Identity Assignment
// ============================================================================

#[test]
fn register_assigns_dense_depth_first_ids() {
    let mut def = biped();
    assert_eq!(def.register(), 5);

    let id = |name: &str| {
        def.part(def.part_by_name(name).unwrap())
            .unwrap()
            .bake_id()
            .unwrap()
    };

    // Depth-first in fixed child order: root, torso, left_arm, right_arm, head
    assert_eq!(id("root"), 0);
    assert_eq!(id("torso"), 1);
    assert_eq!(id("left_arm"), 2);
    assert_eq!(id("right_arm"), 3);
    assert_eq!(id("head"), 4);
}

#[test]
fn registration_is_stable_and_idempotent() {
    let mut first = biped();
    let mut second = biped();
    first.register();
    second.register();

    for name in ["root", "torso", "left_arm", "right_arm", "head"] {
        let id_of = |def: &ModelDefinition| {
            def.part(def.part_by_name(name).unwrap())
                .unwrap()
                .bake_id()
                .unwrap()
        };
        assert_eq!(id_of(&first), id_of(&second), "id of `{name}` diverged");
    }

    // Registering again must not reassign anything.
    let before: Vec<_> = ["root", "torso", "left_arm", "right_arm", "head"]
        .iter()
        .map(|n| first.part(first.part_by_name(n).unwrap()).unwrap().bake_id())
        .collect();
    assert_eq!(first.register(), 5);
    let after: Vec<_> = ["root", "torso", "left_arm", "right_arm", "head"]
        .iter()
        .map(|n| first.part(first.part_by_name(n).unwrap()).unwrap().bake_id())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn ids_are_unique_within_a_hierarchy() {
    let mut def = biped();
    let count = def.register();

    let mut seen = vec![false; count as usize];
    for name in ["root", "torso", "left_arm", "right_arm", "head"] {
        let id = def
            .part(def.part_by_name(name).unwrap())
            .unwrap()
            .bake_id()
            .unwrap() as usize;
        assert!(!seen[id], "id {id} assigned twice");
        seen[id] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
#[should_panic(expected = "frozen")]
fn topology_is_frozen_after_registration() {
    let mut def = biped();
    def.register();
    def.add_root("late", Part::new());
}

// ============================================================================
// Rotation Composition
// ============================================================================

/// The rotation must equal Rz(roll) · Ry(yaw) · Rx(pitch). Expanded by
/// hand so a silent change of axis order fails this test rather than
/// producing plausible-looking but incorrect poses.
#[test]
fn rotation_matrix_is_intrinsic_zyx() {
    let (pitch, yaw, roll) = (0.31_f32, -0.72_f32, 1.18_f32);

    let mut part = Part::new();
    part.set_angles(pitch, yaw, roll);

    let (sx, cx) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    let (sz, cz) = roll.sin_cos();

    let expected = Mat4::from_cols(
        Vec4::new(cy * cz, cy * sz, -sy, 0.0),
        Vec4::new(sx * sy * cz - cx * sz, sx * sy * sz + cx * cz, sx * cy, 0.0),
        Vec4::new(cx * sy * cz + sx * sz, cx * sy * sz - sx * cz, cx * cy, 0.0),
        Vec4::W,
    );

    assert!(mat4_approx(part.rotation_matrix(), expected));
}

#[test]
fn local_matrix_translates_then_rotates() {
    let mut part = Part::new();
    part.translation = Vec3::new(1.0, 2.0, 3.0);
    part.yaw = std::f32::consts::FRAC_PI_2;

    let expected = Mat4::from_translation(part.translation) * part.rotation_matrix();
    assert!(mat4_approx(part.local_matrix(), expected));

    // The pivot must be unaffected by the rotation (translate first).
    let origin = part.local_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!((origin.truncate() - part.translation).length() < EPSILON);
}

#[test]
fn world_matrix_accumulates_down_the_chain() {
    let mut def = ModelDefinition::new("chain");
    let mut a = Part::new();
    a.translation = Vec3::X;
    let root = def.add_root("a", a);
    let mut b = Part::new();
    b.translation = Vec3::Y;
    let child = def.add_child(root, "b", b);
    def.register();

    let world = def.world_matrix_of(child);
    let pos = (world * Vec4::W).truncate();
    assert!((pos - Vec3::new(1.0, 1.0, 0.0)).length() < EPSILON);
}

// ============================================================================
// Geometry Emission
// ============================================================================

#[test]
fn cuboid_emits_24_vertices_with_the_part_id() {
    let cuboid = Cuboid::new(Vec3::ZERO, Vec3::ONE);
    let mut out = Vec::new();
    cuboid.emit_vertices(7, &mut out);

    assert_eq!(out.len(), 24);
    assert!(out.iter().all(|v| v.part_id == 7));

    // All positions lie on the unit box surface.
    for v in &out {
        for c in v.position {
            assert!((-EPSILON..=1.0 + EPSILON).contains(&c));
        }
    }
}

#[test]
fn build_mesh_stamps_each_parts_vertices() {
    let mut def = ModelDefinition::new("boxes");
    let mut root = Part::new();
    root.cuboids.push(Cuboid::new(Vec3::ZERO, Vec3::ONE));
    let root_key = def.add_root("root", root);

    let mut child = Part::new();
    child.cuboids.push(Cuboid {
        origin: Vec3::ZERO,
        size: Vec3::splat(2.0),
        uv_origin: Vec2::new(0.5, 0.5),
    });
    def.add_child(root_key, "child", child);
    def.register();

    let mesh = def.build_mesh();
    assert_eq!(mesh.len(), 48);
    assert!(mesh[..24].iter().all(|v| v.part_id == 0));
    assert!(mesh[24..].iter().all(|v| v.part_id == 1));
}
