use glam::{EulerRot, Mat4, Vec2, Vec3};
use slotmap::new_key_type;

use crate::baking::vertex::BakedVertex;

new_key_type! {
    /// Handle to a [`Part`] inside its owning [`ModelDefinition`].
    ///
    /// [`ModelDefinition`]: crate::model::ModelDefinition
    pub struct PartKey;
}

/// Capability interface for parts that can participate in GPU baking.
///
/// A baked part carries a small dense integer id, assigned once at model
/// registration and stable for the life of the definition, so that GPU
/// buffer offsets computed from `id * stride` stay valid across frames.
pub trait BakeablePart {
    /// The assigned bake id, or `None` before registration.
    fn bake_id(&self) -> Option<u32>;
    /// Assigns the bake id. Called once during registration.
    fn set_bake_id(&mut self, id: u32);
    /// Whether this part (and, transitively, its subtree) is drawn.
    fn is_visible(&self) -> bool;
}

/// An axis-aligned box primitive owned by a [`Part`].
///
/// Texture layout is the host's concern; emitted vertices carry
/// `uv_origin` plus unit face offsets for the host atlas to resolve.
#[derive(Debug, Clone, Copy)]
pub struct Cuboid {
    /// Minimum corner in the part's local space.
    pub origin: Vec3,
    /// Extent along each axis.
    pub size: Vec3,
    /// Base texture coordinate for this box.
    pub uv_origin: Vec2,
}

impl Cuboid {
    #[must_use]
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self {
            origin,
            size,
            uv_origin: Vec2::ZERO,
        }
    }

    /// Emits the 24 vertices of this box (4 per face), each stamped with
    /// the owning part's bake id so the shader can look up its transform.
    pub fn emit_vertices(&self, part_id: i32, out: &mut Vec<BakedVertex>) {
        let min = self.origin;
        let max = self.origin + self.size;

        // (normal, four corners in CCW order viewed from outside)
        let faces: [(Vec3, [Vec3; 4]); 6] = [
            (
                Vec3::X,
                [
                    Vec3::new(max.x, min.y, max.z),
                    Vec3::new(max.x, min.y, min.z),
                    Vec3::new(max.x, max.y, min.z),
                    Vec3::new(max.x, max.y, max.z),
                ],
            ),
            (
                Vec3::NEG_X,
                [
                    Vec3::new(min.x, min.y, min.z),
                    Vec3::new(min.x, min.y, max.z),
                    Vec3::new(min.x, max.y, max.z),
                    Vec3::new(min.x, max.y, min.z),
                ],
            ),
            (
                Vec3::Y,
                [
                    Vec3::new(min.x, max.y, max.z),
                    Vec3::new(max.x, max.y, max.z),
                    Vec3::new(max.x, max.y, min.z),
                    Vec3::new(min.x, max.y, min.z),
                ],
            ),
            (
                Vec3::NEG_Y,
                [
                    Vec3::new(min.x, min.y, min.z),
                    Vec3::new(max.x, min.y, min.z),
                    Vec3::new(max.x, min.y, max.z),
                    Vec3::new(min.x, min.y, max.z),
                ],
            ),
            (
                Vec3::Z,
                [
                    Vec3::new(min.x, min.y, max.z),
                    Vec3::new(max.x, min.y, max.z),
                    Vec3::new(max.x, max.y, max.z),
                    Vec3::new(min.x, max.y, max.z),
                ],
            ),
            (
                Vec3::NEG_Z,
                [
                    Vec3::new(max.x, min.y, min.z),
                    Vec3::new(min.x, min.y, min.z),
                    Vec3::new(min.x, max.y, min.z),
                    Vec3::new(max.x, max.y, min.z),
                ],
            ),
        ];

        let face_uv = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];

        for (normal, corners) in &faces {
            for (corner, uv) in corners.iter().zip(&face_uv) {
                out.push(BakedVertex {
                    position: corner.to_array(),
                    uv: (self.uv_origin + *uv).to_array(),
                    normal: normal.to_array(),
                    part_id,
                });
            }
        }
    }
}

/// A node in a rigid part hierarchy.
///
/// # Topology and Pose
///
/// Parent/child links and the cuboid list are fixed once the owning
/// [`ModelDefinition`] is registered; the pose fields (`translation`,
/// `pitch`, `yaw`, `roll`) and the `visible` flag are mutated freely per
/// frame.
///
/// # Rotation Order
///
/// The local rotation is composed as `Rz(roll) · Ry(yaw) · Rx(pitch)`
/// (intrinsic ZYX). The order is load-bearing: a different composition
/// produces plausible-looking but incorrect poses, so it is pinned by test.
///
/// [`ModelDefinition`]: crate::model::ModelDefinition
#[derive(Debug, Clone, Default)]
pub struct Part {
    // === Hierarchy ===
    pub(crate) parent: Option<PartKey>,
    pub(crate) children: Vec<PartKey>,

    // === Pose (hot data, mutated per frame) ===
    /// Local translation relative to the parent part.
    pub translation: Vec3,
    /// Rotation about the local X axis, in radians.
    pub pitch: f32,
    /// Rotation about the local Y axis, in radians.
    pub yaw: f32,
    /// Rotation about the local Z axis, in radians.
    pub roll: f32,

    // === State ===
    /// When `false`, this part and its entire subtree are not drawn.
    pub visible: bool,

    // === Geometry ===
    /// Box primitives attached to this part. May be empty for grouping
    /// parts that exist only to transform their children.
    pub cuboids: Vec<Cuboid>,

    pub(crate) bake_id: Option<u32>,
}

impl Part {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    /// Returns the parent part handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<PartKey> {
        self.parent
    }

    /// Returns a read-only slice of child handles, in fixed child order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[PartKey] {
        &self.children
    }

    /// Sets all three Euler angles at once.
    #[inline]
    pub fn set_angles(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.pitch = pitch;
        self.yaw = yaw;
        self.roll = roll;
    }

    /// The local rotation matrix, `Rz(roll) · Ry(yaw) · Rx(pitch)`.
    #[inline]
    #[must_use]
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::ZYX, self.roll, self.yaw, self.pitch)
    }

    /// The full local matrix: translate, then rotate.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * self.rotation_matrix()
    }
}

impl BakeablePart for Part {
    #[inline]
    fn bake_id(&self) -> Option<u32> {
        self.bake_id
    }

    #[inline]
    fn set_bake_id(&mut self, id: u32) {
        self.bake_id = Some(id);
    }

    #[inline]
    fn is_visible(&self) -> bool {
        self.visible
    }
}
