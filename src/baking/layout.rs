//! GPU buffer layout contract.
//!
//! These structs must match the consuming shader's storage declarations
//! exactly; the strides are fixed so both sides can address records as
//! `base + id * stride`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Per-instance record, one per rendered model instance.
///
/// Memory layout (48 bytes): tint (4×f32) | base_part, part_count (2×u32)
/// | flags/padding (2×u32) | reserved (4×f32).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ModelRecord {
    /// Packed per-instance color tint.
    pub tint: Vec4,
    /// First part-record slot belonging to this instance.
    pub base_part: u32,
    /// Number of part records owned by this instance.
    pub part_count: u32,
    pub _flags: [u32; 2],
    pub _reserved: Vec4,
}

impl ModelRecord {
    #[must_use]
    pub fn new(tint: Vec4, base_part: u32, part_count: u32) -> Self {
        Self {
            tint,
            base_part,
            part_count,
            _flags: [0; 2],
            _reserved: Vec4::ZERO,
        }
    }
}

/// Per-part record: one 4×4 world transform.
///
/// Absent parts are zero-written. A zeroed matrix is distinguishable from
/// every valid affine transform because its translation column has `w == 0`
/// where a real transform carries `1`; the shader (and
/// [`entry`](Self::entry)) use that as the absence flag, so a section reused
/// frames later can never leak a stale pose.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PartRecord {
    pub transform: Mat4,
}

impl PartRecord {
    /// The record written for parts absent this frame.
    pub const ABSENT: Self = Self {
        transform: Mat4::ZERO,
    };

    #[must_use]
    pub fn from_entry(entry: Option<Mat4>) -> Self {
        match entry {
            Some(transform) => Self { transform },
            None => Self::ABSENT,
        }
    }

    /// Recovers the transform-or-absent mapping from a serialized record.
    #[must_use]
    pub fn entry(&self) -> Option<Mat4> {
        if self.transform.w_axis.w == 0.0 {
            None
        } else {
            Some(self.transform)
        }
    }
}

/// Fixed stride of one [`ModelRecord`].
pub const MODEL_STRUCT_SIZE: u64 = std::mem::size_of::<ModelRecord>() as u64;

/// Fixed stride of one [`PartRecord`].
pub const PART_STRUCT_SIZE: u64 = std::mem::size_of::<PartRecord>() as u64;
