//! The vertex-side contract for GPU-baked meshes.

use bytemuck::{Pod, Zeroable};

/// A vertex of the baked mesh format.
///
/// Besides the usual position/uv/normal, every vertex carries the integer
/// id of the part it belongs to, which the shader uses to index the
/// per-part transform records of the draw's assigned section. The id is
/// signed: the instanced id range must fit an `i32`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BakedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub part_id: i32,
}

/// Attribute layout: position, uv, normal, part id.
pub const BAKED_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x2,
    2 => Float32x3,
    3 => Sint32,
];

impl BakedVertex {
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &BAKED_VERTEX_ATTRIBUTES,
        }
    }
}
