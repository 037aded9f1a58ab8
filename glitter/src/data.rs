use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

pub const POSITION_COMPONENTS: u32 = 3;
pub const COLOR_COMPONENTS: u32 = 3;

pub const VERTEX_STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;
pub const POSITION_OFFSET: u32 = std::mem::offset_of!(Vertex, position) as u32;
pub const COLOR_OFFSET: u32 = std::mem::offset_of!(Vertex, color) as u32;

#[rustfmt::skip]
pub static TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex { position: [ 0.5, -0.5, 0.0], color: [0.8, 0.0, 0.0] },
    Vertex { position: [-0.5, -0.5, 0.0], color: [0.5, 1.0, 0.5] },
    Vertex { position: [ 0.0,  0.5, 0.0], color: [0.2, 0.6, 0.6] },
];

/// The triangle as the flat, interleaved float array uploaded to the GPU.
pub fn triangle_floats() -> &'static [f32] {
    bytemuck::cast_slice(&TRIANGLE_VERTICES)
}
