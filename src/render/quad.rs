use bytemuck::{Pod, Zeroable};

/// One instanced rectangle in normalized device coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

impl QuadInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Converts a top-left pixel rectangle into a quad instance.
pub fn quad_from_rect(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: [f32; 4],
    screen_width: f32,
    screen_height: f32,
) -> QuadInstance {
    let center = [
        ((x + width / 2.0) / screen_width) * 2.0 - 1.0,
        -(((y + height / 2.0) / screen_height) * 2.0 - 1.0),
    ];
    let size = [(width / screen_width) * 2.0, (height / screen_height) * 2.0];

    QuadInstance {
        center,
        size,
        color,
    }
}

/// Same as [`quad_from_rect`] for a rectangle given by its center.
pub fn quad_centered(
    cx: f32,
    cy: f32,
    width: f32,
    height: f32,
    color: [f32; 4],
    screen_width: f32,
    screen_height: f32,
) -> QuadInstance {
    quad_from_rect(
        cx - width / 2.0,
        cy - height / 2.0,
        width,
        height,
        color,
        screen_width,
        screen_height,
    )
}

/// Instanced quad shader: a unit triangle strip scaled and offset per instance.
pub const QUAD_SHADER_SRC: &str = r#"
struct InstanceInput {
    @location(0) center: vec2<f32>,
    @location(1) size: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32, instance: InstanceInput) -> VertexOutput {
    var corners = array<vec2<f32>, 4>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(-0.5, 0.5),
        vec2<f32>(0.5, 0.5),
    );
    let corner = corners[index];
    var out: VertexOutput;
    out.position = vec4<f32>(instance.center + corner * instance.size, 0.0, 1.0);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
