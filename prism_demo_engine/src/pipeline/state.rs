/// Pipeline sub-state types
///
/// Each of these is an opaque, already-constructed value the descriptor
/// builder stores unchanged. They are plain data: the backend consumes them
/// when the descriptor is finalized. Two descriptors that must not diverge
/// share the same Arc-wrapped sub-state instead of cloning it.

use std::sync::Arc;

use crate::gpu::{Shader, ShaderStage, TextureFormat};

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Triangle list
    TriangleList,
    /// Triangle strip
    TriangleStrip,
    /// Line list
    LineList,
    /// Point list
    PointList,
}

/// Vertex input rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    /// Data is per-vertex
    Vertex,
    /// Data is per-instance
    Instance,
}

/// Vertex attribute description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute location in the shader
    pub location: u32,
    /// Binding index
    pub binding: u32,
    /// Format of the attribute
    pub format: TextureFormat,
    /// Offset in bytes from the start of the vertex
    pub offset: u32,
}

/// Vertex binding description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBinding {
    /// Binding index
    pub binding: u32,
    /// Stride in bytes between consecutive elements
    pub stride: u32,
    /// Input rate (per-vertex or per-instance)
    pub input_rate: VertexInputRate,
}

/// Vertex input layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    /// Vertex bindings
    pub bindings: Vec<VertexBinding>,
    /// Vertex attributes
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout for a single tightly-packed per-vertex binding
    ///
    /// Attribute locations are assigned in order; offsets are accumulated
    /// from the format sizes.
    pub fn packed(formats: &[TextureFormat]) -> Self {
        let mut attributes = Vec::with_capacity(formats.len());
        let mut offset = 0u32;
        for (location, format) in formats.iter().enumerate() {
            attributes.push(VertexAttribute {
                location: location as u32,
                binding: 0,
                format: *format,
                offset,
            });
            offset += format_size(*format);
        }
        Self {
            bindings: vec![VertexBinding {
                binding: 0,
                stride: offset,
                input_rate: VertexInputRate::Vertex,
            }],
            attributes,
        }
    }
}

fn format_size(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::R32_SFLOAT => 4,
        TextureFormat::R32G32_SFLOAT => 8,
        TextureFormat::R32G32B32_SFLOAT => 12,
        TextureFormat::R32G32B32A32_SFLOAT => 16,
        // Pixel formats are 4 bytes per texel in this fixed set
        _ => 4,
    }
}

/// Input assembly sub-state: vertex layout plus topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputAssemblyState {
    /// Vertex input layout
    pub layout: VertexLayout,
    /// Primitive topology
    pub topology: PrimitiveTopology,
}

impl InputAssemblyState {
    pub fn new(layout: VertexLayout, topology: PrimitiveTopology) -> Self {
        Self { layout, topology }
    }
}

/// Shader stage sub-state: a compiled module plus its entry point
///
/// The entry point name matters for the Vulkan backend (GLSL); other
/// backends may bind the entry at compile time and ignore it.
#[derive(Clone)]
pub struct ShaderState {
    /// Pipeline stage
    pub stage: ShaderStage,
    /// Compiled shader module
    pub module: Arc<dyn Shader>,
    /// Entry point name
    pub entry_point: String,
}

impl ShaderState {
    pub fn new(stage: ShaderStage, module: Arc<dyn Shader>, entry_point: &str) -> Self {
        Self {
            stage,
            module,
            entry_point: entry_point.to_string(),
        }
    }
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Front face winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise vertices define front face
    CounterClockwise,
    /// Clockwise vertices define front face
    Clockwise,
}

/// Rasterization fixed-function sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizationState {
    /// Face culling mode
    pub cull_mode: CullMode,
    /// Front face winding order
    pub front_face: FrontFace,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
        }
    }
}

/// Comparison operator for the depth test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Depth/stencil sub-state
///
/// The demo family never uses stencil operations, so only the enable flag is
/// carried through to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    /// Enable depth testing
    pub depth_test_enable: bool,
    /// Enable writing to the depth buffer
    pub depth_write_enable: bool,
    /// Depth comparison operator
    pub depth_compare_op: CompareOp,
    /// Enable stencil testing
    pub stencil_test_enable: bool,
}

impl DepthStencilState {
    /// Depth testing fully disabled (2D demos)
    pub fn disabled() -> Self {
        Self {
            depth_test_enable: false,
            depth_write_enable: false,
            depth_compare_op: CompareOp::Always,
            stencil_test_enable: false,
        }
    }
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: CompareOp::Less,
            stencil_test_enable: false,
        }
    }
}

/// Blend factor for the blending equation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Blend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    /// result = src * srcFactor + dst * dstFactor
    Add,
    /// result = src * srcFactor - dst * dstFactor
    Subtract,
}

/// Color blend sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    /// Enable blending
    pub blend_enable: bool,
    /// Source color blend factor
    pub src_color_factor: BlendFactor,
    /// Destination color blend factor
    pub dst_color_factor: BlendFactor,
    /// Color blend operation
    pub color_blend_op: BlendOp,
    /// Source alpha blend factor
    pub src_alpha_factor: BlendFactor,
    /// Destination alpha blend factor
    pub dst_alpha_factor: BlendFactor,
    /// Alpha blend operation
    pub alpha_blend_op: BlendOp,
}

impl BlendState {
    /// Standard alpha blending (the particle demo uses this)
    pub fn alpha() -> Self {
        Self {
            blend_enable: true,
            src_color_factor: BlendFactor::SrcAlpha,
            dst_color_factor: BlendFactor::OneMinusSrcAlpha,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
        }
    }
}

impl Default for BlendState {
    fn default() -> Self {
        // Opaque: source replaces destination
        Self {
            blend_enable: false,
            src_color_factor: BlendFactor::One,
            dst_color_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
