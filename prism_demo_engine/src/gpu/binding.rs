/// Resource layout and binding set traits
///
/// A BindingSet is an immutable set of GPU resource bindings (buffers,
/// textures) consumed by a pipeline at draw time. The ResourceLayout is its
/// blueprint and doubles as the pipeline's binding interface, including the
/// optional push-constant range.
///
/// Key properties:
/// - Immutable after creation
/// - One binding set per frame slot, created during swapchain setup
/// - Pool/heap management is internal to the backend

use std::sync::Arc;

use bitflags::bitflags;

use crate::gpu::{Buffer, Texture};

bitflags! {
    /// Shader stage visibility flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0b01;
        const PIXEL = 0b10;
    }
}

/// Type of resource bound at a given slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    /// Uniform buffer (read-only structured data)
    UniformBuffer,
    /// Combined image sampler (texture + sampler in one binding)
    SampledTexture,
}

/// Description of a single binding slot within a resource layout
#[derive(Debug, Clone, Copy)]
pub struct ResourceLayoutElement {
    /// Binding number (corresponds to `layout(binding = N)` in GLSL)
    pub binding: u32,
    /// Type of resource at this binding
    pub binding_type: BindingType,
    /// Shader stages that access this binding
    pub stages: ShaderStageFlags,
}

/// Push constant range descriptor
#[derive(Debug, Clone, Copy)]
pub struct PushConstantRange {
    /// Shader stages that can access the push constants
    pub stages: ShaderStageFlags,
    /// Offset in bytes
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

impl PushConstantRange {
    /// Range of `count` 32-bit constants starting at offset 0
    ///
    /// The demos push small values this way (e.g. a color as four floats).
    pub fn constant_32bits(count: u32, stages: ShaderStageFlags) -> Self {
        Self {
            stages,
            offset: 0,
            size: count * 4,
        }
    }
}

/// Descriptor for creating a resource layout
#[derive(Debug, Clone)]
pub struct ResourceLayoutDesc {
    /// Binding slot descriptions
    pub elements: Vec<ResourceLayoutElement>,
    /// Optional push-constant range
    pub push_constants: Option<PushConstantRange>,
}

/// A concrete resource to bind into a binding set at creation time
pub enum BindingResource<'a> {
    /// Uniform buffer at the given binding number
    UniformBuffer {
        binding: u32,
        buffer: &'a Arc<dyn Buffer>,
    },
    /// Sampled texture at the given binding number
    SampledTexture {
        binding: u32,
        texture: &'a Arc<dyn Texture>,
    },
}

/// Resource layout trait
///
/// Marker trait; backends wrap the native layout objects (descriptor set
/// layout and pipeline layout for Vulkan).
pub trait ResourceLayout: Send + Sync {}

/// An immutable set of GPU resource bindings
///
/// Once created, a binding set cannot be modified - create a new one to
/// change resources.
pub trait BindingSet: Send + Sync {}
