/// Vulkan resource wrappers - buffers, textures, shaders, framebuffers,
/// binding sets - plus the enum conversions shared across the backend
///
/// Every wrapper holds the shared GpuContext and destroys its native handles
/// on drop. Drops only happen behind the engine's teardown wait-idle barrier.

use std::sync::Arc;

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;

use prism_demo_engine::prism::gpu::{
    AttachmentLayout, BindingSet, Buffer, Framebuffer, MemoryHeap, ResourceLayout, SampleCount,
    Shader, ShaderStageFlags, Texture, TextureFormat, TextureInfo,
};
use prism_demo_engine::prism::{Error, Result};
use prism_demo_engine::prism_error;

use crate::context::GpuContext;

// ============================================================================
// Enum conversions
// ============================================================================

pub(crate) fn vk_format(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::D16_UNORM => vk::Format::D16_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        TextureFormat::R32_SFLOAT => vk::Format::R32_SFLOAT,
        TextureFormat::R32G32_SFLOAT => vk::Format::R32G32_SFLOAT,
        TextureFormat::R32G32B32_SFLOAT => vk::Format::R32G32B32_SFLOAT,
        TextureFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
    }
}

pub(crate) fn vk_sample_count(samples: SampleCount) -> vk::SampleCountFlags {
    match samples {
        SampleCount::S1 => vk::SampleCountFlags::TYPE_1,
        SampleCount::S2 => vk::SampleCountFlags::TYPE_2,
        SampleCount::S4 => vk::SampleCountFlags::TYPE_4,
        SampleCount::S8 => vk::SampleCountFlags::TYPE_8,
    }
}

pub(crate) fn vk_image_layout(layout: AttachmentLayout) -> vk::ImageLayout {
    match layout {
        AttachmentLayout::Undefined => vk::ImageLayout::UNDEFINED,
        AttachmentLayout::RenderTarget => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        AttachmentLayout::DepthStencil => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        AttachmentLayout::GeneralRead => vk::ImageLayout::GENERAL,
        AttachmentLayout::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        AttachmentLayout::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        AttachmentLayout::Present => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

pub(crate) fn vk_shader_stages(stages: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut flags = vk::ShaderStageFlags::empty();
    if stages.contains(ShaderStageFlags::VERTEX) {
        flags |= vk::ShaderStageFlags::VERTEX;
    }
    if stages.contains(ShaderStageFlags::PIXEL) {
        flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    flags
}

// ============================================================================
// Buffer
// ============================================================================

/// Vulkan buffer implementation
pub struct VulkanBuffer {
    ctx: Arc<GpuContext>,
    pub(crate) buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
    host_visible: bool,
}

impl VulkanBuffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        size: u64,
        usage: vk::BufferUsageFlags,
        heap: MemoryHeap,
    ) -> Result<Self> {
        unsafe {
            let buffer_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&buffer_info, None).map_err(|e| {
                prism_error!("prism::vulkan", "Failed to create buffer: {:?}", e);
                Error::ResourceCreation(format!("Failed to create buffer: {:?}", e))
            })?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let location = match heap {
                MemoryHeap::Default => MemoryLocation::GpuOnly,
                MemoryHeap::Upload => MemoryLocation::CpuToGpu,
            };

            let allocation = ctx
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("Allocator lock poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "buffer",
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|e| {
                    ctx.device.destroy_buffer(buffer, None);
                    Error::ResourceCreation(format!("Failed to allocate buffer memory: {:?}", e))
                })?;

            ctx.device
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    Error::ResourceCreation(format!("Failed to bind buffer memory: {:?}", e))
                })?;

            Ok(Self {
                ctx,
                buffer,
                allocation: Some(allocation),
                size,
                host_visible: heap == MemoryHeap::Upload,
            })
        }
    }
}

impl Buffer for VulkanBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.host_visible {
            return Err(Error::BackendError(
                "Buffer update requires an upload-heap buffer".to_string(),
            ));
        }
        if offset + data.len() as u64 > self.size {
            return Err(Error::BackendError(format!(
                "Buffer update of {} bytes at offset {} exceeds size {}",
                data.len(),
                offset,
                self.size
            )));
        }

        let allocation = self
            .allocation
            .as_ref()
            .ok_or_else(|| Error::BackendError("Buffer has no allocation".to_string()))?;

        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                mapped_ptr.offset(offset as isize),
                data.len(),
            );
        }

        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if the lock fails - the buffer must still go
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}

// ============================================================================
// Texture
// ============================================================================

/// Vulkan texture implementation
///
/// Wraps an image plus its view. Swapchain images are wrapped with
/// `owns_image = false`: the swapchain owns the image, the wrapper owns only
/// the view.
pub struct VulkanTexture {
    ctx: Arc<GpuContext>,
    pub(crate) image: vk::Image,
    pub(crate) image_view: vk::ImageView,
    allocation: Option<Allocation>,
    owns_image: bool,
    info: TextureInfo,
}

impl VulkanTexture {
    pub(crate) fn owned(
        ctx: Arc<GpuContext>,
        image: vk::Image,
        image_view: vk::ImageView,
        allocation: Allocation,
        info: TextureInfo,
    ) -> Self {
        Self {
            ctx,
            image,
            image_view,
            allocation: Some(allocation),
            owns_image: true,
            info,
        }
    }

    /// Wrap a swapchain image; only the view is owned
    pub(crate) fn from_swapchain_image(
        ctx: Arc<GpuContext>,
        image: vk::Image,
        image_view: vk::ImageView,
        info: TextureInfo,
    ) -> Self {
        Self {
            ctx,
            image,
            image_view,
            allocation: None,
            owns_image: false,
            info,
        }
    }
}

impl Texture for VulkanTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.image_view, None);

            if self.owns_image {
                if let Some(allocation) = self.allocation.take() {
                    if let Ok(mut allocator) = self.ctx.allocator.lock() {
                        allocator.free(allocation).ok();
                    }
                }
                self.ctx.device.destroy_image(self.image, None);
            }
        }
    }
}

// ============================================================================
// Shader
// ============================================================================

/// Vulkan shader module implementation
pub struct VulkanShader {
    ctx: Arc<GpuContext>,
    pub(crate) module: vk::ShaderModule,
}

impl VulkanShader {
    pub(crate) fn new(ctx: Arc<GpuContext>, bytecode: &[u8]) -> Result<Self> {
        let code = ash::util::read_spv(&mut std::io::Cursor::new(bytecode)).map_err(|e| {
            prism_error!("prism::vulkan", "Invalid SPIR-V bytecode: {:?}", e);
            Error::ResourceCreation(format!("Invalid SPIR-V bytecode: {:?}", e))
        })?;

        unsafe {
            let create_info = vk::ShaderModuleCreateInfo::default().code(&code);
            let module = ctx.device.create_shader_module(&create_info, None).map_err(|e| {
                Error::ResourceCreation(format!("Failed to create shader module: {:?}", e))
            })?;

            Ok(Self { ctx, module })
        }
    }
}

impl Shader for VulkanShader {}

impl Drop for VulkanShader {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_shader_module(self.module, None);
        }
    }
}

// ============================================================================
// Framebuffer
// ============================================================================

/// Vulkan framebuffer implementation
pub struct VulkanFramebuffer {
    ctx: Arc<GpuContext>,
    pub(crate) framebuffer: vk::Framebuffer,
    width: u32,
    height: u32,
}

impl VulkanFramebuffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        framebuffer: vk::Framebuffer,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            ctx,
            framebuffer,
            width,
            height,
        }
    }
}

impl Framebuffer for VulkanFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for VulkanFramebuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}

// ============================================================================
// Resource layout
// ============================================================================

/// Vulkan resource layout implementation
///
/// Owns both the descriptor set layout and the pipeline layout built from it
/// (including the push-constant range). Pipelines and binding sets reference
/// these handles without owning them.
pub struct VulkanResourceLayout {
    ctx: Arc<GpuContext>,
    pub(crate) descriptor_set_layout: vk::DescriptorSetLayout,
    pub(crate) pipeline_layout: vk::PipelineLayout,
}

impl VulkanResourceLayout {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        descriptor_set_layout: vk::DescriptorSetLayout,
        pipeline_layout: vk::PipelineLayout,
    ) -> Self {
        Self {
            ctx,
            descriptor_set_layout,
            pipeline_layout,
        }
    }
}

impl ResourceLayout for VulkanResourceLayout {}

impl Drop for VulkanResourceLayout {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline_layout(self.pipeline_layout, None);
            self.ctx
                .device
                .destroy_descriptor_set_layout(self.descriptor_set_layout, None);
        }
    }
}

// ============================================================================
// Binding set
// ============================================================================

/// Vulkan binding set implementation
///
/// Owns a dedicated descriptor pool; the set is freed with the pool.
pub struct VulkanBindingSet {
    ctx: Arc<GpuContext>,
    pub(crate) descriptor_pool: vk::DescriptorPool,
    pub(crate) descriptor_set: vk::DescriptorSet,
}

impl VulkanBindingSet {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        descriptor_pool: vk::DescriptorPool,
        descriptor_set: vk::DescriptorSet,
    ) -> Self {
        Self {
            ctx,
            descriptor_pool,
            descriptor_set,
        }
    }
}

impl BindingSet for VulkanBindingSet {}

impl Drop for VulkanBindingSet {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_pool(self.descriptor_pool, None);
        }
    }
}
