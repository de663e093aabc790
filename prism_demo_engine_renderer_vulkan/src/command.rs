/// Vulkan command objects - allocator, queue, and command list
///
/// The command list records into a buffer allocated from the allocator's
/// pool; the allocator's per-frame reset recycles that storage after the
/// orchestrator's queue-idle wait proves nothing in flight references it.

use std::sync::Arc;

use ash::vk;

use prism_demo_engine::prism::gpu::{
    BindingSet, Buffer, ClearValue, CommandAllocator, CommandList, CommandQueue, Framebuffer,
    IndexType, Pipeline, Rect2D, RenderPass, ShaderStageFlags, Texture, Viewport,
};
use prism_demo_engine::prism::{Error, Result};

use crate::context::GpuContext;
use crate::pipeline::VulkanPipeline;
use crate::render_pass::VulkanRenderPass;
use crate::resources::{vk_shader_stages, VulkanBindingSet, VulkanBuffer, VulkanFramebuffer, VulkanTexture};

// ============================================================================
// Command allocator
// ============================================================================

/// Vulkan command allocator (a command pool)
pub struct VulkanCommandAllocator {
    ctx: Arc<GpuContext>,
    pub(crate) pool: vk::CommandPool,
}

impl VulkanCommandAllocator {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let pool = ctx.device.create_command_pool(&create_info, None).map_err(|e| {
                Error::ResourceCreation(format!("Failed to create command pool: {:?}", e))
            })?;

            Ok(Self { ctx, pool })
        }
    }
}

impl CommandAllocator for VulkanCommandAllocator {
    fn reset(&mut self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .reset_command_pool(self.pool, vk::CommandPoolResetFlags::empty())
                .map_err(|e| Error::BackendError(format!("Failed to reset command pool: {:?}", e)))
        }
    }
}

impl Drop for VulkanCommandAllocator {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_command_pool(self.pool, None);
        }
    }
}

// ============================================================================
// Command queue
// ============================================================================

/// Vulkan command queue
pub struct VulkanCommandQueue {
    ctx: Arc<GpuContext>,
}

impl VulkanCommandQueue {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx }
    }
}

impl CommandQueue for VulkanCommandQueue {
    fn execute(&self, lists: &[&dyn CommandList]) -> Result<()> {
        let command_buffers: Vec<vk::CommandBuffer> = lists
            .iter()
            .map(|list| unsafe {
                let vk_list = *list as *const dyn CommandList as *const VulkanCommandList;
                (*vk_list).command_buffer
            })
            .collect();

        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

        unsafe {
            self.ctx
                .device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], vk::Fence::null())
                .map_err(|e| match e {
                    vk::Result::ERROR_DEVICE_LOST => {
                        Error::DeviceLost("Device lost during submit".to_string())
                    }
                    other => Error::BackendError(format!("Queue submit failed: {:?}", other)),
                })
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .queue_wait_idle(self.ctx.graphics_queue)
                .map_err(|e| match e {
                    vk::Result::ERROR_DEVICE_LOST => {
                        Error::DeviceLost("Device lost while waiting for queue idle".to_string())
                    }
                    other => Error::BackendError(format!("Queue wait idle failed: {:?}", other)),
                })
        }
    }
}

// ============================================================================
// Command list
// ============================================================================

/// Vulkan command list
///
/// Records into a primary command buffer allocated from the allocator's
/// pool. Recording-state guards catch out-of-order use before Vulkan does.
pub struct VulkanCommandList {
    ctx: Arc<GpuContext>,
    pub(crate) command_buffer: vk::CommandBuffer,
    pool: vk::CommandPool,
    is_recording: bool,
    in_render_pass: bool,
    /// Layout of the currently bound pipeline, required for push constants
    bound_pipeline_layout: Option<vk::PipelineLayout>,
}

impl VulkanCommandList {
    pub(crate) fn new(ctx: Arc<GpuContext>, allocator: &VulkanCommandAllocator) -> Result<Self> {
        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(allocator.pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = ctx
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| {
                    Error::ResourceCreation(format!("Failed to allocate command buffer: {:?}", e))
                })?;

            Ok(Self {
                ctx,
                command_buffer: command_buffers[0],
                pool: allocator.pool,
                is_recording: false,
                in_render_pass: false,
                bound_pipeline_layout: None,
            })
        }
    }

    fn ensure_recording(&self) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }
        Ok(())
    }

    /// Transition an image between layouts with a full-image barrier
    fn image_barrier(
        &self,
        image: vk::Image,
        old_layout: vk::ImageLayout,
        new_layout: vk::ImageLayout,
    ) {
        let barrier = vk::ImageMemoryBarrier::default()
            .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
            .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
            .old_layout(old_layout)
            .new_layout(new_layout)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1),
            );

        unsafe {
            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }
    }
}

impl CommandList for VulkanCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError("Command list already recording".to_string()));
        }

        unsafe {
            self.ctx
                .device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| {
                    Error::BackendError(format!("Failed to reset command buffer: {:?}", e))
                })?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.ctx
                .device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to begin command buffer: {:?}", e))
                })?;

            self.is_recording = true;
            self.in_render_pass = false;
            self.bound_pipeline_layout = None;

            Ok(())
        }
    }

    fn end(&mut self) -> Result<()> {
        self.ensure_recording()?;

        if self.in_render_pass {
            return Err(Error::BackendError(
                "Render pass not ended before ending command list".to_string(),
            ));
        }

        unsafe {
            self.ctx
                .device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| Error::BackendError(format!("Failed to end command buffer: {:?}", e)))?;

            self.is_recording = false;
            Ok(())
        }
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        self.ensure_recording()?;

        if self.in_render_pass {
            return Err(Error::BackendError("Already inside a render pass".to_string()));
        }

        unsafe {
            let vk_render_pass = {
                let ptr = render_pass.as_ref() as *const dyn RenderPass as *const VulkanRenderPass;
                &*ptr
            };
            let vk_framebuffer = {
                let ptr = framebuffer.as_ref() as *const dyn Framebuffer as *const VulkanFramebuffer;
                &*ptr
            };

            let vk_clear_values: Vec<vk::ClearValue> = clear_values
                .iter()
                .map(|cv| match cv {
                    ClearValue::Color(color) => vk::ClearValue {
                        color: vk::ClearColorValue { float32: *color },
                    },
                    ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
                        depth_stencil: vk::ClearDepthStencilValue {
                            depth: *depth,
                            stencil: *stencil,
                        },
                    },
                })
                .collect();

            let begin_info = vk::RenderPassBeginInfo::default()
                .render_pass(vk_render_pass.render_pass)
                .framebuffer(vk_framebuffer.framebuffer)
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: vk::Extent2D {
                        width: framebuffer.width(),
                        height: framebuffer.height(),
                    },
                })
                .clear_values(&vk_clear_values);

            self.ctx.device.cmd_begin_render_pass(
                self.command_buffer,
                &begin_info,
                vk::SubpassContents::INLINE,
            );

            self.in_render_pass = true;
            Ok(())
        }
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.ensure_recording()?;

        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }

        unsafe {
            self.ctx.device.cmd_end_render_pass(self.command_buffer);
            self.in_render_pass = false;
            Ok(())
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            let vk_viewport = vk::Viewport::default()
                .x(viewport.x)
                .y(viewport.y)
                .width(viewport.width)
                .height(viewport.height)
                .min_depth(viewport.min_depth)
                .max_depth(viewport.max_depth);

            self.ctx
                .device
                .cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]);
            Ok(())
        }
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            let vk_scissor = vk::Rect2D {
                offset: vk::Offset2D {
                    x: scissor.x,
                    y: scissor.y,
                },
                extent: vk::Extent2D {
                    width: scissor.width,
                    height: scissor.height,
                },
            };

            self.ctx
                .device
                .cmd_set_scissor(self.command_buffer, 0, &[vk_scissor]);
            Ok(())
        }
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            let vk_pipeline = {
                let ptr = pipeline.as_ref() as *const dyn Pipeline as *const VulkanPipeline;
                &*ptr
            };

            self.ctx.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline,
            );

            self.bound_pipeline_layout = Some(vk_pipeline.pipeline_layout);
            Ok(())
        }
    }

    fn bind_binding_set(
        &mut self,
        pipeline: &Arc<dyn Pipeline>,
        binding_set: &Arc<dyn BindingSet>,
    ) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            let vk_pipeline = {
                let ptr = pipeline.as_ref() as *const dyn Pipeline as *const VulkanPipeline;
                &*ptr
            };
            let vk_binding_set = {
                let ptr = binding_set.as_ref() as *const dyn BindingSet as *const VulkanBindingSet;
                &*ptr
            };

            self.ctx.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline_layout,
                0,
                &[vk_binding_set.descriptor_set],
                &[],
            );
            Ok(())
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            let vk_buffer = {
                let ptr = buffer.as_ref() as *const dyn Buffer as *const VulkanBuffer;
                &*ptr
            };

            self.ctx.device.cmd_bind_vertex_buffers(
                self.command_buffer,
                0,
                &[vk_buffer.buffer],
                &[offset],
            );
            Ok(())
        }
    }

    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            let vk_buffer = {
                let ptr = buffer.as_ref() as *const dyn Buffer as *const VulkanBuffer;
                &*ptr
            };

            self.ctx.device.cmd_bind_index_buffer(
                self.command_buffer,
                vk_buffer.buffer,
                offset,
                match index_type {
                    IndexType::U16 => vk::IndexType::UINT16,
                    IndexType::U32 => vk::IndexType::UINT32,
                },
            );
            Ok(())
        }
    }

    fn push_constants(&mut self, stages: ShaderStageFlags, offset: u32, data: &[u8]) -> Result<()> {
        self.ensure_recording()?;

        // The currently bound pipeline's layout is required; binding order is
        // guaranteed by the orchestrator (pipeline first).
        unsafe {
            let layout = self.bound_pipeline_layout.ok_or_else(|| {
                Error::BackendError("No pipeline bound for push constants".to_string())
            })?;

            self.ctx.device.cmd_push_constants(
                self.command_buffer,
                layout,
                vk_shader_stages(stages),
                offset,
                data,
            );
            Ok(())
        }
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.ensure_recording()?;

        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }

        unsafe {
            self.ctx
                .device
                .cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
            Ok(())
        }
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.ensure_recording()?;

        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }

        unsafe {
            self.ctx.device.cmd_draw_indexed(
                self.command_buffer,
                index_count,
                1,
                first_index,
                vertex_offset,
                0,
            );
            Ok(())
        }
    }

    fn resolve_texture(
        &mut self,
        source: &Arc<dyn Texture>,
        destination: &Arc<dyn Texture>,
    ) -> Result<()> {
        self.ensure_recording()?;

        if self.in_render_pass {
            return Err(Error::BackendError(
                "resolve_texture must be recorded outside a render pass".to_string(),
            ));
        }

        unsafe {
            let src = {
                let ptr = source.as_ref() as *const dyn Texture as *const VulkanTexture;
                &*ptr
            };
            let dst = {
                let ptr = destination.as_ref() as *const dyn Texture as *const VulkanTexture;
                &*ptr
            };

            let src_info = source.info();
            let dst_info = destination.info();

            // The offscreen pass left the source in GENERAL; move both images
            // into transfer layouts, resolve, and leave both in GENERAL so
            // the composite pass and a future read agree on the layout.
            self.image_barrier(
                src.image,
                vk::ImageLayout::GENERAL,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            );
            self.image_barrier(
                dst.image,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            );

            let subresource = vk::ImageSubresourceLayers::default()
                .aspect_mask(vk::ImageAspectFlags::COLOR)
                .mip_level(0)
                .base_array_layer(0)
                .layer_count(1);

            let region = vk::ImageResolve::default()
                .src_subresource(subresource)
                .dst_subresource(subresource)
                .extent(vk::Extent3D {
                    width: dst_info.width.min(src_info.width),
                    height: dst_info.height.min(src_info.height),
                    depth: 1,
                });

            self.ctx.device.cmd_resolve_image(
                self.command_buffer,
                src.image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                dst.image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            self.image_barrier(
                src.image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                vk::ImageLayout::GENERAL,
            );
            self.image_barrier(
                dst.image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::ImageLayout::GENERAL,
            );

            Ok(())
        }
    }
}

impl Drop for VulkanCommandList {
    fn drop(&mut self) {
        unsafe {
            self.ctx
                .device
                .free_command_buffers(self.pool, &[self.command_buffer]);
        }
    }
}
