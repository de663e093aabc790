/// VulkanDevice - Vulkan implementation of the GpuDevice factory trait
///
/// Owns the instance, surface and physical device selection, and the shared
/// GpuContext (logical device + allocator + queue). Teardown precondition:
/// the application releases every GPU object (registry release_all plus
/// orchestrator drop, both behind queue-idle waits) before dropping the
/// device, so this struct holds the last context reference when it drops.

use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::os::raw::c_char;
use std::sync::{Arc, Mutex};

use ash::vk;
use gpu_allocator::vulkan::{
    Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc,
};
use gpu_allocator::MemoryLocation;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

use prism_demo_engine::prism::gpu::{
    BindingResource, BindingSet, BindingType, Buffer, BufferDesc, BufferUsage, CommandAllocator,
    CommandList, CommandQueue, DeviceConfig, Framebuffer, FramebufferDesc, GpuDevice, MemoryHeap,
    Pipeline, RenderPass, RenderPassDesc, ResourceLayout, ResourceLayoutDesc, Shader, ShaderDesc,
    Swapchain, Texture, TextureDesc, TextureFormat, TextureInfo, TextureUsage,
};
use prism_demo_engine::prism::{Error, Result};
use prism_demo_engine::{prism_error, prism_info};

use crate::command::{VulkanCommandAllocator, VulkanCommandList, VulkanCommandQueue};
use crate::context::GpuContext;
use crate::pipeline::VulkanPipeline;
use crate::render_pass::VulkanRenderPass;
use crate::resources::{
    vk_format, vk_sample_count, vk_shader_stages, VulkanBindingSet, VulkanBuffer, VulkanFramebuffer,
    VulkanResourceLayout, VulkanShader, VulkanTexture,
};
use crate::swapchain::VulkanSwapchain;

/// Vulkan device implementation
pub struct VulkanDevice {
    _entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,

    // ManuallyDrop so the context (and with it the logical device) is
    // destroyed in Drop before the instance
    ctx: ManuallyDrop<Arc<GpuContext>>,

    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanDevice {
    /// Create a new Vulkan device for the given window
    pub fn new(window: &Window, config: &DeviceConfig) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                Error::InitializationFailed(format!("Failed to load Vulkan: {}", e))
            })?;

            let enable_validation =
                cfg!(feature = "vulkan-validation") && config.enable_validation;

            // Instance
            let app_name = CString::new(config.app_name.as_str()).map_err(|e| {
                Error::InitializationFailed(format!("Invalid app name: {}", e))
            })?;

            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(
                    0,
                    config.app_version.0,
                    config.app_version.1,
                    config.app_version.2,
                ))
                .engine_name(c"Prism")
                .engine_version(vk::make_api_version(0, 1, 0, 0))
                .api_version(vk::API_VERSION_1_1);

            let display_handle = window
                .display_handle()
                .map_err(|e| Error::InitializationFailed(format!("No display handle: {}", e)))?
                .as_raw();
            let window_handle = window
                .window_handle()
                .map_err(|e| Error::InitializationFailed(format!("No window handle: {}", e)))?
                .as_raw();

            let mut extensions = ash_window::enumerate_required_extensions(display_handle)
                .map_err(|e| {
                    Error::InitializationFailed(format!("No surface extensions: {:?}", e))
                })?
                .to_vec();
            if enable_validation {
                extensions.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            let layers: Vec<*const c_char> = if enable_validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                Vec::new()
            };

            let instance_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_extension_names(&extensions)
                .enabled_layer_names(&layers);

            let instance = entry.create_instance(&instance_info, None).map_err(|e| {
                prism_error!("prism::vulkan", "Failed to create instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            #[cfg(feature = "vulkan-validation")]
            let debug_messenger = if enable_validation {
                Some(crate::debug::create_debug_messenger(&entry, &instance)?)
            } else {
                None
            };

            // Surface
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle,
                window_handle,
                None,
            )
            .map_err(|e| Error::InitializationFailed(format!("Failed to create surface: {:?}", e)))?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            // Physical device: prefer a discrete GPU that can present to the
            // surface from its graphics queue family
            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                Error::InitializationFailed(format!("Failed to enumerate devices: {:?}", e))
            })?;

            let mut selected: Option<(vk::PhysicalDevice, u32, bool)> = None;
            for physical_device in physical_devices {
                let Some(family) = Self::find_queue_family(
                    &instance,
                    &surface_loader,
                    physical_device,
                    surface,
                ) else {
                    continue;
                };

                let properties = instance.get_physical_device_properties(physical_device);
                let discrete =
                    properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU;

                match selected {
                    Some((_, _, true)) => {}
                    _ if discrete => selected = Some((physical_device, family, true)),
                    None => selected = Some((physical_device, family, false)),
                    _ => {}
                }
            }

            let (physical_device, graphics_queue_family, _) = selected.ok_or_else(|| {
                Error::InitializationFailed("No suitable Vulkan device found".to_string())
            })?;

            // Logical device + queue
            let priorities = [1.0f32];
            let queue_info = vk::DeviceQueueCreateInfo::default()
                .queue_family_index(graphics_queue_family)
                .queue_priorities(&priorities);

            let device_extensions = [ash::khr::swapchain::NAME.as_ptr()];
            let features = vk::PhysicalDeviceFeatures::default();

            let device_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(std::slice::from_ref(&queue_info))
                .enabled_extension_names(&device_extensions)
                .enabled_features(&features);

            let device = instance
                .create_device(physical_device, &device_info, None)
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(graphics_queue_family, 0);

            // Allocator
            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            // Internal transfer pool
            let transfer_pool = device
                .create_command_pool(
                    &vk::CommandPoolCreateInfo::default()
                        .queue_family_index(graphics_queue_family)
                        .flags(vk::CommandPoolCreateFlags::TRANSIENT),
                    None,
                )
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create transfer pool: {:?}", e))
                })?;

            // Default linear sampler shared by all binding sets
            let default_sampler = device
                .create_sampler(
                    &vk::SamplerCreateInfo::default()
                        .mag_filter(vk::Filter::LINEAR)
                        .min_filter(vk::Filter::LINEAR)
                        .address_mode_u(vk::SamplerAddressMode::REPEAT)
                        .address_mode_v(vk::SamplerAddressMode::REPEAT)
                        .address_mode_w(vk::SamplerAddressMode::REPEAT),
                    None,
                )
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create sampler: {:?}", e))
                })?;

            let ctx = Arc::new(GpuContext {
                device,
                allocator: Mutex::new(ManuallyDrop::new(allocator)),
                graphics_queue,
                graphics_queue_family,
                transfer_pool,
                default_sampler,
            });

            prism_info!("prism::vulkan", "Vulkan device created");

            Ok(Self {
                _entry: entry,
                instance,
                physical_device,
                surface,
                surface_loader,
                ctx: ManuallyDrop::new(ctx),
                #[cfg(feature = "vulkan-validation")]
                debug_messenger,
            })
        }
    }

    fn find_queue_family(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Option<u32> {
        unsafe {
            let families = instance.get_physical_device_queue_family_properties(physical_device);
            for (index, properties) in families.iter().enumerate() {
                if !properties.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                    continue;
                }
                let present = surface_loader
                    .get_physical_device_surface_support(physical_device, index as u32, surface)
                    .unwrap_or(false);
                if present {
                    return Some(index as u32);
                }
            }
            None
        }
    }

    /// Record and synchronously execute one-time transfer commands
    fn one_time_commands<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let ctx = &**self.ctx;
        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(ctx.transfer_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let buffers = ctx.device.allocate_command_buffers(&allocate_info).map_err(|e| {
                Error::BackendError(format!("Failed to allocate transfer buffer: {:?}", e))
            })?;
            let cmd = buffers[0];

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            ctx.device.begin_command_buffer(cmd, &begin_info).map_err(|e| {
                Error::BackendError(format!("Failed to begin transfer: {:?}", e))
            })?;

            record(&ctx.device, cmd);

            ctx.device.end_command_buffer(cmd).map_err(|e| {
                Error::BackendError(format!("Failed to end transfer: {:?}", e))
            })?;

            let command_buffers = [cmd];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            ctx.device
                .queue_submit(ctx.graphics_queue, &[submit_info], vk::Fence::null())
                .map_err(|e| Error::BackendError(format!("Transfer submit failed: {:?}", e)))?;
            ctx.device
                .queue_wait_idle(ctx.graphics_queue)
                .map_err(|e| Error::BackendError(format!("Transfer wait failed: {:?}", e)))?;

            ctx.device.free_command_buffers(ctx.transfer_pool, &command_buffers);
            Ok(())
        }
    }

    /// Upload pixel data into a freshly created image and leave it in
    /// shader-read layout
    fn upload_texture_data(&self, image: vk::Image, width: u32, height: u32, data: &[u8]) -> Result<()> {
        let ctx = Arc::clone(&self.ctx);

        let staging = VulkanBuffer::new(
            Arc::clone(&ctx),
            data.len() as u64,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryHeap::Upload,
        )?;
        staging.update(0, data)?;

        let staging_buffer = staging.buffer;
        self.one_time_commands(|device, cmd| unsafe {
            let range = vk::ImageSubresourceRange::default()
                .aspect_mask(vk::ImageAspectFlags::COLOR)
                .base_mip_level(0)
                .level_count(1)
                .base_array_layer(0)
                .layer_count(1);

            let to_transfer = vk::ImageMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::empty())
                .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .old_layout(vk::ImageLayout::UNDEFINED)
                .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(range);
            device.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_transfer],
            );

            let region = vk::BufferImageCopy::default()
                .buffer_offset(0)
                .image_subresource(
                    vk::ImageSubresourceLayers::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .mip_level(0)
                        .base_array_layer(0)
                        .layer_count(1),
                )
                .image_extent(vk::Extent3D {
                    width,
                    height,
                    depth: 1,
                });
            device.cmd_copy_buffer_to_image(
                cmd,
                staging_buffer,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            let to_sampled = vk::ImageMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .dst_access_mask(vk::AccessFlags::SHADER_READ)
                .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(range);
            device.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_sampled],
            );
        })
    }
}

impl GpuDevice for VulkanDevice {
    fn create_command_allocator(&self) -> Result<Box<dyn CommandAllocator>> {
        Ok(Box::new(VulkanCommandAllocator::new(Arc::clone(&self.ctx))?))
    }

    fn create_command_queue(&self) -> Result<Arc<dyn CommandQueue>> {
        Ok(Arc::new(VulkanCommandQueue::new(Arc::clone(&self.ctx))))
    }

    fn create_command_list(
        &self,
        allocator: &dyn CommandAllocator,
    ) -> Result<Box<dyn CommandList>> {
        let vk_allocator = unsafe {
            let ptr = allocator as *const dyn CommandAllocator as *const VulkanCommandAllocator;
            &*ptr
        };
        Ok(Box::new(VulkanCommandList::new(
            Arc::clone(&self.ctx),
            vk_allocator,
        )?))
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>> {
        let usage = match desc.usage {
            BufferUsage::Vertex => {
                vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
            }
            BufferUsage::Index => {
                vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
            }
            BufferUsage::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
        };

        Ok(Arc::new(VulkanBuffer::new(
            Arc::clone(&self.ctx),
            desc.size,
            usage,
            desc.heap,
        )?))
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        let ctx = Arc::clone(&self.ctx);
        let format = vk_format(desc.format);
        let is_depth = desc.format.is_depth();

        let usage = match desc.usage {
            TextureUsage::Sampled => {
                vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST
            }
            // Render targets double as resolve sources
            TextureUsage::RenderTarget => {
                vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC
            }
            TextureUsage::SampledAndRenderTarget => {
                vk::ImageUsageFlags::SAMPLED
                    | vk::ImageUsageFlags::COLOR_ATTACHMENT
                    | vk::ImageUsageFlags::TRANSFER_SRC
            }
            TextureUsage::DepthStencil => vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
        };

        unsafe {
            let image_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: desc.width,
                    height: desc.height,
                    depth: 1,
                })
                .mip_levels(1)
                .array_layers(1)
                .samples(vk_sample_count(desc.sample_count))
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = ctx.device.create_image(&image_info, None).map_err(|e| {
                prism_error!("prism::vulkan", "Failed to create image: {:?}", e);
                Error::ResourceCreation(format!("Failed to create image: {:?}", e))
            })?;

            let requirements = ctx.device.get_image_memory_requirements(image);
            let allocation: Allocation = ctx
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("Allocator lock poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "texture",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|e| {
                    ctx.device.destroy_image(image, None);
                    Error::ResourceCreation(format!("Failed to allocate image memory: {:?}", e))
                })?;

            ctx.device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    Error::ResourceCreation(format!("Failed to bind image memory: {:?}", e))
                })?;

            let aspect = if is_depth {
                vk::ImageAspectFlags::DEPTH
            } else {
                vk::ImageAspectFlags::COLOR
            };

            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(aspect)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );

            let image_view = ctx.device.create_image_view(&view_info, None).map_err(|e| {
                Error::ResourceCreation(format!("Failed to create image view: {:?}", e))
            })?;

            if let Some(data) = &desc.data {
                self.upload_texture_data(image, desc.width, desc.height, data)?;
            }

            Ok(Arc::new(VulkanTexture::owned(
                ctx,
                image,
                image_view,
                allocation,
                TextureInfo {
                    width: desc.width,
                    height: desc.height,
                    format: desc.format,
                    usage: desc.usage,
                    sample_count: desc.sample_count,
                },
            )))
        }
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        let ctx = Arc::clone(&self.ctx);

        unsafe {
            let vk_render_pass = {
                let ptr =
                    desc.render_pass.as_ref() as *const dyn RenderPass as *const VulkanRenderPass;
                &*ptr
            };

            let mut attachments: Vec<vk::ImageView> = Vec::new();
            for texture in &desc.color_attachments {
                let ptr = texture.as_ref() as *const dyn Texture as *const VulkanTexture;
                attachments.push((*ptr).image_view);
            }
            if let Some(depth) = &desc.depth_attachment {
                let ptr = depth.as_ref() as *const dyn Texture as *const VulkanTexture;
                attachments.push((*ptr).image_view);
            }

            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(vk_render_pass.render_pass)
                .attachments(&attachments)
                .width(desc.width)
                .height(desc.height)
                .layers(1);

            let framebuffer = ctx.device.create_framebuffer(&create_info, None).map_err(|e| {
                Error::ResourceCreation(format!("Failed to create framebuffer: {:?}", e))
            })?;

            Ok(Arc::new(VulkanFramebuffer::new(
                ctx,
                framebuffer,
                desc.width,
                desc.height,
            )))
        }
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        Ok(Arc::new(VulkanRenderPass::new(Arc::clone(&self.ctx), desc)?))
    }

    fn create_resource_layout(&self, desc: &ResourceLayoutDesc) -> Result<Arc<dyn ResourceLayout>> {
        let ctx = Arc::clone(&self.ctx);

        unsafe {
            let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
                .elements
                .iter()
                .map(|element| {
                    vk::DescriptorSetLayoutBinding::default()
                        .binding(element.binding)
                        .descriptor_type(match element.binding_type {
                            BindingType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
                            BindingType::SampledTexture => {
                                vk::DescriptorType::COMBINED_IMAGE_SAMPLER
                            }
                        })
                        .descriptor_count(1)
                        .stage_flags(vk_shader_stages(element.stages))
                })
                .collect();

            let layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
            let descriptor_set_layout = ctx
                .device
                .create_descriptor_set_layout(&layout_info, None)
                .map_err(|e| {
                    Error::ResourceCreation(format!("Failed to create set layout: {:?}", e))
                })?;

            let push_constant_ranges: Vec<vk::PushConstantRange> = desc
                .push_constants
                .iter()
                .map(|range| {
                    vk::PushConstantRange::default()
                        .stage_flags(vk_shader_stages(range.stages))
                        .offset(range.offset)
                        .size(range.size)
                })
                .collect();

            let set_layouts = [descriptor_set_layout];
            let pipeline_layout_info = vk::PipelineLayoutCreateInfo::default()
                .set_layouts(&set_layouts)
                .push_constant_ranges(&push_constant_ranges);

            let pipeline_layout = ctx
                .device
                .create_pipeline_layout(&pipeline_layout_info, None)
                .map_err(|e| {
                    ctx.device.destroy_descriptor_set_layout(descriptor_set_layout, None);
                    Error::ResourceCreation(format!("Failed to create pipeline layout: {:?}", e))
                })?;

            Ok(Arc::new(VulkanResourceLayout::new(
                ctx,
                descriptor_set_layout,
                pipeline_layout,
            )))
        }
    }

    fn create_binding_set(
        &self,
        layout: &Arc<dyn ResourceLayout>,
        resources: &[BindingResource],
    ) -> Result<Arc<dyn BindingSet>> {
        let ctx = Arc::clone(&self.ctx);

        unsafe {
            let vk_layout = {
                let ptr = layout.as_ref() as *const dyn ResourceLayout as *const VulkanResourceLayout;
                &*ptr
            };

            let uniform_count = resources
                .iter()
                .filter(|r| matches!(r, BindingResource::UniformBuffer { .. }))
                .count() as u32;
            let sampled_count = resources
                .iter()
                .filter(|r| matches!(r, BindingResource::SampledTexture { .. }))
                .count() as u32;

            let mut pool_sizes = Vec::new();
            if uniform_count > 0 {
                pool_sizes.push(
                    vk::DescriptorPoolSize::default()
                        .ty(vk::DescriptorType::UNIFORM_BUFFER)
                        .descriptor_count(uniform_count),
                );
            }
            if sampled_count > 0 {
                pool_sizes.push(
                    vk::DescriptorPoolSize::default()
                        .ty(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                        .descriptor_count(sampled_count),
                );
            }

            let pool_info = vk::DescriptorPoolCreateInfo::default()
                .max_sets(1)
                .pool_sizes(&pool_sizes);
            let descriptor_pool = ctx.device.create_descriptor_pool(&pool_info, None).map_err(|e| {
                Error::ResourceCreation(format!("Failed to create descriptor pool: {:?}", e))
            })?;

            let set_layouts = [vk_layout.descriptor_set_layout];
            let allocate_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(descriptor_pool)
                .set_layouts(&set_layouts);
            let descriptor_sets =
                ctx.device.allocate_descriptor_sets(&allocate_info).map_err(|e| {
                    ctx.device.destroy_descriptor_pool(descriptor_pool, None);
                    Error::ResourceCreation(format!("Failed to allocate descriptor set: {:?}", e))
                })?;
            let descriptor_set = descriptor_sets[0];

            // Build all infos first so the write structs point at stable
            // memory
            let mut buffer_infos = Vec::new();
            let mut image_infos = Vec::new();
            for resource in resources {
                match resource {
                    BindingResource::UniformBuffer { buffer, .. } => {
                        let ptr = buffer.as_ref() as *const dyn Buffer as *const VulkanBuffer;
                        buffer_infos.push(
                            vk::DescriptorBufferInfo::default()
                                .buffer((*ptr).buffer)
                                .offset(0)
                                .range(vk::WHOLE_SIZE),
                        );
                    }
                    BindingResource::SampledTexture { texture, .. } => {
                        let ptr = texture.as_ref() as *const dyn Texture as *const VulkanTexture;
                        image_infos.push(
                            vk::DescriptorImageInfo::default()
                                .sampler(ctx.default_sampler)
                                .image_view((*ptr).image_view)
                                .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                        );
                    }
                }
            }

            let mut writes = Vec::new();
            let mut buffer_index = 0usize;
            let mut image_index = 0usize;
            for resource in resources {
                match resource {
                    BindingResource::UniformBuffer { binding, .. } => {
                        writes.push(
                            vk::WriteDescriptorSet::default()
                                .dst_set(descriptor_set)
                                .dst_binding(*binding)
                                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                                .buffer_info(std::slice::from_ref(&buffer_infos[buffer_index])),
                        );
                        buffer_index += 1;
                    }
                    BindingResource::SampledTexture { binding, .. } => {
                        writes.push(
                            vk::WriteDescriptorSet::default()
                                .dst_set(descriptor_set)
                                .dst_binding(*binding)
                                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                                .image_info(std::slice::from_ref(&image_infos[image_index])),
                        );
                        image_index += 1;
                    }
                }
            }

            ctx.device.update_descriptor_sets(&writes, &[]);

            Ok(Arc::new(VulkanBindingSet::new(ctx, descriptor_pool, descriptor_set)))
        }
    }

    fn create_shader(&self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        Ok(Arc::new(VulkanShader::new(Arc::clone(&self.ctx), &desc.bytecode)?))
    }

    fn create_pipeline(
        &self,
        desc: &prism_demo_engine::prism::pipeline::GraphicsPipelineDesc,
    ) -> Result<Arc<dyn Pipeline>> {
        Ok(Arc::new(VulkanPipeline::new(Arc::clone(&self.ctx), desc)?))
    }

    fn create_swapchain(
        &self,
        _window: &Window,
        format: TextureFormat,
        buffer_count: usize,
    ) -> Result<Box<dyn Swapchain>> {
        Ok(Box::new(VulkanSwapchain::new(
            Arc::clone(&self.ctx),
            &self.instance,
            self.surface,
            &self.surface_loader,
            self.physical_device,
            format,
            buffer_count,
        )?))
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            // Context first: destroys the logical device (after its own
            // wait-idle) while the instance is still alive
            ManuallyDrop::drop(&mut self.ctx);

            #[cfg(feature = "vulkan-validation")]
            if let Some((loader, messenger)) = self.debug_messenger.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.surface_loader.destroy_surface(self.surface, None);
            self.instance.destroy_instance(None);
        }
    }
}
