/// Vulkan swapchain implementation
///
/// Owns the presentable images (wrapped so each exposes its view and can be
/// the destination of a resolve). Present acquires the next image and queues
/// it; with the orchestrator's whole-queue barrier and FIFO presentation the
/// acquired index stays in lockstep with the frame ring, which is what the
/// per-slot framebuffers assume.

use std::sync::Arc;

use ash::vk;

use prism_demo_engine::prism::gpu::{
    SampleCount, Swapchain, Texture, TextureFormat, TextureInfo, TextureUsage,
};
use prism_demo_engine::prism::{Error, Result};
use prism_demo_engine::prism_error;

use crate::context::GpuContext;
use crate::resources::{vk_format, VulkanTexture};

/// Vulkan swapchain wrapper
pub struct VulkanSwapchain {
    ctx: Arc<GpuContext>,
    loader: ash::khr::swapchain::Device,
    pub(crate) swapchain: vk::SwapchainKHR,
    textures: Vec<Arc<dyn Texture>>,
    image_available: vk::Semaphore,
    width: u32,
    height: u32,
    format: TextureFormat,
}

impl VulkanSwapchain {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        instance: &ash::Instance,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        physical_device: vk::PhysicalDevice,
        format: TextureFormat,
        buffer_count: usize,
    ) -> Result<Self> {
        unsafe {
            let capabilities = surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(|e| {
                    Error::ResourceCreation(format!("Failed to query surface capabilities: {:?}", e))
                })?;

            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| {
                    Error::ResourceCreation(format!("Failed to query surface formats: {:?}", e))
                })?;

            let wanted = vk_format(format);
            let surface_format = formats
                .iter()
                .find(|f| f.format == wanted)
                .copied()
                .ok_or_else(|| {
                    prism_error!("prism::vulkan", "Surface does not support {:?}", format);
                    Error::ResourceCreation(format!("Surface does not support {:?}", format))
                })?;

            let extent = capabilities.current_extent;

            let min_images = (buffer_count as u32)
                .max(capabilities.min_image_count)
                .min(if capabilities.max_image_count == 0 {
                    u32::MAX
                } else {
                    capabilities.max_image_count
                });

            let create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(surface)
                .min_image_count(min_images)
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(
                    vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST,
                )
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(vk::PresentModeKHR::FIFO)
                .clipped(true);

            let loader = ash::khr::swapchain::Device::new(instance, &ctx.device);
            let swapchain = loader.create_swapchain(&create_info, None).map_err(|e| {
                Error::ResourceCreation(format!("Failed to create swapchain: {:?}", e))
            })?;

            let images = loader.get_swapchain_images(swapchain).map_err(|e| {
                Error::ResourceCreation(format!("Failed to get swapchain images: {:?}", e))
            })?;

            let mut textures: Vec<Arc<dyn Texture>> = Vec::with_capacity(images.len());
            for image in &images {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(*image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(surface_format.format)
                    .subresource_range(
                        vk::ImageSubresourceRange::default()
                            .aspect_mask(vk::ImageAspectFlags::COLOR)
                            .base_mip_level(0)
                            .level_count(1)
                            .base_array_layer(0)
                            .layer_count(1),
                    );

                let view = ctx.device.create_image_view(&view_info, None).map_err(|e| {
                    Error::ResourceCreation(format!("Failed to create swapchain view: {:?}", e))
                })?;

                textures.push(Arc::new(VulkanTexture::from_swapchain_image(
                    Arc::clone(&ctx),
                    *image,
                    view,
                    TextureInfo {
                        width: extent.width,
                        height: extent.height,
                        format,
                        usage: TextureUsage::RenderTarget,
                        sample_count: SampleCount::S1,
                    },
                )));
            }

            let image_available = ctx
                .device
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                .map_err(|e| {
                    Error::ResourceCreation(format!("Failed to create semaphore: {:?}", e))
                })?;

            Ok(Self {
                ctx,
                loader,
                swapchain,
                textures,
                image_available,
                width: extent.width,
                height: extent.height,
                format,
            })
        }
    }
}

impl Swapchain for VulkanSwapchain {
    fn buffer(&self, index: usize) -> Arc<dyn Texture> {
        Arc::clone(&self.textures[index])
    }

    fn buffer_count(&self) -> usize {
        self.textures.len()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn present(&mut self) -> Result<()> {
        unsafe {
            let (index, _suboptimal) = self
                .loader
                .acquire_next_image(
                    self.swapchain,
                    u64::MAX,
                    self.image_available,
                    vk::Fence::null(),
                )
                .map_err(|e| match e {
                    vk::Result::ERROR_DEVICE_LOST => {
                        Error::DeviceLost("Device lost acquiring swapchain image".to_string())
                    }
                    other => Error::PresentFailure(format!("Failed to acquire image: {:?}", other)),
                })?;

            let wait_semaphores = [self.image_available];
            let swapchains = [self.swapchain];
            let indices = [index];

            let present_info = vk::PresentInfoKHR::default()
                .wait_semaphores(&wait_semaphores)
                .swapchains(&swapchains)
                .image_indices(&indices);

            self.loader
                .queue_present(self.ctx.graphics_queue, &present_info)
                .map_err(|e| match e {
                    vk::Result::ERROR_DEVICE_LOST => {
                        Error::DeviceLost("Device lost during present".to_string())
                    }
                    other => Error::PresentFailure(format!("Present failed: {:?}", other)),
                })?;

            Ok(())
        }
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            // Texture wrappers (and their views) drop with the Vec; the
            // images themselves belong to the swapchain
            let _ = self.ctx.device.device_wait_idle();
            self.ctx.device.destroy_semaphore(self.image_available, None);
            self.textures.clear();
            self.loader.destroy_swapchain(self.swapchain, None);
        }
    }
}
