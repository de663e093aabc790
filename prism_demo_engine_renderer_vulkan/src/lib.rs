/*!
# Prism Demo Engine - Vulkan Renderer Backend

Vulkan implementation of the Prism demo engine device traits.

This crate implements the prism_demo_engine GPU abstraction using the Ash
library for Vulkan bindings and gpu-allocator for memory management.

The backend is registered as a runtime strategy and selected by name
("vulkan") through the core's backend registry.
*/

use std::sync::Arc;

use prism_demo_engine::prism::gpu::GpuDevice;

// Vulkan implementation modules
mod context;
mod device;
mod command;
mod render_pass;
mod pipeline;
mod resources;
mod swapchain;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use device::VulkanDevice;
pub use swapchain::VulkanSwapchain;
pub use command::{VulkanCommandAllocator, VulkanCommandList, VulkanCommandQueue};

#[cfg(feature = "vulkan-validation")]
pub use debug::{get_validation_stats, print_validation_stats_report, ValidationStats};

/// Register the Vulkan backend in the core's backend registry
///
/// After this call, `Engine::create_device("vulkan", ...)` constructs a
/// [`VulkanDevice`].
pub fn register() {
    prism_demo_engine::prism::gpu::register_backend("vulkan", |window, config| {
        let device = VulkanDevice::new(window, config)?;
        Ok(Arc::new(device) as Arc<dyn GpuDevice>)
    });
}
