/// GpuContext - shared Vulkan device context
///
/// One context is created per VulkanDevice and shared (Arc) with every
/// resource wrapper, so resources can record transfers and clean themselves
/// up on drop. The context drops last: it destroys the logical device only
/// after every resource holding it is gone, and the engine-level teardown
/// wait-idle barrier guarantees the GPU is quiet by then.

use std::mem::ManuallyDrop;
use std::sync::Mutex;

use ash::vk;
use gpu_allocator::vulkan::Allocator;

/// Shared Vulkan device context
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,
    /// GPU memory allocator (ManuallyDrop so it is freed before the device)
    pub allocator: Mutex<ManuallyDrop<Allocator>>,
    /// Graphics + present queue
    pub graphics_queue: vk::Queue,
    /// Graphics queue family index
    pub graphics_queue_family: u32,
    /// Command pool for internal one-time transfer commands
    pub transfer_pool: vk::CommandPool,
    /// Default linear sampler used by binding sets
    pub default_sampler: vk::Sampler,
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            // Last-resort barrier; normal teardown has already waited idle
            let _ = self.device.device_wait_idle();

            self.device.destroy_sampler(self.default_sampler, None);
            self.device.destroy_command_pool(self.transfer_pool, None);

            if let Ok(mut allocator) = self.allocator.lock() {
                ManuallyDrop::drop(&mut allocator);
            }

            self.device.destroy_device(None);
        }
    }
}
