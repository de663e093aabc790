/// GPU abstraction module - device, queue, command and resource traits
///
/// These traits are the contract this core requires from a backend. Concrete
/// implementations live in backend crates (e.g. the Vulkan plugin) and are
/// selected at runtime through the backend registry in `device.rs`.

// Module declarations
pub mod device;
pub mod queue;
pub mod command_list;
pub mod render_pass;
pub mod framebuffer;
pub mod texture;
pub mod buffer;
pub mod shader;
pub mod binding;
pub mod swapchain;

// Re-export everything
pub use device::*;
pub use queue::*;
pub use command_list::*;
pub use render_pass::*;
pub use framebuffer::*;
pub use texture::*;
pub use buffer::*;
pub use shader::*;
pub use binding::*;
pub use swapchain::*;

// Mock device for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
