/// Frame resources module - the GPU object registry and the frame ring

// Module declarations
pub mod registry;
pub mod ring;
pub mod resource_helper;

// Re-export everything
pub use registry::*;
pub use ring::*;
pub use resource_helper::*;
