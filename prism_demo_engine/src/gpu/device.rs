/// GpuDevice trait - main factory interface, plus the runtime backend registry

use std::sync::{Arc, Mutex};
use std::collections::HashMap;
use winit::window::Window;

use crate::error::{Error, Result};
use crate::gpu::{
    BindingResource, BindingSet, Buffer, BufferDesc, CommandAllocator, CommandList, CommandQueue,
    Framebuffer, FramebufferDesc, RenderPass, RenderPassDesc, ResourceLayout, ResourceLayoutDesc,
    Shader, ShaderDesc, Swapchain, Texture, TextureDesc, TextureFormat,
};
use crate::pipeline::GraphicsPipelineDesc;

/// Pipeline object trait
///
/// The finalized, executable pipeline a `PipelineDescriptor` caches after
/// `update_state()`. Marker trait; backends wrap their native handle.
pub trait Pipeline: Send + Sync {}

/// Device configuration
///
/// Chosen once at startup; `frames_in_flight` sizes the frame resource ring
/// and the swapchain.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Number of frame resource slots
    pub frames_in_flight: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Prism Demo".to_string(),
            app_version: (1, 0, 0),
            frames_in_flight: 2,
        }
    }
}

/// Main device trait
///
/// This is the central factory interface for creating GPU resources.
/// Implemented by backend-specific devices (e.g., the Vulkan plugin).
/// Every create call that the backend rejects surfaces as
/// `Error::ResourceCreation` and aborts app start.
pub trait GpuDevice: Send + Sync {
    /// Create a command allocator
    fn create_command_allocator(&self) -> Result<Box<dyn CommandAllocator>>;

    /// Create the command queue
    fn create_command_queue(&self) -> Result<Arc<dyn CommandQueue>>;

    /// Create a command list recording into the given allocator
    fn create_command_list(
        &self,
        allocator: &dyn CommandAllocator,
    ) -> Result<Box<dyn CommandList>>;

    /// Create a buffer
    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a texture
    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a framebuffer
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Create a render pass
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    /// Create a resource layout
    fn create_resource_layout(&self, desc: &ResourceLayoutDesc) -> Result<Arc<dyn ResourceLayout>>;

    /// Create an immutable binding set over the given layout
    fn create_binding_set(
        &self,
        layout: &Arc<dyn ResourceLayout>,
        resources: &[BindingResource],
    ) -> Result<Arc<dyn BindingSet>>;

    /// Create a shader module from bytecode
    fn create_shader(&self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>>;

    /// Create a graphics pipeline from a finalized descriptor's sub-states
    ///
    /// Called exactly once per `PipelineDescriptor::update_state()`.
    fn create_pipeline(&self, desc: &GraphicsPipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Create a swapchain for window presentation
    fn create_swapchain(
        &self,
        window: &Window,
        format: TextureFormat,
        buffer_count: usize,
    ) -> Result<Box<dyn Swapchain>>;
}

// ============================================================================
// Backend registry - runtime strategy selection
// ============================================================================

/// Backend factory function type
type BackendFactory = Box<dyn Fn(&Window, &DeviceConfig) -> Result<Arc<dyn GpuDevice>> + Send + Sync>;

/// Registry of device backends
///
/// Backends are registered by name at startup (e.g. "vulkan") and one is
/// selected at runtime via configuration - there is no compile-time backend
/// switching.
pub struct BackendRegistry {
    backends: HashMap<&'static str, BackendFactory>,
}

impl BackendRegistry {
    fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Register a backend factory under a name
    pub fn register<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(&Window, &DeviceConfig) -> Result<Arc<dyn GpuDevice>> + Send + Sync + 'static,
    {
        self.backends.insert(name, Box::new(factory));
    }

    /// Names of all registered backends
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.keys().copied().collect()
    }

    /// Create a device using a registered backend
    pub fn create_device(
        &self,
        name: &str,
        window: &Window,
        config: &DeviceConfig,
    ) -> Result<Arc<dyn GpuDevice>> {
        self.backends
            .get(name)
            .ok_or_else(|| {
                Error::InitializationFailed(format!("Backend '{}' not registered", name))
            })?(window, config)
    }
}

static BACKEND_REGISTRY: Mutex<Option<BackendRegistry>> = Mutex::new(None);

/// Get the global backend registry
pub fn backend_registry() -> &'static Mutex<Option<BackendRegistry>> {
    // Initialize on first access
    let mut registry = BACKEND_REGISTRY.lock().unwrap();
    if registry.is_none() {
        *registry = Some(BackendRegistry::new());
    }
    drop(registry);
    &BACKEND_REGISTRY
}

/// Register a device backend in the global registry
pub fn register_backend<F>(name: &'static str, factory: F)
where
    F: Fn(&Window, &DeviceConfig) -> Result<Arc<dyn GpuDevice>> + Send + Sync + 'static,
{
    backend_registry()
        .lock()
        .unwrap()
        .as_mut()
        .unwrap()
        .register(name, factory);
}
