/// Mock GPU device for unit tests (no GPU required)
///
/// Every mock object shares one `MockStats`, which counts the calls the
/// frame-cycle properties are stated in terms of (queue idle waits, allocator
/// resets, presents) and records the command stream so tests can assert
/// ordering, e.g. that the composite pass always follows its resolve.

use std::sync::{Arc, Mutex};
use winit::window::Window;

use crate::error::{Error, Result};
use crate::gpu::{
    BindingResource, BindingSet, Buffer, BufferDesc, ClearValue, CommandAllocator, CommandList,
    CommandQueue, Framebuffer, FramebufferDesc, GpuDevice, IndexType, Pipeline, Rect2D,
    RenderPass, RenderPassDesc, ResourceLayout, ResourceLayoutDesc, SampleCount, Shader,
    ShaderDesc, ShaderStageFlags, Swapchain, Texture, TextureDesc, TextureFormat, TextureInfo,
    TextureUsage, Viewport,
};
use crate::pipeline::GraphicsPipelineDesc;

// ============================================================================
// Shared stats
// ============================================================================

/// Counters and recorded command stream shared by every mock object
#[derive(Debug, Default)]
pub struct MockStats {
    /// CommandQueue::wait_idle invocations
    pub wait_idle_calls: usize,
    /// CommandAllocator::reset invocations
    pub allocator_resets: usize,
    /// CommandQueue::execute invocations
    pub executes: usize,
    /// Swapchain::present invocations
    pub presents: usize,
    /// GpuDevice::create_pipeline invocations
    pub created_pipelines: usize,
    /// Every command recorded into any mock command list, in order
    pub commands: Vec<String>,
}

/// Shared handle to mock stats
pub type SharedStats = Arc<Mutex<MockStats>>;

/// Fresh stats for one test
pub fn shared_stats() -> SharedStats {
    Arc::new(Mutex::new(MockStats::default()))
}

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
}

impl MockTexture {
    pub fn new(width: u32, height: u32, format: TextureFormat, sample_count: SampleCount) -> Self {
        Self {
            info: TextureInfo {
                width,
                height,
                format,
                usage: TextureUsage::RenderTarget,
                sample_count,
            },
        }
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub contents: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            contents: Mutex::new(vec![0; size as usize]),
        }
    }
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut contents = self.contents.lock().unwrap();
        let start = offset as usize;
        let end = start + data.len();
        if end > contents.len() {
            return Err(Error::BackendError(format!(
                "buffer update of {} bytes at offset {} exceeds size {}",
                data.len(),
                offset,
                self.size
            )));
        }
        contents[start..end].copy_from_slice(data);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug)]
pub struct MockShader;

impl Shader for MockShader {}

#[derive(Debug)]
pub struct MockRenderPass {
    pub desc: RenderPassDesc,
}

impl RenderPass for MockRenderPass {}

#[derive(Debug)]
pub struct MockFramebuffer {
    pub width: u32,
    pub height: u32,
}

impl Framebuffer for MockFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[derive(Debug)]
pub struct MockResourceLayout {
    pub desc: ResourceLayoutDesc,
}

impl ResourceLayout for MockResourceLayout {}

#[derive(Debug)]
pub struct MockBindingSet;

impl BindingSet for MockBindingSet {}

#[derive(Debug)]
pub struct MockPipeline;

impl Pipeline for MockPipeline {}

// ============================================================================
// Mock command objects
// ============================================================================

pub struct MockCommandQueue {
    pub stats: SharedStats,
}

impl CommandQueue for MockCommandQueue {
    fn execute(&self, _lists: &[&dyn CommandList]) -> Result<()> {
        self.stats.lock().unwrap().executes += 1;
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.stats.lock().unwrap().wait_idle_calls += 1;
        Ok(())
    }
}

pub struct MockCommandAllocator {
    pub stats: SharedStats,
}

impl CommandAllocator for MockCommandAllocator {
    fn reset(&mut self) -> Result<()> {
        self.stats.lock().unwrap().allocator_resets += 1;
        Ok(())
    }
}

pub struct MockCommandList {
    pub stats: SharedStats,
}

impl MockCommandList {
    fn record(&self, command: &str) {
        self.stats.lock().unwrap().commands.push(command.to_string());
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.record("begin");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.record("end");
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        _render_pass: &Arc<dyn RenderPass>,
        _framebuffer: &Arc<dyn Framebuffer>,
        _clear_values: &[ClearValue],
    ) -> Result<()> {
        self.record("begin_render_pass");
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.record("end_render_pass");
        Ok(())
    }

    fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
        self.record("set_viewport");
        Ok(())
    }

    fn set_scissor(&mut self, _scissor: Rect2D) -> Result<()> {
        self.record("set_scissor");
        Ok(())
    }

    fn bind_pipeline(&mut self, _pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.record("bind_pipeline");
        Ok(())
    }

    fn bind_binding_set(
        &mut self,
        _pipeline: &Arc<dyn Pipeline>,
        _binding_set: &Arc<dyn BindingSet>,
    ) -> Result<()> {
        self.record("bind_binding_set");
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, _buffer: &Arc<dyn Buffer>, _offset: u64) -> Result<()> {
        self.record("bind_vertex_buffer");
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        _buffer: &Arc<dyn Buffer>,
        _offset: u64,
        _index_type: IndexType,
    ) -> Result<()> {
        self.record("bind_index_buffer");
        Ok(())
    }

    fn push_constants(&mut self, _stages: ShaderStageFlags, _offset: u32, _data: &[u8]) -> Result<()> {
        self.record("push_constants");
        Ok(())
    }

    fn draw(&mut self, _vertex_count: u32, _first_vertex: u32) -> Result<()> {
        self.record("draw");
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        _index_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
    ) -> Result<()> {
        self.record("draw_indexed");
        Ok(())
    }

    fn resolve_texture(
        &mut self,
        _source: &Arc<dyn Texture>,
        _destination: &Arc<dyn Texture>,
    ) -> Result<()> {
        self.record("resolve_texture");
        Ok(())
    }
}

// ============================================================================
// Mock swapchain
// ============================================================================

pub struct MockSwapchain {
    pub stats: SharedStats,
    buffers: Vec<Arc<dyn Texture>>,
    width: u32,
    height: u32,
    format: TextureFormat,
    /// When true, every present fails; used to exercise the fatal path
    pub fail_present: bool,
}

impl MockSwapchain {
    pub fn new(
        stats: SharedStats,
        width: u32,
        height: u32,
        format: TextureFormat,
        buffer_count: usize,
    ) -> Self {
        let buffers = (0..buffer_count)
            .map(|_| {
                Arc::new(MockTexture::new(width, height, format, SampleCount::S1))
                    as Arc<dyn Texture>
            })
            .collect();
        Self {
            stats,
            buffers,
            width,
            height,
            format,
            fail_present: false,
        }
    }
}

impl Swapchain for MockSwapchain {
    fn buffer(&self, index: usize) -> Arc<dyn Texture> {
        Arc::clone(&self.buffers[index])
    }

    fn buffer_count(&self) -> usize {
        self.buffers.len()
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
        if self.fail_present {
            return Err(Error::PresentFailure("mock present failure".to_string()));
        }
        self.stats.lock().unwrap().presents += 1;
        Ok(())
    }
}

// ============================================================================
// Mock device
// ============================================================================

/// Mock device: every factory method succeeds and returns a mock object
pub struct MockDevice {
    pub stats: SharedStats,
}

impl MockDevice {
    pub fn new(stats: SharedStats) -> Self {
        Self { stats }
    }
}

impl GpuDevice for MockDevice {
    fn create_command_allocator(&self) -> Result<Box<dyn CommandAllocator>> {
        Ok(Box::new(MockCommandAllocator {
            stats: Arc::clone(&self.stats),
        }))
    }

    fn create_command_queue(&self) -> Result<Arc<dyn CommandQueue>> {
        Ok(Arc::new(MockCommandQueue {
            stats: Arc::clone(&self.stats),
        }))
    }

    fn create_command_list(
        &self,
        _allocator: &dyn CommandAllocator,
    ) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList {
            stats: Arc::clone(&self.stats),
        }))
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>> {
        Ok(Arc::new(MockBuffer::new(desc.size)))
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        Ok(Arc::new(MockTexture::new(
            desc.width,
            desc.height,
            desc.format,
            desc.sample_count,
        )))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        Ok(Arc::new(MockFramebuffer {
            width: desc.width,
            height: desc.height,
        }))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        Ok(Arc::new(MockRenderPass { desc: desc.clone() }))
    }

    fn create_resource_layout(&self, desc: &ResourceLayoutDesc) -> Result<Arc<dyn ResourceLayout>> {
        Ok(Arc::new(MockResourceLayout { desc: desc.clone() }))
    }

    fn create_binding_set(
        &self,
        _layout: &Arc<dyn ResourceLayout>,
        _resources: &[BindingResource],
    ) -> Result<Arc<dyn BindingSet>> {
        Ok(Arc::new(MockBindingSet))
    }

    fn create_shader(&self, _desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        Ok(Arc::new(MockShader))
    }

    fn create_pipeline(&self, _desc: &GraphicsPipelineDesc) -> Result<Arc<dyn Pipeline>> {
        self.stats.lock().unwrap().created_pipelines += 1;
        Ok(Arc::new(MockPipeline))
    }

    fn create_swapchain(
        &self,
        _window: &Window,
        format: TextureFormat,
        buffer_count: usize,
    ) -> Result<Box<dyn Swapchain>> {
        Ok(Box::new(MockSwapchain::new(
            Arc::clone(&self.stats),
            800,
            600,
            format,
            buffer_count,
        )))
    }
}

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
