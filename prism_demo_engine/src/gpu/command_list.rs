/// CommandList trait - for recording rendering commands

use std::sync::Arc;

use crate::error::Result;
use crate::gpu::{
    BindingSet, Buffer, Framebuffer, IndexType, Pipeline, RenderPass, ShaderStageFlags, Texture,
};

/// Command list for recording rendering commands
///
/// Commands are recorded between `begin()` and `end()` and later handed to
/// the queue via `CommandQueue::execute()`. Draw-related commands are only
/// valid inside an open render pass; `resolve_texture` is only valid between
/// passes.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass writing into `framebuffer`
    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Bind a binding set
    ///
    /// The pipeline is needed to extract the native binding interface
    /// (pipeline layout on Vulkan).
    fn bind_binding_set(
        &mut self,
        pipeline: &Arc<dyn Pipeline>,
        binding_set: &Arc<dyn BindingSet>,
    ) -> Result<()>;

    /// Bind a vertex buffer at the given byte offset
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Bind an index buffer
    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()>;

    /// Push constants into the bound pipeline's push-constant range
    fn push_constants(&mut self, stages: ShaderStageFlags, offset: u32, data: &[u8]) -> Result<()>;

    /// Draw vertices
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Draw indexed vertices
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;

    /// Reduce a multisampled source image into a single-sample destination
    ///
    /// Recorded between render passes; the backend performs whatever layout
    /// transitions its API requires and leaves both images in general-read.
    /// Callers validate the sample-count contract before recording this
    /// (see `ResolveStage`).
    fn resolve_texture(
        &mut self,
        source: &Arc<dyn Texture>,
        destination: &Arc<dyn Texture>,
    ) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport covering a full target of the given size
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    /// Scissor rectangle covering a full target of the given size
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}
