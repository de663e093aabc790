/// PipelineDescriptor - builder for an immutable, finalized pipeline bundle
///
/// A descriptor accumulates sub-states through ordered setter calls, then
/// `update_state()` validates completeness and creates the backend pipeline
/// object exactly once. After that the descriptor is immutable: setters are
/// rejected, and mode switching is done by holding two independently
/// finalized descriptors, never by mutating one.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::gpu::{GpuDevice, Pipeline, RenderPass, ResourceLayout, SampleCount};
use crate::pipeline::{
    BlendState, DepthStencilState, InputAssemblyState, RasterizationState, ShaderState,
};

/// Everything the backend needs to build a graphics pipeline
///
/// Assembled by `update_state()` from the descriptor's finalized sub-states.
pub struct GraphicsPipelineDesc {
    pub input_assembly: Arc<InputAssemblyState>,
    pub resource_layout: Arc<dyn ResourceLayout>,
    pub vertex_shader: Arc<ShaderState>,
    pub pixel_shader: Arc<ShaderState>,
    pub depth_stencil: Arc<DepthStencilState>,
    pub rasterization: Arc<RasterizationState>,
    pub blend: Arc<BlendState>,
    pub render_pass: Arc<dyn RenderPass>,
    pub sample_count: SampleCount,
}

/// Builder and owner of one finalized pipeline configuration
pub struct PipelineDescriptor {
    device: Arc<dyn GpuDevice>,

    input_assembly: Option<Arc<InputAssemblyState>>,
    resource_layout: Option<Arc<dyn ResourceLayout>>,
    vertex_shader: Option<Arc<ShaderState>>,
    pixel_shader: Option<Arc<ShaderState>>,
    depth_stencil: Option<Arc<DepthStencilState>>,
    rasterization: Option<Arc<RasterizationState>>,
    blend: Option<Arc<BlendState>>,
    render_pass: Option<Arc<dyn RenderPass>>,
    sample_count: SampleCount,

    /// Set exactly once by update_state(); presence marks the descriptor
    /// finalized
    pipeline: Option<Arc<dyn Pipeline>>,
}

impl PipelineDescriptor {
    /// Create an empty descriptor bound to a device
    pub fn new(device: Arc<dyn GpuDevice>) -> Self {
        Self {
            device,
            input_assembly: None,
            resource_layout: None,
            vertex_shader: None,
            pixel_shader: None,
            depth_stencil: None,
            rasterization: None,
            blend: None,
            render_pass: None,
            sample_count: SampleCount::S1,
            pipeline: None,
        }
    }

    fn ensure_mutable(&self, slot: &'static str) -> Result<()> {
        if self.pipeline.is_some() {
            return Err(Error::DescriptorFinalized(slot));
        }
        Ok(())
    }

    /// Set the input assembly sub-state
    pub fn set_input_assembly_state(&mut self, state: Arc<InputAssemblyState>) -> Result<()> {
        self.ensure_mutable("input assembly state")?;
        self.input_assembly = Some(state);
        Ok(())
    }

    /// Set the resource layout
    pub fn set_resource_layout(&mut self, layout: Arc<dyn ResourceLayout>) -> Result<()> {
        self.ensure_mutable("resource layout")?;
        self.resource_layout = Some(layout);
        Ok(())
    }

    /// Set the vertex shader sub-state
    pub fn set_vertex_shader_state(&mut self, state: Arc<ShaderState>) -> Result<()> {
        self.ensure_mutable("vertex shader state")?;
        self.vertex_shader = Some(state);
        Ok(())
    }

    /// Set the pixel shader sub-state
    pub fn set_pixel_shader_state(&mut self, state: Arc<ShaderState>) -> Result<()> {
        self.ensure_mutable("pixel shader state")?;
        self.pixel_shader = Some(state);
        Ok(())
    }

    /// Set the depth/stencil sub-state
    pub fn set_depth_stencil_state(&mut self, state: Arc<DepthStencilState>) -> Result<()> {
        self.ensure_mutable("depth stencil state")?;
        self.depth_stencil = Some(state);
        Ok(())
    }

    /// Set the rasterization sub-state
    pub fn set_rasterization_state(&mut self, state: Arc<RasterizationState>) -> Result<()> {
        self.ensure_mutable("rasterization state")?;
        self.rasterization = Some(state);
        Ok(())
    }

    /// Set the blend sub-state
    pub fn set_blend_state(&mut self, state: Arc<BlendState>) -> Result<()> {
        self.ensure_mutable("blend state")?;
        self.blend = Some(state);
        Ok(())
    }

    /// Set the render pass
    pub fn set_render_pass(&mut self, render_pass: Arc<dyn RenderPass>) -> Result<()> {
        self.ensure_mutable("render pass")?;
        self.render_pass = Some(render_pass);
        Ok(())
    }

    /// Set the sample count (defaults to S1)
    ///
    /// The direct-path and resolve-path descriptors differ only here and in
    /// their render pass.
    pub fn set_sample_count(&mut self, sample_count: SampleCount) -> Result<()> {
        self.ensure_mutable("sample count")?;
        self.sample_count = sample_count;
        Ok(())
    }

    /// Finalize the descriptor
    ///
    /// Validates that every required sub-state is present, then creates and
    /// caches the backend pipeline object. Calling this again on an already
    /// finalized descriptor is a no-op: the cached pipeline is never
    /// re-created.
    ///
    /// # Errors
    ///
    /// `Error::MissingSubState` naming the first absent slot.
    pub fn update_state(&mut self) -> Result<()> {
        if self.pipeline.is_some() {
            return Ok(());
        }

        let desc = GraphicsPipelineDesc {
            input_assembly: self
                .input_assembly
                .clone()
                .ok_or(Error::MissingSubState("input assembly state"))?,
            resource_layout: self
                .resource_layout
                .clone()
                .ok_or(Error::MissingSubState("resource layout"))?,
            vertex_shader: self
                .vertex_shader
                .clone()
                .ok_or(Error::MissingSubState("vertex shader state"))?,
            pixel_shader: self
                .pixel_shader
                .clone()
                .ok_or(Error::MissingSubState("pixel shader state"))?,
            depth_stencil: self
                .depth_stencil
                .clone()
                .ok_or(Error::MissingSubState("depth stencil state"))?,
            rasterization: self
                .rasterization
                .clone()
                .ok_or(Error::MissingSubState("rasterization state"))?,
            blend: self.blend.clone().ok_or(Error::MissingSubState("blend state"))?,
            render_pass: self
                .render_pass
                .clone()
                .ok_or(Error::MissingSubState("render pass"))?,
            sample_count: self.sample_count,
        };

        self.pipeline = Some(self.device.create_pipeline(&desc)?);
        Ok(())
    }

    /// Whether `update_state()` has completed
    pub fn is_finalized(&self) -> bool {
        self.pipeline.is_some()
    }

    // ===== READ-ONLY ACCESSORS (post-finalize) =====

    /// The cached backend pipeline object
    ///
    /// # Panics
    ///
    /// Panics if the descriptor has not been finalized - binding an
    /// unfinalized descriptor is a programmer error.
    pub fn graphics_pipeline(&self) -> &Arc<dyn Pipeline> {
        self.pipeline
            .as_ref()
            .unwrap_or_else(|| panic!("graphics_pipeline() called before update_state()"))
    }

    /// The resource layout sub-state
    ///
    /// # Panics
    ///
    /// Panics if no resource layout has been set.
    pub fn resource_layout(&self) -> &Arc<dyn ResourceLayout> {
        self.resource_layout
            .as_ref()
            .unwrap_or_else(|| panic!("resource_layout() called before set_resource_layout()"))
    }

    /// The render pass sub-state
    ///
    /// # Panics
    ///
    /// Panics if no render pass has been set.
    pub fn render_pass(&self) -> &Arc<dyn RenderPass> {
        self.render_pass
            .as_ref()
            .unwrap_or_else(|| panic!("render_pass() called before set_render_pass()"))
    }

    /// The sample count this descriptor was finalized with
    pub fn sample_count(&self) -> SampleCount {
        self.sample_count
    }

    /// The input assembly sub-state
    pub fn input_assembly_state(&self) -> Option<&Arc<InputAssemblyState>> {
        self.input_assembly.as_ref()
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
