/// ResolveStage - the optional multisample companion of the orchestrator
///
/// Exists only when the render mode can be multisample. Owns the handles of
/// the offscreen multisampled target, a second pipeline descriptor whose
/// render pass leaves the offscreen attachment in general-read (so it can be
/// the source of a resolve), and the separate overlay-composite pass that
/// loads the resolved image instead of clearing it.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::frame::{FramebufferHandle, GpuRegistry, TextureHandle};
use crate::gpu::{CommandList, RenderPass, SampleCount, Texture};
use crate::pipeline::PipelineDescriptor;

/// Offscreen target, resolve-path descriptor, and composite pass
pub struct ResolveStage {
    descriptor: Arc<PipelineDescriptor>,
    offscreen_texture: TextureHandle,
    offscreen_framebuffer: FramebufferHandle,
    composite_pass: Arc<dyn RenderPass>,
    sample_count: SampleCount,
}

impl ResolveStage {
    /// Create a resolve stage
    ///
    /// # Errors
    ///
    /// - `Error::ResolveContract` if `sample_count` is S1: resolving a
    ///   single-sample image into a single-sample destination is a contract
    ///   violation, caught here before any frame runs.
    /// - `Error::InitializationFailed` if the descriptor is not finalized.
    pub fn new(
        descriptor: Arc<PipelineDescriptor>,
        offscreen_texture: TextureHandle,
        offscreen_framebuffer: FramebufferHandle,
        composite_pass: Arc<dyn RenderPass>,
        sample_count: SampleCount,
    ) -> Result<Self> {
        if sample_count <= SampleCount::S1 {
            return Err(Error::ResolveContract {
                source: sample_count,
                destination: SampleCount::S1,
            });
        }

        if !descriptor.is_finalized() {
            return Err(Error::InitializationFailed(
                "Resolve stage requires a finalized pipeline descriptor".to_string(),
            ));
        }

        Ok(Self {
            descriptor,
            offscreen_texture,
            offscreen_framebuffer,
            composite_pass,
            sample_count,
        })
    }

    /// The resolve-path pipeline descriptor
    pub fn descriptor(&self) -> &Arc<PipelineDescriptor> {
        &self.descriptor
    }

    /// Handle of the offscreen multisampled texture (the resolve source)
    pub fn offscreen_texture(&self) -> TextureHandle {
        self.offscreen_texture
    }

    /// Handle of the framebuffer wrapping the offscreen texture
    pub fn offscreen_framebuffer(&self) -> FramebufferHandle {
        self.offscreen_framebuffer
    }

    /// The overlay-composite render pass (load-existing/store)
    pub fn composite_pass(&self) -> &Arc<dyn RenderPass> {
        &self.composite_pass
    }

    /// Sample count of the offscreen target
    pub fn sample_count(&self) -> SampleCount {
        self.sample_count
    }

    /// Record the resolve of the offscreen image into `destination`
    ///
    /// Validates the contract - source samples must strictly exceed
    /// destination samples - before anything reaches the command list.
    pub fn record_resolve(
        &self,
        cmd: &mut dyn CommandList,
        registry: &GpuRegistry,
        destination: &Arc<dyn Texture>,
    ) -> Result<()> {
        let source = registry.texture(self.offscreen_texture);

        let source_samples = source.info().sample_count;
        let destination_samples = destination.info().sample_count;
        if source_samples <= destination_samples {
            return Err(Error::ResolveContract {
                source: source_samples,
                destination: destination_samples,
            });
        }

        cmd.resolve_texture(source, destination)
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
