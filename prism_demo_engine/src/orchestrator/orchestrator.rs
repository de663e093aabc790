/// RenderOrchestrator - the per-frame state machine
///
/// Ties the frame ring and the pipeline descriptor(s) together and drives the
/// cycle every demo repeats:
///
/// `Idle -> Synchronizing -> Recording -> Submitted -> Presented -> Idle`
///
/// Synchronizing blocks on a whole-queue idle wait. This is deliberately
/// coarse: after it returns, the frame slot about to be reused is safe to
/// reset without any per-resource fence tracking, at the cost of pipelining
/// throughput. At most one frame's GPU work is ever outstanding.
///
/// Any step's failure is fatal. The orchestrator never retries, re-records,
/// or skips frames; a frame is a whole success or a terminating failure.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::frame::{FrameRing, FrameSlot, GpuRegistry, VERTEX_BUFFER_KEY};
use crate::gpu::{
    ClearValue, CommandAllocator, CommandList, CommandQueue, Framebuffer, Rect2D, Swapchain,
    Viewport,
};
use crate::orchestrator::{Overlay, ResolveStage};
use crate::pipeline::PipelineDescriptor;

/// Which finalized descriptor and pass sequence a frame uses
///
/// Toggling the mode only changes the selection; it never mutates a
/// descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One pass straight into the swapchain image
    Direct,
    /// Offscreen multisampled pass, resolve, then overlay composite
    Multisample,
}

/// Orchestrator state, cyclic with no terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Synchronizing,
    Recording,
    Submitted,
    Presented,
}

/// Demo draw calls, recorded inside the orchestrator's open render pass
///
/// The orchestrator has already bound the pipeline, viewport, scissor, the
/// slot's vertex buffer (if any) and binding set (if any); the painter issues
/// draws and push constants.
pub trait ScenePainter {
    fn record(
        &mut self,
        cmd: &mut dyn CommandList,
        slot: &FrameSlot,
        registry: &GpuRegistry,
    ) -> Result<()>;
}

/// The per-frame state machine
pub struct RenderOrchestrator {
    // The command list records into the allocator's storage; field order
    // keeps its drop first.
    command_list: Box<dyn CommandList>,
    allocator: Box<dyn CommandAllocator>,
    queue: Arc<dyn CommandQueue>,
    swapchain: Box<dyn Swapchain>,
    ring: FrameRing,

    direct: Arc<PipelineDescriptor>,
    resolve: Option<ResolveStage>,

    mode: RenderMode,
    state: FrameState,
    clear_color: [f32; 4],
}

impl RenderOrchestrator {
    /// Create an orchestrator over already-constructed GPU objects
    ///
    /// `direct` must be finalized. A `resolve` stage is required before the
    /// mode can ever be `Multisample`; without one the orchestrator is
    /// permanently direct.
    pub fn new(
        queue: Arc<dyn CommandQueue>,
        allocator: Box<dyn CommandAllocator>,
        command_list: Box<dyn CommandList>,
        swapchain: Box<dyn Swapchain>,
        ring: FrameRing,
        direct: Arc<PipelineDescriptor>,
        resolve: Option<ResolveStage>,
    ) -> Result<Self> {
        if !direct.is_finalized() {
            return Err(Error::InitializationFailed(
                "Orchestrator requires a finalized direct-path descriptor".to_string(),
            ));
        }

        Ok(Self {
            command_list,
            allocator,
            queue,
            swapchain,
            ring,
            direct,
            resolve,
            mode: RenderMode::Direct,
            state: FrameState::Idle,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        })
    }

    /// Current render mode
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Switch between the direct and multisample paths
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` if multisample is requested but no
    /// resolve stage was configured.
    pub fn set_mode(&mut self, mode: RenderMode) -> Result<()> {
        if mode == RenderMode::Multisample && self.resolve.is_none() {
            return Err(Error::InitializationFailed(
                "Multisample mode requires a resolve stage".to_string(),
            ));
        }
        self.mode = mode;
        Ok(())
    }

    /// Current state-machine state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Current frame index, in `[0, N)`
    pub fn frame_index(&self) -> usize {
        self.ring.index()
    }

    /// The frame ring (slot setup happens through `ring_mut`)
    pub fn ring(&self) -> &FrameRing {
        &self.ring
    }

    /// Mutable access to the ring for slot setup
    pub fn ring_mut(&mut self) -> &mut FrameRing {
        &mut self.ring
    }

    /// The direct-path pipeline descriptor
    ///
    /// Demos use this to reach the render pass when wiring up the overlay.
    pub fn direct_descriptor(&self) -> &Arc<PipelineDescriptor> {
        &self.direct
    }

    /// The resolve stage, when one is configured
    pub fn resolve_stage(&self) -> Option<&ResolveStage> {
        self.resolve.as_ref()
    }

    /// Clear color of the main pass
    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    fn transition(&mut self, next: FrameState) {
        crate::prism_trace!(
            "prism::Orchestrator",
            "frame {}: {:?} -> {:?}",
            self.ring.index(),
            self.state,
            next
        );
        self.state = next;
    }

    /// Run one complete frame cycle
    ///
    /// Synchronize, reset, record, submit, present, advance. The overlay's
    /// `update()` runs first so all writes to overlay-bound state happen
    /// before recording; the rest of the cycle treats it as a read-only
    /// snapshot.
    pub fn render_frame(
        &mut self,
        registry: &GpuRegistry,
        scene: &mut dyn ScenePainter,
        mut overlay: Option<&mut dyn Overlay>,
    ) -> Result<()> {
        if let Some(o) = overlay.as_mut() {
            o.update();
        }

        self.transition(FrameState::Synchronizing);
        self.queue.wait_idle()?;

        self.transition(FrameState::Recording);
        self.allocator.reset()?;
        self.record_commands(registry, scene, overlay)?;

        self.transition(FrameState::Submitted);
        self.queue.execute(&[self.command_list.as_ref()])?;

        self.transition(FrameState::Presented);
        self.swapchain.present()?;
        self.ring.advance();

        self.transition(FrameState::Idle);
        Ok(())
    }

    fn record_commands(
        &mut self,
        registry: &GpuRegistry,
        scene: &mut dyn ScenePainter,
        mut overlay: Option<&mut dyn Overlay>,
    ) -> Result<()> {
        let slot = self.ring.current();
        let cmd = self.command_list.as_mut();

        // Select by mode: resolve stage present means the main pass targets
        // the offscreen framebuffer, otherwise the slot's swapchain
        // framebuffer.
        let stage = match self.mode {
            RenderMode::Direct => None,
            RenderMode::Multisample => Some(self.resolve.as_ref().ok_or_else(|| {
                Error::InitializationFailed(
                    "Multisample mode without a resolve stage".to_string(),
                )
            })?),
        };

        let descriptor = match stage {
            Some(stage) => stage.descriptor(),
            None => &self.direct,
        };
        let target = match stage {
            Some(stage) => registry.framebuffer(stage.offscreen_framebuffer()),
            None => registry.framebuffer(slot.framebuffer()),
        };

        cmd.begin()?;

        cmd.bind_pipeline(descriptor.graphics_pipeline())?;
        cmd.set_viewport(Viewport::full(target.width(), target.height()))?;
        cmd.set_scissor(Rect2D::full(target.width(), target.height()))?;

        if let Some(vertex_buffer) = slot.try_buffer(VERTEX_BUFFER_KEY) {
            cmd.bind_vertex_buffer(registry.buffer(vertex_buffer), 0)?;
        }
        if let Some(binding_set) = slot.binding_set() {
            cmd.bind_binding_set(descriptor.graphics_pipeline(), registry.binding_set(binding_set))?;
        }

        cmd.begin_render_pass(
            descriptor.render_pass(),
            target,
            &[ClearValue::Color(self.clear_color)],
        )?;

        scene.record(&mut *cmd, slot, registry)?;

        match stage {
            None => {
                if let Some(o) = overlay.as_mut() {
                    o.draw(&mut *cmd)?;
                }
                cmd.end_render_pass()?;
            }
            Some(stage) => {
                cmd.end_render_pass()?;

                // Reduce the offscreen image into this frame's presentable
                // image, then draw the overlay on top of the resolved
                // contents in a pass that loads instead of clearing.
                let destination = self.swapchain.buffer(slot.index());
                stage.record_resolve(&mut *cmd, registry, &destination)?;

                let slot_framebuffer = registry.framebuffer(slot.framebuffer());
                cmd.begin_render_pass(stage.composite_pass(), slot_framebuffer, &[])?;
                if let Some(o) = overlay.as_mut() {
                    o.draw(&mut *cmd)?;
                }
                cmd.end_render_pass()?;
            }
        }

        cmd.end()?;
        Ok(())
    }
}

impl Drop for RenderOrchestrator {
    fn drop(&mut self) {
        // No GPU object recorded into the in-flight command list may be
        // destroyed while the queue still references it.
        if self.queue.wait_idle().is_err() {
            crate::prism_warn!("prism::Orchestrator", "wait_idle failed during teardown");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
