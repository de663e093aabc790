/// GpuRegistry - single owning registry for GPU objects
///
/// GPU object graphs are not reference-counted across the app: one registry
/// owns every buffer, texture, framebuffer and binding set, and hands out
/// opaque generational handles. The ring and the resolve stage store handles,
/// never objects. Release is a single explicit call gated by the teardown
/// wait-idle barrier; there is no implicit destruction order to reason about.

use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::error::Result;
use crate::gpu::{BindingSet, Buffer, CommandQueue, Framebuffer, Texture};

new_key_type! {
    /// Opaque handle to a registered buffer
    pub struct BufferHandle;

    /// Opaque handle to a registered texture
    pub struct TextureHandle;

    /// Opaque handle to a registered framebuffer
    pub struct FramebufferHandle;

    /// Opaque handle to a registered binding set
    pub struct BindingSetHandle;
}

/// Owning registry for GPU objects
#[derive(Default)]
pub struct GpuRegistry {
    buffers: SlotMap<BufferHandle, Arc<dyn Buffer>>,
    textures: SlotMap<TextureHandle, Arc<dyn Texture>>,
    framebuffers: SlotMap<FramebufferHandle, Arc<dyn Framebuffer>>,
    binding_sets: SlotMap<BindingSetHandle, Arc<dyn BindingSet>>,
}

impl GpuRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer and get its handle
    pub fn insert_buffer(&mut self, buffer: Arc<dyn Buffer>) -> BufferHandle {
        self.buffers.insert(buffer)
    }

    /// Register a texture and get its handle
    pub fn insert_texture(&mut self, texture: Arc<dyn Texture>) -> TextureHandle {
        self.textures.insert(texture)
    }

    /// Register a framebuffer and get its handle
    pub fn insert_framebuffer(&mut self, framebuffer: Arc<dyn Framebuffer>) -> FramebufferHandle {
        self.framebuffers.insert(framebuffer)
    }

    /// Register a binding set and get its handle
    pub fn insert_binding_set(&mut self, binding_set: Arc<dyn BindingSet>) -> BindingSetHandle {
        self.binding_sets.insert(binding_set)
    }

    /// Resolve a buffer handle
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign handle - that is a programmer error, not
    /// a recoverable condition.
    pub fn buffer(&self, handle: BufferHandle) -> &Arc<dyn Buffer> {
        self.buffers
            .get(handle)
            .unwrap_or_else(|| panic!("stale buffer handle {:?}", handle))
    }

    /// Resolve a texture handle
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign handle.
    pub fn texture(&self, handle: TextureHandle) -> &Arc<dyn Texture> {
        self.textures
            .get(handle)
            .unwrap_or_else(|| panic!("stale texture handle {:?}", handle))
    }

    /// Resolve a framebuffer handle
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign handle.
    pub fn framebuffer(&self, handle: FramebufferHandle) -> &Arc<dyn Framebuffer> {
        self.framebuffers
            .get(handle)
            .unwrap_or_else(|| panic!("stale framebuffer handle {:?}", handle))
    }

    /// Resolve a binding set handle
    ///
    /// # Panics
    ///
    /// Panics on a stale or foreign handle.
    pub fn binding_set(&self, handle: BindingSetHandle) -> &Arc<dyn BindingSet> {
        self.binding_sets
            .get(handle)
            .unwrap_or_else(|| panic!("stale binding set handle {:?}", handle))
    }

    /// Number of live objects of every kind
    pub fn len(&self) -> usize {
        self.buffers.len() + self.textures.len() + self.framebuffers.len() + self.binding_sets.len()
    }

    /// True when no objects are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every registered GPU object
    ///
    /// Waits for the queue to go idle first - no in-flight GPU work may
    /// reference a soon-to-be-destroyed resource. This is a hard lifetime
    /// precondition, so the wait happens even if the registry is empty.
    pub fn release_all(&mut self, queue: &dyn CommandQueue) -> Result<()> {
        queue.wait_idle()?;

        self.buffers.clear();
        self.textures.clear();
        self.framebuffers.clear();
        self.binding_sets.clear();

        crate::prism_debug!("prism::GpuRegistry", "All GPU objects released");

        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
