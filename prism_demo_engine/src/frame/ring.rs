/// FrameRing - fixed-size ring of per-frame resource slots
///
/// One slot per frame in flight. A slot holds the handles of that frame's
/// framebuffer, binding set, and any per-frame dynamic buffers keyed by name.
/// The ring has no internal synchronization: single-writer, single-reader per
/// slot is enforced externally by the orchestrator's whole-queue barrier, not
/// here.

use rustc_hash::FxHashMap;

use crate::frame::{BindingSetHandle, BufferHandle, FramebufferHandle};

/// Well-known buffer key for the per-frame vertex buffer
///
/// The orchestrator binds this buffer automatically when the slot defines it;
/// demos with static vertex data simply never set it.
pub const VERTEX_BUFFER_KEY: &str = "VertexBuffer";

/// One frame slot: the resources owned by a single frame in flight
///
/// Created during swapchain setup, mutated only through these accessors,
/// released at teardown through the registry.
#[derive(Debug, Default)]
pub struct FrameSlot {
    index: usize,
    framebuffer: Option<FramebufferHandle>,
    binding_set: Option<BindingSetHandle>,
    buffers: FxHashMap<String, BufferHandle>,
}

impl FrameSlot {
    /// Slot position in the ring
    pub fn index(&self) -> usize {
        self.index
    }

    /// Set this slot's framebuffer
    pub fn set_framebuffer(&mut self, handle: FramebufferHandle) {
        self.framebuffer = Some(handle);
    }

    /// Get this slot's framebuffer
    ///
    /// # Panics
    ///
    /// Panics if no framebuffer was set - a programmer error, fatal.
    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
            .unwrap_or_else(|| panic!("frame slot {} has no framebuffer", self.index))
    }

    /// Set this slot's binding set
    pub fn set_binding_set(&mut self, handle: BindingSetHandle) {
        self.binding_set = Some(handle);
    }

    /// Get this slot's binding set, if one was configured
    pub fn binding_set(&self) -> Option<BindingSetHandle> {
        self.binding_set
    }

    /// Set a named per-frame buffer
    pub fn set_buffer(&mut self, key: &str, handle: BufferHandle) {
        self.buffers.insert(key.to_string(), handle);
    }

    /// Get a named per-frame buffer
    ///
    /// # Panics
    ///
    /// Panics if the key was never set - a programmer error, fatal.
    pub fn buffer(&self, key: &str) -> BufferHandle {
        *self
            .buffers
            .get(key)
            .unwrap_or_else(|| panic!("frame slot {} has no buffer '{}'", self.index, key))
    }

    /// Get a named per-frame buffer without the fatal-on-missing contract
    pub fn try_buffer(&self, key: &str) -> Option<BufferHandle> {
        self.buffers.get(key).copied()
    }
}

/// Fixed-size ring of frame slots, indexed modulo N
pub struct FrameRing {
    slots: Vec<FrameSlot>,
    current: usize,
}

impl FrameRing {
    /// Create a ring with `n` slots (n >= 1)
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn new(n: usize) -> Self {
        assert!(n >= 1, "frame ring needs at least one slot");
        let slots = (0..n)
            .map(|index| FrameSlot {
                index,
                ..FrameSlot::default()
            })
            .collect();
        Self { slots, current: 0 }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: the ring has at least one slot
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current frame index, in `[0, N)`
    pub fn index(&self) -> usize {
        self.current
    }

    /// Borrow the slot at a fixed position (used during setup)
    pub fn slot(&self, index: usize) -> &FrameSlot {
        &self.slots[index]
    }

    /// Mutably borrow the slot at a fixed position (used during setup)
    pub fn slot_mut(&mut self, index: usize) -> &mut FrameSlot {
        &mut self.slots[index]
    }

    /// Borrow the current frame's slot
    pub fn current(&self) -> &FrameSlot {
        &self.slots[self.current]
    }

    /// Mutably borrow the current frame's slot
    pub fn current_mut(&mut self) -> &mut FrameSlot {
        &mut self.slots[self.current]
    }

    /// Advance the frame index: `index <- (index + 1) mod N`
    ///
    /// Called exactly once per completed present, and nowhere else.
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.slots.len();
        self.current
    }
}

#[cfg(test)]
#[path = "ring_tests.rs"]
mod tests;
