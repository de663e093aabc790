/// Command queue and command allocator traits

use crate::error::Result;
use crate::gpu::CommandList;

/// Command queue trait
///
/// Executes recorded command lists and provides the whole-queue barrier the
/// orchestrator's frame pacing is built on.
pub trait CommandQueue: Send + Sync {
    /// Hand recorded command lists to the queue for execution
    fn execute(&self, lists: &[&dyn CommandList]) -> Result<()>;

    /// Block until the queue has finished all previously submitted work
    ///
    /// This is a coarse barrier, not a per-resource fence: after it returns,
    /// every frame slot is safe to reset. It is also the teardown
    /// precondition before any GPU object may be released.
    fn wait_idle(&self) -> Result<()>;
}

/// Command allocator trait
///
/// Backs the storage command lists record into. Reset once per frame, after
/// the queue-idle wait proves nothing in flight still references it.
pub trait CommandAllocator: Send + Sync {
    /// Recycle all storage owned by this allocator
    fn reset(&mut self) -> Result<()>;
}
