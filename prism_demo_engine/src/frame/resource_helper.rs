/// Buffer upload helper
///
/// Demos rewrite per-frame upload buffers from plain-old-data slices (vertex
/// positions, transform matrices). This helper does the byte cast so call
/// sites stay free of raw byte handling.

use std::sync::Arc;

use crate::error::Result;
use crate::gpu::Buffer;

/// Copy a Pod slice into a buffer, starting at offset 0
///
/// The orchestrator's frame barrier guarantees the GPU is not reading the
/// buffer while it is rewritten, so this is safe to call from the update
/// phase every frame.
pub fn update_buffer<T: bytemuck::Pod>(buffer: &Arc<dyn Buffer>, data: &[T]) -> Result<()> {
    buffer.update(0, bytemuck::cast_slice(data))
}

/// Copy a single Pod value into a buffer, starting at offset 0
pub fn update_buffer_value<T: bytemuck::Pod>(buffer: &Arc<dyn Buffer>, value: &T) -> Result<()> {
    buffer.update(0, bytemuck::bytes_of(value))
}
