/// Buffer trait and buffer descriptor

use crate::error::Result;

/// What a buffer is bound as at draw time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex data
    Vertex,
    /// Index data
    Index,
    /// Uniform/constant data
    Uniform,
}

/// Memory heap a buffer is allocated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryHeap {
    /// Device-local memory, not CPU-visible
    Default,
    /// CPU-visible upload memory, written every frame by the demos
    Upload,
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Bind usage
    pub usage: BufferUsage,
    /// Memory heap
    pub heap: MemoryHeap,
}

impl BufferDesc {
    /// Vertex buffer descriptor, sized from element stride and count
    pub fn vertex(stride: u64, count: u64, heap: MemoryHeap) -> Self {
        Self {
            size: stride * count,
            usage: BufferUsage::Vertex,
            heap,
        }
    }

    /// Index buffer descriptor
    pub fn index(index_type: IndexType, count: u64, heap: MemoryHeap) -> Self {
        Self {
            size: index_type.size_bytes() as u64 * count,
            usage: BufferUsage::Index,
            heap,
        }
    }

    /// Uniform buffer descriptor; always CPU-visible so per-frame constants
    /// can be rewritten in the update phase
    pub fn uniform(size: u64) -> Self {
        Self {
            size,
            usage: BufferUsage::Uniform,
            heap: MemoryHeap::Upload,
        }
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types. The buffer is destroyed when
/// dropped, behind the teardown wait-idle barrier.
pub trait Buffer: Send + Sync {
    /// Copy `data` into the buffer at `offset` bytes
    ///
    /// Only valid for `MemoryHeap::Upload` buffers. The orchestrator's frame
    /// barrier guarantees the GPU is not reading the buffer while it is
    /// rewritten.
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Size of the buffer in bytes
    fn size(&self) -> u64;
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
