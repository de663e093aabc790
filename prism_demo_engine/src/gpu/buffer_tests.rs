//! Unit tests for buffer descriptors

use crate::gpu::{BufferDesc, BufferUsage, MemoryHeap, IndexType};

#[test]
fn test_index_type_size_bytes() {
    assert_eq!(IndexType::U16.size_bytes(), 2);
    assert_eq!(IndexType::U32.size_bytes(), 4);
}

#[test]
fn test_vertex_buffer_desc_size() {
    // 3 vertices of vec3 (12 bytes each), as in the triangle demo
    let desc = BufferDesc::vertex(12, 3, MemoryHeap::Upload);
    assert_eq!(desc.size, 36);
    assert_eq!(desc.usage, BufferUsage::Vertex);
    assert_eq!(desc.heap, MemoryHeap::Upload);
}

#[test]
fn test_index_buffer_desc_size() {
    let desc = BufferDesc::index(IndexType::U16, 1000, MemoryHeap::Default);
    assert_eq!(desc.size, 2000);
    assert_eq!(desc.usage, BufferUsage::Index);

    let desc = BufferDesc::index(IndexType::U32, 1000, MemoryHeap::Default);
    assert_eq!(desc.size, 4000);
}

#[test]
fn test_uniform_buffer_desc_is_upload() {
    // Uniform buffers are rewritten per frame, so they must live in the
    // upload heap
    let desc = BufferDesc::uniform(64);
    assert_eq!(desc.size, 64);
    assert_eq!(desc.usage, BufferUsage::Uniform);
    assert_eq!(desc.heap, MemoryHeap::Upload);
}
