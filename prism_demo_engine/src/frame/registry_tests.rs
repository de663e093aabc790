//! Unit tests for the GPU object registry

use std::sync::Arc;

use crate::frame::GpuRegistry;
use crate::gpu::mock_device::{shared_stats, MockBuffer, MockCommandQueue, MockTexture};
use crate::gpu::{Buffer, SampleCount, Texture, TextureFormat};

#[test]
fn test_registry_starts_empty() {
    let registry = GpuRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[test]
fn test_buffer_handle_roundtrip() {
    let mut registry = GpuRegistry::new();
    let handle = registry.insert_buffer(Arc::new(MockBuffer::new(128)));

    assert_eq!(registry.buffer(handle).size(), 128);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_texture_handle_roundtrip() {
    let mut registry = GpuRegistry::new();
    let handle = registry.insert_texture(Arc::new(MockTexture::new(
        640,
        480,
        TextureFormat::B8G8R8A8_UNORM,
        SampleCount::S4,
    )));

    let texture = registry.texture(handle);
    assert_eq!(texture.info().width, 640);
    assert_eq!(texture.info().sample_count, SampleCount::S4);
}

#[test]
fn test_release_all_waits_for_queue_idle() {
    let stats = shared_stats();
    let queue = MockCommandQueue {
        stats: Arc::clone(&stats),
    };

    let mut registry = GpuRegistry::new();
    registry.insert_buffer(Arc::new(MockBuffer::new(16)));
    registry.insert_buffer(Arc::new(MockBuffer::new(32)));
    assert_eq!(registry.len(), 2);

    registry.release_all(&queue).unwrap();

    // The wait-idle barrier must run before anything is dropped
    assert_eq!(stats.lock().unwrap().wait_idle_calls, 1);
    assert!(registry.is_empty());
}

#[test]
fn test_release_all_on_empty_registry_still_waits() {
    let stats = shared_stats();
    let queue = MockCommandQueue {
        stats: Arc::clone(&stats),
    };

    let mut registry = GpuRegistry::new();
    registry.release_all(&queue).unwrap();
    assert_eq!(stats.lock().unwrap().wait_idle_calls, 1);
}

#[test]
#[should_panic(expected = "stale buffer handle")]
fn test_stale_handle_is_fatal() {
    let stats = shared_stats();
    let queue = MockCommandQueue {
        stats: Arc::clone(&stats),
    };

    let mut registry = GpuRegistry::new();
    let handle = registry.insert_buffer(Arc::new(MockBuffer::new(16)));
    registry.release_all(&queue).unwrap();

    let _ = registry.buffer(handle);
}
