//! Unit tests for the mock device family

use std::sync::Arc;

use crate::gpu::mock_device::{shared_stats, MockBuffer, MockDevice, MockSwapchain};
use crate::gpu::{
    AttachmentDesc, Buffer, BufferDesc, BufferUsage, CommandList, GpuDevice, MemoryHeap,
    RenderPassDesc, SampleCount, Swapchain, Texture, TextureDesc, TextureFormat,
};

#[test]
fn test_mock_buffer_update_in_bounds() {
    let buffer = MockBuffer::new(8);
    buffer.update(0, &[1, 2, 3, 4]).unwrap();
    buffer.update(4, &[5, 6, 7, 8]).unwrap();
    assert_eq!(*buffer.contents.lock().unwrap(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_mock_buffer_update_out_of_bounds_fails() {
    let buffer = MockBuffer::new(4);
    assert!(buffer.update(2, &[0; 4]).is_err());
}

#[test]
fn test_mock_device_creates_textures_with_sample_count() {
    let device = MockDevice::new(shared_stats());
    let texture = device
        .create_texture(&TextureDesc::multisampled_render_target(
            256,
            256,
            TextureFormat::B8G8R8A8_UNORM,
            SampleCount::S4,
        ))
        .unwrap();
    assert_eq!(texture.info().sample_count, SampleCount::S4);
    assert_eq!(texture.info().width, 256);
}

#[test]
fn test_mock_device_buffer_size() {
    let device = MockDevice::new(shared_stats());
    let buffer = device
        .create_buffer(&BufferDesc {
            size: 96,
            usage: BufferUsage::Vertex,
            heap: MemoryHeap::Upload,
        })
        .unwrap();
    assert_eq!(buffer.size(), 96);
}

#[test]
fn test_mock_swapchain_buffers_are_single_sample() {
    let stats = shared_stats();
    let swapchain = MockSwapchain::new(stats, 800, 600, TextureFormat::B8G8R8A8_UNORM, 3);

    assert_eq!(swapchain.buffer_count(), 3);
    for i in 0..3 {
        assert_eq!(swapchain.buffer(i).info().sample_count, SampleCount::S1);
    }
}

#[test]
fn test_mock_swapchain_counts_presents() {
    let stats = shared_stats();
    let mut swapchain = MockSwapchain::new(
        Arc::clone(&stats),
        800,
        600,
        TextureFormat::B8G8R8A8_UNORM,
        2,
    );

    swapchain.present().unwrap();
    swapchain.present().unwrap();
    assert_eq!(stats.lock().unwrap().presents, 2);
}

#[test]
fn test_mock_command_list_records_into_shared_stream() {
    let stats = shared_stats();
    let device = MockDevice::new(Arc::clone(&stats));
    let allocator = device.create_command_allocator().unwrap();
    let mut cmd = device.create_command_list(allocator.as_ref()).unwrap();

    cmd.begin().unwrap();
    cmd.draw(3, 0).unwrap();
    cmd.end().unwrap();

    assert_eq!(stats.lock().unwrap().commands, vec!["begin", "draw", "end"]);
}

#[test]
fn test_mock_render_pass_keeps_descriptor() {
    let device = MockDevice::new(shared_stats());
    let _render_pass = device
        .create_render_pass(&RenderPassDesc::single_color(AttachmentDesc::render_target(
            TextureFormat::B8G8R8A8_UNORM,
        )))
        .unwrap();
}
