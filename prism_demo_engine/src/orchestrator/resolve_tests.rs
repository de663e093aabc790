//! Unit tests for the resolve stage contract

use std::sync::Arc;

use crate::error::Error;
use crate::frame::GpuRegistry;
use crate::gpu::mock_device::{shared_stats, MockCommandList, MockDevice, MockTexture};
use crate::gpu::{
    AttachmentDesc, GpuDevice, RenderPassDesc, ResourceLayoutDesc, SampleCount, ShaderDesc,
    ShaderStage, Texture, TextureDesc, TextureFormat,
};
use crate::orchestrator::ResolveStage;
use crate::pipeline::{
    BlendState, DepthStencilState, InputAssemblyState, PipelineDescriptor, PrimitiveTopology,
    RasterizationState, ShaderState, VertexLayout,
};

fn finalized_descriptor(device: &Arc<dyn GpuDevice>, sample_count: SampleCount) -> PipelineDescriptor {
    let render_pass = device
        .create_render_pass(&RenderPassDesc::single_color(
            AttachmentDesc::multisampled_render_target(TextureFormat::B8G8R8A8_UNORM, sample_count),
        ))
        .unwrap();
    let layout = device
        .create_resource_layout(&ResourceLayoutDesc {
            elements: vec![],
            push_constants: None,
        })
        .unwrap();
    let vertex_module = device
        .create_shader(&ShaderDesc {
            stage: ShaderStage::Vertex,
            bytecode: vec![0u8; 16],
        })
        .unwrap();
    let pixel_module = device
        .create_shader(&ShaderDesc {
            stage: ShaderStage::Pixel,
            bytecode: vec![0u8; 16],
        })
        .unwrap();

    let mut descriptor = PipelineDescriptor::new(Arc::clone(device));
    descriptor
        .set_input_assembly_state(Arc::new(InputAssemblyState::new(
            VertexLayout::packed(&[TextureFormat::R32G32B32_SFLOAT]),
            PrimitiveTopology::TriangleList,
        )))
        .unwrap();
    descriptor.set_resource_layout(layout).unwrap();
    descriptor
        .set_vertex_shader_state(Arc::new(ShaderState::new(
            ShaderStage::Vertex,
            vertex_module,
            "main",
        )))
        .unwrap();
    descriptor
        .set_pixel_shader_state(Arc::new(ShaderState::new(
            ShaderStage::Pixel,
            pixel_module,
            "main",
        )))
        .unwrap();
    descriptor
        .set_depth_stencil_state(Arc::new(DepthStencilState::disabled()))
        .unwrap();
    descriptor
        .set_rasterization_state(Arc::new(RasterizationState::default()))
        .unwrap();
    descriptor.set_blend_state(Arc::new(BlendState::default())).unwrap();
    descriptor.set_render_pass(render_pass).unwrap();
    descriptor.set_sample_count(sample_count).unwrap();
    descriptor.update_state().unwrap();
    descriptor
}

struct StageParts {
    stage: ResolveStage,
    registry: GpuRegistry,
    stats: crate::gpu::mock_device::SharedStats,
}

fn stage_with_samples(sample_count: SampleCount) -> Result<StageParts, Error> {
    let stats = shared_stats();
    let device: Arc<dyn GpuDevice> = Arc::new(MockDevice::new(Arc::clone(&stats)));

    let descriptor = Arc::new(finalized_descriptor(&device, sample_count));

    let mut registry = GpuRegistry::new();
    let offscreen = device
        .create_texture(&TextureDesc::multisampled_render_target(
            800,
            600,
            TextureFormat::B8G8R8A8_UNORM,
            sample_count,
        ))
        .unwrap();
    let offscreen_texture = registry.insert_texture(offscreen);

    let framebuffer = device
        .create_framebuffer(&crate::gpu::FramebufferDesc {
            render_pass: Arc::clone(descriptor.render_pass()),
            color_attachments: vec![Arc::clone(registry.texture(offscreen_texture))],
            depth_attachment: None,
            width: 800,
            height: 600,
        })
        .unwrap();
    let offscreen_framebuffer = registry.insert_framebuffer(framebuffer);

    let composite_pass = device
        .create_render_pass(&RenderPassDesc::single_color(AttachmentDesc::composite_over(
            TextureFormat::B8G8R8A8_UNORM,
        )))
        .unwrap();

    let stage = ResolveStage::new(
        descriptor,
        offscreen_texture,
        offscreen_framebuffer,
        composite_pass,
        sample_count,
    )?;

    Ok(StageParts {
        stage,
        registry,
        stats,
    })
}

#[test]
fn test_stage_rejects_single_sample_source() {
    // A single-sample offscreen target cannot be a resolve source
    match stage_with_samples(SampleCount::S1) {
        Err(Error::ResolveContract { source, destination }) => {
            assert_eq!(source, SampleCount::S1);
            assert_eq!(destination, SampleCount::S1);
        }
        _ => panic!("expected ResolveContract"),
    }
}

#[test]
fn test_stage_accepts_multisampled_source() {
    let parts = stage_with_samples(SampleCount::S4).unwrap();
    assert_eq!(parts.stage.sample_count(), SampleCount::S4);
}

#[test]
fn test_resolve_four_to_one_succeeds() {
    let parts = stage_with_samples(SampleCount::S4).unwrap();
    let mut cmd = MockCommandList {
        stats: Arc::clone(&parts.stats),
    };

    let destination: Arc<dyn Texture> = Arc::new(MockTexture::new(
        800,
        600,
        TextureFormat::B8G8R8A8_UNORM,
        SampleCount::S1,
    ));

    parts
        .stage
        .record_resolve(&mut cmd, &parts.registry, &destination)
        .unwrap();

    assert_eq!(
        parts.stats.lock().unwrap().commands,
        vec!["resolve_texture".to_string()]
    );
}

#[test]
fn test_resolve_equal_sample_counts_rejected_before_recording() {
    let parts = stage_with_samples(SampleCount::S4).unwrap();
    let mut cmd = MockCommandList {
        stats: Arc::clone(&parts.stats),
    };

    // Destination with the same sample count as the source
    let destination: Arc<dyn Texture> = Arc::new(MockTexture::new(
        800,
        600,
        TextureFormat::B8G8R8A8_UNORM,
        SampleCount::S4,
    ));

    let result = parts
        .stage
        .record_resolve(&mut cmd, &parts.registry, &destination);

    assert!(matches!(
        result,
        Err(Error::ResolveContract {
            source: SampleCount::S4,
            destination: SampleCount::S4,
        })
    ));
    // Nothing reached the command list
    assert!(parts.stats.lock().unwrap().commands.is_empty());
}

#[test]
fn test_stage_requires_finalized_descriptor() {
    let stats = shared_stats();
    let device: Arc<dyn GpuDevice> = Arc::new(MockDevice::new(Arc::clone(&stats)));

    // Descriptor that was never finalized
    let descriptor = Arc::new(PipelineDescriptor::new(Arc::clone(&device)));

    let mut registry = GpuRegistry::new();
    let offscreen = registry.insert_texture(Arc::new(MockTexture::new(
        800,
        600,
        TextureFormat::B8G8R8A8_UNORM,
        SampleCount::S4,
    )));
    let framebuffer = registry.insert_framebuffer(Arc::new(
        crate::gpu::mock_device::MockFramebuffer {
            width: 800,
            height: 600,
        },
    ));
    let composite_pass = device
        .create_render_pass(&RenderPassDesc::single_color(AttachmentDesc::composite_over(
            TextureFormat::B8G8R8A8_UNORM,
        )))
        .unwrap();

    let result = ResolveStage::new(
        descriptor,
        offscreen,
        framebuffer,
        composite_pass,
        SampleCount::S4,
    );
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}
