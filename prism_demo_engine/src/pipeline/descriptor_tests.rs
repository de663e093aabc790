//! Unit tests for the pipeline descriptor builder
//!
//! Covers the finalize protocol: completeness validation, idempotence,
//! immutability after finalize, deterministic builds from shared sub-states.

use std::sync::Arc;

use crate::error::Error;
use crate::gpu::mock_device::{shared_stats, MockDevice, SharedStats};
use crate::gpu::{
    AttachmentDesc, GpuDevice, RenderPass, RenderPassDesc, ResourceLayoutDesc, SampleCount,
    ShaderDesc, ShaderStage, TextureFormat,
};
use crate::pipeline::{
    BlendState, DepthStencilState, InputAssemblyState, PipelineDescriptor, PrimitiveTopology,
    RasterizationState, ShaderState, VertexLayout,
};

struct TestContext {
    device: Arc<dyn GpuDevice>,
    stats: SharedStats,
}

fn context() -> TestContext {
    let stats = shared_stats();
    let device: Arc<dyn GpuDevice> = Arc::new(MockDevice::new(Arc::clone(&stats)));
    TestContext { device, stats }
}

/// The base sub-states two configuration-identical descriptors share
struct BaseStates {
    input_assembly: Arc<InputAssemblyState>,
    vertex_shader: Arc<ShaderState>,
    pixel_shader: Arc<ShaderState>,
    depth_stencil: Arc<DepthStencilState>,
    rasterization: Arc<RasterizationState>,
    blend: Arc<BlendState>,
}

fn base_states(device: &Arc<dyn GpuDevice>) -> BaseStates {
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

    BaseStates {
        input_assembly: Arc::new(InputAssemblyState::new(
            VertexLayout::packed(&[TextureFormat::R32G32B32_SFLOAT]),
            PrimitiveTopology::TriangleList,
        )),
        vertex_shader: Arc::new(ShaderState::new(ShaderStage::Vertex, vertex_module, "main")),
        pixel_shader: Arc::new(ShaderState::new(ShaderStage::Pixel, pixel_module, "main")),
        depth_stencil: Arc::new(DepthStencilState::disabled()),
        rasterization: Arc::new(RasterizationState::default()),
        blend: Arc::new(BlendState::default()),
    }
}

fn populated_descriptor(
    device: &Arc<dyn GpuDevice>,
    states: &BaseStates,
    render_pass: Arc<dyn RenderPass>,
) -> PipelineDescriptor {
    let layout = device
        .create_resource_layout(&ResourceLayoutDesc {
            elements: vec![],
            push_constants: None,
        })
        .unwrap();

    let mut descriptor = PipelineDescriptor::new(Arc::clone(device));
    descriptor
        .set_input_assembly_state(Arc::clone(&states.input_assembly))
        .unwrap();
    descriptor.set_resource_layout(layout).unwrap();
    descriptor
        .set_vertex_shader_state(Arc::clone(&states.vertex_shader))
        .unwrap();
    descriptor
        .set_pixel_shader_state(Arc::clone(&states.pixel_shader))
        .unwrap();
    descriptor
        .set_depth_stencil_state(Arc::clone(&states.depth_stencil))
        .unwrap();
    descriptor
        .set_rasterization_state(Arc::clone(&states.rasterization))
        .unwrap();
    descriptor.set_blend_state(Arc::clone(&states.blend)).unwrap();
    descriptor.set_render_pass(render_pass).unwrap();
    descriptor
}

fn direct_pass(device: &Arc<dyn GpuDevice>) -> Arc<dyn RenderPass> {
    device
        .create_render_pass(&RenderPassDesc::single_color(AttachmentDesc::render_target(
            TextureFormat::B8G8R8A8_UNORM,
        )))
        .unwrap()
}

#[test]
fn test_update_state_finalizes() {
    let ctx = context();
    let states = base_states(&ctx.device);
    let mut descriptor = populated_descriptor(&ctx.device, &states, direct_pass(&ctx.device));

    assert!(!descriptor.is_finalized());
    descriptor.update_state().unwrap();
    assert!(descriptor.is_finalized());
    assert_eq!(ctx.stats.lock().unwrap().created_pipelines, 1);
}

#[test]
fn test_update_state_missing_sub_state_fails() {
    let ctx = context();
    let states = base_states(&ctx.device);
    let mut descriptor = populated_descriptor(&ctx.device, &states, direct_pass(&ctx.device));

    // Rebuild without the blend state
    let mut incomplete = PipelineDescriptor::new(Arc::clone(&ctx.device));
    incomplete
        .set_input_assembly_state(Arc::clone(&states.input_assembly))
        .unwrap();
    incomplete
        .set_resource_layout(Arc::clone(descriptor.resource_layout()))
        .unwrap();
    incomplete
        .set_vertex_shader_state(Arc::clone(&states.vertex_shader))
        .unwrap();
    incomplete
        .set_pixel_shader_state(Arc::clone(&states.pixel_shader))
        .unwrap();
    incomplete
        .set_depth_stencil_state(Arc::clone(&states.depth_stencil))
        .unwrap();
    incomplete
        .set_rasterization_state(Arc::clone(&states.rasterization))
        .unwrap();
    incomplete
        .set_render_pass(Arc::clone(descriptor.render_pass()))
        .unwrap();

    match incomplete.update_state() {
        Err(Error::MissingSubState(slot)) => assert_eq!(slot, "blend state"),
        other => panic!("expected MissingSubState, got {:?}", other.map(|_| ())),
    }
    assert!(!incomplete.is_finalized());

    // No backend pipeline may exist for the failed build
    descriptor.update_state().unwrap();
    assert_eq!(ctx.stats.lock().unwrap().created_pipelines, 1);
}

#[test]
fn test_update_state_is_idempotent() {
    let ctx = context();
    let states = base_states(&ctx.device);
    let mut descriptor = populated_descriptor(&ctx.device, &states, direct_pass(&ctx.device));

    descriptor.update_state().unwrap();
    let first = Arc::clone(descriptor.graphics_pipeline());

    // Repeated finalization is a no-op and never re-creates the backend object
    descriptor.update_state().unwrap();
    descriptor.update_state().unwrap();

    assert!(Arc::ptr_eq(&first, descriptor.graphics_pipeline()));
    assert_eq!(ctx.stats.lock().unwrap().created_pipelines, 1);
}

#[test]
fn test_setters_rejected_after_finalize() {
    let ctx = context();
    let states = base_states(&ctx.device);
    let mut descriptor = populated_descriptor(&ctx.device, &states, direct_pass(&ctx.device));
    descriptor.update_state().unwrap();

    let result = descriptor.set_blend_state(Arc::new(BlendState::alpha()));
    assert!(matches!(result, Err(Error::DescriptorFinalized("blend state"))));

    let result = descriptor.set_sample_count(SampleCount::S4);
    assert!(matches!(result, Err(Error::DescriptorFinalized("sample count"))));
}

#[test]
fn test_identical_inputs_build_equal_descriptors() {
    let ctx = context();
    let states = base_states(&ctx.device);
    let render_pass = direct_pass(&ctx.device);

    let mut first = populated_descriptor(&ctx.device, &states, Arc::clone(&render_pass));
    let mut second = populated_descriptor(&ctx.device, &states, Arc::clone(&render_pass));

    first.update_state().unwrap();
    second.update_state().unwrap();

    // Deterministic build: both finalized, from structurally identical
    // (here: shared) sub-states
    assert!(first.is_finalized() && second.is_finalized());
    assert_eq!(
        first.input_assembly_state().unwrap(),
        second.input_assembly_state().unwrap()
    );
    assert!(Arc::ptr_eq(first.render_pass(), second.render_pass()));
    assert_eq!(first.sample_count(), second.sample_count());
}

#[test]
fn test_direct_and_multisample_descriptors_share_base_states() {
    let ctx = context();
    let states = base_states(&ctx.device);

    let mut direct = populated_descriptor(&ctx.device, &states, direct_pass(&ctx.device));

    let msaa_pass = ctx
        .device
        .create_render_pass(&RenderPassDesc::single_color(
            AttachmentDesc::multisampled_render_target(
                TextureFormat::B8G8R8A8_UNORM,
                SampleCount::S4,
            ),
        ))
        .unwrap();
    let mut msaa = populated_descriptor(&ctx.device, &states, msaa_pass);
    msaa.set_sample_count(SampleCount::S4).unwrap();

    direct.update_state().unwrap();
    msaa.update_state().unwrap();

    // Intentional aliasing: configuration-identical sub-states are shared by
    // reference so the two paths cannot diverge
    assert!(Arc::ptr_eq(
        direct.input_assembly_state().unwrap(),
        msaa.input_assembly_state().unwrap()
    ));

    // But each path caches its own pipeline object
    assert!(!Arc::ptr_eq(direct.graphics_pipeline(), msaa.graphics_pipeline()));
    assert_eq!(ctx.stats.lock().unwrap().created_pipelines, 2);
}

#[test]
#[should_panic(expected = "before update_state")]
fn test_graphics_pipeline_before_finalize_is_fatal() {
    let ctx = context();
    let descriptor = PipelineDescriptor::new(Arc::clone(&ctx.device));
    let _ = descriptor.graphics_pipeline();
}
