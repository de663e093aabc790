/// Vulkan graphics pipeline implementation
///
/// Translates a finalized descriptor's sub-states into one
/// VkGraphicsPipelineCreateInfo. Viewport and scissor are dynamic state: the
/// orchestrator sets them per frame from the target framebuffer.

use std::ffi::CString;
use std::sync::Arc;

use ash::vk;

use prism_demo_engine::prism::gpu::Pipeline;
use prism_demo_engine::prism::pipeline::{
    BlendFactor, BlendOp, CompareOp, CullMode, FrontFace, GraphicsPipelineDesc,
    PrimitiveTopology, VertexInputRate,
};
use prism_demo_engine::prism::{Error, Result};
use prism_demo_engine::prism_error;

use crate::context::GpuContext;
use crate::render_pass::VulkanRenderPass;
use crate::resources::{vk_format, vk_sample_count, VulkanResourceLayout, VulkanShader};

fn vk_topology(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
    }
}

fn vk_cull_mode(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

fn vk_front_face(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

fn vk_compare_op(op: CompareOp) -> vk::CompareOp {
    match op {
        CompareOp::Never => vk::CompareOp::NEVER,
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::Equal => vk::CompareOp::EQUAL,
        CompareOp::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Greater => vk::CompareOp::GREATER,
        CompareOp::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareOp::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

fn vk_blend_factor(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
    }
}

fn vk_blend_op(op: BlendOp) -> vk::BlendOp {
    match op {
        BlendOp::Add => vk::BlendOp::ADD,
        BlendOp::Subtract => vk::BlendOp::SUBTRACT,
    }
}

/// Vulkan pipeline wrapper
///
/// The pipeline layout handle is a copy owned by the resource layout; only
/// the pipeline itself is destroyed here.
pub struct VulkanPipeline {
    ctx: Arc<GpuContext>,
    pub(crate) pipeline: vk::Pipeline,
    pub(crate) pipeline_layout: vk::PipelineLayout,
}

impl VulkanPipeline {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &GraphicsPipelineDesc) -> Result<Self> {
        // Downcast the sub-state trait objects to their Vulkan types
        let resource_layout = unsafe {
            let ptr = desc.resource_layout.as_ref() as *const dyn prism_demo_engine::prism::gpu::ResourceLayout
                as *const VulkanResourceLayout;
            &*ptr
        };
        let render_pass = unsafe {
            let ptr = desc.render_pass.as_ref() as *const dyn prism_demo_engine::prism::gpu::RenderPass
                as *const VulkanRenderPass;
            &*ptr
        };
        let vertex_module = unsafe {
            let ptr = desc.vertex_shader.module.as_ref() as *const dyn prism_demo_engine::prism::gpu::Shader
                as *const VulkanShader;
            (*ptr).module
        };
        let pixel_module = unsafe {
            let ptr = desc.pixel_shader.module.as_ref() as *const dyn prism_demo_engine::prism::gpu::Shader
                as *const VulkanShader;
            (*ptr).module
        };

        let vertex_entry = CString::new(desc.vertex_shader.entry_point.as_str())
            .map_err(|_| Error::ResourceCreation("Invalid vertex entry point".to_string()))?;
        let pixel_entry = CString::new(desc.pixel_shader.entry_point.as_str())
            .map_err(|_| Error::ResourceCreation("Invalid pixel entry point".to_string()))?;

        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_module)
                .name(&vertex_entry),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(pixel_module)
                .name(&pixel_entry),
        ];

        let layout = &desc.input_assembly.layout;
        let binding_descriptions: Vec<vk::VertexInputBindingDescription> = layout
            .bindings
            .iter()
            .map(|binding| {
                vk::VertexInputBindingDescription::default()
                    .binding(binding.binding)
                    .stride(binding.stride)
                    .input_rate(match binding.input_rate {
                        VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
                        VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
                    })
            })
            .collect();
        let attribute_descriptions: Vec<vk::VertexInputAttributeDescription> = layout
            .attributes
            .iter()
            .map(|attribute| {
                vk::VertexInputAttributeDescription::default()
                    .location(attribute.location)
                    .binding(attribute.binding)
                    .format(vk_format(attribute.format))
                    .offset(attribute.offset)
            })
            .collect();

        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk_topology(desc.input_assembly.topology))
            .primitive_restart_enable(false);

        // Viewport and scissor are dynamic; only the counts matter here
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk_cull_mode(desc.rasterization.cull_mode))
            .front_face(vk_front_face(desc.rasterization.front_face))
            .depth_bias_enable(false)
            .line_width(1.0);

        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk_sample_count(desc.sample_count))
            .sample_shading_enable(false);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(desc.depth_stencil.depth_test_enable)
            .depth_write_enable(desc.depth_stencil.depth_write_enable)
            .depth_compare_op(vk_compare_op(desc.depth_stencil.depth_compare_op))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(desc.depth_stencil.stencil_test_enable);

        let blend = desc.blend.as_ref();
        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .blend_enable(blend.blend_enable)
            .src_color_blend_factor(vk_blend_factor(blend.src_color_factor))
            .dst_color_blend_factor(vk_blend_factor(blend.dst_color_factor))
            .color_blend_op(vk_blend_op(blend.color_blend_op))
            .src_alpha_blend_factor(vk_blend_factor(blend.src_alpha_factor))
            .dst_alpha_blend_factor(vk_blend_factor(blend.dst_alpha_factor))
            .alpha_blend_op(vk_blend_op(blend.alpha_blend_op))
            .color_write_mask(vk::ColorComponentFlags::RGBA)];

        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic_state)
            .layout(resource_layout.pipeline_layout)
            .render_pass(render_pass.render_pass)
            .subpass(0);

        unsafe {
            let pipelines = ctx
                .device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
                .map_err(|(_, e)| {
                    prism_error!("prism::vulkan", "Failed to create graphics pipeline: {:?}", e);
                    Error::ResourceCreation(format!("Failed to create graphics pipeline: {:?}", e))
                })?;

            Ok(Self {
                ctx,
                pipeline: pipelines[0],
                pipeline_layout: resource_layout.pipeline_layout,
            })
        }
    }
}

impl Pipeline for VulkanPipeline {}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
        }
    }
}
