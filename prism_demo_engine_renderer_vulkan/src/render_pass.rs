/// Vulkan render pass implementation
///
/// Builds a single-subpass VkRenderPass from the core's attachment chain
/// description. The initial/final layouts in the description are mapped
/// verbatim: the render pass itself performs the transitions the frame's
/// pass chain relies on (render-target to general-read for a resolve source,
/// render-target to present for the last pass of a frame).

use std::sync::Arc;

use ash::vk;

use prism_demo_engine::prism::gpu::{LoadOp, RenderPass, RenderPassDesc, StoreOp};
use prism_demo_engine::prism::{Error, Result};

use crate::context::GpuContext;
use crate::resources::{vk_format, vk_image_layout, vk_sample_count};

fn vk_load_op(op: LoadOp) -> vk::AttachmentLoadOp {
    match op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

fn vk_store_op(op: StoreOp) -> vk::AttachmentStoreOp {
    match op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

/// Vulkan render pass wrapper
pub struct VulkanRenderPass {
    ctx: Arc<GpuContext>,
    pub(crate) render_pass: vk::RenderPass,
}

impl VulkanRenderPass {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &RenderPassDesc) -> Result<Self> {
        let mut attachments = Vec::new();
        let mut color_refs = Vec::new();

        for attachment in &desc.color_attachments {
            color_refs.push(
                vk::AttachmentReference::default()
                    .attachment(attachments.len() as u32)
                    .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
            );
            attachments.push(
                vk::AttachmentDescription::default()
                    .format(vk_format(attachment.format))
                    .samples(vk_sample_count(attachment.sample_count))
                    .load_op(vk_load_op(attachment.load_op))
                    .store_op(vk_store_op(attachment.store_op))
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk_image_layout(attachment.initial_layout))
                    .final_layout(vk_image_layout(attachment.final_layout)),
            );
        }

        let depth_ref = desc.depth_attachment.as_ref().map(|attachment| {
            let reference = vk::AttachmentReference::default()
                .attachment(attachments.len() as u32)
                .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);
            attachments.push(
                vk::AttachmentDescription::default()
                    .format(vk_format(attachment.format))
                    .samples(vk_sample_count(attachment.sample_count))
                    .load_op(vk_load_op(attachment.load_op))
                    .store_op(vk_store_op(attachment.store_op))
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk_image_layout(attachment.initial_layout))
                    .final_layout(vk_image_layout(attachment.final_layout)),
            );
            reference
        });

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs);
        if let Some(depth_ref) = &depth_ref {
            subpass = subpass.depth_stencil_attachment(depth_ref);
        }
        let subpasses = [subpass];

        // One external dependency so the pass waits for any prior output to
        // the same attachments
        let dependencies = [vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)];

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        unsafe {
            let render_pass = ctx.device.create_render_pass(&create_info, None).map_err(|e| {
                Error::ResourceCreation(format!("Failed to create render pass: {:?}", e))
            })?;

            Ok(Self { ctx, render_pass })
        }
    }
}

impl RenderPass for VulkanRenderPass {}

impl Drop for VulkanRenderPass {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
