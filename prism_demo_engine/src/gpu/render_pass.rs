/// RenderPass trait, render pass descriptor, and attachment descriptions
///
/// The attachment chain is where frame correctness lives: the final layout of
/// the attachment a pass writes must equal the initial layout expected by
/// whichever pass consumes it next. The named constructors below carry the
/// three configurations the orchestrator uses.

use crate::gpu::TextureFormat;

/// Multisample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SampleCount {
    /// 1 sample (no multisampling)
    S1,
    /// 2 samples
    S2,
    /// 4 samples
    S4,
    /// 8 samples
    S8,
}

impl SampleCount {
    /// Samples per pixel as a plain integer
    pub fn count(&self) -> u32 {
        match self {
            SampleCount::S1 => 1,
            SampleCount::S2 => 2,
            SampleCount::S4 => 4,
            SampleCount::S8 => 8,
        }
    }
}

/// Load operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    /// Load existing content (the composite pass uses this to preserve the
    /// resolved image under the overlay)
    Load,
    /// Clear the content
    Clear,
    /// Don't care about existing content
    DontCare,
}

/// Store operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Store the rendered content
    Store,
    /// Don't care about storing the content
    DontCare,
}

/// GPU-visible access mode of an attachment at a point in the command sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentLayout {
    /// Undefined (initial state, contents discardable)
    Undefined,
    /// Writable as a color render target
    RenderTarget,
    /// Writable as a depth/stencil attachment
    DepthStencil,
    /// General read access; the layout a resolve source is left in
    GeneralRead,
    /// Transfer source
    TransferSrc,
    /// Transfer destination
    TransferDst,
    /// Presentable to the swapchain
    Present,
}

/// Descriptor for a single attachment in a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDesc {
    /// Pixel format
    pub format: TextureFormat,
    /// Samples per pixel
    pub sample_count: SampleCount,
    /// Load operation
    pub load_op: LoadOp,
    /// Store operation
    pub store_op: StoreOp,
    /// Layout the attachment is in when the pass begins
    pub initial_layout: AttachmentLayout,
    /// Layout the pass transitions the attachment to when it ends
    pub final_layout: AttachmentLayout,
}

impl AttachmentDesc {
    /// Swapchain color attachment for a direct-mode pass: cleared, stored,
    /// and handed straight to present
    pub fn render_target(format: TextureFormat) -> Self {
        Self {
            format,
            sample_count: SampleCount::S1,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            initial_layout: AttachmentLayout::Undefined,
            final_layout: AttachmentLayout::Present,
        }
    }

    /// Offscreen multisampled color attachment: cleared, stored, and left in
    /// general-read so it can be the source of a resolve
    pub fn multisampled_render_target(format: TextureFormat, sample_count: SampleCount) -> Self {
        Self {
            format,
            sample_count,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            initial_layout: AttachmentLayout::Undefined,
            final_layout: AttachmentLayout::GeneralRead,
        }
    }

    /// Swapchain color attachment for the overlay-composite pass: loads the
    /// resolved contents, draws on top, then hands the image to present
    pub fn composite_over(format: TextureFormat) -> Self {
        Self {
            format,
            sample_count: SampleCount::S1,
            load_op: LoadOp::Load,
            store_op: StoreOp::Store,
            initial_layout: AttachmentLayout::GeneralRead,
            final_layout: AttachmentLayout::Present,
        }
    }

    /// Depth attachment: cleared each frame, contents not preserved
    pub fn depth(format: TextureFormat) -> Self {
        Self {
            format,
            sample_count: SampleCount::S1,
            load_op: LoadOp::Clear,
            store_op: StoreOp::DontCare,
            initial_layout: AttachmentLayout::Undefined,
            final_layout: AttachmentLayout::DepthStencil,
        }
    }

    /// Replace the final layout
    pub fn with_final_layout(mut self, layout: AttachmentLayout) -> Self {
        self.final_layout = layout;
        self
    }
}

/// Descriptor for creating a render pass
#[derive(Debug, Clone)]
pub struct RenderPassDesc {
    /// Color attachments, in attachment-index order
    pub color_attachments: Vec<AttachmentDesc>,
    /// Optional depth attachment
    pub depth_attachment: Option<AttachmentDesc>,
}

impl RenderPassDesc {
    /// Render pass over a single color attachment, no depth
    pub fn single_color(attachment: AttachmentDesc) -> Self {
        Self {
            color_attachments: vec![attachment],
            depth_attachment: None,
        }
    }
}

/// Render pass trait
///
/// Describes how attachments are loaded, stored, and transitioned during
/// rendering. Marker trait; backends wrap their native handle.
pub trait RenderPass: Send + Sync {}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
