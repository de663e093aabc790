/// Swapchain trait

use std::sync::Arc;

use crate::error::Result;
use crate::gpu::{Texture, TextureFormat};

/// Swapchain trait
///
/// Owns the presentable images. The ring wraps each image in a framebuffer at
/// setup; `buffer(index)` exposes the image itself so the resolve stage can
/// target it as a resolve destination.
pub trait Swapchain: Send + Sync {
    /// Get the presentable image at the given buffer index
    fn buffer(&self, index: usize) -> Arc<dyn Texture>;

    /// Number of presentable images
    fn buffer_count(&self) -> usize;

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Pixel format of the presentable images
    fn format(&self) -> TextureFormat;

    /// Present the image rendered this frame
    ///
    /// May block on display vertical sync. Failure is fatal; the orchestrator
    /// never retries or recreates (resize and device loss are out of scope).
    fn present(&mut self) -> Result<()>;
}
