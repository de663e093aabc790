/// Texture trait, texture descriptor, and texture info

use crate::gpu::SampleCount;

/// Texture and vertex attribute format
///
/// Pixel formats come from the fixed set the demo family uses; the SFLOAT
/// entries double as vertex attribute formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // Color formats
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,

    // Depth formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,

    // Vertex attribute formats
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,
}

impl TextureFormat {
    /// Returns true for the depth/stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT
        )
    }
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as render target
    RenderTarget,
    /// Texture can be used for both
    SampledAndRenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Samples per pixel (S1 for everything except multisampled render targets)
    pub sample_count: SampleCount,
    /// Optional initial pixel data to upload at creation time
    pub data: Option<Vec<u8>>,
}

impl TextureDesc {
    /// Descriptor for an offscreen multisampled render target
    ///
    /// This is the source side of a resolve; the destination is a plain
    /// single-sample presentable image.
    pub fn multisampled_render_target(
        width: u32,
        height: u32,
        format: TextureFormat,
        sample_count: SampleCount,
    ) -> Self {
        Self {
            width,
            height,
            format,
            usage: TextureUsage::RenderTarget,
            sample_count,
            data: None,
        }
    }

    /// Descriptor for a sampled texture uploaded from CPU data
    pub fn sampled(width: u32, height: u32, format: TextureFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            usage: TextureUsage::Sampled,
            sample_count: SampleCount::S1,
            data: Some(data),
        }
    }
}

/// Read-only properties of a created texture
///
/// Returned by `Texture::info()` to query texture properties without exposing
/// backend-specific details. The sample count is what the resolve contract is
/// checked against.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Samples per pixel
    pub sample_count: SampleCount,
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types. The texture is destroyed
/// when dropped; the drop must happen behind the teardown wait-idle barrier.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
