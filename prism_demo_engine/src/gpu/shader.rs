/// Shader trait, shader descriptor, and the shader compiler contract

use std::path::Path;

use crate::error::{Error, Result};

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Pixel (fragment) stage
    Pixel,
}

/// Descriptor for creating a shader module
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    /// Pipeline stage the bytecode targets
    pub stage: ShaderStage,
    /// Backend-specific bytecode (SPIR-V for the Vulkan backend)
    pub bytecode: Vec<u8>,
}

/// Shader module trait
///
/// Marker trait; backends wrap their native module handle.
pub trait Shader: Send + Sync {}

/// Source-to-bytecode compiler contract
///
/// Compilation is an external collaborator: the core only defines the
/// contract and treats failure as fatal at initialization.
pub trait ShaderCompiler {
    /// Compile shader source text for the given stage into backend bytecode
    fn compile(&self, stage: ShaderStage, source: &str) -> Result<Vec<u8>>;
}

/// Read shader source text from disk
///
/// Demos reference shaders by a simple path convention (e.g.
/// `shaders/triangle.vert`). A missing or unreadable file aborts app start.
pub fn read_shader_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        Error::InitializationFailed(format!(
            "Failed to read shader source '{}': {}",
            path.display(),
            e
        ))
    })
}
