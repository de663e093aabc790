/*!
# Prism Demo Engine

Per-frame render orchestration core shared by the Prism GPU demo applications.

This crate provides the platform-agnostic rendering API using trait-based
dynamic polymorphism. Backend implementations (Vulkan, and possibly others
later) are selected at runtime via the backend registry.

## Architecture

- **GpuDevice**: factory trait for GPU resources (buffers, textures, render
  passes, pipelines, swapchains, command objects)
- **PipelineDescriptor**: builder for immutable, finalized pipeline bundles
- **FrameRing / GpuRegistry**: fixed ring of per-frame resource slots backed
  by an owning handle registry
- **RenderOrchestrator**: the per-frame state machine (synchronize, record,
  submit, present, advance), with an optional multisample resolve path

Backend implementations provide concrete types that implement the traits in
[`gpu`].
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod gpu;
pub mod pipeline;
pub mod frame;
pub mod orchestrator;

// Main prism namespace module
pub mod prism {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: prism_* macros are NOT re-exported here - they live at the crate root
    }

    // GPU abstraction sub-module
    pub mod gpu {
        pub use crate::gpu::*;
    }

    // Pipeline descriptor sub-module
    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    // Frame resources sub-module
    pub mod frame {
        pub use crate::frame::*;
    }

    // Render orchestration sub-module
    pub mod render {
        pub use crate::orchestrator::*;
    }
}

// Re-export math library at crate root
pub use glam;
