/// Prism Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the GPU device and the
/// logger. It uses thread-safe static storage with RwLock for safe concurrent
/// access, although the render cycle itself is single-threaded.

use std::sync::{OnceLock, RwLock, Arc};
use std::time::SystemTime;
use winit::window::Window;

use crate::gpu::{GpuDevice, DeviceConfig, backend_registry};
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// GPU device singleton
    device: RwLock<Option<Arc<dyn GpuDevice>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            device: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of the GPU device singleton and the global logger.
/// Demo applications call `initialize()`, create a device through a registered
/// backend, run their update/render cycle, and `shutdown()` at exit.
///
/// The engine never waits on the GPU itself: the teardown wait-idle barrier is
/// the responsibility of the components that own GPU objects (the orchestrator
/// and the registry), which release them before the device is dropped.
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::prism_error!("prism::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::prism_error!("prism::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::prism_error!("prism::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating the
    /// device. Idempotent.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the entire engine and drop the device singleton
    ///
    /// Callers must have released all GPU objects (behind the wait-idle
    /// barrier) before calling this.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
        }
    }

    /// Create the device singleton through a registered backend
    ///
    /// The backend is a runtime strategy selected by name, registered by the
    /// backend crate (e.g. "vulkan"). The device is stored as the singleton
    /// and also returned for direct use.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A device already exists
    /// - The named backend is not registered, or its factory fails
    pub fn create_device(
        backend: &str,
        window: &Window,
        config: DeviceConfig,
    ) -> Result<Arc<dyn GpuDevice>> {
        let registry = backend_registry().lock().map_err(|_| {
            Self::log_and_return_error(Error::BackendError("Backend registry lock poisoned".to_string()))
        })?;

        let device = registry
            .as_ref()
            .ok_or_else(|| {
                Self::log_and_return_error(Error::InitializationFailed(
                    "No backends registered".to_string(),
                ))
            })?
            .create_device(backend, window, &config)?;

        drop(registry);

        Self::register_device(Arc::clone(&device))?;

        crate::prism_info!("prism::Engine", "Device created through '{}' backend", backend);

        Ok(device)
    }

    /// Register an already-constructed device as the singleton
    ///
    /// Used by tests (with a mock device) and by applications that construct a
    /// backend directly instead of going through the registry.
    pub fn register_device(device: Arc<dyn GpuDevice>) -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let mut lock = state.device.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError("Device lock poisoned".to_string()))
        })?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "Device already exists. Call Engine::destroy_device() first.".to_string(),
            )));
        }

        *lock = Some(device);
        Ok(())
    }

    /// Get the device singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or no device has
    /// been created.
    pub fn device() -> Result<Arc<dyn GpuDevice>> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let lock = state.device.read().map_err(|_| {
            Self::log_and_return_error(Error::BackendError("Device lock poisoned".to_string()))
        })?;

        lock.clone().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Device not created. Call Engine::create_device() first.".to_string(),
            ))
        })
    }

    /// Destroy the device singleton
    ///
    /// Removes the singleton, allowing a new one to be created. Existing
    /// references remain valid until dropped; the caller is responsible for
    /// the wait-idle barrier before the last reference goes away.
    pub fn destroy_device() -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized".to_string(),
            ))
        })?;

        let mut lock = state.device.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError("Device lock poisoned".to_string()))
        })?;

        *lock = None;

        crate::prism_info!("prism::Engine", "Device singleton destroyed");

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like prism_info!, prism_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by the prism_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
