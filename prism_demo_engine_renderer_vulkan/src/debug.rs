/// Vulkan debug messenger - validation layer messages with colored output
///
/// Compiled only with the `vulkan-validation` feature. The callback counts
/// messages per severity and groups identical messages so a frame loop that
/// trips the same warning every cycle does not flood the console.

use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use ash::vk;
use colored::*;
use rustc_hash::FxHashMap;

use prism_demo_engine::prism::{Error, Result};

/// Validation message counts per severity
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

/// Thread-safe validation statistics tracker
struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn get(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }
}

static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Occurrence count per unique message, for grouping repeats
static MESSAGE_COUNTS: Mutex<Option<FxHashMap<String, u32>>> = Mutex::new(None);

/// Get the accumulated validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get()
}

/// Print a summary of validation messages seen so far
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();
    println!("{}", "=== Vulkan validation report ===".bold());
    println!("  errors:   {}", stats.errors.to_string().red());
    println!("  warnings: {}", stats.warnings.to_string().yellow());
    println!("  info:     {}", stats.info);
    println!("  verbose:  {}", stats.verbose);

    if let Ok(counts) = MESSAGE_COUNTS.lock() {
        if let Some(counts) = counts.as_ref() {
            let repeated: Vec<_> = counts.iter().filter(|(_, c)| **c > 1).collect();
            if !repeated.is_empty() {
                println!("  repeated messages:");
                for (message, count) in repeated {
                    println!("    {}x {}", count, message);
                }
            }
        }
    }
}

unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = if callback_data.is_null() || (*callback_data).p_message.is_null() {
        String::from("<no message>")
    } else {
        CStr::from_ptr((*callback_data).p_message)
            .to_string_lossy()
            .into_owned()
    };

    // Count and dedupe; only the first occurrence of a message prints
    let first_occurrence = {
        let mut counts = MESSAGE_COUNTS.lock().unwrap_or_else(|e| e.into_inner());
        let counts = counts.get_or_insert_with(FxHashMap::default);
        let entry = counts.entry(message.clone()).or_insert(0);
        *entry += 1;
        *entry == 1
    };

    match severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            VALIDATION_STATS.errors.fetch_add(1, Ordering::Relaxed);
            if first_occurrence {
                eprintln!("{} {}", "[vulkan error]".red().bold(), message);
            }
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            VALIDATION_STATS.warnings.fetch_add(1, Ordering::Relaxed);
            if first_occurrence {
                eprintln!("{} {}", "[vulkan warning]".yellow(), message);
            }
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            VALIDATION_STATS.info.fetch_add(1, Ordering::Relaxed);
        }
        _ => {
            VALIDATION_STATS.verbose.fetch_add(1, Ordering::Relaxed);
        }
    }

    vk::FALSE
}

/// Create the debug messenger for a validation-enabled instance
pub(crate) fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    let loader = ash::ext::debug_utils::Instance::new(entry, instance);

    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    unsafe {
        let messenger = loader
            .create_debug_utils_messenger(&create_info, None)
            .map_err(|e| {
                Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
            })?;

        Ok((loader, messenger))
    }
}
