//! Unit tests for error.rs

use crate::error::Error;
use crate::gpu::SampleCount;

#[test]
fn test_error_display_resource_creation() {
    let err = Error::ResourceCreation("bad extent".to_string());
    assert_eq!(format!("{}", err), "Resource creation failed: bad extent");
}

#[test]
fn test_error_display_missing_sub_state() {
    let err = Error::MissingSubState("render pass");
    let msg = format!("{}", err);
    assert!(msg.contains("render pass"));
    assert!(msg.contains("without required sub-state"));
}

#[test]
fn test_error_display_descriptor_finalized() {
    let err = Error::DescriptorFinalized("blend state");
    assert!(format!("{}", err).contains("finalized pipeline descriptor"));
}

#[test]
fn test_error_display_resolve_contract() {
    let err = Error::ResolveContract {
        source: SampleCount::S1,
        destination: SampleCount::S1,
    };
    let msg = format!("{}", err);
    assert!(msg.contains("S1"));
    assert!(msg.contains("must exceed"));
}

#[test]
fn test_error_display_present_failure() {
    let err = Error::PresentFailure("swapchain out of date".to_string());
    assert!(format!("{}", err).contains("swapchain out of date"));
}

#[test]
fn test_error_is_std_error() {
    // Errors must be usable behind a dyn std::error::Error
    let err: Box<dyn std::error::Error> = Box::new(Error::DeviceLost("gone".to_string()));
    assert!(err.to_string().contains("Device lost"));
}

#[test]
fn test_error_clone() {
    let err = Error::BackendError("vk".to_string());
    let cloned = err.clone();
    assert_eq!(format!("{}", err), format!("{}", cloned));
}
