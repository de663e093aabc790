//! Unit tests for the application capability interface and run loop

use crate::error::{Error, Result};
use crate::orchestrator::{run_loop, Application};

struct CountingApp {
    updates: usize,
    renders: usize,
    fail_update_at: Option<usize>,
}

impl CountingApp {
    fn new() -> Self {
        Self {
            updates: 0,
            renders: 0,
            fail_update_at: None,
        }
    }
}

impl Application for CountingApp {
    fn update(&mut self, _delta: f32) -> Result<()> {
        self.updates += 1;
        if self.fail_update_at == Some(self.updates) {
            return Err(Error::DeviceLost("test".to_string()));
        }
        Ok(())
    }

    fn render(&mut self, _delta: f32) -> Result<()> {
        // Update must always precede render within a cycle
        assert_eq!(self.updates, self.renders + 1);
        self.renders += 1;
        Ok(())
    }
}

#[test]
fn test_run_loop_drives_update_then_render() {
    let mut app = CountingApp::new();
    let mut remaining = 5;

    run_loop(&mut app, || {
        if remaining == 0 {
            return false;
        }
        remaining -= 1;
        true
    })
    .unwrap();

    assert_eq!(app.updates, 5);
    assert_eq!(app.renders, 5);
}

#[test]
fn test_run_loop_zero_cycles() {
    let mut app = CountingApp::new();
    run_loop(&mut app, || false).unwrap();
    assert_eq!(app.updates, 0);
    assert_eq!(app.renders, 0);
}

#[test]
fn test_run_loop_stops_on_error() {
    // A failing cycle terminates the loop; there is no partial-frame recovery
    let mut app = CountingApp::new();
    app.fail_update_at = Some(3);

    let result = run_loop(&mut app, || true);

    assert!(matches!(result, Err(Error::DeviceLost(_))));
    assert_eq!(app.updates, 3);
    assert_eq!(app.renders, 2);
}
