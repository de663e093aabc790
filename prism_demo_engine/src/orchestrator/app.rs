/// Application capability interface and run loop
///
/// Demo applications are not subclasses of anything: they implement the
/// two-method `Application` trait and the run loop drives them. Composition
/// replaces the deep virtual base class the framework grew out of.

use std::time::Instant;

use crate::error::Result;
use crate::gpu::CommandList;

/// The capability a demo application provides to the run loop
pub trait Application {
    /// Advance application state by `delta` seconds
    ///
    /// All writes to state shared with recording happen here; the render
    /// phase treats that state as a read-only snapshot for the rest of the
    /// cycle.
    fn update(&mut self, delta: f32) -> Result<()>;

    /// Record and present one frame
    fn render(&mut self, delta: f32) -> Result<()>;
}

/// UI overlay contract
///
/// The overlay library owns its widgets; the orchestrator only calls these
/// two hooks at fixed points: `update()` once per cycle before recording
/// begins, `draw()` once per pass the overlay must appear in (the main pass
/// in direct mode, the composite pass in multisample mode).
pub trait Overlay {
    /// Mutate overlay-bound state; called once per frame, before recording
    fn update(&mut self);

    /// Emit overlay draw commands inside an already-open render pass
    fn draw(&mut self, cmd: &mut dyn CommandList) -> Result<()>;
}

/// Drive an application's update/render cycle until `should_continue`
/// returns false
///
/// Delta time is measured per cycle; the first cycle sees a delta of zero.
/// Any error from either phase ends the loop immediately - a frame is a
/// whole success or a terminating failure.
pub fn run_loop<A, F>(app: &mut A, mut should_continue: F) -> Result<()>
where
    A: Application,
    F: FnMut() -> bool,
{
    let mut last = Instant::now();
    let mut delta = 0.0f32;

    while should_continue() {
        app.update(delta)?;
        app.render(delta)?;

        let now = Instant::now();
        delta = now.duration_since(last).as_secs_f32();
        last = now;
    }

    Ok(())
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
