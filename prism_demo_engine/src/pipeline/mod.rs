/// Pipeline module - immutable pipeline sub-states and the descriptor builder

// Module declarations
pub mod state;
pub mod descriptor;

// Re-export everything
pub use state::*;
pub use descriptor::*;
