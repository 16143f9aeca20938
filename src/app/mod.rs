//! App Module: operator-facing state and the send workflow.

mod state;
mod view_model;

pub use state::*;
pub use view_model::ViewModel;
