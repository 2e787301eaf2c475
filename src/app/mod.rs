mod state;
mod ui;

pub use state::{Dashboard, FetchApplied, GenerationRequest, Notice, Phase, RefreshRequest};
pub use ui::{draw_ui, spawn_refresh, App, AppWrapper};
