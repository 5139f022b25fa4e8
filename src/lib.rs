pub mod api;
pub mod app;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod state;
pub mod ui;

pub use api::{ApiClient, resolve_base_url};
pub use app::router;
pub use state::AppState;
