pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod sweeper;

#[cfg(test)]
mod tests;

pub use api::{error::ApiError, error::Result as ApiResult};
pub use app_state::{AppState, Services};
pub use error::{Result, ServerError};
pub use routes::build_router;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use sweeper::{spawn_sweeper, sweep_once};
