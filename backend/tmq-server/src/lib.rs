pub mod app_state;
pub mod cli;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;


pub use crate::app_state::AppState;
pub use crate::cli::Cli;
pub use crate::error::{Result as ServerErrorResult, ServerError};
pub use crate::routes::build_router;
