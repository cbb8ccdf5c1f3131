pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::config::{cli::LocalStorage, CliConfig, Settings};
pub use crate::core::{engine::MarksEngine, store::InMemoryMarksStore};
pub use crate::server::{router, serve, AppState};
pub use crate::utils::error::{MarksError, Result};
