//! Core application functionality
//!
//! This module contains the core application logic, including:
//! - Application initialization and configuration
//! - View state and the selected picture
//! - Settings and CLI handling
//! - Error handling

pub mod app;
pub mod cli;
pub mod errors;
pub mod settings;
pub mod state;

// Re-export commonly used items
pub use app::create_app;
pub use cli::CliArgs;
pub use state::{AppView, SelectedPage};
