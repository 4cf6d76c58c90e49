//! Bevy Systems and Plugins
//!
//! This module contains the systems that sit around the book:
//! - Plugin management and configuration
//! - Keyboard navigation and leaving views
//! - The page flip sound

pub mod audio;
pub mod input;
pub mod lifecycle;
pub mod plugins;

// Re-export commonly used items
pub use plugins::{configure_default_plugins, MemoryBookSystems};
