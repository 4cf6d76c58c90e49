//! A three dimensional memory book made with the Bevy game engine.

pub mod book;
pub mod content;
pub mod core;
pub mod rendering;
pub mod systems;
pub mod ui;
pub mod utils;

pub use crate::core::{create_app, CliArgs};
