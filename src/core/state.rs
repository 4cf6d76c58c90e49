//! Application state shared across the book, the HUD and the views.
//!
//! Every page instance reads the same navigation resource each frame, so the
//! whole book always agrees on which page is showing.

use bevy::prelude::*;

/// Which screen is showing. The animated book only exists in `Home`.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppView {
    #[default]
    Home,
    Ticket,
    Detail,
}

/// Picture shown by the detail view
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedPage(pub Option<String>);

impl SelectedPage {
    pub fn select(&mut self, id: impl Into<String>) {
        self.0 = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}
