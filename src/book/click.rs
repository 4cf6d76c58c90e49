//! Single versus double click on a page
//!
//! Both gestures land on the same leaf. The first click starts a short
//! window; a second click inside it opens the detail view, otherwise the
//! window runs out and the click turns the page.

use std::time::Duration;

use bevy::prelude::*;

use crate::core::settings::DOUBLE_CLICK_WINDOW;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Turn to the next page (or back to this one if it is already turned)
    Advance,
    /// Show the visible side of the page in the detail view
    OpenDetail,
}

#[derive(Component, Debug, Clone, Default)]
pub struct ClickDisambiguator {
    /// Running only while waiting for a possible second click
    window: Option<Timer>,
}

impl ClickDisambiguator {
    pub fn click(&mut self) -> Option<ClickAction> {
        match self.window.take() {
            Some(_) => Some(ClickAction::OpenDetail),
            None => {
                self.window = Some(Timer::new(DOUBLE_CLICK_WINDOW, TimerMode::Once));
                None
            }
        }
    }

    pub fn tick(&mut self, delta: Duration) -> Option<ClickAction> {
        let timer = self.window.as_mut()?;
        timer.tick(delta);
        if timer.finished() {
            self.window = None;
            Some(ClickAction::Advance)
        } else {
            None
        }
    }
}
