//! Keyboard navigation through the book

use bevy::prelude::*;

use crate::book::BookNavigation;

/// Page asked for by a key, if the key navigates
pub fn keyboard_target(key: KeyCode, requested: usize, page_count: usize) -> Option<usize> {
    match key {
        KeyCode::ArrowRight | KeyCode::PageDown => Some((requested + 1).min(page_count)),
        KeyCode::ArrowLeft | KeyCode::PageUp => Some(requested.saturating_sub(1)),
        KeyCode::Home => Some(0),
        KeyCode::End => Some(page_count),
        _ => None,
    }
}

pub fn navigate_with_keyboard(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut navigation: ResMut<BookNavigation>,
) {
    for key in keyboard.get_just_pressed() {
        let Some(page) = keyboard_target(*key, navigation.requested(), navigation.page_count())
        else {
            continue;
        };
        if navigation.request(page) {
            debug!("{:?} requested page {}", key, page);
        }
    }
}
