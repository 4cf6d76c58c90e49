use bevy::prelude::*;

use crate::book::{BookPlugin, BookSet};
use crate::content::ContentPlugin;
use crate::core::state::AppView;
use crate::rendering::RenderingPlugin;
use crate::systems::{audio, input, lifecycle};
use crate::ui::theme::{WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use crate::ui::UiPlugin;

/// Configure the default Bevy plugins with custom settings
pub fn configure_default_plugins() -> bevy::app::PluginGroupBuilder {
    DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: WINDOW_TITLE.into(),
                resolution: (WINDOW_WIDTH, WINDOW_HEIGHT).into(),
                // Tell wasm to resize the window according to the available canvas
                fit_canvas_to_parent: true,
                // Tells wasm not to override default event handling, like F5, Ctrl+R etc.
                prevent_default_event_handling: false,
                ..default()
            }),
            ..default()
        })
        // Our own logger is installed before the app is built
        .build()
        .disable::<bevy::log::LogPlugin>()
}

/// Keyboard, sound and exit handling around the book
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, lifecycle::leave_view_on_esc)
            .add_systems(
                Update,
                input::navigate_with_keyboard
                    .before(BookSet::Pages)
                    .run_if(in_state(AppView::Home)),
            )
            .add_systems(
                Update,
                audio::play_page_flip
                    .after(BookSet::Pages)
                    .run_if(in_state(AppView::Home)),
            );
    }
}

/// Main application plugin that bundles all internal plugins
pub struct MemoryBookSystems;

impl Plugin for MemoryBookSystems {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            BookPlugin,
            ContentPlugin,
            RenderingPlugin,
            UiPlugin,
            InputPlugin,
        ));
    }
}
