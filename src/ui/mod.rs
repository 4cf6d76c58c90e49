//! User interface: the HUD over the book and the detail and ticket views

pub mod buttons;
pub mod detail;
pub mod hud;
pub mod theme;
pub mod ticket;

use bevy::prelude::*;

use crate::core::state::AppView;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.enable_state_scoped_entities::<AppView>()
            .add_systems(Startup, hud::spawn_view_selector)
            .add_systems(OnEnter(AppView::Home), hud::spawn_page_button_row)
            .add_systems(OnEnter(AppView::Detail), detail::spawn_detail_view)
            .add_systems(OnExit(AppView::Detail), detail::clear_selection)
            .add_systems(OnEnter(AppView::Ticket), ticket::spawn_ticket_view)
            .add_systems(
                Update,
                (
                    buttons::handle_view_buttons,
                    buttons::style_buttons,
                    hud::rebuild_page_buttons,
                ),
            )
            .add_systems(
                Update,
                buttons::handle_page_buttons.run_if(in_state(AppView::Home)),
            )
            .add_systems(
                Update,
                (detail::handle_back_button, detail::finish_detail_image)
                    .run_if(in_state(AppView::Detail)),
            );
    }
}
