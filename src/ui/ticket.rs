// Ticket view: a static panel in place of the ticket download

use bevy::prelude::*;

use crate::core::state::AppView;
use crate::ui::theme::*;

pub const TICKET_TITLE: &str = "Freshers Day 2025";
pub const TICKET_MESSAGE: &str = "Entry passes are handed out at the registration desk.";

pub fn spawn_ticket_view(mut commands: Commands) {
    commands.spawn((
        Name::new("Ticket View"),
        StateScoped(AppView::Ticket),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        children![(
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(PANEL_ROW_GAP),
                padding: UiRect::all(Val::Px(PANEL_PADDING)),
                border: UiRect::all(Val::Px(PANEL_BORDER_WIDTH)),
                ..default()
            },
            BackgroundColor(PANEL_BACKGROUND_COLOR),
            BorderColor(PANEL_BORDER_COLOR),
            children![
                (
                    Text::new(TICKET_TITLE),
                    TextFont {
                        font_size: TITLE_FONT_SIZE,
                        ..default()
                    },
                    TextColor(ACCENT_TEXT_COLOR),
                ),
                (
                    Text::new(TICKET_MESSAGE),
                    TextFont {
                        font_size: BODY_FONT_SIZE,
                        ..default()
                    },
                    TextColor(TEXT_COLOR),
                ),
            ],
        )],
    ));
}
