//! Buttons shared by the HUD and the views

use bevy::prelude::*;

use crate::book::BookNavigation;
use crate::core::state::AppView;
use crate::ui::theme::*;

/// Asks the book for a page
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton(pub usize);

/// Switches to another view
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewButton(pub AppView);

/// A button with the standard look and a text label
pub fn labeled_button(label: impl Into<String>) -> impl Bundle {
    (
        Button,
        Node {
            padding: UiRect::axes(Val::Px(BUTTON_PADDING_X), Val::Px(BUTTON_PADDING_Y)),
            border: UiRect::all(Val::Px(BUTTON_BORDER_WIDTH)),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BorderColor(NORMAL_BUTTON_OUTLINE_COLOR),
        BackgroundColor(NORMAL_BUTTON),
        children![(
            Text::new(label),
            TextFont {
                font_size: BUTTON_FONT_SIZE,
                ..default()
            },
            TextColor(TEXT_COLOR),
        )],
    )
}

fn button_colors(interaction: Interaction, active: bool) -> (Color, Color) {
    match (interaction, active) {
        (Interaction::Pressed, _) | (_, true) => (PRESSED_BUTTON, PRESSED_BUTTON_OUTLINE_COLOR),
        (Interaction::Hovered, false) => (HOVERED_BUTTON, HOVERED_BUTTON_OUTLINE_COLOR),
        (Interaction::None, false) => (NORMAL_BUTTON, NORMAL_BUTTON_OUTLINE_COLOR),
    }
}

/// Colors every button by its interaction, keeping the requested page and
/// the current view highlighted
#[allow(clippy::type_complexity)]
pub fn style_buttons(
    navigation: Res<BookNavigation>,
    view: Res<State<AppView>>,
    mut buttons: Query<
        (
            Entity,
            &Interaction,
            &mut BackgroundColor,
            &mut BorderColor,
            Option<&PageButton>,
            Option<&ViewButton>,
        ),
        With<Button>,
    >,
    mut labels: Query<(&ChildOf, &mut TextColor)>,
) {
    let mut label_colors = Vec::new();
    for (entity, interaction, mut background, mut border, page, target_view) in &mut buttons {
        let active = page.is_some_and(|p| p.0 == navigation.requested())
            || target_view.is_some_and(|v| v.0 == *view.get());
        let (fill, outline) = button_colors(*interaction, active);
        if background.0 != fill {
            background.0 = fill;
        }
        if border.0 != outline {
            border.0 = outline;
        }
        let text = if active {
            PRESSED_BUTTON_TEXT_COLOR
        } else {
            TEXT_COLOR
        };
        label_colors.push((entity, text));
    }

    for (child_of, mut color) in &mut labels {
        let Some((_, text)) = label_colors.iter().find(|(button, _)| *button == child_of.parent())
        else {
            continue;
        };
        if color.0 != *text {
            color.0 = *text;
        }
    }
}

pub fn handle_page_buttons(
    buttons: Query<(&Interaction, &PageButton), Changed<Interaction>>,
    mut navigation: ResMut<BookNavigation>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed && navigation.request(button.0) {
            debug!("Page button requested page {}", button.0);
        }
    }
}

pub fn handle_view_buttons(
    buttons: Query<(&Interaction, &ViewButton), Changed<Interaction>>,
    view: Res<State<AppView>>,
    mut next_view: ResMut<NextState<AppView>>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed && *view.get() != button.0 {
            info!("Switching to the {:?} view", button.0);
            next_view.set(button.0);
        }
    }
}
