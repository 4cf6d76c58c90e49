// The heads-up display over the book: the title, the view selector and a
// row of page buttons. The view selector lives for the whole session, the
// page buttons only while the book is open.

use bevy::prelude::*;

use crate::book::PageCatalog;
use crate::core::state::AppView;
use crate::ui::buttons::{labeled_button, PageButton, ViewButton};
use crate::ui::theme::*;

/// Row holding one button per leaf plus the back cover
#[derive(Component)]
pub struct PageButtonRow;

/// Label of the button that opens leaf `index`
pub fn page_button_label(index: usize) -> String {
    if index == 0 {
        "Cover".to_string()
    } else {
        format!("Page {index}")
    }
}

/// Every page button as (requested page, label), ending with the back cover
pub fn page_buttons(page_count: usize) -> Vec<(usize, String)> {
    (0..page_count)
        .map(|index| (index, page_button_label(index)))
        .chain(std::iter::once((page_count, "Back Cover".to_string())))
        .collect()
}

pub fn spawn_view_selector(mut commands: Commands) {
    commands.spawn((
        Name::new("View Selector"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(HUD_MARGIN),
            left: Val::Px(HUD_MARGIN),
            right: Val::Px(HUD_MARGIN),
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: Val::Px(HUD_ITEM_SPACING),
            ..default()
        },
        children![
            (
                Text::new(WINDOW_TITLE),
                TextFont {
                    font_size: HEADING_FONT_SIZE,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                Node {
                    margin: UiRect::right(Val::Auto),
                    ..default()
                },
            ),
            (labeled_button("Home"), ViewButton(AppView::Home)),
            (labeled_button("Ticket"), ViewButton(AppView::Ticket)),
        ],
    ));
}

pub fn spawn_page_button_row(mut commands: Commands) {
    commands.spawn((
        Name::new("Page Buttons"),
        PageButtonRow,
        StateScoped(AppView::Home),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(HUD_MARGIN),
            left: Val::Px(HUD_MARGIN),
            right: Val::Px(HUD_MARGIN),
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Wrap,
            justify_content: JustifyContent::Center,
            column_gap: Val::Px(HUD_ITEM_SPACING),
            row_gap: Val::Px(HUD_ITEM_SPACING),
            ..default()
        },
    ));
}

/// Rebuilds the page buttons whenever the catalog or the row changes
pub fn rebuild_page_buttons(
    mut commands: Commands,
    catalog: Res<PageCatalog>,
    rows: Query<Entity, With<PageButtonRow>>,
    new_rows: Query<(), Added<PageButtonRow>>,
) {
    if !catalog.is_changed() && new_rows.is_empty() {
        return;
    }
    for row in &rows {
        commands.entity(row).despawn_related::<Children>();
        commands.entity(row).with_children(|row| {
            for (page, label) in page_buttons(catalog.len()) {
                row.spawn((labeled_button(label), PageButton(page)));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_cover_every_leaf_and_the_back_cover() {
        let buttons = page_buttons(4);
        let labels: Vec<&str> = buttons.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Cover", "Page 1", "Page 2", "Page 3", "Back Cover"]
        );
        assert_eq!(buttons.last().map(|(page, _)| *page), Some(4));
    }
}
