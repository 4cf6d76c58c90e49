//! Detail view for a double clicked picture
//!
//! Shows the picture with its page number and caption. Embedded pictures are
//! decoded off the main thread like the page faces are.

use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task};

use crate::book::catalog::is_reserved;
use crate::book::PageCatalog;
use crate::content::{
    resolve_content, ContentServices, ImageResolver, ImageSource, RemoteContent,
};
use crate::core::errors::BookResult;
use crate::core::state::{AppView, SelectedPage};
use crate::rendering::textures::decode_data_url;
use crate::ui::buttons::labeled_button;
use crate::ui::theme::*;

#[derive(Component)]
pub struct DetailImage;

#[derive(Component)]
pub struct DetailImageTask(Task<BookResult<Image>>);

#[derive(Component)]
pub struct BackToBookButton;

/// Page number shown for a picture; covers have none
pub fn detail_page_number(catalog: &PageCatalog, id: &str) -> Option<usize> {
    if is_reserved(id) {
        return None;
    }
    catalog.page_number_of(id)
}

#[allow(clippy::too_many_arguments)]
pub fn spawn_detail_view(
    mut commands: Commands,
    selected: Res<SelectedPage>,
    catalog: Res<PageCatalog>,
    resolver: Res<ImageResolver>,
    services: Res<ContentServices>,
    remote: Res<RemoteContent>,
    asset_server: Res<AssetServer>,
    mut next_view: ResMut<NextState<AppView>>,
) {
    let Some(id) = selected.id() else {
        warn!("Detail view opened without a selected picture");
        next_view.set(AppView::Home);
        return;
    };
    let cache = services.cache.as_ref();
    let content = resolve_content(id, remote.snapshot(), cache);
    let source = resolver.resolve(Some(id), remote.snapshot(), cache);

    let mut image = ImageNode::default();
    let mut task = None;
    match &source {
        ImageSource::Asset(path) => image.image = asset_server.load(path.clone()),
        ImageSource::Embedded(url) => {
            let url = url.clone();
            task = Some(AsyncComputeTaskPool::get().spawn(async move { decode_data_url(&url) }));
        }
        ImageSource::Placeholder => image.color = PAGE_PLACEHOLDER_COLOR,
    }

    let mut panel = commands.spawn((
        Name::new("Detail View"),
        StateScoped(AppView::Detail),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: Val::Px(PANEL_ROW_GAP),
            padding: UiRect::all(Val::Px(PANEL_PADDING)),
            ..default()
        },
        BackgroundColor(PANEL_BACKGROUND_COLOR),
    ));

    panel.with_children(|panel| {
        let mut picture = panel.spawn((
            DetailImage,
            image,
            Node {
                max_width: Val::Px(DETAIL_IMAGE_MAX_WIDTH),
                max_height: Val::Percent(55.0),
                border: UiRect::all(Val::Px(PANEL_BORDER_WIDTH)),
                ..default()
            },
            BorderColor(PANEL_BORDER_COLOR),
        ));
        if let Some(task) = task {
            picture.insert(DetailImageTask(task));
        }

        if let Some(number) = detail_page_number(&catalog, id) {
            panel.spawn((
                Text::new(format!("Page {number}")),
                TextFont {
                    font_size: BODY_FONT_SIZE,
                    ..default()
                },
                TextColor(MUTED_TEXT_COLOR),
            ));
        }
        panel.spawn((
            Text::new(content.title),
            TextFont {
                font_size: TITLE_FONT_SIZE,
                ..default()
            },
            TextColor(TEXT_COLOR),
        ));
        panel.spawn((
            Text::new(content.event_name),
            TextFont {
                font_size: HEADING_FONT_SIZE,
                ..default()
            },
            TextColor(ACCENT_TEXT_COLOR),
        ));
        for line in content.lines.into_iter().filter(|line| !line.is_empty()) {
            panel.spawn((
                Text::new(line),
                TextFont {
                    font_size: BODY_FONT_SIZE,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                TextLayout::new_with_justify(JustifyText::Center),
            ));
        }
        panel.spawn((labeled_button("Back to book"), BackToBookButton));
    });
    info!("Showing details for '{}' ({})", id, source);
}

pub fn finish_detail_image(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut pictures: Query<(Entity, &mut ImageNode, &mut DetailImageTask)>,
) {
    for (entity, mut node, mut task) in &mut pictures {
        let Some(result) = block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        match result {
            Ok(image) => node.image = images.add(image),
            Err(e) => {
                warn!("Could not decode the detail picture: {e:#}");
                node.color = PAGE_PLACEHOLDER_COLOR;
            }
        }
        commands.entity(entity).remove::<DetailImageTask>();
    }
}

pub fn handle_back_button(
    buttons: Query<&Interaction, (Changed<Interaction>, With<BackToBookButton>)>,
    mut next_view: ResMut<NextState<AppView>>,
) {
    if buttons.iter().any(|i| *i == Interaction::Pressed) {
        next_view.set(AppView::Home);
    }
}

pub fn clear_selection(mut selected: ResMut<SelectedPage>) {
    selected.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{BACK_ID, COVER_ID};

    #[test]
    fn page_numbers_count_leaves_from_one() {
        let local: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
        let catalog = PageCatalog::new(&local, &["42".to_string()]);
        // cover, [1, 2], [3, 42], back
        assert_eq!(detail_page_number(&catalog, "1"), Some(2));
        assert_eq!(detail_page_number(&catalog, "42"), Some(3));
        assert_eq!(detail_page_number(&catalog, COVER_ID), None);
        assert_eq!(detail_page_number(&catalog, BACK_ID), None);
        assert_eq!(detail_page_number(&catalog, "missing"), None);
    }
}
