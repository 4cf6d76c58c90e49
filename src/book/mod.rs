//! The animated book
//!
//! This module contains everything that makes the book move:
//! - Shared skinned page geometry and the per-page bone chain
//! - The page turn animation
//! - The delay between the requested and the rendered page
//! - The page catalog and single/double click handling

pub mod animation;
pub mod catalog;
pub mod click;
pub mod delay;
pub mod geometry;
pub mod page;
pub mod skeleton;

pub use catalog::{PageCatalog, PageDescriptor, BACK_ID, COVER_ID};
pub use page::{BookNavigation, Page, PageFace};

use bevy::prelude::*;

use crate::core::state::AppView;

/// Ordering of the per-frame book work
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookSet {
    /// Content snapshot and catalog updates
    Content,
    /// Spawning pages, clicks and navigation
    Pages,
    /// Joint rotations, stacking and highlight
    Animate,
}

pub struct BookPlugin;

impl Plugin for BookPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BookNavigation>()
            .init_resource::<PageCatalog>()
            .add_event::<page::PageClicked>()
            .configure_sets(
                Update,
                (BookSet::Content, BookSet::Pages, BookSet::Animate).chain(),
            )
            .add_systems(Startup, geometry::build_page_geometry)
            .add_systems(OnEnter(AppView::Home), page::spawn_book)
            .add_systems(OnExit(AppView::Home), page::despawn_book)
            .add_systems(
                Update,
                (
                    page::sync_pages_with_catalog,
                    page::advance_rendered_page,
                    page::tick_page_clicks,
                    page::handle_page_clicks,
                )
                    .chain()
                    .in_set(BookSet::Pages)
                    .run_if(in_state(AppView::Home)),
            )
            .add_systems(
                Update,
                (
                    animation::animate_pages,
                    animation::stack_pages,
                    animation::apply_page_highlight,
                )
                    .in_set(BookSet::Animate)
                    .run_if(in_state(AppView::Home)),
            );
    }
}
