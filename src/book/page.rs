//! Page instances and the book they live in
//!
//! The book root is spawned when the home view opens and despawned when it
//! closes, taking every page, joint and pending click timer with it. Pages
//! are kept in step with the catalog by index, so a catalog refresh only
//! touches the leaves that actually changed.

use bevy::prelude::*;
use bevy::render::mesh::skinning::SkinnedMesh;
use bevy::render::view::NoFrustumCulling;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::time::Duration;

use crate::book::animation::PageMotion;
use crate::book::catalog::{PageCatalog, PageDescriptor};
use crate::book::click::{ClickAction, ClickDisambiguator};
use crate::book::delay::PageDelay;
use crate::book::geometry::{FaceSide, PageGeometry};
use crate::book::skeleton::{spawn_joints, BoneChain};
use crate::core::settings::PAGE_DEPTH;
use crate::core::state::{AppView, SelectedPage};
use crate::ui::theme::PAGE_PLACEHOLDER_COLOR;

/// Requested and rendered page indices for the whole book
#[derive(Resource, Debug, Clone, Default)]
pub struct BookNavigation {
    delay: PageDelay,
    page_count: usize,
}

impl BookNavigation {
    pub fn new(page_count: usize) -> Self {
        Self {
            delay: PageDelay::new(0),
            page_count,
        }
    }

    pub fn requested(&self) -> usize {
        self.delay.requested()
    }

    pub fn rendered(&self) -> usize {
        self.delay.rendered()
    }

    /// Number of leaves; the book is closed on its back at `rendered == page_count`
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Ask for a page. Returns false if it was already the requested one.
    pub fn request(&mut self, page: usize) -> bool {
        let page = page.min(self.page_count);
        if page == self.requested() {
            return false;
        }
        self.delay.request(page);
        true
    }

    pub fn tick(&mut self, delta: Duration) -> bool {
        self.delay.tick(delta)
    }

    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count;
        self.delay.clamp_to(page_count);
    }

    /// Stop chasing, used when the book is torn down
    pub fn cancel(&mut self) {
        self.delay.cancel();
    }

    /// A freshly mounted book starts on the requested page
    pub fn remount(&mut self) {
        self.delay = PageDelay::new(self.requested());
    }
}

/// Root of the whole book
#[derive(Component)]
pub struct BookRoot;

/// One leaf; the entity also carries the rotation of the root joint
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub front: String,
    pub back: String,
}

impl Page {
    /// Picture facing the reader: the back once the page is turned
    pub fn visible_side(&self, opened: bool) -> &str {
        if opened {
            &self.back
        } else {
            &self.front
        }
    }
}

/// Child of the page root that carries the stack offset and the joints
#[derive(Component)]
pub struct PageLeaf {
    pub number: usize,
}

#[derive(Component)]
pub struct PageSkeleton {
    pub chain: BoneChain,
    pub joints: Vec<Entity>,
}

/// A textured side of a leaf
#[derive(Component, Debug, Clone)]
pub struct PageFace {
    pub page: Entity,
    pub side: FaceSide,
    pub image_id: String,
    pub material: Handle<StandardMaterial>,
}

/// A gesture on a page, resolved by the click disambiguator
#[derive(Event, Debug, Clone, Copy)]
pub struct PageClicked {
    pub page: Entity,
    pub action: ClickAction,
}

/// Covers are a little less glossy than the inner pages
fn face_roughness(number: usize, page_count: usize) -> f32 {
    if number == 0 || number + 1 == page_count {
        0.15
    } else {
        0.1
    }
}

fn face_material(number: usize, page_count: usize) -> StandardMaterial {
    StandardMaterial {
        base_color: PAGE_PLACEHOLDER_COLOR,
        perceptual_roughness: face_roughness(number, page_count),
        metallic: 0.0,
        emissive: LinearRgba::BLACK,
        ..default()
    }
}

pub fn spawn_book(mut commands: Commands, mut navigation: ResMut<BookNavigation>) {
    navigation.remount();
    commands.spawn((
        Name::new("Book"),
        BookRoot,
        Transform::from_rotation(
            Quat::from_rotation_x(-FRAC_PI_4) * Quat::from_rotation_y(-FRAC_PI_2),
        ),
        Visibility::default(),
    ));
    debug!("Book mounted on page {}", navigation.rendered());
}

/// Tears the book down together with every pending page timer
pub fn despawn_book(
    mut commands: Commands,
    books: Query<Entity, With<BookRoot>>,
    mut navigation: ResMut<BookNavigation>,
) {
    navigation.cancel();
    for book in &books {
        commands.entity(book).despawn();
    }
    debug!("Book unmounted");
}

#[allow(clippy::too_many_arguments)]
fn spawn_page(
    commands: &mut Commands,
    book: Entity,
    geometry: &PageGeometry,
    materials: &mut Assets<StandardMaterial>,
    number: usize,
    descriptor: &PageDescriptor,
    page_count: usize,
    rendered: usize,
) -> Entity {
    let dimensions = geometry.dimensions;
    let chain = BoneChain::new(dimensions.segments, dimensions.segment_width());

    let root = commands
        .spawn((
            Name::new(format!("Page {number}")),
            Page {
                number,
                front: descriptor.front.clone(),
                back: descriptor.back.clone(),
            },
            PageMotion::new(chain.len(), rendered > number),
            ClickDisambiguator::default(),
            Transform::default(),
            Visibility::default(),
        ))
        .observe(on_page_over)
        .observe(on_page_out)
        .observe(on_page_click)
        .id();
    commands.entity(book).add_child(root);

    let leaf = commands
        .spawn((
            PageLeaf { number },
            Transform::from_xyz(
                0.0,
                0.0,
                (rendered as f32 - number as f32) * PAGE_DEPTH,
            ),
            Visibility::default(),
        ))
        .id();
    commands.entity(root).add_child(leaf);

    let joints = spawn_joints(commands, leaf, &chain);
    let skin = SkinnedMesh {
        inverse_bindposes: geometry.inverse_bindposes.clone(),
        joints: joints.clone(),
    };

    for (side, image_id) in [
        (FaceSide::Front, &descriptor.front),
        (FaceSide::Back, &descriptor.back),
    ] {
        let material = materials.add(face_material(number, page_count));
        let face = commands
            .spawn((
                Mesh3d(geometry.face(side)),
                MeshMaterial3d(material.clone()),
                skin.clone(),
                NoFrustumCulling,
                Transform::default(),
                PageFace {
                    page: root,
                    side,
                    image_id: image_id.clone(),
                    material,
                },
            ))
            .id();
        commands.entity(leaf).add_child(face);
    }

    let edges = commands
        .spawn((
            Mesh3d(geometry.edges.clone()),
            MeshMaterial3d(geometry.edge_material.clone()),
            skin,
            NoFrustumCulling,
            Transform::default(),
        ))
        .id();
    commands.entity(leaf).add_child(edges);

    commands.entity(root).insert(PageSkeleton { chain, joints });
    root
}

/// Keeps the spawned pages in step with the catalog, matching them by index
#[allow(clippy::too_many_arguments)]
pub fn sync_pages_with_catalog(
    mut commands: Commands,
    catalog: Res<PageCatalog>,
    geometry: Option<Res<PageGeometry>>,
    new_books: Query<Entity, Added<BookRoot>>,
    books: Query<Entity, With<BookRoot>>,
    mut pages: Query<(Entity, &mut Page)>,
    mut faces: Query<&mut PageFace>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut navigation: ResMut<BookNavigation>,
) {
    let Some(geometry) = geometry else {
        return;
    };
    if !catalog.is_changed() && !geometry.is_added() && new_books.is_empty() {
        return;
    }
    let Ok(book) = books.single() else {
        return;
    };

    let page_count = catalog.len();
    if navigation.page_count() != page_count {
        navigation.set_page_count(page_count);
    }

    let mut existing = vec![None; page_count];
    for (entity, mut page) in &mut pages {
        let Some(descriptor) = catalog.pages.get(page.number) else {
            commands.entity(entity).despawn();
            continue;
        };
        existing[page.number] = Some(entity);
        if page.front != descriptor.front || page.back != descriptor.back {
            page.front = descriptor.front.clone();
            page.back = descriptor.back.clone();
        }
    }

    for mut face in &mut faces {
        let Ok((_, page)) = pages.get(face.page) else {
            continue;
        };
        let image_id = match face.side {
            FaceSide::Front => &page.front,
            FaceSide::Back => &page.back,
        };
        if &face.image_id != image_id {
            face.image_id = image_id.clone();
        }
        let roughness = face_roughness(page.number, page_count);
        if let Some(material) = materials.get_mut(&face.material) {
            material.perceptual_roughness = roughness;
        }
    }

    let rendered = navigation.rendered();
    let mut spawned = 0;
    for (number, descriptor) in catalog.pages.iter().enumerate() {
        if existing[number].is_none() {
            spawn_page(
                &mut commands,
                book,
                &geometry,
                &mut materials,
                number,
                descriptor,
                page_count,
                rendered,
            );
            spawned += 1;
        }
    }
    if spawned > 0 {
        info!("Spawned {} pages ({} in the book)", spawned, page_count);
    }
}

/// Steps the rendered page toward the requested one
pub fn advance_rendered_page(time: Res<Time>, mut navigation: ResMut<BookNavigation>) {
    if navigation.tick(time.delta()) {
        debug!(
            "Rendered page {} (requested {})",
            navigation.rendered(),
            navigation.requested()
        );
    }
}

fn on_page_over(mut trigger: Trigger<Pointer<Over>>, mut pages: Query<&mut PageMotion>) {
    trigger.propagate(false);
    if let Ok(mut motion) = pages.get_mut(trigger.target()) {
        motion.hovered = true;
    }
}

fn on_page_out(mut trigger: Trigger<Pointer<Out>>, mut pages: Query<&mut PageMotion>) {
    trigger.propagate(false);
    if let Ok(mut motion) = pages.get_mut(trigger.target()) {
        motion.hovered = false;
    }
}

fn on_page_click(
    mut trigger: Trigger<Pointer<Click>>,
    mut clicks: Query<&mut ClickDisambiguator>,
    mut events: EventWriter<PageClicked>,
) {
    trigger.propagate(false);
    if trigger.event().button != PointerButton::Primary {
        return;
    }
    let page = trigger.target();
    let Ok(mut click) = clicks.get_mut(page) else {
        return;
    };
    if let Some(action) = click.click() {
        events.write(PageClicked { page, action });
    }
}

/// Lets single clicks through once their double click window runs out
pub fn tick_page_clicks(
    time: Res<Time>,
    mut clicks: Query<(Entity, &mut ClickDisambiguator)>,
    mut events: EventWriter<PageClicked>,
) {
    for (page, mut click) in &mut clicks {
        if let Some(action) = click.tick(time.delta()) {
            events.write(PageClicked { page, action });
        }
    }
}

pub fn handle_page_clicks(
    mut events: EventReader<PageClicked>,
    mut pages: Query<(&Page, &mut PageMotion)>,
    mut navigation: ResMut<BookNavigation>,
    mut selected: ResMut<SelectedPage>,
    mut next_view: ResMut<NextState<AppView>>,
) {
    for event in events.read() {
        let Ok((page, mut motion)) = pages.get_mut(event.page) else {
            continue;
        };
        let opened = navigation.rendered() > page.number;
        motion.hovered = false;
        match event.action {
            ClickAction::Advance => {
                let target = if opened { page.number } else { page.number + 1 };
                navigation.request(target);
            }
            ClickAction::OpenDetail => {
                let id = page.visible_side(opened).to_string();
                info!("Opening detail view for '{}'", id);
                selected.select(id);
                next_view.set(AppView::Detail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::catalog::BACK_ID;
    use crate::book::geometry::build_page_geometry;
    use bevy::render::mesh::skinning::SkinnedMeshInverseBindposes;
    use std::collections::HashMap;

    #[test]
    fn requests_are_clamped_to_the_back_cover() {
        let mut navigation = BookNavigation::new(5);
        assert!(navigation.request(99));
        assert_eq!(navigation.requested(), 5);
        assert!(!navigation.request(5));
        assert_eq!(navigation.rendered(), 1);
    }

    #[test]
    fn remount_starts_on_the_requested_page() {
        let mut navigation = BookNavigation::new(8);
        navigation.request(6);
        navigation.cancel();
        assert_eq!(navigation.rendered(), 1);
        navigation.remount();
        assert_eq!(navigation.rendered(), 6);
    }

    #[test]
    fn visible_side_flips_when_opened() {
        let page = Page {
            number: 2,
            front: "3".into(),
            back: "4".into(),
        };
        assert_eq!(page.visible_side(false), "3");
        assert_eq!(page.visible_side(true), "4");
    }

    #[test]
    fn only_first_and_last_leaves_use_cover_roughness() {
        assert_eq!(face_roughness(0, 6), 0.15);
        assert_eq!(face_roughness(5, 6), 0.15);
        assert_eq!(face_roughness(3, 6), 0.1);
    }

    #[test]
    fn new_faces_start_blank_until_their_picture_loads() {
        for number in 0..4 {
            assert_eq!(face_material(number, 4).base_color, PAGE_PLACEHOLDER_COLOR);
        }
    }

    #[test]
    fn click_events_turn_pages_and_open_details() {
        let mut app = App::new();
        app.add_plugins(bevy::state::app::StatesPlugin)
            .init_state::<AppView>()
            .add_event::<PageClicked>()
            .init_resource::<SelectedPage>()
            .insert_resource(BookNavigation::new(6))
            .add_systems(Update, handle_page_clicks);

        let page = app
            .world_mut()
            .spawn((
                Page {
                    number: 2,
                    front: "3".into(),
                    back: "4".into(),
                },
                PageMotion::new(4, false),
            ))
            .id();

        app.world_mut().send_event(PageClicked {
            page,
            action: ClickAction::Advance,
        });
        app.update();
        assert_eq!(app.world().resource::<BookNavigation>().requested(), 3);

        app.world_mut().send_event(PageClicked {
            page,
            action: ClickAction::OpenDetail,
        });
        app.update();
        assert_eq!(app.world().resource::<SelectedPage>().id(), Some("3"));
    }

    fn ids(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
        range.map(|n| n.to_string()).collect()
    }

    fn book_app(catalog: PageCatalog) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<SkinnedMeshInverseBindposes>()
            .init_asset::<StandardMaterial>()
            .init_resource::<BookNavigation>()
            .insert_resource(catalog)
            .add_systems(Startup, (build_page_geometry, spawn_book))
            .add_systems(Update, sync_pages_with_catalog);
        app
    }

    fn page_numbers(app: &mut App) -> Vec<usize> {
        let world = app.world_mut();
        let mut numbers: Vec<usize> = world
            .query::<&Page>()
            .iter(world)
            .map(|page| page.number)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    /// Image ids on the faces of leaf `number`, front first
    fn face_ids(app: &mut App, number: usize) -> Vec<String> {
        let world = app.world_mut();
        let pages: HashMap<Entity, usize> = world
            .query::<(Entity, &Page)>()
            .iter(world)
            .map(|(entity, page)| (entity, page.number))
            .collect();
        let mut faces: Vec<(bool, String)> = world
            .query::<&PageFace>()
            .iter(world)
            .filter(|face| pages.get(&face.page) == Some(&number))
            .map(|face| (face.side == FaceSide::Back, face.image_id.clone()))
            .collect();
        faces.sort();
        faces.into_iter().map(|(_, id)| id).collect()
    }

    #[test]
    fn pages_follow_the_catalog_as_it_grows_and_shrinks() {
        let local = ids(1..=4);
        let mut app = book_app(PageCatalog::new(&local, &[]));
        app.update();
        // cover, [1, 2], [3, 4], back
        assert_eq!(page_numbers(&mut app), vec![0, 1, 2, 3]);
        assert_eq!(app.world().resource::<BookNavigation>().page_count(), 4);
        assert_eq!(face_ids(&mut app, 3), vec![BACK_ID, BACK_ID]);

        let remote: Vec<String> = ["r1", "r2", "r3"].iter().map(|s| s.to_string()).collect();
        app.world_mut()
            .resource_mut::<PageCatalog>()
            .refresh(&local, &remote);
        app.update();
        // cover, [1, 2], [3, 4], [r1, r2], [r3, back], back
        assert_eq!(page_numbers(&mut app), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(face_ids(&mut app, 3), vec!["r1", "r2"]);
        assert_eq!(face_ids(&mut app, 4), vec!["r3", BACK_ID]);

        app.world_mut().resource_mut::<BookNavigation>().request(6);
        app.world_mut()
            .resource_mut::<PageCatalog>()
            .refresh(&local, &[]);
        app.update();
        assert_eq!(page_numbers(&mut app), vec![0, 1, 2, 3]);
        assert_eq!(face_ids(&mut app, 3), vec![BACK_ID, BACK_ID]);
        let navigation = app.world().resource::<BookNavigation>();
        assert_eq!(navigation.page_count(), 4);
        assert_eq!(navigation.requested(), 4);
        assert!(navigation.rendered() <= 4);
    }
}
