//! Application lifecycle systems
//!
//! Escape backs out of the detail and ticket views, and quits from the book.

use bevy::prelude::*;

use crate::core::state::AppView;

pub fn leave_view_on_esc(
    keyboard: Res<ButtonInput<KeyCode>>,
    view: Res<State<AppView>>,
    mut next_view: ResMut<NextState<AppView>>,
    mut app_exit_events: EventWriter<AppExit>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }
    match view.get() {
        AppView::Home => {
            info!("Escape pressed, closing the book");
            app_exit_events.write(AppExit::Success);
        }
        AppView::Detail | AppView::Ticket => next_view.set(AppView::Home),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    fn app_in(view: AppView) -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .insert_state(view)
            .init_resource::<ButtonInput<KeyCode>>()
            .add_event::<AppExit>()
            .add_systems(Update, leave_view_on_esc);
        app.update();
        app
    }

    fn press_escape(app: &mut App) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .clear();
        app.update();
    }

    #[test]
    fn escape_from_detail_returns_home() {
        let mut app = app_in(AppView::Detail);
        press_escape(&mut app);
        assert_eq!(*app.world().resource::<State<AppView>>().get(), AppView::Home);
        assert!(app.world().resource::<Events<AppExit>>().is_empty());
    }

    #[test]
    fn escape_from_home_exits() {
        let mut app = app_in(AppView::Home);
        press_escape(&mut app);
        assert!(!app.world().resource::<Events<AppExit>>().is_empty());
    }
}
