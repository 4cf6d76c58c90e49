//! Page turn animation
//!
//! Every frame each page computes a target rotation for every joint of its
//! chain from three inputs: whether it is turned (the rendered page is past
//! it), how long ago that last flipped, and whether the whole book is closed.
//! The joints then ease toward their targets with a critically damped smooth
//! damp so the motion does not depend on the frame rate.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::time::Duration;

use bevy::prelude::*;

use crate::book::page::{BookNavigation, Page, PageFace, PageLeaf, PageSkeleton};
use crate::book::skeleton::{BoneChain, JointRotation};
use crate::core::settings::{
    FOLD_ANGLE_DEGREES, FOLD_SMOOTH_TIME, FOLD_START_JOINT, HIGHLIGHT_INTENSITY,
    HIGHLIGHT_LERP_PER_FRAME, INSIDE_CURVE_JOINTS, INSIDE_CURVE_STRENGTH,
    OUTSIDE_CURVE_STRENGTH, PAGE_DEPTH, STACK_FAN_DEGREES, TURN_DURATION,
    TURN_SMOOTH_TIME, TURNING_CURVE_STRENGTH,
};
use crate::ui::theme::HIGHLIGHT_EMISSIVE_COLOR;

/// What a page needs to know about the book this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnInputs {
    pub number: usize,
    pub opened: bool,
    pub book_closed: bool,
}

impl TurnInputs {
    /// Derive the inputs of page `number` from the rendered page index
    pub fn for_page(number: usize, rendered: usize, page_count: usize) -> Self {
        Self {
            number,
            opened: rendered > number,
            book_closed: rendered == 0 || rendered == page_count,
        }
    }
}

/// 0 → 1 → 0 pulse over the turn window
pub fn turn_progress(since_toggle: Option<Duration>) -> f32 {
    let Some(elapsed) = since_toggle else {
        return 0.0;
    };
    let t = (elapsed.as_secs_f32() / TURN_DURATION.as_secs_f32()).clamp(0.0, 1.0);
    (t * PI).sin()
}

/// Rotation of the whole leaf about the spine. Open books fan their leaves
/// slightly so the stack looks thick.
pub fn target_rotation(inputs: &TurnInputs) -> f32 {
    let mut target = if inputs.opened { -FRAC_PI_2 } else { FRAC_PI_2 };
    if !inputs.book_closed {
        target += (inputs.number as f32 * STACK_FAN_DEGREES).to_radians();
    }
    target
}

/// Target rotation of one joint
pub fn joint_target(
    joint: usize,
    joint_count: usize,
    target: f32,
    progress: f32,
    book_closed: bool,
) -> JointRotation {
    if book_closed {
        return if joint == 0 {
            JointRotation {
                turn: target,
                fold: 0.0,
            }
        } else {
            JointRotation::default()
        };
    }

    let i = joint as f32;
    let span = PI / joint_count as f32;

    let inside = if joint < INSIDE_CURVE_JOINTS {
        (i * 0.2 + 0.25).sin()
    } else {
        0.0
    };
    let outside = if joint >= INSIDE_CURVE_JOINTS {
        (i * 0.3 + 0.09).cos()
    } else {
        0.0
    };
    let turning = (i * span).sin() * progress;

    let turn = INSIDE_CURVE_STRENGTH * inside * target
        - OUTSIDE_CURVE_STRENGTH * outside * target
        + TURNING_CURVE_STRENGTH * turning * target;

    let fold_intensity = if joint > FOLD_START_JOINT {
        (i * span - 0.5).sin() * progress
    } else {
        0.0
    };
    let fold = (target.signum() * FOLD_ANGLE_DEGREES).to_radians() * fold_intensity;

    JointRotation { turn, fold }
}

/// Critically damped smoothing toward `target`, Unity style.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    delta: f32,
) -> f32 {
    const EPSILON: f32 = 0.001;
    if (current - target).abs() <= EPSILON {
        *velocity = 0.0;
        return target;
    }
    if delta <= 0.0 {
        return current;
    }

    let omega = 2.0 / smooth_time.max(0.0001);
    let x = omega * delta;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * decay;
    let output = target + (change + temp) * decay;

    // Never overshoot
    if (target - current > 0.0) == (output > target) {
        *velocity = 0.0;
        return target;
    }
    output
}

/// Shortest signed difference from `current` to `target`, in [-π, π]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(TAU);
    if delta > PI {
        delta - TAU
    } else {
        delta
    }
}

/// `smooth_damp` along the shortest arc
pub fn damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    delta: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, delta)
}

/// Animation state of one page instance
#[derive(Component, Debug, Clone)]
pub struct PageMotion {
    /// Time of the last open/close flip
    pub turned_at: Option<Duration>,
    pub last_opened: bool,
    pub hovered: bool,
    pub highlight: f32,
    velocities: Vec<JointRotation>,
}

impl PageMotion {
    pub fn new(joint_count: usize, opened: bool) -> Self {
        Self {
            turned_at: None,
            last_opened: opened,
            hovered: false,
            highlight: 0.0,
            velocities: vec![JointRotation::default(); joint_count],
        }
    }

    /// Advance the chain one frame. `now` is the elapsed app time and `delta`
    /// the frame time in seconds.
    pub fn step(
        &mut self,
        now: Duration,
        delta: f32,
        inputs: &TurnInputs,
        chain: &mut BoneChain,
    ) {
        if self.last_opened != inputs.opened {
            self.turned_at = Some(now);
            self.last_opened = inputs.opened;
        }
        let progress =
            turn_progress(self.turned_at.map(|at| now.saturating_sub(at)));
        let target = target_rotation(inputs);

        let joint_count = chain.len();
        self.velocities
            .resize(joint_count, JointRotation::default());
        for (joint, (rotation, velocity)) in chain
            .rotations_mut()
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .enumerate()
        {
            let goal =
                joint_target(joint, joint_count, target, progress, inputs.book_closed);
            rotation.turn = damp_angle(
                rotation.turn,
                goal.turn,
                &mut velocity.turn,
                TURN_SMOOTH_TIME,
                delta,
            );
            rotation.fold = damp_angle(
                rotation.fold,
                goal.fold,
                &mut velocity.fold,
                FOLD_SMOOTH_TIME,
                delta,
            );
        }

        let goal = if self.hovered { HIGHLIGHT_INTENSITY } else { 0.0 };
        let rate = 1.0 - (1.0 - HIGHLIGHT_LERP_PER_FRAME).powf(delta * 60.0);
        self.highlight += (goal - self.highlight) * rate;
    }
}

/// Per-frame system driving every page chain from the rendered page index
pub fn animate_pages(
    time: Res<Time>,
    navigation: Res<BookNavigation>,
    mut pages: Query<(&Page, &mut PageMotion, &mut PageSkeleton, &mut Transform)>,
    mut joints: Query<&mut Transform, Without<Page>>,
) {
    let now = time.elapsed();
    let delta = time.delta_secs();
    let rendered = navigation.rendered();
    let page_count = navigation.page_count();

    for (page, mut motion, mut skeleton, mut root) in &mut pages {
        let inputs = TurnInputs::for_page(page.number, rendered, page_count);
        let skeleton = &mut *skeleton;
        motion.step(now, delta, &inputs, &mut skeleton.chain);

        let rotations = skeleton.chain.rotations();
        // The root joint has no parent joint, its rotation drives the page root
        root.rotation = rotations[0].to_quat();
        for (joint, rotation) in skeleton.joints.iter().zip(rotations).skip(1) {
            if let Ok(mut transform) = joints.get_mut(*joint) {
                transform.rotation = rotation.to_quat();
            }
        }
    }
}

/// Keeps the leaves stacked around the rendered page
pub fn stack_pages(
    navigation: Res<BookNavigation>,
    mut leaves: Query<(&PageLeaf, &mut Transform)>,
) {
    let rendered = navigation.rendered() as f32;
    for (leaf, mut transform) in &mut leaves {
        transform.translation.z = (rendered - leaf.number as f32) * PAGE_DEPTH;
    }
}

/// Pushes each page's highlight intensity into its face materials
pub fn apply_page_highlight(
    pages: Query<&PageMotion>,
    faces: Query<&PageFace>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for face in &faces {
        let Ok(motion) = pages.get(face.page) else {
            continue;
        };
        let emissive = HIGHLIGHT_EMISSIVE_COLOR.to_linear() * motion.highlight;
        let Some(material) = materials.get(&face.material) else {
            continue;
        };
        if material.emissive == emissive {
            continue;
        }
        if let Some(material) = materials.get_mut(&face.material) {
            material.emissive = emissive;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOINTS: usize = 31;

    #[test]
    fn progress_pulses_over_the_turn_window() {
        assert_eq!(turn_progress(None), 0.0);
        assert!(turn_progress(Some(Duration::ZERO)).abs() < 1e-6);
        assert!((turn_progress(Some(Duration::from_millis(200))) - 1.0).abs() < 1e-5);
        assert!(turn_progress(Some(Duration::from_millis(400))).abs() < 1e-5);
        assert!(turn_progress(Some(Duration::from_secs(5))).abs() < 1e-5);
    }

    #[test]
    fn open_book_fans_leaves_by_stack_position() {
        let closed = TurnInputs {
            number: 3,
            opened: false,
            book_closed: false,
        };
        let expected = FRAC_PI_2 + (3.0 * STACK_FAN_DEGREES).to_radians();
        assert!((target_rotation(&closed) - expected).abs() < 1e-6);

        let flat = TurnInputs {
            book_closed: true,
            opened: true,
            ..closed
        };
        assert_eq!(target_rotation(&flat), -FRAC_PI_2);
    }

    #[test]
    fn closed_book_lies_flat_except_root() {
        for number in 0..5 {
            for opened in [false, true] {
                for millis in [0u64, 100, 200, 399, 1000] {
                    let inputs = TurnInputs {
                        number,
                        opened,
                        book_closed: true,
                    };
                    let target = target_rotation(&inputs);
                    let progress = turn_progress(Some(Duration::from_millis(millis)));
                    let root = joint_target(0, JOINTS, target, progress, true);
                    assert_eq!(root.turn, target);
                    assert_eq!(root.fold, 0.0);
                    for joint in 1..JOINTS {
                        let rotation =
                            joint_target(joint, JOINTS, target, progress, true);
                        assert_eq!(rotation, JointRotation::default());
                    }
                }
            }
        }
    }

    #[test]
    fn fold_only_near_free_edge_while_turning() {
        let target = -FRAC_PI_2;
        for joint in 0..=FOLD_START_JOINT {
            assert_eq!(joint_target(joint, JOINTS, target, 1.0, false).fold, 0.0);
        }
        let edge = joint_target(20, JOINTS, target, 1.0, false);
        assert!(edge.fold < 0.0, "fold follows the sign of the turn");
        let settled = joint_target(20, JOINTS, target, 0.0, false);
        assert_eq!(settled.fold, 0.0);
    }

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..600 {
            value = smooth_damp(value, 1.0, &mut velocity, 0.5, 1.0 / 60.0);
            assert!(value <= 1.0);
        }
        assert_eq!(value, 1.0);
    }

    #[test]
    fn smooth_damp_is_frame_rate_independent() {
        let run = |steps: usize| {
            let mut value = 0.0;
            let mut velocity = 0.0;
            let delta = 1.0 / steps as f32;
            for _ in 0..steps {
                value = smooth_damp(value, 1.0, &mut velocity, 0.5, delta);
            }
            value
        };
        assert!((run(30) - run(240)).abs() < 0.02);
    }

    #[test]
    fn damp_angle_takes_the_short_way_round() {
        assert!((delta_angle(3.0, -3.0) - (TAU - 6.0)).abs() < 1e-5);
        let mut velocity = 0.0;
        let next = damp_angle(3.0, -3.0, &mut velocity, 0.5, 1.0 / 60.0);
        assert!(next > 3.0);
    }

    #[test]
    fn toggling_open_restarts_the_turn_pulse() {
        let mut chain = BoneChain::new(30, 0.1);
        let mut motion = PageMotion::new(chain.len(), false);
        let mut inputs = TurnInputs::for_page(1, 0, 10);
        motion.step(Duration::from_secs(1), 1.0 / 60.0, &inputs, &mut chain);
        assert_eq!(motion.turned_at, None);

        inputs = TurnInputs::for_page(1, 2, 10);
        motion.step(Duration::from_secs(2), 1.0 / 60.0, &inputs, &mut chain);
        assert_eq!(motion.turned_at, Some(Duration::from_secs(2)));
        assert!(motion.last_opened);
    }

    #[test]
    fn closed_book_chain_settles_flat() {
        let mut chain = BoneChain::new(30, 0.1);
        let mut motion = PageMotion::new(chain.len(), false);
        // Bend the chain first with the book open
        let open = TurnInputs::for_page(2, 1, 10);
        for frame in 0..30 {
            let now = Duration::from_millis(frame * 16);
            motion.step(now, 1.0 / 60.0, &open, &mut chain);
        }
        assert!(chain.rotations()[5].turn != 0.0);

        let closed = TurnInputs::for_page(2, 0, 10);
        for frame in 30..2000 {
            let now = Duration::from_millis(frame * 16);
            motion.step(now, 1.0 / 60.0, &closed, &mut chain);
        }
        for rotation in &chain.rotations()[1..] {
            assert_eq!(*rotation, JointRotation::default());
        }
        assert!((chain.rotations()[0].turn - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn highlight_eases_toward_hover_state() {
        let mut chain = BoneChain::new(2, 0.5);
        let mut motion = PageMotion::new(chain.len(), false);
        let inputs = TurnInputs::for_page(1, 0, 4);
        motion.hovered = true;
        for _ in 0..300 {
            motion.step(Duration::ZERO, 1.0 / 60.0, &inputs, &mut chain);
        }
        assert!((motion.highlight - HIGHLIGHT_INTENSITY).abs() < 1e-3);
        motion.hovered = false;
        motion.step(Duration::ZERO, 1.0 / 60.0, &inputs, &mut chain);
        assert!(motion.highlight < HIGHLIGHT_INTENSITY);
    }
}
