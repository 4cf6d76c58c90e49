//! Rendered page delay
//!
//! The user moves the requested page directly. The rendered page chases it
//! one leaf at a time so that a jump across several leaves plays as a
//! sequence of turns instead of a single snap. Large gaps are crossed with a
//! shorter step.

use std::time::Duration;

use bevy::prelude::*;

use crate::core::settings::{FAST_STEP_GAP, PAGE_STEP_FAST, PAGE_STEP_SLOW};

/// Delay before the next step, chosen from the gap before the current one
pub fn step_interval(gap: usize) -> Duration {
    if gap > FAST_STEP_GAP {
        PAGE_STEP_FAST
    } else {
        PAGE_STEP_SLOW
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageDelay {
    requested: usize,
    rendered: usize,
    /// Pending step; `None` when converged or cancelled
    pending: Option<Timer>,
}

impl PageDelay {
    pub fn new(page: usize) -> Self {
        Self {
            requested: page,
            rendered: page,
            pending: None,
        }
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_none() && self.rendered == self.requested
    }

    /// Time left until the next step, if one is pending
    pub fn next_step_in(&self) -> Option<Duration> {
        self.pending.as_ref().map(Timer::remaining)
    }

    /// Point the chase at a new target. Any pending step is dropped, one
    /// step is taken right away and the next one is scheduled.
    pub fn request(&mut self, page: usize) {
        self.requested = page;
        self.pending = None;
        self.step();
    }

    /// Advance the pending step timer. Returns true if the rendered page moved.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.pending.as_mut() else {
            return false;
        };
        timer.tick(delta);
        if !timer.finished() {
            return false;
        }
        self.step()
    }

    /// Drop any pending step, leaving the rendered page where it is
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Clamp both indices after the book changed size
    pub fn clamp_to(&mut self, page_count: usize) {
        if self.requested > page_count {
            self.requested = page_count;
        }
        if self.rendered > page_count {
            self.rendered = page_count;
        }
        if self.rendered == self.requested {
            self.pending = None;
        } else if self.pending.is_none() {
            self.step();
        }
    }

    fn step(&mut self) -> bool {
        if self.rendered == self.requested {
            self.pending = None;
            return false;
        }
        let gap = self.rendered.abs_diff(self.requested);
        if self.requested > self.rendered {
            self.rendered += 1;
        } else {
            self.rendered -= 1;
        }
        self.pending = (self.rendered != self.requested)
            .then(|| Timer::new(step_interval(gap), TimerMode::Once));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the controller in 1 ms ticks and records when each step happened
    fn record_steps(delay: &mut PageDelay, limit: Duration) -> Vec<(Duration, usize)> {
        let mut steps = Vec::new();
        let mut now = Duration::ZERO;
        while now < limit && !delay.is_settled() {
            now += Duration::from_millis(1);
            if delay.tick(Duration::from_millis(1)) {
                steps.push((now, delay.rendered()));
            }
        }
        steps
    }

    #[test]
    fn settled_controller_does_nothing() {
        let mut delay = PageDelay::new(3);
        assert!(delay.is_settled());
        assert!(!delay.tick(Duration::from_secs(1)));
        assert_eq!(delay.rendered(), 3);
    }

    #[test]
    fn jump_steps_monotonically_fast_then_slow() {
        let mut delay = PageDelay::new(0);
        delay.request(10);
        assert_eq!(delay.rendered(), 1, "first step is immediate");

        let steps = record_steps(&mut delay, Duration::from_secs(5));
        let rendered: Vec<usize> = steps.iter().map(|(_, page)| *page).collect();
        assert_eq!(rendered, (2..=10).collect::<Vec<_>>());

        let mut previous = Duration::ZERO;
        let mut from = 1usize;
        for (at, page) in steps {
            let spacing = at - previous;
            let gap_before_previous_step = 10 - (from - 1);
            let expected = step_interval(gap_before_previous_step);
            assert_eq!(spacing, expected, "step to {page}");
            previous = at;
            from = page;
        }
        assert!(delay.is_settled());
    }

    #[test]
    fn spacing_is_fast_while_far_and_slow_when_close() {
        let mut delay = PageDelay::new(0);
        delay.request(10);
        assert_eq!(delay.next_step_in(), Some(PAGE_STEP_FAST));

        let mut delay = PageDelay::new(8);
        delay.request(10);
        assert_eq!(delay.rendered(), 9);
        assert_eq!(delay.next_step_in(), Some(PAGE_STEP_SLOW));
    }

    #[test]
    fn new_request_restarts_the_chase() {
        let mut delay = PageDelay::new(0);
        delay.request(10);
        delay.tick(PAGE_STEP_FAST);
        assert_eq!(delay.rendered(), 2);

        delay.request(0);
        assert_eq!(delay.rendered(), 1);
        let steps = record_steps(&mut delay, Duration::from_secs(1));
        assert_eq!(steps.last().map(|(_, page)| *page), Some(0));
        assert_eq!(delay.rendered(), 0);
    }

    #[test]
    fn cancel_stops_pending_steps() {
        let mut delay = PageDelay::new(0);
        delay.request(5);
        delay.cancel();
        assert!(!delay.tick(Duration::from_secs(1)));
        assert_eq!(delay.rendered(), 1);
    }

    #[test]
    fn shrinking_book_clamps_indices() {
        let mut delay = PageDelay::new(12);
        delay.clamp_to(6);
        assert_eq!(delay.rendered(), 6);
        assert_eq!(delay.requested(), 6);
        assert!(delay.is_settled());
    }
}
