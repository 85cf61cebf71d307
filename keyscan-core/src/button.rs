//! Per-button state machine
//!
//! One [`Button`] tracks the debounced state of a single physical key:
//! current/previous state, edge flags, long-press latch and the last
//! synthesized action. Debouncing itself happens upstream — the matrix
//! scanner rate-limits how often raw readings are fed in — so this type
//! only has to interpret already-sampled states.
//!
//! # Read-resets accessors
//!
//! [`fell`](Button::fell), [`rose`](Button::rose) and
//! [`has_state_changed`](Button::has_state_changed) are *consuming*
//! queries: each returns the pending edge and clears it, so an edge is
//! observed exactly once, by whichever caller reads it first. This is a
//! deliberate, load-bearing contract (callbacks and poll sites share the
//! same flags) — do not convert these to pure queries.

use keyscan_hal::Millis;

/// Debounced state of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    /// Only ever seen as the *previous* state before the first transition
    Uninitialized,
    /// Button is released (not pressed)
    Released,
    /// Button is pressed
    Pressed,
}

/// Higher-level action synthesized from button activity.
///
/// Double-click detection is deliberately absent from this model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    /// No pending action
    None,
    /// Press followed by release within the long-press threshold
    /// (reported at the release)
    Click,
    /// Held past the long-press threshold (reported at the threshold
    /// crossing, not at the release)
    LongPress,
}

/// State machine for a single key.
///
/// Normally driven by [`ButtonMatrix`](crate::matrix::ButtonMatrix), but
/// usable standalone: feed raw states through
/// [`update_state`](Self::update_state) and poll the edge accessors.
///
/// A disabled button reports [`ButtonState::Released`] and never raises
/// edges or actions, while still tracking its raw state internally so
/// that re-enabling does not replay stale transitions.
#[derive(Debug, Clone)]
pub struct Button {
    /// Stable identity, assigned at construction
    number: u8,
    enabled: bool,
    cur_state: ButtonState,
    prev_state: ButtonState,
    last_action: ButtonAction,
    /// Timestamp of the last state transition
    state_change_ms: Millis,
    /// Duration of the state before the current one, frozen at the
    /// transition
    prev_state_duration: u32,
    /// One-shot suppression of the next rose edge
    swallow_next_rose: bool,
    /// Sticky-until-read edge flags
    state_changed: bool,
    fell: bool,
    rose: bool,
    /// Set once a long press has fired for the current pressed episode
    long_press_latched: bool,
}

impl Button {
    /// Create a new, enabled button.
    ///
    /// The state starts as [`ButtonState::Released`] with the previous
    /// state [`ButtonState::Uninitialized`].
    pub const fn new(number: u8) -> Self {
        Self {
            number,
            enabled: true,
            cur_state: ButtonState::Released,
            prev_state: ButtonState::Uninitialized,
            last_action: ButtonAction::None,
            state_change_ms: 0,
            prev_state_duration: 0,
            swallow_next_rose: false,
            state_changed: false,
            fell: false,
            rose: false,
            long_press_latched: false,
        }
    }

    /// The button's number.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Whether the button is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the button.
    ///
    /// A disabled button always reports released and never notifies.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Current debounced state.
    ///
    /// Always [`ButtonState::Released`] while the button is disabled,
    /// regardless of the underlying raw state.
    pub fn current_state(&self) -> ButtonState {
        if self.enabled {
            self.cur_state
        } else {
            ButtonState::Released
        }
    }

    /// State the button was in before the last transition.
    pub fn previous_state(&self) -> ButtonState {
        self.prev_state
    }

    /// Whether the button is currently pressed (and enabled).
    pub fn is_pressed(&self) -> bool {
        self.enabled && self.cur_state == ButtonState::Pressed
    }

    /// Time spent in the current state as of `now`.
    ///
    /// Wrapping difference; correct across the 32-bit millisecond
    /// rollover.
    pub fn current_state_duration(&self, now: Millis) -> u32 {
        now.wrapping_sub(self.state_change_ms)
    }

    /// Duration of the previous state, frozen at the last transition.
    pub fn previous_state_duration(&self) -> u32 {
        self.prev_state_duration
    }

    /// Apply a new raw state.
    ///
    /// No-op when `newState` equals the current state. On a transition
    /// the edge flags are recomputed: `fell` on entering pressed, `rose`
    /// on entering released unless a swallow was pending. Entering
    /// released also clears the long-press latch and consumes any
    /// pending swallow.
    ///
    /// Returns true if the state changed and the button is enabled.
    pub fn update_state(&mut self, new_state: ButtonState, now: Millis) -> bool {
        if new_state == self.cur_state {
            return false;
        }

        self.fell = false;
        self.rose = false;
        self.prev_state_duration = now.wrapping_sub(self.state_change_ms);
        self.state_change_ms = now;

        self.prev_state = self.cur_state;
        self.cur_state = new_state;

        // disabled buttons never report a change
        self.state_changed = self.enabled;
        self.fell = new_state == ButtonState::Pressed;
        if new_state == ButtonState::Released {
            self.rose = !self.swallow_next_rose;
            // one-shot: the next rose notifies again
            self.swallow_next_rose = false;
            self.long_press_latched = false;
        }

        self.state_changed
    }

    /// Check for a long press.
    ///
    /// True exactly once per pressed episode: on the first call where
    /// the button is pressed, enabled, and has been held for at least
    /// `threshold_ms`. Latches afterwards, so polling this every tick is
    /// safe; the latch clears when the button re-enters released.
    pub fn is_long_pressed(&mut self, now: Millis, threshold_ms: u16) -> bool {
        if !self.long_press_latched
            && self.is_pressed()
            && self.current_state_duration(now) >= u32::from(threshold_ms)
        {
            self.long_press_latched = true;
            return true;
        }
        false
    }

    /// Force the button into released without notifying anything.
    ///
    /// Transitions through [`update_state`](Self::update_state) and then
    /// discards the edge flags it produced. The matrix uses this after
    /// synthesizing a long-press action so the eventual physical release
    /// does not also emit a rose edge or a click.
    pub fn force_released(&mut self, now: Millis) {
        self.update_state(ButtonState::Released, now);
        self.rose = false;
        self.fell = false;
        self.state_changed = false;
    }

    /// Suppress (or, with `false`, stop suppressing) the next rose edge.
    ///
    /// The suppression is consumed by the next released-entry; calling
    /// with `false` before that cancels it.
    pub fn swallow_next_rose_event(&mut self, swallow: bool) {
        self.swallow_next_rose = swallow;
    }

    /// Whether the state changed since the last query. Read-resets.
    pub fn has_state_changed(&mut self) -> bool {
        let result = self.state_changed && self.enabled;
        self.state_changed = false;
        result
    }

    /// Whether the state fell (released -> pressed). Read-resets, also
    /// clearing the change flag.
    pub fn fell(&mut self) -> bool {
        let result = self.fell && self.enabled;
        self.fell = false;
        self.state_changed = false;
        result
    }

    /// Whether the state rose (pressed -> released). Read-resets, also
    /// clearing the change flag.
    pub fn rose(&mut self) -> bool {
        let result = self.rose && self.enabled;
        self.rose = false;
        self.state_changed = false;
        result
    }

    /// Record the action last executed on this button.
    ///
    /// Called by the matrix just before invoking the action callback, so
    /// the callback can read the action via [`last_action`](Self::last_action).
    pub fn update_action(&mut self, action: ButtonAction) {
        self.last_action = action;
    }

    /// The last synthesized action, left in place.
    pub fn last_action(&self) -> ButtonAction {
        self.last_action
    }

    /// The last synthesized action, reset to [`ButtonAction::None`].
    pub fn take_last_action(&mut self) -> ButtonAction {
        core::mem::replace(&mut self.last_action, ButtonAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn initial_state() {
        let btn = Button::new(7);
        assert_eq!(btn.number(), 7);
        assert!(btn.is_enabled());
        assert_eq!(btn.current_state(), ButtonState::Released);
        assert_eq!(btn.previous_state(), ButtonState::Uninitialized);
        assert!(!btn.is_pressed());
        assert_eq!(btn.last_action(), ButtonAction::None);
    }

    #[test]
    fn press_sets_fell_once() {
        let mut btn = Button::new(0);
        assert!(btn.update_state(ButtonState::Pressed, 100));
        assert!(btn.is_pressed());
        assert!(btn.fell());
        // read-resets: second query is false
        assert!(!btn.fell());
        assert!(!btn.has_state_changed());
    }

    #[test]
    fn release_sets_rose_once() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 100);
        let _ = btn.fell();
        assert!(btn.update_state(ButtonState::Released, 150));
        assert!(btn.rose());
        assert!(!btn.rose());
    }

    #[test]
    fn same_state_is_a_noop() {
        let mut btn = Button::new(0);
        assert!(!btn.update_state(ButtonState::Released, 50));
        assert!(!btn.has_state_changed());
        assert_eq!(btn.previous_state(), ButtonState::Uninitialized);
    }

    #[test]
    fn state_change_query_resets() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 10);
        assert!(btn.has_state_changed());
        assert!(!btn.has_state_changed());
        // fell flag survives a has_state_changed read
        assert!(btn.fell());
    }

    #[test]
    fn durations_freeze_at_transition() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 1000);
        assert_eq!(btn.current_state_duration(1400), 400);
        btn.update_state(ButtonState::Released, 1500);
        assert_eq!(btn.previous_state_duration(), 500);
        assert_eq!(btn.current_state_duration(1500), 0);
    }

    #[test]
    fn durations_tolerate_clock_wraparound() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, u32::MAX - 99);
        // 100ms before rollover, queried 200ms after the transition
        assert_eq!(btn.current_state_duration(100), 200);
        assert!(btn.is_long_pressed(100, 150));
    }

    #[test]
    fn disabled_button_reports_nothing() {
        let mut btn = Button::new(0);
        btn.set_enabled(false);
        assert!(!btn.update_state(ButtonState::Pressed, 10));
        assert_eq!(btn.current_state(), ButtonState::Released);
        assert!(!btn.is_pressed());
        assert!(!btn.fell());
        assert!(!btn.has_state_changed());
        assert!(!btn.is_long_pressed(10_000, 100));
        assert!(!btn.update_state(ButtonState::Released, 20));
        assert!(!btn.rose());
    }

    #[test]
    fn long_press_fires_once_per_episode() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 0);
        assert!(!btn.is_long_pressed(200, 1000));
        assert!(btn.is_long_pressed(1010, 1000));
        // latched: polling past the threshold does not re-fire
        assert!(!btn.is_long_pressed(2000, 1000));
        assert!(!btn.is_long_pressed(60_000, 1000));

        // latch clears on released entry, next episode fires again
        btn.update_state(ButtonState::Released, 60_001);
        btn.update_state(ButtonState::Pressed, 60_002);
        assert!(btn.is_long_pressed(61_010, 1000));
    }

    #[test]
    fn long_press_exactly_at_threshold() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 500);
        assert!(!btn.is_long_pressed(1499, 1000));
        assert!(btn.is_long_pressed(1500, 1000));
    }

    #[test]
    fn force_released_emits_no_edges() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 0);
        let _ = btn.fell();
        btn.force_released(10);
        assert_eq!(btn.current_state(), ButtonState::Released);
        assert!(!btn.rose());
        assert!(!btn.fell());
        assert!(!btn.has_state_changed());
    }

    #[test]
    fn swallow_suppresses_next_rose_only() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 0);
        btn.swallow_next_rose_event(true);
        btn.update_state(ButtonState::Released, 10);
        assert!(!btn.rose());

        // consumed: the following release notifies again
        btn.update_state(ButtonState::Pressed, 20);
        btn.update_state(ButtonState::Released, 30);
        assert!(btn.rose());
    }

    #[test]
    fn swallow_can_be_reverted_before_consumption() {
        let mut btn = Button::new(0);
        btn.update_state(ButtonState::Pressed, 0);
        btn.swallow_next_rose_event(true);
        btn.swallow_next_rose_event(false);
        btn.update_state(ButtonState::Released, 10);
        assert!(btn.rose());
    }

    #[test]
    fn action_peek_and_take() {
        let mut btn = Button::new(0);
        btn.update_action(ButtonAction::Click);
        assert_eq!(btn.last_action(), ButtonAction::Click);
        assert_eq!(btn.last_action(), ButtonAction::Click);
        assert_eq!(btn.take_last_action(), ButtonAction::Click);
        assert_eq!(btn.last_action(), ButtonAction::None);
    }

    proptest! {
        /// A disabled button is observably inert for any input sequence.
        #[test]
        fn disabled_button_is_inert(raw in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut btn = Button::new(1);
            btn.set_enabled(false);
            let mut now = 0u32;
            for pressed in raw {
                now = now.wrapping_add(20);
                let state = if pressed { ButtonState::Pressed } else { ButtonState::Released };
                prop_assert!(!btn.update_state(state, now));
                prop_assert_eq!(btn.current_state(), ButtonState::Released);
                prop_assert!(!btn.fell());
                prop_assert!(!btn.rose());
                prop_assert!(!btn.has_state_changed());
                prop_assert!(!btn.is_long_pressed(now.wrapping_add(100_000), 10));
            }
        }

        /// Each edge is observed exactly once: the number of true fell()
        /// reads equals the number of released->pressed transitions, and
        /// likewise for rose().
        #[test]
        fn edges_observed_exactly_once(raw in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut btn = Button::new(2);
            let mut now = 0u32;
            let mut was_pressed = false;
            let (mut expected_fell, mut expected_rose) = (0u32, 0u32);
            let (mut seen_fell, mut seen_rose) = (0u32, 0u32);
            for pressed in raw {
                now = now.wrapping_add(20);
                if pressed != was_pressed {
                    if pressed { expected_fell += 1 } else { expected_rose += 1 }
                }
                was_pressed = pressed;
                let state = if pressed { ButtonState::Pressed } else { ButtonState::Released };
                btn.update_state(state, now);
                // read twice: the second read must never add an observation
                if btn.fell() { seen_fell += 1 }
                prop_assert!(!btn.fell());
                if btn.rose() { seen_rose += 1 }
                prop_assert!(!btn.rose());
            }
            prop_assert_eq!(seen_fell, expected_fell);
            prop_assert_eq!(seen_rose, expected_rose);
        }
    }
}
