//! Render state machine
//!
//! ```text
//! IDLE ──trigger──► RUNNING (progress 0 → 1) ──progress ≥ 1──► IDLE (slots swapped)
//! ```
//!
//! While running, the live system state is interpolated between the
//! current and pending slots with the eased progress, and both characters
//! are drawn with the poses of the active transition shape. Completion is
//! decided on the raw progress so the easing curve never delays the swap.

use crate::easing::Interpolation;
use crate::math::clip_unit;
use crate::state::{CharacterState, DoubleSlot, SystemState, TransitionType};

use super::transitions;

#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    start_ms: u64,
    duration_ms: u32,
    kind: TransitionType,
    curve: Interpolation,
    /// Completes on the first tick without animating
    immediate: bool,
}

/// Owns the current/pending/live triads of system and character state
#[derive(Debug, Clone)]
pub struct RenderMachine {
    system: DoubleSlot<SystemState>,
    character: DoubleSlot<CharacterState>,
    live_system: SystemState,
    live_outgoing: CharacterState,
    live_incoming: Option<CharacterState>,
    transition: Option<ActiveTransition>,
    progress: f32,
    transition_complete: bool,
}

impl Default for RenderMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderMachine {
    pub fn new() -> Self {
        Self {
            system: DoubleSlot::new(SystemState::new()),
            character: DoubleSlot::new(CharacterState::new()),
            live_system: SystemState::new(),
            live_outgoing: CharacterState::new(),
            live_incoming: None,
            transition: None,
            progress: 0.0,
            transition_complete: false,
        }
    }

    /// Back to boot defaults, dropping any running transition
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Start a transition from the current to the pending slots
    ///
    /// Transition type, duration and curve are read from the pending
    /// system state. Re-triggering while running restarts the clock.
    pub fn trigger_transition(&mut self, now_ms: u64) {
        let pending = self.system.pending();
        let kind = pending.transition_type;
        let duration_ms = pending.transition_duration_ms;
        let immediate = kind == TransitionType::Instant || duration_ms == 0;

        self.transition = Some(ActiveTransition {
            start_ms: now_ms,
            duration_ms,
            kind,
            curve: pending.transition_interpolation,
            immediate,
        });
        self.progress = if immediate { 1.0 } else { 0.0 };
    }

    /// Advance the machine to `now_ms` and refresh the live state
    pub fn tick(&mut self, now_ms: u64) {
        let Some(transition) = self.transition else {
            self.publish_idle();
            return;
        };

        let progress = if transition.immediate {
            1.0
        } else {
            let elapsed = now_ms.saturating_sub(transition.start_ms) as f32;
            clip_unit(elapsed / transition.duration_ms as f32)
        };
        let shaped = transition.curve.apply(progress);
        self.progress = progress;

        let frame = transitions::evaluate(transition.kind, progress, shaped);
        self.live_system = self.system.current().interpolate(self.system.pending(), shaped);
        self.live_outgoing = self.character.current().posed(&frame.outgoing);
        self.live_incoming = Some(self.character.pending().posed(&frame.incoming));

        if progress >= 1.0 {
            let system_dirty = self.system.swap();
            let character_dirty = self.character.swap();
            self.transition = None;
            if system_dirty || character_dirty {
                self.transition_complete = true;
            }
            self.publish_idle();
        }
    }

    fn publish_idle(&mut self) {
        self.live_system = *self.system.current();
        self.live_outgoing = *self.character.current();
        self.live_incoming = None;
    }

    pub fn is_running(&self) -> bool {
        self.transition.is_some()
    }

    /// Raw progress of the running transition (1.0 when idle)
    pub fn progress(&self) -> f32 {
        if self.transition.is_some() {
            self.progress
        } else {
            1.0
        }
    }

    /// One-shot completion edge; reading it clears it
    pub fn take_transition_complete(&mut self) -> bool {
        core::mem::replace(&mut self.transition_complete, false)
    }

    pub fn current_system(&self) -> &SystemState {
        self.system.current()
    }

    pub fn pending_system(&self) -> &SystemState {
        self.system.pending()
    }

    /// Pending system state, applied by the next transition
    pub fn pending_system_mut(&mut self) -> &mut SystemState {
        self.system.pending_mut()
    }

    /// Change system state on screen immediately, without a transition
    pub fn update_system_now(&mut self, mut edit: impl FnMut(&mut SystemState)) {
        self.system.set_both(&mut edit);
        edit(&mut self.live_system);
    }

    pub fn live_system(&self) -> &SystemState {
        &self.live_system
    }

    pub fn current_character(&self) -> &CharacterState {
        self.character.current()
    }

    pub fn pending_character(&self) -> &CharacterState {
        self.character.pending()
    }

    pub fn pending_character_mut(&mut self) -> &mut CharacterState {
        self.character.pending_mut()
    }

    /// Queue a glyph into the pending slot, fully visible
    pub fn set_pending_glyph(&mut self, glyph: u8) {
        let pending = self.character.pending_mut();
        pending.glyph = glyph;
        pending.opacity = 1.0;
    }

    /// Characters to draw this frame: the outgoing (or only) one and the
    /// incoming one while a transition runs
    pub fn live_characters(&self) -> (&CharacterState, Option<&CharacterState>) {
        (&self.live_outgoing, self.live_incoming.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorF;

    fn fade_machine(duration_ms: u32) -> RenderMachine {
        let mut machine = RenderMachine::new();
        machine.update_system_now(|s| {
            s.transition_type = TransitionType::Fade;
            s.transition_duration_ms = duration_ms;
        });
        machine.tick(0);
        machine
    }

    #[test]
    fn test_idle_shows_current() {
        let mut machine = RenderMachine::new();
        machine.set_pending_glyph(b'A');
        machine.tick(10);

        let (outgoing, incoming) = machine.live_characters();
        assert_eq!(outgoing.glyph, b' ');
        assert!(incoming.is_none());
        assert!(!machine.is_running());
    }

    #[test]
    fn test_fade_midpoint_and_completion() {
        let mut machine = fade_machine(250);
        machine.set_pending_glyph(b'7');
        machine.trigger_transition(1000);

        machine.tick(1125);
        let (outgoing, incoming) = machine.live_characters();
        let incoming = incoming.unwrap();
        // Boot character starts invisible, so scale by the base opacity
        assert!((outgoing.opacity - 0.0).abs() < 1e-6);
        assert!((incoming.opacity - 0.5).abs() < 1e-6);
        assert!(machine.is_running());
        assert!(!machine.take_transition_complete());

        machine.tick(1250);
        assert!(!machine.is_running());
        assert_eq!(machine.current_character().glyph, b'7');
        assert_eq!(machine.pending_character().glyph, b'7');
        assert!(machine.take_transition_complete());
        assert!(!machine.take_transition_complete());

        machine.tick(1300);
        assert!(!machine.take_transition_complete());
    }

    #[test]
    fn test_crossfade_between_visible_characters() {
        let mut machine = fade_machine(250);
        machine.set_pending_glyph(b'1');
        machine.trigger_transition(0);
        machine.tick(250);

        machine.set_pending_glyph(b'2');
        machine.trigger_transition(1000);
        machine.tick(1125);
        let (outgoing, incoming) = machine.live_characters();
        assert_eq!(outgoing.glyph, b'1');
        assert!((outgoing.opacity - 0.5).abs() < 1e-6);
        assert_eq!(incoming.unwrap().glyph, b'2');
        assert!((incoming.unwrap().opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_instant_completes_on_next_tick() {
        let mut machine = RenderMachine::new();
        machine.set_pending_glyph(b'X');
        machine.trigger_transition(0);
        assert_eq!(machine.progress(), 1.0);
        assert!(machine.is_running());

        machine.tick(0);
        assert!(!machine.is_running());
        assert_eq!(machine.current_character().glyph, b'X');
        assert!(machine.take_transition_complete());
    }

    #[test]
    fn test_clean_transition_raises_no_event() {
        let mut machine = RenderMachine::new();
        machine.trigger_transition(0);
        machine.tick(1);
        assert!(!machine.is_running());
        assert!(!machine.take_transition_complete());
    }

    #[test]
    fn test_system_state_interpolates_with_shaped_progress() {
        let mut machine = RenderMachine::new();
        machine.update_system_now(|s| {
            s.brightness = 0.0;
            s.transition_duration_ms = 100;
        });
        {
            let pending = machine.pending_system_mut();
            pending.brightness = 1.0;
            pending.transition_type = TransitionType::Fade;
            pending.transition_interpolation = Interpolation::EaseIn;
            pending.display_color_a = ColorF::new(0.0, 1.0, 0.0);
        }
        machine.trigger_transition(0);
        machine.tick(50);

        // Ease-in: 0.5² = 0.25
        assert!((machine.live_system().brightness - 0.25).abs() < 1e-6);
        assert!((machine.live_system().display_color_a.g - 0.25).abs() < 1e-6);
        assert_eq!(machine.current_system().brightness, 0.0);

        machine.tick(100);
        assert_eq!(machine.current_system().brightness, 1.0);
        assert_eq!(machine.live_system().brightness, 1.0);
    }

    #[test]
    fn test_zero_duration_is_immediate() {
        let mut machine = fade_machine(0);
        machine.set_pending_glyph(b'Q');
        machine.trigger_transition(5);
        machine.tick(5);
        assert_eq!(machine.current_character().glyph, b'Q');
    }

    #[test]
    fn test_update_system_now_skips_transition() {
        let mut machine = RenderMachine::new();
        machine.update_system_now(|s| s.brightness = 0.9);
        assert_eq!(machine.live_system().brightness, 0.9);
        assert_eq!(machine.pending_system().brightness, 0.9);
        assert!(!machine.is_running());
    }
}
