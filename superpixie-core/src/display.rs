//! Command dispatcher and per-node render state
//!
//! [`Display`] owns everything a node draws: the render machine, the
//! compositor and its effect layers, touch filtering, the link watchdog
//! and the scroll queue. Chain engines hand it every render command that
//! reaches this node; chain-level commands never get here.
//!
//! The two generations apply setters differently:
//! - full-byte: setters change what is on screen immediately, character
//!   commands start their own transition.
//! - nibble: setters edit the pending state, `SHOW` runs the transition.

use heapless::Deque;
use superpixie_protocol::{Command, PayloadReader, WireProfile};

use crate::chain::ChainConfig;
use crate::color::ColorF;
use crate::compose::touch::glow_point;
use crate::compose::{Compositor, Frame, FrameInputs, RenderSettings, Ripple, RippleLayer, TouchCalibration, TouchFilter};
use crate::config::StorageRecord;
use crate::easing::Interpolation;
use crate::render::{RenderMachine, ScrollQueue, ScrollStep};
use crate::safety::watchdog::{ALARM_FADE_MS, ALARM_GLYPH};
use crate::safety::{LinkFault, LinkWatchdog};
use crate::state::{GlowPosition, GradientType, SystemState, TransitionType};

/// Events waiting for the firmware
pub const EVENT_CAPACITY: usize = 8;

/// Lifetime of the ripple spawned by a touch
pub const TOUCH_RIPPLE_MS: u64 = 600;

/// Full-byte boot colour of the character
pub const FULL_BYTE_COLOR: ColorF = ColorF::new(1.0, 0.0, 0.0);

/// Default push-left duration of a scroll step
pub const DEFAULT_SCROLL_MS: u16 = 150;

/// Default hold after each scroll step
pub const DEFAULT_HOLD_MS: u16 = 250;

/// Where a command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecContext {
    pub local_address: u8,
    pub chain_length: u8,
    pub now_ms: u64,
}

/// Data a command asks the engine to send back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    None,
    ReadyStatus(bool),
    TouchValue(u16),
}

/// Something the firmware has to act on or log
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeEvent {
    Assigned(u8),
    ChainLength(u8),
    Propagation(bool),
    BusMode(bool),
    /// Discovery found no downstream neighbour
    Terminating,
    Blink,
    SetBaud(u32),
    DebugLed(u8),
    /// Persist this record
    SaveStorage(StorageRecord),
    LinkFault(LinkFault),
    /// Chain reset by the commander
    Reset,
    /// Marquee text did not fit; only this many steps were queued
    ScrollTruncated(usize),
}

pub struct Display {
    profile: WireProfile,
    machine: RenderMachine,
    settings: RenderSettings,
    compositor: Compositor,
    ripple: RippleLayer,
    touch: TouchFilter,
    watchdog: LinkWatchdog,
    scroll: ScrollQueue,
    /// Transition type and duration to restore once a scroll drains
    saved_transition: Option<(TransitionType, u32)>,
    force_transition: bool,
    scroll_ms: u16,
    hold_ms: u16,
    debug_led: u8,
    events: Deque<NodeEvent, EVENT_CAPACITY>,
}

impl Display {
    pub fn new(profile: WireProfile, record: &StorageRecord) -> Self {
        let mut display = Self {
            profile,
            machine: RenderMachine::new(),
            settings: RenderSettings::default(),
            compositor: Compositor::new(),
            ripple: RippleLayer::new(),
            touch: TouchFilter::new(record.calibration()),
            watchdog: LinkWatchdog::new(),
            scroll: ScrollQueue::new(),
            saved_transition: None,
            force_transition: true,
            scroll_ms: DEFAULT_SCROLL_MS,
            hold_ms: DEFAULT_HOLD_MS,
            debug_led: 0,
            events: Deque::new(),
        };
        display.apply_profile_defaults();
        display
    }

    /// Back to boot render state; calibration and watchdog are kept
    pub fn reset(&mut self) {
        self.machine.reset();
        self.settings = RenderSettings::default();
        self.ripple.clear();
        self.scroll.clear();
        self.saved_transition = None;
        self.force_transition = true;
        self.scroll_ms = DEFAULT_SCROLL_MS;
        self.hold_ms = DEFAULT_HOLD_MS;
        self.debug_led = 0;
        self.apply_profile_defaults();
    }

    fn apply_profile_defaults(&mut self) {
        if self.profile == WireProfile::FullByte {
            self.machine.update_system_now(|s| {
                s.display_color_a = FULL_BYTE_COLOR;
                s.display_color_b = FULL_BYTE_COLOR;
                s.transition_duration_ms = 0;
            });
        }
    }

    pub fn profile(&self) -> WireProfile {
        self.profile
    }

    pub fn machine(&self) -> &RenderMachine {
        &self.machine
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn calibration(&self) -> &TouchCalibration {
        self.touch.calibration()
    }

    pub fn debug_led(&self) -> u8 {
        self.debug_led
    }

    /// Not busy with a scroll
    pub fn is_ready(&self) -> bool {
        !self.scroll.is_active()
    }

    /// Record link activity
    pub fn feed_watchdog(&mut self) {
        self.watchdog.feed();
    }

    /// Queue an event; the oldest one is dropped when full
    pub fn push_event(&mut self, event: NodeEvent) {
        if self.events.is_full() {
            self.events.pop_front();
        }
        let _ = self.events.push_back(event);
    }

    pub fn take_event(&mut self) -> Option<NodeEvent> {
        self.events.pop_front()
    }

    /// Run one render command
    ///
    /// Unknown or chain-level commands are ignored.
    pub fn execute(&mut self, command: Command, payload: &[u8], ctx: &ExecContext) -> Reply {
        let data = PayloadReader::new(payload);

        match command {
            Command::Blink => self.push_event(NodeEvent::Blink),
            Command::SetBaud => self.push_event(NodeEvent::SetBaud(data.u32_be(0))),
            Command::SetDebugLed => {
                self.debug_led = data.u8(0);
                self.push_event(NodeEvent::DebugLed(self.debug_led));
            }
            Command::SetCharacter => self.set_character(data.u8(0), ctx.now_ms),
            Command::SetString => {
                if let Some(&glyph) = payload.get(ctx.local_address as usize) {
                    self.set_character(glyph, ctx.now_ms);
                }
            }
            Command::Show => {
                self.watchdog.feed();
                if self.profile == WireProfile::NibblePadded {
                    self.machine.trigger_transition(ctx.now_ms);
                }
            }
            Command::SetBrightness => {
                let brightness = data.unit(0);
                self.edit_system(|s| s.brightness = brightness);
            }
            Command::SetDisplayColors => {
                let a = ColorF::from_array(data.rgb_unit(0));
                let b = ColorF::from_array(data.rgb_unit(3));
                self.edit_system(|s| {
                    s.display_color_a = a;
                    s.display_color_b = b;
                });
            }
            Command::SetBackgroundColors => {
                let a = ColorF::from_array(data.rgb_unit(0));
                let b = ColorF::from_array(data.rgb_unit(3));
                self.edit_system(|s| {
                    s.background_color_a = a;
                    s.background_color_b = b;
                });
            }
            Command::SetBacklightColor => {
                let color = ColorF::from_array(data.rgb_unit(0));
                self.edit_system(|s| s.backlight_color = color);
            }
            Command::SetBacklightBrightness => {
                let brightness = data.unit(0);
                self.edit_system(|s| s.backlight_brightness = brightness);
            }
            Command::SetTransitionType => {
                if let Some(kind) = TransitionType::from_u8(data.u8(0)) {
                    self.edit_system(|s| s.transition_type = kind);
                }
            }
            Command::SetTransitionDurationMs => {
                let duration = data.u16_be(0) as u32;
                self.edit_system(|s| s.transition_duration_ms = duration);
            }
            Command::SetTransitionInterpolation => {
                if let Some(curve) = Interpolation::from_u8(data.u8(0)) {
                    self.edit_system(|s| s.transition_interpolation = curve);
                }
            }
            Command::SetGradientType => {
                if let Some(kind) = self.gradient(data.u8(0)) {
                    self.edit_system(|s| s.gradient_type = kind);
                }
            }
            Command::SetBackgroundGradientType => {
                if let Some(kind) = GradientType::from_u8(data.u8(0)) {
                    self.edit_system(|s| s.background_gradient_type = kind);
                }
            }
            Command::SetFrameBlending => self.settings.frame_blending = data.unit(0),
            Command::SetFxColor => self.settings.fx_color = ColorF::from_array(data.rgb_unit(0)),
            Command::SetFxOpacity => self.settings.fx_opacity = data.unit(0),
            Command::SetFxBlur => self.settings.fx_blur = data.u8(0) as f32 / 25.5,
            Command::SetDebugOverlayOpacity => self.settings.debug_overlay_opacity = data.unit(0),
            Command::ForceTransition => self.force_transition = data.flag(0),
            Command::ScrollString => self.start_scroll(payload, ctx),
            Command::SetScrollSpeed => {
                self.scroll_ms = data.u16_be(0);
                self.hold_ms = data.u16_be(2);
            }
            Command::GetReadyStatus => return Reply::ReadyStatus(self.is_ready()),
            Command::SetTouchGlowPosition => {
                if let Some(position) = GlowPosition::from_u8(data.u8(0)) {
                    self.machine.update_system_now(|s| s.touch_glow_position = position);
                }
            }
            Command::SetTouchGlowColor => {
                let color = ColorF::from_array(data.rgb_unit(0));
                self.machine.update_system_now(|s| s.touch_color = color);
            }
            Command::ReadTouch => return Reply::TouchValue(self.touch.raw()),
            Command::CalibrateTouch => {
                let raw = self.touch.raw() as f32;
                let calibration = self.touch.calibration_mut();
                if data.flag(0) {
                    calibration.high = raw - 5.0;
                } else {
                    calibration.low = raw + 5.0;
                }
            }
            Command::SetTouchThreshold => self.touch.calibration_mut().threshold = data.unit(0),
            Command::SaveStorage => {
                let record = StorageRecord::from_calibration(self.touch.calibration());
                self.push_event(NodeEvent::SaveStorage(record));
            }
            _ => {}
        }

        Reply::None
    }

    fn edit_system(&mut self, edit: impl FnMut(&mut SystemState)) {
        match self.profile {
            WireProfile::FullByte => self.machine.update_system_now(edit),
            WireProfile::NibblePadded => {
                let mut edit = edit;
                edit(self.machine.pending_system_mut());
            }
        }
    }

    fn gradient(&self, value: u8) -> Option<GradientType> {
        match self.profile {
            WireProfile::FullByte => GradientType::from_full_byte(value),
            WireProfile::NibblePadded => GradientType::from_u8(value),
        }
    }

    fn set_character(&mut self, glyph: u8, now_ms: u64) {
        match self.profile {
            WireProfile::FullByte => {
                // Ignored mid-transition; unchanged glyphs only when forced
                if self.machine.is_running() {
                    return;
                }
                if glyph == self.machine.current_character().glyph && !self.force_transition {
                    return;
                }
                self.machine.set_pending_glyph(glyph);
                self.machine.trigger_transition(now_ms);
            }
            WireProfile::NibblePadded => self.machine.set_pending_glyph(glyph),
        }
    }

    fn start_scroll(&mut self, text: &[u8], ctx: &ExecContext) {
        if self.saved_transition.is_none() {
            let current = self.machine.current_system();
            self.saved_transition = Some((current.transition_type, current.transition_duration_ms));
        }

        let scroll_ms = self.scroll_ms as u32;
        self.machine.update_system_now(|s| {
            s.transition_type = TransitionType::PushLeft;
            s.transition_duration_ms = scroll_ms;
        });

        let step_ms = scroll_ms + self.hold_ms as u32;
        let complete = self
            .scroll
            .load(text, ctx.local_address, ctx.chain_length, step_ms, ctx.now_ms);
        if !complete {
            self.push_event(NodeEvent::ScrollTruncated(self.scroll.remaining()));
        }
    }

    fn poll_scroll(&mut self, now_ms: u64) {
        match self.scroll.poll(now_ms) {
            ScrollStep::Glyph(glyph) => {
                self.machine.set_pending_glyph(glyph);
                self.machine.trigger_transition(now_ms);
            }
            ScrollStep::Finished => {
                if let Some((kind, duration)) = self.saved_transition.take() {
                    self.machine.update_system_now(|s| {
                        s.transition_type = kind;
                        s.transition_duration_ms = duration;
                    });
                }
            }
            ScrollStep::Idle | ScrollStep::Wait => {}
        }
    }

    fn raise_alarm(&mut self, fault: LinkFault, now_ms: u64) {
        let color = fault.color();
        let pending = self.machine.pending_system_mut();
        pending.display_color_a = color;
        pending.display_color_b = color;
        pending.backlight_color = color;
        pending.transition_type = TransitionType::Fade;
        pending.transition_duration_ms = ALARM_FADE_MS;

        self.settings.frame_blending = 0.0;
        self.machine.set_pending_glyph(ALARM_GLYPH);
        self.machine.trigger_transition(now_ms);
        self.push_event(NodeEvent::LinkFault(fault));
    }

    /// Feed a raw touch reading
    ///
    /// Returns `Some(active)` on a touch edge. A press also starts a
    /// ripple from the glow point.
    pub fn set_touch_reading(&mut self, raw: u16, now_ms: u64) -> Option<bool> {
        let edge = self.touch.update(raw, now_ms);
        let active = self.touch.is_active();
        self.machine.update_system_now(|s| {
            s.touch_value = raw;
            s.touch_active = active;
        });

        if edge == Some(true) {
            let live = self.machine.live_system();
            self.ripple.spawn(Ripple {
                start_color: live.touch_color,
                dest_color: live.display_color_a,
                position: glow_point(live.touch_glow_position),
                width: 1.5,
                opacity: 1.0,
                curve: Interpolation::EaseOut,
                start_ms: now_ms,
                end_ms: now_ms + TOUCH_RIPPLE_MS,
            });
        }
        edge
    }

    /// Advance time-driven state
    ///
    /// Returns `true` once per completed transition.
    pub fn tick(&mut self, now_ms: u64, assigned: bool) -> bool {
        if let Some(fault) = self.watchdog.check(now_ms, assigned) {
            self.raise_alarm(fault, now_ms);
        }
        self.poll_scroll(now_ms);
        self.ripple.update(now_ms);
        self.machine.tick(now_ms);
        self.machine.take_transition_complete()
    }

    /// Compose the next frame
    pub fn render(&mut self, now_ms: u64, chain: &ChainConfig, terminating: bool, out: &mut Frame) {
        let inputs = FrameInputs {
            machine: &self.machine,
            settings: &self.settings,
            ripple: &self.ripple,
            touch_strength: self.touch.strength(),
            chain,
            terminating,
        };
        self.compositor.compose(&inputs, now_ms, out);
    }
}
