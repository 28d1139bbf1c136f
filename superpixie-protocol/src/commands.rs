//! Command codes for both protocol generations
//!
//! Each generation numbers its commands in an append-only table. The
//! tables overlap in meaning but not in numbering, so they are mapped onto
//! one semantic [`Command`] enum. A code missing from the active table
//! decodes to `None` and must be ignored by the receiver.

use crate::packet::WireProfile;

/// Semantic command, independent of wire numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    Null,
    Ack,
    /// Full-byte: liveness check answered with ACK. Nibble: discovery probe.
    Probe,
    ProbeResponse,
    Blink,
    ResetChain,
    EnablePropagation,
    AssignAddress,
    SetBaud,
    SetDebugLed,
    /// Full-byte SET_DEBUG_DIGIT, nibble SET_CHARACTER
    SetCharacter,
    SetBrightness,
    /// Full-byte SET_COLORS, nibble SET_DISPLAY_COLORS
    SetDisplayColors,
    Show,
    /// Full-byte SEND_STRING, nibble SET_STRING
    SetString,
    Announce,
    SetTransitionType,
    SetTransitionDurationMs,
    SetTransitionInterpolation,
    SetFrameBlending,
    SetFxColor,
    SetFxOpacity,
    SetFxBlur,
    SetGradientType,
    TouchEvent,
    ForceTransition,
    ScrollString,
    /// Full-byte SET_CHAIN_LENGTH, nibble INFORM_CHAIN_LENGTH
    SetChainLength,
    SetScrollSpeed,
    GetReadyStatus,
    ReadyStatus,
    LengthInquiry,
    LengthResponse,
    SetBacklightColor,
    SetBacklightBrightness,
    StartBusMode,
    EndBusMode,
    SetDebugOverlayOpacity,
    SetTouchGlowPosition,
    SetTouchGlowColor,
    ReadTouch,
    ReadTouchResponse,
    CalibrateTouch,
    SetTouchThreshold,
    SaveStorage,
    TransitionComplete,
    SetBackgroundColors,
    SetBackgroundGradientType,
}

/// Full-byte generation, indexed by wire code
const FULL_BYTE_TABLE: [Command; 29] = [
    Command::Null,
    Command::Ack,
    Command::Probe,
    Command::Blink,
    Command::ResetChain,
    Command::EnablePropagation,
    Command::AssignAddress,
    Command::SetBaud,
    Command::SetDebugLed,
    Command::SetCharacter,
    Command::SetBrightness,
    Command::SetDisplayColors,
    Command::Show,
    Command::SetString,
    Command::Announce,
    Command::SetTransitionType,
    Command::SetTransitionDurationMs,
    Command::SetFrameBlending,
    Command::SetFxColor,
    Command::SetFxOpacity,
    Command::SetFxBlur,
    Command::SetGradientType,
    Command::TouchEvent,
    Command::ForceTransition,
    Command::ScrollString,
    Command::SetChainLength,
    Command::SetScrollSpeed,
    Command::GetReadyStatus,
    Command::ReadyStatus,
];

/// Nibble generation, indexed by wire code
const NIBBLE_TABLE: [Command; 34] = [
    Command::Null,
    Command::Probe,
    Command::ProbeResponse,
    Command::EnablePropagation,
    Command::LengthInquiry,
    Command::LengthResponse,
    Command::SetChainLength,
    Command::SetBacklightColor,
    Command::SetFrameBlending,
    Command::SetBrightness,
    Command::Show,
    Command::SetTransitionType,
    Command::SetTransitionDurationMs,
    Command::SetCharacter,
    Command::StartBusMode,
    Command::EndBusMode,
    Command::SetDebugOverlayOpacity,
    Command::SetDisplayColors,
    Command::SetGradientType,
    Command::SetString,
    Command::SetTransitionInterpolation,
    Command::SetTouchGlowPosition,
    Command::SetTouchGlowColor,
    Command::ReadTouch,
    Command::ReadTouchResponse,
    Command::CalibrateTouch,
    Command::SetTouchThreshold,
    Command::SaveStorage,
    Command::TouchEvent,
    Command::TransitionComplete,
    Command::Ack,
    Command::SetBackgroundColors,
    Command::SetBackgroundGradientType,
    Command::SetBacklightBrightness,
];

const fn table(profile: WireProfile) -> &'static [Command] {
    match profile {
        WireProfile::FullByte => &FULL_BYTE_TABLE,
        WireProfile::NibblePadded => &NIBBLE_TABLE,
    }
}

impl Command {
    /// Look up a wire code in the given generation's table
    pub fn from_code(profile: WireProfile, code: u16) -> Option<Self> {
        table(profile).get(code as usize).copied()
    }

    /// Wire code of this command in the given generation
    ///
    /// Returns `None` if the generation has no such command.
    pub fn code(self, profile: WireProfile) -> Option<u16> {
        table(profile)
            .iter()
            .position(|&command| command == self)
            .map(|index| index as u16)
    }
}
