//! Debug overlay showing the node's view of the chain
//!
//! ```text
//! row 0   ...P...   propagation on
//! row 1   ...B...   bus mode on
//! row 10  ...T...   terminating node
//! row 12  ███░░░░   chain length
//! row 14  ██░░░░░   local address + 1 (all red while unassigned)
//! ```

use superpixie_protocol::ADDRESS_NULL;

use crate::chain::ChainConfig;
use crate::color::ColorF;
use crate::raster::LEDS_X;

pub const ADDRESS_ROW: usize = 14;
pub const LENGTH_ROW: usize = 12;

const ADDRESS_ON: ColorF = ColorF::new(1.0, 0.5, 0.0);
const ADDRESS_OFF: ColorF = ColorF::new(0.25, 0.125, 0.0);
const UNASSIGNED: ColorF = ColorF::new(1.0, 0.0, 0.0);
const LENGTH_ON: ColorF = ColorF::new(0.0, 0.0, 1.0);
const LENGTH_OFF: ColorF = ColorF::new(0.0, 0.0, 0.25);
const TERMINATING: ColorF = ColorF::new(0.5, 0.0, 0.5);
const FLAG_ON: ColorF = ColorF::new(0.0, 0.5, 0.0);

const INDICATOR_COLUMN: usize = LEDS_X / 2;

/// Overlay color at a pixel, `None` where the overlay is transparent
pub fn sample(x: usize, y: usize, chain: &ChainConfig, terminating: bool) -> Option<ColorF> {
    match y {
        ADDRESS_ROW => Some(if chain.local_address == ADDRESS_NULL {
            UNASSIGNED
        } else if x < chain.local_address as usize + 1 {
            ADDRESS_ON
        } else {
            ADDRESS_OFF
        }),
        LENGTH_ROW => Some(if x < chain.chain_length as usize {
            LENGTH_ON
        } else {
            LENGTH_OFF
        }),
        10 if x == INDICATOR_COLUMN && terminating => Some(TERMINATING),
        0 if x == INDICATOR_COLUMN && chain.propagation => Some(FLAG_ON),
        1 if x == INDICATOR_COLUMN && chain.bus_mode => Some(FLAG_ON),
        _ => None,
    }
}

/// Blend the overlay over a pixel
pub fn apply(color: ColorF, x: usize, y: usize, chain: &ChainConfig, terminating: bool, opacity: f32) -> ColorF {
    if opacity <= 0.0 {
        return color;
    }
    match sample(x, y, chain, terminating) {
        Some(overlay) => color.lerp(overlay, opacity),
        None => color,
    }
}
