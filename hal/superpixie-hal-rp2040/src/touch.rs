//! RC-timing touch pad
//!
//! The RP2040 has no touch peripheral. The pad is charged through its GPIO,
//! released to an input with a pull-down, and the time until it reads low
//! is counted. A finger adds capacitance and stretches the discharge.

use embassy_rp::gpio::{Flex, Pull};
use embassy_time::Timer;

/// Charge time before each measurement
pub const CHARGE_US: u64 = 10;

/// Upper bound of one measurement in polling loops
pub const MAX_COUNT: u16 = 4000;

/// Samples averaged per reading
pub const SAMPLES: u16 = 4;

pub struct RcTouchPad<'d> {
    pad: Flex<'d>,
}

impl<'d> RcTouchPad<'d> {
    pub fn new(mut pad: Flex<'d>) -> Self {
        pad.set_pull(Pull::Down);
        pad.set_as_input();
        Self { pad }
    }

    async fn sample(&mut self) -> u16 {
        self.pad.set_high();
        self.pad.set_as_output();
        Timer::after_micros(CHARGE_US).await;

        let count = cortex_m::interrupt::free(|_| {
            self.pad.set_as_input();
            let mut count = 0u16;
            while self.pad.is_high() && count < MAX_COUNT {
                count += 1;
                cortex_m::asm::nop();
            }
            count
        });
        count
    }
}

impl<'d> superpixie_hal::TouchSensor for RcTouchPad<'d> {
    async fn read(&mut self) -> u16 {
        let mut total: u32 = 0;
        for _ in 0..SAMPLES {
            total += self.sample().await as u32;
        }
        (total / SAMPLES as u32) as u16
    }
}
