//! Status LED task

use defmt::*;
use embassy_rp::gpio::{Level, Output};
use embassy_time::Timer;

use crate::channels::{StatusLed, STATUS_LED};

/// On and off time of one identification blink
const BLINK_MS: u64 = 150;

/// Blinks per BLINK command
const BLINK_COUNT: u8 = 3;

#[embassy_executor::task]
pub async fn status_led_task(mut led: Output<'static>) {
    info!("Status LED task started");

    let mut level = Level::Low;
    loop {
        match STATUS_LED.wait().await {
            StatusLed::Level(on) => {
                level = Level::from(on);
                led.set_level(level);
            }
            StatusLed::Blink => {
                for _ in 0..BLINK_COUNT {
                    led.set_high();
                    Timer::after_millis(BLINK_MS).await;
                    led.set_low();
                    Timer::after_millis(BLINK_MS).await;
                }
                led.set_level(level);
            }
        }
    }
}
