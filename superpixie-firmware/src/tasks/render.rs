//! Render task
//!
//! Composes a frame at a fixed rate and pushes it to the LEDs.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_time::{Duration, Instant, Ticker};
use smart_leds::RGB8;

use superpixie_core::compose::NUM_LEDS;
use superpixie_hal_rp2040::ws2812::PioWs2812;
use superpixie_hal_rp2040::LedSink;

use crate::channels::NODE;

#[embassy_executor::task]
pub async fn render_task(mut leds: PioWs2812<'static, PIO0, 0>, frame_rate_hz: u64) {
    info!("Render task started at {} fps", frame_rate_hz);

    let mut ticker = Ticker::every(Duration::from_hz(frame_rate_hz));
    let mut frame = [RGB8::default(); NUM_LEDS];

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        {
            let mut guard = NODE.lock().await;
            if let Some(node) = guard.as_mut() {
                node.render(now_ms, &mut frame);
            }
        }

        // Infallible for the PIO sink
        let _ = leds.write(&frame).await;
    }
}
