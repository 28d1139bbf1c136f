//! Touch sampling task

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use superpixie_hal_rp2040::touch::RcTouchPad;
use superpixie_hal_rp2040::TouchSensor;

use crate::channels::{PipeIo, NODE};

#[embassy_executor::task]
pub async fn touch_task(mut pad: RcTouchPad<'static>, interval_ms: u64) {
    info!("Touch task started");

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms));
    let mut io = PipeIo;

    loop {
        ticker.next().await;
        let raw = pad.read().await;
        let now_ms = Instant::now().as_millis();

        let mut guard = NODE.lock().await;
        if let Some(node) = guard.as_mut() {
            node.set_touch_reading(raw, now_ms, &mut io);
        }
    }
}
