//! Node tick task
//!
//! Drives discovery, animation and the link watchdog, then acts on the
//! events the node raised.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use portable_atomic::Ordering;

use superpixie_core::NodeEvent;
use superpixie_hal::uart::UartConfig;

use crate::channels::{PipeIo, StatusLed, NODE, SAVE_REQUEST, STATUS_LED, TX_OVERFLOW};

#[embassy_executor::task]
pub async fn tick_task(interval_ms: u64, chain_uart: UartConfig) {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms));
    let mut io = PipeIo;
    let mut overflow = 0;

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        let mut guard = NODE.lock().await;
        let Some(node) = guard.as_mut() else {
            continue;
        };
        node.tick(now_ms, &mut io);
        while let Some(event) = node.take_event() {
            handle_event(event, &chain_uart);
        }
        drop(guard);

        let lost = TX_OVERFLOW.load(Ordering::Relaxed);
        if lost != overflow {
            warn!("TX pipe full, {} bytes dropped so far", lost);
            overflow = lost;
        }
    }
}

fn handle_event(event: NodeEvent, chain_uart: &UartConfig) {
    match event {
        NodeEvent::Assigned(address) => info!("Assigned address {}", address),
        NodeEvent::ChainLength(length) => info!("Chain length {}", length),
        NodeEvent::Propagation(on) => debug!("Propagation {}", on),
        NodeEvent::BusMode(on) => debug!("Bus mode {}", on),
        NodeEvent::Terminating => info!("Last node of the chain"),
        NodeEvent::Blink => STATUS_LED.signal(StatusLed::Blink),
        NodeEvent::DebugLed(level) => STATUS_LED.signal(StatusLed::Level(level != 0)),
        NodeEvent::SetBaud(baud) => {
            // Neighbours switch at different times, so the ports stay put
            let requested = chain_uart.with_baudrate(baud);
            warn!(
                "Baud change to {} requested, staying at {}",
                requested.baudrate, chain_uart.baudrate
            );
        }
        NodeEvent::SaveStorage(record) => SAVE_REQUEST.signal(record),
        NodeEvent::LinkFault(fault) => warn!("Link fault: {:?}", fault),
        NodeEvent::Reset => info!("Chain reset"),
        NodeEvent::ScrollTruncated(queued) => warn!("Scroll text cut to {} steps", queued),
    }
}
