//! Chain UART tasks
//!
//! One RX and one TX task per port. RX feeds every byte to the node in
//! arrival order; TX drains the port's outbound pipe.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::Instant;
use embedded_io_async::{Read, Write};

use superpixie_core::chain::Direction;

use crate::channels::{outbound, PipeIo, NODE};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Buffer size for one TX burst
const TX_BUF_SIZE: usize = 64;

/// Receive on one port
///
/// `direction` is where the received bytes are heading: bytes from the
/// upstream port travel downstream and vice versa.
#[embassy_executor::task(pool_size = 2)]
pub async fn chain_rx_task(mut rx: BufferedUartRx, direction: Direction) {
    info!("Chain RX task started ({})", direction);

    let mut buf = [0u8; RX_BUF_SIZE];
    let mut io = PipeIo;
    let mut dropped = 0;

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX {}: {} bytes", direction, n);
                let now_ms = Instant::now().as_millis();

                let mut guard = NODE.lock().await;
                let Some(node) = guard.as_mut() else {
                    continue;
                };
                for &byte in &buf[..n] {
                    node.on_byte(direction, byte, now_ms, &mut io);
                }

                let total = node.dropped_frames();
                if total != dropped {
                    warn!("Framer overrun, {} frames dropped so far", total);
                    dropped = total;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Transmit on one port
#[embassy_executor::task(pool_size = 2)]
pub async fn chain_tx_task(mut tx: BufferedUartTx, direction: Direction) {
    info!("Chain TX task started ({})", direction);

    let pipe = outbound(direction);
    let mut buf = [0u8; TX_BUF_SIZE];

    loop {
        let n = pipe.read(&mut buf).await;
        if let Err(e) = tx.write_all(&buf[..n]).await {
            warn!("UART write error: {:?}", e);
        }
    }
}
