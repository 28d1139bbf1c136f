//! SuperPixie - node firmware
//!
//! One tile of a daisy-chained character display. The node sits between
//! two UARTs: the upstream port faces the commander, the downstream port
//! the rest of the chain. It relays traffic for its neighbours, executes
//! what is addressed to it and renders its character at a fixed frame
//! rate on a WS2812 matrix.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Level, Output};
use embassy_rp::peripherals::{PIO0, UART0, UART1};
use embassy_rp::pio::Pio;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use superpixie_core::chain::Direction;
use superpixie_core::Node;
use superpixie_hal_rp2040::flash::Rp2040FlashStorage;
use superpixie_hal_rp2040::touch::RcTouchPad;
use superpixie_hal_rp2040::uart;
use superpixie_hal_rp2040::ws2812::PioWs2812;

use crate::channels::NODE;
use crate::config::{NODE_CONFIG, UART_BUFFER_SIZE};

mod channels;
mod config;
mod storage;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// UART buffers (must live forever)
static UP_TX_BUF: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
static UP_RX_BUF: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
static DOWN_TX_BUF: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
static DOWN_RX_BUF: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SuperPixie node starting ({:?} profile)", NODE_CONFIG.profile);

    let p = embassy_rp::init(Default::default());

    // Touch calibration from flash, defaults otherwise
    let mut flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let record = storage::load_record(&mut flash).await;

    // Seeds the random packet ids of the nibble profile
    let seed = match flash.unique_id() {
        Ok(id) => id,
        Err(e) => {
            warn!("Flash unique id unavailable: {:?}", e);
            embassy_time::Instant::now().as_ticks()
        }
    };
    NODE.lock().await.replace(Node::new(NODE_CONFIG.profile, &record, seed));

    // Chain ports
    let uart_config = uart::config(&NODE_CONFIG.chain_uart);

    let upstream = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config).into_buffered(
        Irqs,
        UP_TX_BUF.init([0u8; UART_BUFFER_SIZE]),
        UP_RX_BUF.init([0u8; UART_BUFFER_SIZE]),
    );
    let (up_tx, up_rx) = upstream.split();

    let downstream = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart_config).into_buffered(
        Irqs,
        DOWN_TX_BUF.init([0u8; UART_BUFFER_SIZE]),
        DOWN_RX_BUF.init([0u8; UART_BUFFER_SIZE]),
    );
    let (down_tx, down_rx) = downstream.split();

    info!("Chain UARTs initialized at {} baud", NODE_CONFIG.chain_uart.baudrate);

    // LED matrix on PIO0
    let Pio { mut common, sm0, .. } = Pio::new(p.PIO0, Irqs);
    let leds = PioWs2812::new(&mut common, sm0, p.PIN_2);

    let pad = RcTouchPad::new(Flex::new(p.PIN_3));
    let status_led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks
    spawner.spawn(tasks::chain_rx_task(up_rx, Direction::Downstream)).unwrap();
    spawner.spawn(tasks::chain_rx_task(down_rx, Direction::Upstream)).unwrap();
    spawner.spawn(tasks::chain_tx_task(up_tx, Direction::Upstream)).unwrap();
    spawner.spawn(tasks::chain_tx_task(down_tx, Direction::Downstream)).unwrap();
    spawner
        .spawn(tasks::tick_task(NODE_CONFIG.tick_ms, NODE_CONFIG.chain_uart))
        .unwrap();
    spawner
        .spawn(tasks::render_task(leds, NODE_CONFIG.frame_rate_hz))
        .unwrap();
    spawner
        .spawn(tasks::touch_task(pad, NODE_CONFIG.touch_sample_ms))
        .unwrap();
    spawner.spawn(tasks::storage_task(flash)).unwrap();
    spawner.spawn(tasks::status_led_task(status_led)).unwrap();

    info!("All tasks spawned, node running");

    // The PIO common block must outlive the state machine
    let _common = common;
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
