//! PIO-based WS2812 driver
//!
//! Uses RP2040's Programmable I/O to generate the WS2812 bit timing. The
//! CPU only pushes one 24-bit GRB word per LED into the TX FIFO.
//!
//! Each bit takes 10 PIO cycles: 2 low, then 5 high for a one or 5 low
//! for a zero, then 3 more. At 800 kHz that is an 8 MHz PIO clock.

use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, PioPin, ShiftConfig, ShiftDirection,
    StateMachine,
};
use embassy_rp::Peri;
use embassy_time::Timer;
use fixed::types::U24F8;
use smart_leds::RGB8;

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// WS2812 bit rate
pub const BIT_RATE_HZ: u32 = 800_000;

/// PIO cycles per transmitted bit
pub const CYCLES_PER_BIT: u32 = 10;

/// FIFO drain plus the low time that latches a frame into the LEDs
pub const LATCH_US: u64 = 300;

/// 16.8 fixed-point divider bits for the bit clock
pub fn clock_divider_bits() -> u32 {
    let pio_hz = BIT_RATE_HZ * CYCLES_PER_BIT;
    ((SYS_CLK_HZ as u64 * 256) / pio_hz as u64) as u32
}

/// Pack a colour the way the LEDs shift it in: G, R, B, MSB first
pub fn grb_word(color: RGB8) -> u32 {
    ((color.g as u32) << 24) | ((color.r as u32) << 16) | ((color.b as u32) << 8)
}

/// WS2812 chain on one PIO state machine
pub struct PioWs2812<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
}

impl<'d, PIO: Instance, const SM: usize> PioWs2812<'d, PIO, SM> {
    /// Load the program and start the state machine on `pin`
    pub fn new<P: PioPin>(common: &mut Common<'d, PIO>, mut sm: StateMachine<'d, PIO, SM>, pin: Peri<'d, P>) -> Self {
        let prg = pio::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "    out x, 1        side 0 [2]",
            "    jmp !x do_zero  side 1 [1]",
            "    jmp bitloop     side 1 [4]",
            "do_zero:",
            "    nop             side 0 [4]",
            ".wrap"
        );

        let installed = common.load_program(&prg.program);
        let out_pin = common.make_pio_pin(pin);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[&out_pin]);
        cfg.clock_divider = U24F8::from_bits(clock_divider_bits());
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 24,
            direction: ShiftDirection::Left,
        };

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&out_pin]);
        sm.set_enable(true);

        Self { sm }
    }
}

impl<'d, PIO: Instance, const SM: usize> superpixie_hal::LedSink for PioWs2812<'d, PIO, SM> {
    type Error = core::convert::Infallible;

    async fn write(&mut self, frame: &[RGB8]) -> Result<(), Self::Error> {
        for &color in frame {
            self.sm.tx().wait_push(grb_word(color)).await;
        }
        Timer::after_micros(LATCH_US).await;
        Ok(())
    }
}
