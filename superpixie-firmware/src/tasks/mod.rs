//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! `channels`.

pub mod chain;
pub mod render;
pub mod status_led;
pub mod storage;
pub mod tick;
pub mod touch;

pub use chain::{chain_rx_task, chain_tx_task};
pub use render::render_task;
pub use status_led::status_led_task;
pub use storage::storage_task;
pub use tick::tick_task;
pub use touch::touch_task;
