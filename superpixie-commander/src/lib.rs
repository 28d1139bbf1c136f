//! Commander-side driver for SuperPixie chains
//!
//! The commander sits upstream of node 0 and talks to the whole chain over
//! one serial link. [`Commander`] is blocking and generic over the link
//! (`embedded-io` `Read + Write + ReadReady`) and a millisecond [`Clock`]
//! that can also delay, so it runs on a host as well as on a
//! microcontroller.
//!
//! ```text
//! ┌───────────┐    ┌────────┐    ┌────────┐         ┌────────┐
//! │ Commander │───▶│ node 0 │───▶│ node 1 │── ··· ─▶│ node n │
//! │           │◀───│        │◀───│        │◀─ ··· ──│        │
//! └───────────┘    └────────┘    └────────┘         └────────┘
//! ```
//!
//! Both protocol generations are supported. Commands the active
//! generation does not have are refused with
//! [`CommanderError::Unsupported`] before anything is sent.

#![no_std]
#![deny(unsafe_code)]

pub mod acks;
pub mod clock;
pub mod commander;
pub mod error;

pub use acks::PendingAcks;
pub use clock::Clock;
pub use commander::{Commander, TouchEvent};
pub use error::CommanderError;
