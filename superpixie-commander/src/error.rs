//! Commander errors

use superpixie_protocol::{CodecError, Command};

/// Errors from chain operations
///
/// `E` is the link's I/O error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommanderError<E> {
    /// The serial link failed
    Link(E),
    /// Packet could not be built (payload too large for the profile)
    Codec(CodecError),
    /// No ACK arrived for this packet within the ACK timeout
    AckTimeout { packet_id: u16 },
    /// A reply or condition did not arrive before the caller's deadline
    Timeout,
    /// The active protocol generation has no such command or argument
    Unsupported(Command),
}

impl<E> From<CodecError> for CommanderError<E> {
    fn from(err: CodecError) -> Self {
        CommanderError::Codec(err)
    }
}
