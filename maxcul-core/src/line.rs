//! Classification of lines received from the CUL stick
//!
//! culfw reports every received MAX! packet as `Z<hex>` followed by the
//! line terminator. Anything shorter than a minimal packet is a status
//! message.

use crate::constants::{ACK_LINE, DUTY_CYCLE_MARKER, MIN_PACKET_LINE_LEN};

/// A classified inbound line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundLine<'a> {
    /// Packet data with the `Z` marker removed and whitespace trimmed
    Packet(&'a str),

    /// Firmware refuses to send until its duty cycle budget recovers
    DutyCycleLimit,

    /// Bare `Z` acknowledgement
    Ack,

    /// Short line that is not a known status message
    TooShort(&'a str),

    /// Nothing but a line terminator
    Empty,
}

impl<'a> InboundLine<'a> {
    /// Classify a raw line as delivered by the serial reader
    ///
    /// The length threshold applies to the raw line, terminator included.
    ///
    /// # Examples
    ///
    /// ```
    /// use maxcul_core::InboundLine;
    ///
    /// let line = InboundLine::classify("Z0102030405060708090A0B\n");
    /// assert_eq!(line, InboundLine::Packet("0102030405060708090A0B"));
    ///
    /// assert_eq!(InboundLine::classify("LOVF\n"), InboundLine::DutyCycleLimit);
    /// assert_eq!(InboundLine::classify("Z"), InboundLine::Ack);
    /// ```
    pub fn classify(line: &'a str) -> Self {
        if line.len() > MIN_PACKET_LINE_LEN {
            let mut chars = line.chars();
            chars.next();
            return Self::Packet(chars.as_str().trim());
        }

        let content = line.trim_end_matches(['\r', '\n']);

        if content.is_empty() {
            Self::Empty
        } else if content.starts_with(DUTY_CYCLE_MARKER) {
            Self::DutyCycleLimit
        } else if content == ACK_LINE {
            Self::Ack
        } else {
            Self::TooShort(content)
        }
    }

    /// Check if this line carries packet data
    pub fn is_packet(&self) -> bool {
        matches!(self, Self::Packet(_))
    }
}
