//! culfw command definitions

use std::fmt;

use crate::constants::REPORTING_FLAGS;
use crate::error::{Error, Result};

/// Commands understood by the CUL stick
///
/// Each command is one text line on the wire. Several commands are
/// written as a single block, each terminated by `\n`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `X<flags>`: select what the firmware reports
    SetReporting(u8),

    /// `Zr`: enable the MAX! receiver
    MaxReceive,

    /// `Zs<hex>`: transmit one MAX! packet
    MaxSend(&'a str),
}

impl<'a> Command<'a> {
    /// Create a transmit command
    ///
    /// The payload is passed through as-is; it must be non-empty and
    /// fit on a single line.
    ///
    /// # Examples
    ///
    /// ```
    /// use maxcul_core::Command;
    ///
    /// let cmd = Command::max_send("AABBCC").unwrap();
    /// assert_eq!(cmd.to_string(), "ZsAABBCC");
    /// assert!(Command::max_send("").is_err());
    /// ```
    pub fn max_send(hex: &'a str) -> Result<Self> {
        if hex.is_empty() {
            return Err(Error::EmptyPayload);
        }

        if let Some(offset) = hex.find(['\n', '\r']) {
            return Err(Error::LineBreakInPayload { offset });
        }

        Ok(Self::MaxSend(hex))
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetReporting(flags) => write!(f, "X{:02X}", flags),
            Self::MaxReceive => f.write_str("Zr"),
            Self::MaxSend(hex) => write!(f, "Zs{}", hex),
        }
    }
}

/// Encode commands into one newline-terminated block
pub fn encode(commands: &[Command<'_>]) -> String {
    let mut out = String::new();

    for command in commands {
        out.push_str(&command.to_string());
        out.push('\n');
    }

    out
}

/// Block written once after the stick has been opened (`X21\nZr\n`)
pub fn init_sequence() -> String {
    encode(&[Command::SetReporting(REPORTING_FLAGS), Command::MaxReceive])
}

/// Block written for one outbound packet
///
/// Outside of update mode the receiver is re-armed after the transmit,
/// since culfw leaves it off after `Zs`.
pub fn transmit_sequence(hex: &str, update_mode: bool) -> Result<String> {
    let send = Command::max_send(hex)?;

    if update_mode {
        Ok(encode(&[send]))
    } else {
        Ok(encode(&[send, Command::MaxReceive]))
    }
}
