//! Protocol constants

use std::time::Duration;

/// Serial link speed of the CUL stick
pub const BAUD_RATE: u32 = 38400;

/// Read timeout of the serial line reader
pub const READ_TIMEOUT: Duration = Duration::from_millis(45);

/// Reporting flags sent with `X` on start (0x01 = report packets, 0x20 = append RSSI)
pub const REPORTING_FLAGS: u8 = 0x21;

/// Inbound lines up to this many bytes are never packets.
///
/// A packet line is at least the `Z` marker plus 10 hex-encoded bytes.
pub const MIN_PACKET_LINE_LEN: usize = 21;

/// Prefix of the message culfw emits when the 1% duty cycle budget is exhausted
pub const DUTY_CYCLE_MARKER: &str = "LOVF";

/// Bare acknowledgement line
pub const ACK_LINE: &str = "Z";

/// Hardware reset timings
pub mod timing {
    use std::time::Duration;

    /// Reset pin is held low this long
    pub const RESET_LOW: Duration = Duration::from_millis(1000);

    /// Settle time after the reset pin is released
    pub const RESET_SETTLE: Duration = Duration::from_millis(2000);

    /// Firmware settle time after the init sequence
    pub const INIT_SETTLE: Duration = Duration::from_millis(1000);

    /// Extra airtime reserved after a wake-on-radio packet
    pub const WAKE_ON_RADIO: Duration = Duration::from_millis(1100);
}
