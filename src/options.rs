//! Configuration for a [`Server`](crate::Server) and the protocol constants it is built around.

use std::time::Duration;

/// The default port the control channel listens on.
pub const DEFAULT_CONTROL_PORT: u16 = 21;

/// The default base port for passive-mode data listeners. Each slot listens at
/// `base + rotation + slot_index * 25`.
pub const DEFAULT_DATA_PORT_BASE: u16 = 55600;

/// The default number of preallocated client slots.
pub const DEFAULT_MAX_CLIENTS: usize = 1;

/// The default greeting, shown in the `220` banner.
pub const DEFAULT_GREETING: &str = "FTP Server ready";

/// The default username honored by `USER`.
pub const DEFAULT_USERNAME: &str = "user";

/// The default password honored by `PASS`.
pub const DEFAULT_PASSWORD: &str = "pass";

// Native write unit of the storage layer. The transfer buffer is a multiple of
// this so that every coalesced STOR write lands on a sector boundary.
pub(crate) const SECTOR_SIZE: usize = 512;

// Transfer buffer capacity is SECTOR_SIZE * mult; smaller multipliers are
// clamped so the buffer never drops below 1024 bytes.
pub(crate) const BUF_MULT_MIN: usize = 2;
pub(crate) const DEFAULT_BUF_MULT: usize = 32;

// Largest chunk read from a file per data-channel write during RETR.
pub(crate) const TCP_MSS: usize = 1460;

// Longest file name component the storage layer accepts.
pub(crate) const MAX_LFN: usize = 255;

// Upper bounds for a command's parameter string and the working directory.
pub(crate) const PARAM_MAX: usize = MAX_LFN + 8;
pub(crate) const CWD_MAX: usize = MAX_LFN + 8;

// A passive listen port is bumped by one on every new session on the same
// slot, modulo this span, so a port still in TIME_WAIT is not reused at once.
pub(crate) const PORT_ROTATION_SPAN: u16 = 25;

// Credential setters truncate to this many bytes.
pub(crate) const MAX_CREDENTIAL_LEN: usize = 32;

/// Tunables for a [`Server`](crate::Server).
///
/// The defaults match the behavior of a small embedded deployment: one second
/// control-channel read ticks with a sixty tick inactivity allowance, a five
/// second window for the data channel to come up, and a 16 KiB transfer
/// buffer.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Greeting shown in the `220` banner.
    pub greeting: &'static str,
    /// Number of preallocated client slots; connection `N + 1` is refused
    /// with `421 No more connections allowed`.
    pub max_clients: usize,
    /// Base port for passive-mode data listeners.
    pub data_port_base: u16,
    /// Whether `PASV` is served at all. When disabled the verb is treated as
    /// unknown, as if it were absent from the dispatch table.
    pub passive_enabled: bool,
    /// Transfer buffer capacity as a multiple of the 512-byte sector size.
    /// Values below 2 are clamped to 2.
    pub buffer_size_mult: usize,
    /// Duration of one control-channel receive tick. The supervisor stop flag
    /// is observed once per tick.
    pub read_tick: Duration,
    /// Number of silent receive ticks before the session times out.
    pub inactive_ticks: u32,
    /// Bound on completing one control-channel write.
    pub write_timeout: Duration,
    /// Bound on establishing the data channel: the passive-mode accept or the
    /// active-mode connect.
    pub data_establish_timeout: Duration,
    /// Bound on one data-channel receive during STOR.
    pub stor_recv_timeout: Duration,
    /// The supervisor's accept poll tick while running.
    pub accept_tick: Duration,
    /// Interval between checks for workers having stopped during shutdown.
    pub stop_poll: Duration,
    /// Number of stop-poll rounds before giving up on a busy worker.
    pub stop_polls_max: u32,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            greeting: DEFAULT_GREETING,
            max_clients: DEFAULT_MAX_CLIENTS,
            data_port_base: DEFAULT_DATA_PORT_BASE,
            passive_enabled: true,
            buffer_size_mult: DEFAULT_BUF_MULT,
            read_tick: Duration::from_millis(1000),
            inactive_ticks: 60,
            write_timeout: Duration::from_millis(3000),
            data_establish_timeout: Duration::from_millis(5000),
            stor_recv_timeout: Duration::from_millis(5000),
            accept_tick: Duration::from_millis(500),
            stop_poll: Duration::from_millis(1000),
            stop_polls_max: 6,
        }
    }
}

impl ServerOptions {
    // Full inactivity allowance on the control channel, for the STAT reply.
    pub(crate) fn inactivity_window(&self) -> Duration {
        self.read_tick * self.inactive_ticks
    }

    pub(crate) fn buffer_capacity(&self) -> usize {
        SECTOR_SIZE * self.buffer_size_mult.max(BUF_MULT_MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_capacity_is_sector_aligned_and_clamped() {
        let mut options = ServerOptions::default();
        assert_eq!(options.buffer_capacity(), 16 * 1024);
        options.buffer_size_mult = 0;
        assert_eq!(options.buffer_capacity(), 1024);
        options.buffer_size_mult = 3;
        assert_eq!(options.buffer_capacity(), 1536);
    }

    #[test]
    fn inactivity_window_is_ticks_times_tick() {
        let options = ServerOptions::default();
        assert_eq!(options.inactivity_window(), Duration::from_secs(60));
    }
}
