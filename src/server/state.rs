//! Process-wide server state: the status machine, the transport error
//! accumulator, statistics and the credential pair.

use bitflags::bitflags;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, Ordering};

use crate::options::MAX_CREDENTIAL_LEN;

/// The lifecycle state of a [`Server`](crate::Server).
///
/// [`start`](crate::Server::start) moves `Idle`/`Error` to `Starting`,
/// [`stop`](crate::Server::stop) moves `Running` to `Stopping`; the
/// supervisor task drives the remaining transitions. Any accumulated
/// transport error forces `ErrorStopping`, which settles in `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerStatus {
    /// Not serving; waiting for a start request.
    Idle = 0,
    /// A start was requested; the supervisor is binding the listener.
    Starting = 1,
    /// Accepting clients.
    Running = 2,
    /// A stop was requested; the supervisor is winding sessions down.
    Stopping = 3,
    /// A transport error occurred; the supervisor is winding sessions down.
    ErrorStopping = 4,
    /// Stopped after an error. Inspect [`errors`](crate::Server::errors),
    /// then [`clear_errors`](crate::Server::clear_errors) and start again.
    Error = 5,
}

impl ServerStatus {
    fn from_u8(v: u8) -> ServerStatus {
        match v {
            1 => ServerStatus::Starting,
            2 => ServerStatus::Running,
            3 => ServerStatus::Stopping,
            4 => ServerStatus::ErrorStopping,
            5 => ServerStatus::Error,
            _ => ServerStatus::Idle,
        }
    }
}

bitflags! {
    /// The catalog of transport errors a server accumulates.
    ///
    /// Every hit forces the status machine into
    /// [`ServerStatus::ErrorStopping`]. The set is only cleared through
    /// [`clear_errors`](crate::Server::clear_errors) once the server has
    /// settled in [`ServerStatus::Error`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ErrorFlags: u32 {
        /// Creating the control listener socket failed.
        const SERVER_SOCKET_CREATE = 1 << 0;
        /// A start was requested while the configured port is zero.
        const PORT_IS_ZERO = 1 << 1;
        /// Binding the control listener failed.
        const SERVER_SOCKET_BIND = 1 << 2;
        /// Putting the control listener into listen mode failed.
        const SERVER_SOCKET_LISTEN = 1 << 3;
        /// Closing the control listener failed.
        const SERVER_SOCKET_CLOSE = 1 << 4;
        /// Writing to a client's control connection failed.
        const CLIENT_SOCKET_WRITE = 1 << 5;
        /// Closing a client's control connection failed.
        const CLIENT_SOCKET_CLOSE = 1 << 6;
        /// A worker was still busy after the shutdown grace period.
        const NOT_ALL_WORKERS_STOPPED = 1 << 7;
        /// Creating a passive-mode listener socket failed.
        const PASV_LISTENER_CREATE = 1 << 8;
        /// Binding a passive-mode listener failed.
        const PASV_LISTENER_BIND = 1 << 9;
        /// Putting a passive-mode listener into listen mode failed.
        const PASV_LISTENER_LISTEN = 1 << 10;
        /// Closing a passive-mode listener failed.
        const PASV_LISTENER_CLOSE = 1 << 11;
        /// Creating an active-mode data socket failed.
        const DATA_SOCKET_CREATE = 1 << 12;
        /// Binding an active-mode data socket failed.
        const DATA_SOCKET_BIND = 1 << 13;
        /// Closing a data connection failed.
        const DATA_SOCKET_CLOSE = 1 << 14;
    }
}

/// A snapshot of server statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServerStats {
    /// Clients connected right now.
    pub clients_active: u32,
    /// Number of preallocated client slots.
    pub clients_max: u32,
    /// Total clients accepted since init.
    pub clients_connected: u32,
    /// Total sessions ended since init.
    pub clients_disconnected: u32,
    /// Completed downloads (RETR).
    pub files_sent: u32,
    /// Failed downloads.
    pub files_send_failed: u32,
    /// Completed uploads (STOR).
    pub files_received: u32,
    /// Failed uploads.
    pub files_receive_failed: u32,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    clients_active: AtomicU32,
    clients_max: AtomicU32,
    clients_connected: AtomicU32,
    clients_disconnected: AtomicU32,
    files_sent: AtomicU32,
    files_send_failed: AtomicU32,
    files_received: AtomicU32,
    files_receive_failed: AtomicU32,
}

impl StatsCounters {
    pub fn set_clients_max(&self, n: u32) {
        self.clients_max.store(n, Ordering::Relaxed);
    }

    pub fn client_connected(&self) {
        self.clients_active.fetch_add(1, Ordering::Relaxed);
        self.clients_connected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn client_disconnected(&self) {
        self.clients_active.fetch_sub(1, Ordering::Relaxed);
        self.clients_disconnected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_sent(&self) {
        self.files_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_send_failed(&self) {
        self.files_send_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_received(&self) {
        self.files_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_receive_failed(&self) {
        self.files_receive_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ServerStats {
        ServerStats {
            clients_active: self.clients_active.load(Ordering::Relaxed),
            clients_max: self.clients_max.load(Ordering::Relaxed),
            clients_connected: self.clients_connected.load(Ordering::Relaxed),
            clients_disconnected: self.clients_disconnected.load(Ordering::Relaxed),
            files_sent: self.files_sent.load(Ordering::Relaxed),
            files_send_failed: self.files_send_failed.load(Ordering::Relaxed),
            files_received: self.files_received.load(Ordering::Relaxed),
            files_receive_failed: self.files_receive_failed.load(Ordering::Relaxed),
        }
    }
}

// One ServerState is shared by the public handle, the supervisor and every
// worker. The supervisor and workers only read credentials and port; those
// are written through the public setters, normally before start.
#[derive(Debug)]
pub(crate) struct ServerState {
    status: AtomicU8,
    errors: AtomicU32,
    port: AtomicU16,
    inited: AtomicBool,
    username: RwLock<String>,
    password: RwLock<String>,
    pub stats: StatsCounters,
}

impl ServerState {
    pub fn new(port: u16, username: &str, password: &str) -> Self {
        ServerState {
            status: AtomicU8::new(ServerStatus::Idle as u8),
            errors: AtomicU32::new(0),
            port: AtomicU16::new(port),
            inited: AtomicBool::new(false),
            username: RwLock::new(username.to_string()),
            password: RwLock::new(password.to_string()),
            stats: StatsCounters::default(),
        }
    }

    pub fn status(&self) -> ServerStatus {
        ServerStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    pub fn set_status(&self, status: ServerStatus) {
        self.status.store(status as u8, Ordering::SeqCst);
    }

    // Atomically moves from `from` to `to`; false when the status was
    // something else by the time we got there.
    pub fn transition(&self, from: ServerStatus, to: ServerStatus) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    // Records a transport error and forces the status machine to wind down.
    pub fn set_error(&self, flag: ErrorFlags) {
        self.errors.fetch_or(flag.bits(), Ordering::SeqCst);
        self.set_status(ServerStatus::ErrorStopping);
    }

    pub fn errors(&self) -> ErrorFlags {
        ErrorFlags::from_bits_truncate(self.errors.load(Ordering::SeqCst))
    }

    pub fn clear_errors(&self) {
        if self.status() == ServerStatus::Error {
            self.errors.store(0, Ordering::SeqCst);
        }
    }

    pub fn port(&self) -> u16 {
        self.port.load(Ordering::SeqCst)
    }

    pub fn set_port(&self, port: u16) {
        self.port.store(port, Ordering::SeqCst);
    }

    pub fn mark_inited(&self) -> bool {
        self.inited
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_inited(&self) -> bool {
        self.inited.load(Ordering::SeqCst)
    }

    pub fn username(&self) -> String {
        self.username.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn password(&self) -> String {
        self.password.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_username(&self, name: &str) {
        *self.username.write().unwrap_or_else(|e| e.into_inner()) = bounded(name);
    }

    pub fn set_password(&self, pass: &str) {
        *self.password.write().unwrap_or_else(|e| e.into_inner()) = bounded(pass);
    }
}

fn bounded(value: &str) -> String {
    let mut s = value.to_string();
    if s.len() > MAX_CREDENTIAL_LEN {
        let mut cut = MAX_CREDENTIAL_LEN;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_error_accumulates_and_forces_error_stopping() {
        let state = ServerState::new(21, "u", "p");
        state.set_status(ServerStatus::Running);
        state.set_error(ErrorFlags::SERVER_SOCKET_BIND);
        state.set_error(ErrorFlags::PORT_IS_ZERO);
        assert_eq!(state.status(), ServerStatus::ErrorStopping);
        assert_eq!(state.errors(), ErrorFlags::SERVER_SOCKET_BIND | ErrorFlags::PORT_IS_ZERO);
    }

    #[test]
    fn errors_clear_only_in_error_state() {
        let state = ServerState::new(21, "u", "p");
        state.set_error(ErrorFlags::SERVER_SOCKET_LISTEN);
        state.clear_errors();
        assert!(!state.errors().is_empty());
        state.set_status(ServerStatus::Error);
        state.clear_errors();
        assert!(state.errors().is_empty());
    }

    #[test]
    fn transition_is_compare_and_swap() {
        let state = ServerState::new(21, "u", "p");
        assert!(state.transition(ServerStatus::Idle, ServerStatus::Starting));
        assert!(!state.transition(ServerStatus::Idle, ServerStatus::Starting));
        assert_eq!(state.status(), ServerStatus::Starting);
    }

    #[test]
    fn credentials_are_bounded() {
        let state = ServerState::new(21, "u", "p");
        state.set_username(&"x".repeat(100));
        assert_eq!(state.username().len(), MAX_CREDENTIAL_LEN);
    }
}
