//! Per-slot session state.

use crate::options::ServerOptions;
use crate::server::state::ServerState;
use crate::server::transfer::SectorBuffer;
use crate::storage::StorageBackend;
use crate::{options, path};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

// Where the session stands in the USER/PASS dialogue. Until `LoggedIn`,
// every verb apart from USER, PASS, AUTH and QUIT is answered with silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UserState {
    None,
    NameGiven,
    LoggedIn,
}

// How the data channel will be brought up for the next transfer or listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataMode {
    NotSet,
    Active,
    Passive,
}

// All state of one client connection. Lives from accept to disconnect; a
// slot builds a fresh session for every client it serves.
//
// `data_conn` is only ever present while `data_mode` is set; the accessors
// in `datachan` maintain that together.
pub(crate) struct Session<Storage>
where
    Storage: StorageBackend,
{
    pub storage: Arc<Storage>,
    pub state: Arc<ServerState>,
    pub options: Arc<ServerOptions>,
    pub logger: slog::Logger,
    pub slot_index: usize,
    pub server_ip: Ipv4Addr,
    pub client_ip: Ipv4Addr,
    pub data_port: u16,
    pub port_rotation: u16,
    pub data_mode: DataMode,
    pub user_state: UserState,
    // The name the client logged in with, echoed in the PASS reply.
    pub username: String,
    pub cwd: String,
    // Source path staged by RNFR, consumed by RNTO. Empty means none.
    pub rename_from: String,
    pub pasv_listener: Option<TcpListener>,
    pub data_conn: Option<TcpStream>,
    pub xfer: SectorBuffer,
}

impl<Storage> Session<Storage>
where
    Storage: StorageBackend,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        storage: Arc<Storage>,
        state: Arc<ServerState>,
        options: Arc<ServerOptions>,
        logger: slog::Logger,
        slot_index: usize,
        server_ip: Ipv4Addr,
        client_ip: Ipv4Addr,
        port_rotation: u16,
    ) -> Self {
        let xfer = SectorBuffer::new(options.buffer_capacity());
        Session {
            storage,
            state,
            options,
            logger,
            slot_index,
            server_ip,
            client_ip,
            data_port: 0,
            port_rotation,
            data_mode: DataMode::NotSet,
            user_state: UserState::None,
            username: String::new(),
            cwd: String::from("/"),
            rename_from: String::new(),
            pasv_listener: None,
            data_conn: None,
            xfer,
        }
    }

    /// Combines the working directory with a client-supplied parameter into
    /// the absolute path an operation should act on. The working directory
    /// itself is left untouched; only a successful CWD commits the result.
    ///
    /// `None` when the combined path would overflow the directory buffer.
    pub fn resolve(&self, param: &str) -> Option<String> {
        let mut p = self.cwd.clone();
        if path::build(&mut p, param) { Some(p) } else { None }
    }

    /// The port a passive listener for this session binds to.
    pub fn passive_port(&self) -> u16 {
        let base = u32::from(self.options.data_port_base);
        let rotated = base + u32::from(self.port_rotation) + (self.slot_index as u32) * u32::from(options::PORT_ROTATION_SPAN);
        (rotated & 0xffff) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Filesystem;
    use pretty_assertions::assert_eq;

    fn session_for_slot(slot_index: usize, port_rotation: u16) -> Session<Filesystem> {
        let options = Arc::new(ServerOptions::default());
        Session::new(
            Arc::new(Filesystem::new(std::env::temp_dir())),
            Arc::new(ServerState::new(2121, "u", "p")),
            options,
            slog::Logger::root(slog::Discard, slog::o!()),
            slot_index,
            Ipv4Addr::LOCALHOST,
            Ipv4Addr::LOCALHOST,
            port_rotation,
        )
    }

    #[test]
    fn passive_port_spreads_slots_and_rotations() {
        let base = ServerOptions::default().data_port_base;
        assert_eq!(session_for_slot(0, 0).passive_port(), base);
        assert_eq!(session_for_slot(0, 7).passive_port(), base + 7);
        assert_eq!(session_for_slot(3, 2).passive_port(), base + 2 + 3 * 25);
    }

    #[test]
    fn resolve_leaves_cwd_untouched() {
        let mut session = session_for_slot(0, 0);
        session.cwd = String::from("/music");
        assert_eq!(session.resolve("a.mp3").unwrap(), "/music/a.mp3");
        assert_eq!(session.resolve("/other").unwrap(), "/other");
        assert_eq!(session.cwd, "/music");
        assert!(session.resolve(&"x".repeat(400)).is_none());
    }
}
