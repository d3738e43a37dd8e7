//! Data-channel management for one session: the passive-mode listener and
//! the transient per-transfer connection.
//!
//! Failures on socket create/bind/listen are part of the server's transport
//! error catalog and wind the whole server down; a peer that simply never
//! connects (or cannot be connected to) only ends this session.

use crate::server::controlchan::{ControlChanError, ControlChanErrorKind};
use crate::server::session::{DataMode, Session};
use crate::server::state::ErrorFlags;
use crate::storage::StorageBackend;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpSocket;
use tokio::time::timeout;

impl<Storage> Session<Storage>
where
    Storage: StorageBackend,
{
    /// Brings up the passive listener on this session's rotated data port,
    /// reusing one that is already open.
    pub(crate) async fn pasv_open(&mut self) -> Result<(), ControlChanError> {
        self.data_port = self.passive_port();
        if self.pasv_listener.is_some() {
            self.data_mode = DataMode::Passive;
            return Ok(());
        }

        let socket = match TcpSocket::new_v4() {
            Ok(s) => s,
            Err(e) => return Err(self.passive_failure(ErrorFlags::PASV_LISTENER_CREATE, e)),
        };
        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.data_port));
        if let Err(e) = socket.bind(addr) {
            return Err(self.passive_failure(ErrorFlags::PASV_LISTENER_BIND, e));
        }
        let listener = match socket.listen(1) {
            Ok(l) => l,
            Err(e) => return Err(self.passive_failure(ErrorFlags::PASV_LISTENER_LISTEN, e)),
        };

        self.pasv_listener = Some(listener);
        self.data_mode = DataMode::Passive;
        slog::debug!(self.logger, "Passive listener up on port {}", self.data_port);
        Ok(())
    }

    /// Tears the passive listener down and forgets the data mode.
    pub(crate) fn pasv_close(&mut self) {
        self.data_mode = DataMode::NotSet;
        self.pasv_listener = None;
    }

    /// Opens the data connection for one transfer or listing, honoring the
    /// mode selected by the latest PASV or PORT.
    pub(crate) async fn data_open(&mut self) -> Result<(), ControlChanError> {
        match self.data_mode {
            DataMode::NotSet => Err(ControlChanErrorKind::DataChannelFailed.into()),
            DataMode::Passive => {
                let Some(listener) = self.pasv_listener.as_ref() else {
                    return Err(ControlChanErrorKind::DataChannelFailed.into());
                };
                match timeout(self.options.data_establish_timeout, listener.accept()).await {
                    Err(_elapsed) => Err(ControlChanErrorKind::DataChannelFailed.into()),
                    Ok(Err(e)) => Err(ControlChanError::with_source(ControlChanErrorKind::DataChannelFailed, e)),
                    Ok(Ok((stream, peer))) => {
                        slog::debug!(self.logger, "Accepted data connection from {}", peer);
                        self.data_conn = Some(stream);
                        Ok(())
                    }
                }
            }
            DataMode::Active => {
                let socket = match TcpSocket::new_v4() {
                    Ok(s) => s,
                    Err(e) => {
                        self.state.set_error(ErrorFlags::DATA_SOCKET_CREATE);
                        return Err(ControlChanError::with_source(ControlChanErrorKind::DataChannelFailed, e));
                    }
                };
                if let Err(e) = socket.bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))) {
                    self.state.set_error(ErrorFlags::DATA_SOCKET_BIND);
                    return Err(ControlChanError::with_source(ControlChanErrorKind::DataChannelFailed, e));
                }
                let peer = SocketAddr::V4(SocketAddrV4::new(self.client_ip, self.data_port));
                match timeout(self.options.data_establish_timeout, socket.connect(peer)).await {
                    Err(_elapsed) => Err(ControlChanErrorKind::DataChannelFailed.into()),
                    Ok(Err(e)) => Err(ControlChanError::with_source(ControlChanErrorKind::DataChannelFailed, e)),
                    Ok(Ok(stream)) => {
                        slog::debug!(self.logger, "Data connection to {} up", peer);
                        self.data_conn = Some(stream);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Closes the data connection, if any, and forgets the data mode.
    pub(crate) async fn data_close(&mut self) {
        self.data_mode = DataMode::NotSet;
        if let Some(mut conn) = self.data_conn.take() {
            match conn.shutdown().await {
                Ok(()) => {}
                // The peer hanging up first is the normal end of a STOR.
                Err(e) if e.kind() == std::io::ErrorKind::NotConnected => {}
                Err(e) => {
                    slog::warn!(self.logger, "Closing data connection failed: {}", e);
                    self.state.set_error(ErrorFlags::DATA_SOCKET_CLOSE);
                }
            }
        }
    }

    // A passive-path failure resets listener and mode and lands in the
    // server's error set.
    fn passive_failure(&mut self, flag: ErrorFlags, e: std::io::Error) -> ControlChanError {
        slog::warn!(self.logger, "Passive listener failure {:?}: {}", flag, e);
        self.pasv_close();
        self.state.set_error(flag);
        ControlChanError::with_source(ControlChanErrorKind::DataChannelFailed, e)
    }
}
