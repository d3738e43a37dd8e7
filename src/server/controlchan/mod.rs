//! The control channel: wire I/O, command parsing and the per-session
//! command loop.

pub(crate) mod codecs;
pub(crate) mod command;
pub(crate) mod commands;
pub(crate) mod control_loop;
pub(crate) mod error;
pub(crate) mod handler;
pub(crate) mod line_parser;

pub(crate) use command::Command;
pub(crate) use error::{ControlChanError, ControlChanErrorKind};

use crate::options::ServerOptions;
use crate::server::reply::Reply;
use codecs::FtpCodec;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

// The framed control connection. Receiving polls in short ticks so a
// supervisor stop request is observed within one tick even while the client
// is silent; writes must complete within the configured write timeout.
pub(crate) struct ControlChan {
    framed: Framed<TcpStream, FtpCodec>,
    read_tick: Duration,
    inactive_ticks: u32,
    write_timeout: Duration,
    logger: slog::Logger,
}

impl ControlChan {
    pub fn new(stream: TcpStream, options: &ServerOptions, logger: slog::Logger) -> Self {
        ControlChan {
            framed: Framed::new(stream, FtpCodec::new()),
            read_tick: options.read_tick,
            inactive_ticks: options.inactive_ticks,
            write_timeout: options.write_timeout,
            logger,
        }
    }

    /// Waits for one command, polling in read ticks. Fails with
    /// `StopRequested` when the supervisor raised the stop flag,
    /// `InactivityTimeout` after the full allowance of silent ticks,
    /// `ConnectionClosed` on EOF and the underlying error otherwise.
    pub async fn read_command(&mut self, stop: &AtomicBool) -> Result<Command, ControlChanError> {
        for _ in 0..self.inactive_ticks {
            if stop.load(Ordering::SeqCst) {
                return Err(ControlChanErrorKind::StopRequested.into());
            }
            match timeout(self.read_tick, self.framed.next()).await {
                Err(_elapsed) => continue,
                Ok(None) => return Err(ControlChanErrorKind::ConnectionClosed.into()),
                Ok(Some(Ok(cmd))) => {
                    slog::debug!(self.logger, "Received command {:?}", cmd);
                    return Ok(cmd);
                }
                Ok(Some(Err(e))) => return Err(e),
            }
        }
        Err(ControlChanErrorKind::InactivityTimeout.into())
    }

    /// Sends one reply, waiting for write completion. `Reply::None` sends
    /// nothing.
    pub async fn reply(&mut self, reply: Reply) -> Result<(), ControlChanError> {
        if reply == Reply::None {
            return Ok(());
        }
        slog::debug!(self.logger, "Sending reply {:?}", reply);
        match timeout(self.write_timeout, self.framed.send(reply)).await {
            Err(_elapsed) => Err(ControlChanErrorKind::WriteTimeout.into()),
            Ok(result) => result,
        }
    }

    /// Flushes and shuts the connection down for session teardown.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.framed.get_mut().shutdown().await
    }
}
