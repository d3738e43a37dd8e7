//! The RFC 959 Store (`STOR`) command
//
// Receives a file from the client. Inbound segments are coalesced into
// sector-aligned writes; the peer closing the data connection marks the end
// of the upload.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::server::transfer::{self, TransferError};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;

#[derive(Debug)]
pub struct Stor {
    path: String,
}

impl Stor {
    pub fn new(path: String) -> Self {
        Stor { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Stor
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let CommandContext { session, control } = args;

        if self.path.is_empty() {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "No file name"));
        }
        let Some(target) = session.resolve(&self.path) else {
            return Ok(Reply::new(ReplyCode::CommandSyntaxError, "Command line too long"));
        };
        let mut file = match session.storage.create(&target).await {
            Ok(file) => file,
            Err(_) => {
                return Ok(Reply::new_with_string(ReplyCode::LocalError, format!("Can't create {}", self.path)));
            }
        };

        if let Err(e) = session.data_open().await {
            session.state.stats.file_receive_failed();
            control.reply(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection")).await?;
            return Err(e);
        }
        control
            .reply(Reply::new_with_string(
                ReplyCode::FileStatusOkay,
                format!("Connected to port {}", session.data_port),
            ))
            .await?;

        session.xfer.reset();
        let recv_timeout = session.options.stor_recv_timeout;
        let mut outcome = match session.data_conn.as_mut() {
            Some(conn) => transfer::receive_file(&mut session.xfer, conn, &mut file, recv_timeout).await,
            None => Err(TransferError::Socket(io::Error::from(io::ErrorKind::NotConnected))),
        };
        if let Ok(bytes) = outcome {
            outcome = file.flush().await.map(|()| bytes).map_err(TransferError::File);
        }
        drop(file);
        session.data_close().await;

        match outcome {
            Ok(bytes) => {
                session.state.stats.file_received();
                slog::info!(session.logger, "Stored {} ({} bytes)", target, bytes);
                Ok(Reply::new(ReplyCode::ClosingDataConnection, "File successfully transferred"))
            }
            Err(TransferError::File(e)) => {
                session.state.stats.file_receive_failed();
                slog::warn!(session.logger, "Write failure storing {}: {}", target, e);
                Ok(Reply::new(ReplyCode::LocalError, "Write error"))
            }
            Err(TransferError::Socket(e)) => {
                session.state.stats.file_receive_failed();
                slog::warn!(session.logger, "Data channel failure storing {}: {}", target, e);
                Ok(Reply::new_with_string(
                    ReplyCode::ConnectionClosed,
                    format!("Error during file transfer: {e}"),
                ))
            }
        }
    }
}
