//! The RFC 959 Retrieve (`RETR`) command
//
// Streams a file to the client over the data channel. A storage failure
// mid-transfer answers 451, a data-channel failure 426; either way the
// session lives on.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::server::transfer::{self, TransferError};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use std::io;

#[derive(Debug)]
pub struct Retr {
    path: String,
}

impl Retr {
    pub fn new(path: String) -> Self {
        Retr { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Retr
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
        let info = match session.storage.stat(&target).await {
            Ok(info) => info,
            Err(_) => {
                return Ok(Reply::new_with_string(ReplyCode::FileError, format!("File {} not found", self.path)));
            }
        };
        if info.is_dir {
            return Ok(Reply::new_with_string(ReplyCode::FileError, format!("Can't open {}", self.path)));
        }
        let (mut file, size) = match session.storage.open_read(&target).await {
            Ok(opened) => opened,
            Err(_) => {
                return Ok(Reply::new_with_string(ReplyCode::FileError, format!("Can't open {}", self.path)));
            }
        };

        if let Err(e) = session.data_open().await {
            session.state.stats.file_send_failed();
            control.reply(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection")).await?;
            return Err(e);
        }
        control
            .reply(Reply::new_with_string(
                ReplyCode::FileStatusOkay,
                format!("Connected to port {}, {} bytes to download", session.data_port, size),
            ))
            .await?;

        session.xfer.reset();
        let outcome = match session.data_conn.as_mut() {
            Some(conn) => transfer::send_file(&mut session.xfer, &mut file, conn).await,
            None => Err(TransferError::Socket(io::Error::from(io::ErrorKind::NotConnected))),
        };
        drop(file);
        session.data_close().await;

        match outcome {
            Ok(bytes) => {
                session.state.stats.file_sent();
                slog::info!(session.logger, "Sent {} ({} bytes)", target, bytes);
                Ok(Reply::new(ReplyCode::ClosingDataConnection, "File successfully transferred"))
            }
            Err(TransferError::File(e)) => {
                session.state.stats.file_send_failed();
                slog::warn!(session.logger, "Read failure sending {}: {}", target, e);
                Ok(Reply::new(ReplyCode::LocalError, "Read error"))
            }
            Err(TransferError::Socket(e)) => {
                session.state.stats.file_send_failed();
                slog::warn!(session.logger, "Data channel failure sending {}: {}", target, e);
                Ok(Reply::new_with_string(
                    ReplyCode::ConnectionClosed,
                    format!("Error during file transfer: {e}"),
                ))
            }
        }
    }
}
