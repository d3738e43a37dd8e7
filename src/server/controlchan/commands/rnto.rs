//! The RFC 959 Rename To (`RNTO`) command
//
// Completes the rename staged by RNFR and consumes the staged source, so a
// second RNTO without a fresh RNFR is refused instead of silently reusing a
// stale path.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Rnto {
    path: String,
}

impl Rnto {
    pub fn new(path: String) -> Self {
        Rnto { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Rnto
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        if session.rename_from.is_empty() {
            return Ok(Reply::new(ReplyCode::BadCommandSequence, "Need RNFR before RNTO"));
        }
        if self.path.is_empty() {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "No file name"));
        }
        let Some(target) = session.resolve(&self.path) else {
            return Ok(Reply::new(ReplyCode::BadFileName, "Path name too long"));
        };
        if session.storage.stat(&target).await.is_ok() {
            return Ok(Reply::new(ReplyCode::BadFileName, "Destination already exists"));
        }
        let source = std::mem::take(&mut session.rename_from);
        if session.storage.rename(&source, &target).await.is_err() {
            return Ok(Reply::new(ReplyCode::LocalError, "Rename/move failure"));
        }
        slog::info!(session.logger, "Renamed {} to {}", source, target);
        Ok(Reply::new(ReplyCode::FileActionOkay, "File successfully renamed or moved"))
    }
}
