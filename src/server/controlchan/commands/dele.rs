//! The RFC 959 Delete (`DELE`) command

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Self {
        Dele { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Dele
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        if self.path.is_empty() {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "No file name"));
        }
        let Some(target) = session.resolve(&self.path) else {
            return Ok(Reply::new(ReplyCode::CommandSyntaxError, "Command line too long"));
        };
        if session.storage.stat(&target).await.is_err() {
            return Ok(Reply::new_with_string(ReplyCode::FileError, format!("File {} not found", self.path)));
        }
        if session.storage.unlink(&target).await.is_err() {
            return Ok(Reply::new_with_string(
                ReplyCode::TransientFileError,
                format!("Can't delete {}", self.path),
            ));
        }
        slog::info!(session.logger, "Deleted {}", target);
        Ok(Reply::new_with_string(ReplyCode::FileActionOkay, format!("Deleted {}", self.path)))
    }
}
