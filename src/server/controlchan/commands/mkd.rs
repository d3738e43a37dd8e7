//! The RFC 959 Make Directory (`MKD`) command

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Mkd {
    path: String,
}

impl Mkd {
    pub fn new(path: String) -> Self {
        Mkd { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Mkd
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        if self.path.is_empty() {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "No directory name"));
        }
        let Some(target) = session.resolve(&self.path) else {
            return Ok(Reply::new(ReplyCode::CommandSyntaxError, "Command line too long"));
        };
        // The path must not exist yet, whatever kind of object it is.
        if session.storage.stat(&target).await.is_ok() {
            return Ok(Reply::new_with_string(
                ReplyCode::AlreadyExists,
                format!("Can't create \"{}\", Directory exists", self.path),
            ));
        }
        if session.storage.mkdir(&target).await.is_err() {
            return Ok(Reply::new_with_string(
                ReplyCode::FileError,
                format!("Can't create \"{}\"", self.path),
            ));
        }
        slog::info!(session.logger, "Created directory {}", target);
        Ok(Reply::new_with_string(ReplyCode::DirCreated, format!("\"{}\" created", self.path)))
    }
}
