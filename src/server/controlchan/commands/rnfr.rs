//! The RFC 959 Rename From (`RNFR`) command

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Rnfr {
    path: String,
}

impl Rnfr {
    pub fn new(path: String) -> Self {
        Rnfr { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Rnfr
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
            return Ok(Reply::new(ReplyCode::FileError, "File does not exist"));
        }
        session.rename_from = target;
        Ok(Reply::new(
            ReplyCode::FileActionPending,
            "RNFR accepted - file exists, ready for destination",
        ))
    }
}
