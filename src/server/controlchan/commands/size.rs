//! The RFC 3659 File Size (`SIZE`) command

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Size {
    path: String,
}

impl Size {
    pub fn new(path: String) -> Self {
        Size { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Size
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        let Some(target) = session.resolve(&self.path) else {
            return Ok(Reply::new(ReplyCode::CommandSyntaxError, "Command line too long"));
        };
        match session.storage.stat(&target).await {
            Ok(info) if info.is_dir => Ok(Reply::new(ReplyCode::FileError, "Could not get file size")),
            Ok(info) => Ok(Reply::new_with_string(ReplyCode::FileStatus, info.size.to_string())),
            Err(_) => Ok(Reply::new(ReplyCode::FileError, "No such file")),
        }
    }
}
