//! The RFC 959 Change Working Directory (`CWD`) command
//
// This command allows the user to work with a different directory for file
// storage or retrieval without altering his login information. The new
// directory must exist; the previous one is kept on any failure.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Cwd
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
        if target != "/" && session.storage.stat(&target).await.is_err() {
            return Ok(Reply::new_with_string(
                ReplyCode::FileError,
                format!("Can't change directory to {}", self.path),
            ));
        }
        session.cwd = target;
        Ok(Reply::new_with_string(
            ReplyCode::FileActionOkay,
            format!("Ok. Current directory is {}", session.cwd),
        ))
    }
}
