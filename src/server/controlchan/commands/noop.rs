//! The RFC 959 No Operation (`NOOP`) command

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Noop;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Noop
where
    Storage: StorageBackend,
{
    async fn handle(&self, _args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandOkay, "Zzz..."))
    }
}
