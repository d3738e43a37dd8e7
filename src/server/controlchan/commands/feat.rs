//! The RFC 2389 Feature (`FEAT`) command

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Feat;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Feat
where
    Storage: StorageBackend,
{
    async fn handle(&self, _args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        // Each feature line must be indented by a space.
        let lines = vec!["Extensions supported:", " MDTM", " MLSD", " SIZE", " SITE FREE", "End."];
        Ok(Reply::new_multiline(ReplyCode::SystemStatus, lines))
    }
}
