//! The RFC 959 Status (`STAT`) command
//
// Reports the session's inactivity allowance.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Stat;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Stat
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let secs = args.session.options.inactivity_window().as_secs();
        Ok(Reply::new_with_string(
            ReplyCode::ClosingControlConnection,
            format!("Inactivity timer: {secs} s"),
        ))
    }
}
