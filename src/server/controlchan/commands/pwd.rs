//! The RFC 959 Print Working Directory (`PWD`) command

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pwd;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pwd
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new_with_string(
            ReplyCode::DirCreated,
            format!("\"{}\" is your current directory", args.session.cwd),
        ))
    }
}
