//! The RFC 959 Name List (`NLST`) command

use super::list::{ListFormat, send_listing};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::Reply;
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Nlst;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Nlst
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        send_listing(args, ListFormat::NamesOnly).await
    }
}
