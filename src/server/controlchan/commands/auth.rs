//! The RFC 2228 Authentication/Security Mechanism (`AUTH`) command
//
// This server does not do TLS, so whatever mechanism the client asks for,
// the answer is the same.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Auth;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Auth
where
    Storage: StorageBackend,
{
    async fn handle(&self, _args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Not available"))
    }
}
