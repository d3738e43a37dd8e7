//! The RFC 959 Representation Type (`TYPE`) command
//
// ASCII and Image are both accepted, and both get the same treatment: the
// data channel never transforms anything.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Type {
    param: String,
}

impl Type {
    pub fn new(param: String) -> Self {
        Type { param }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Type
where
    Storage: StorageBackend,
{
    async fn handle(&self, _args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        match self.param.as_str() {
            "A" => Ok(Reply::new(ReplyCode::CommandOkay, "TYPE is now ASCII")),
            "I" => Ok(Reply::new(ReplyCode::CommandOkay, "TYPE is now 8-bit binary")),
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Unknown TYPE")),
        }
    }
}
