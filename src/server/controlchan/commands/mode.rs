//! The RFC 959 Transfer Mode (`MODE`) command
//
// Only Stream mode is supported; Block and Compressed are refused.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Mode {
    param: String,
}

impl Mode {
    pub fn new(param: String) -> Self {
        Mode { param }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Mode
where
    Storage: StorageBackend,
{
    async fn handle(&self, _args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        if self.param == "S" {
            Ok(Reply::new(ReplyCode::CommandOkay, "S Ok"))
        } else {
            Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Only S(tream) is supported"))
        }
    }
}
