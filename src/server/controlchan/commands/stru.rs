//! The RFC 959 File Structure (`STRU`) command
//
// Only the File structure is supported.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Stru {
    param: String,
}

impl Stru {
    pub fn new(param: String) -> Self {
        Stru { param }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Stru
where
    Storage: StorageBackend,
{
    async fn handle(&self, _args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        if self.param == "F" {
            Ok(Reply::new(ReplyCode::CommandOkay, "F Ok"))
        } else {
            Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Only F(ile) is supported"))
        }
    }
}
