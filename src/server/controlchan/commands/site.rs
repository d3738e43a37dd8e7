//! The RFC 959 Site Parameters (`SITE`) command
//
// One subcommand is recognized: `SITE FREE` reports the store's free and
// total capacity.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Site {
    param: String,
}

impl Site {
    pub fn new(param: String) -> Self {
        Site { param }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Site
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        if !self.param.eq_ignore_ascii_case("FREE") {
            return Ok(Reply::new_with_string(
                ReplyCode::FileError,
                format!("Unknown SITE command {}", self.param),
            ));
        }
        match session.storage.usage().await {
            Ok(usage) => Ok(Reply::new_with_string(
                ReplyCode::SystemStatus,
                format!("{} MB free of {} MB capacity", usage.free_mb, usage.total_mb),
            )),
            Err(_) => Ok(Reply::new(ReplyCode::FileError, "Get free error")),
        }
    }
}
