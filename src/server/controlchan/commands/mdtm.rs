//! The RFC 3659 Modification Time (`MDTM`) command
//
// With a bare path the file's timestamp comes back as `213 YYYYMMDDHHMMSS`.
// With a `YYYYMMDDHHMMSS path` parameter the timestamp is written instead,
// the nonstandard but widely implemented "MDTM set" extension.

use crate::fat_time::FatTimestamp;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Mdtm {
    param: String,
}

impl Mdtm {
    pub fn new(param: String) -> Self {
        Mdtm { param }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Mdtm
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;

        if let Some((stamp, consumed)) = FatTimestamp::parse_prefix(&self.param) {
            let Some(target) = session.resolve(&self.param[consumed..]) else {
                return Ok(Reply::new(ReplyCode::CommandSyntaxError, "Command line too long"));
            };
            if session.storage.set_mtime(&target, stamp).await.is_err() {
                return Ok(Reply::new(ReplyCode::FileError, "Unable to modify time"));
            }
            return Ok(Reply::new(ReplyCode::CommandOkay, "Ok"));
        }

        let Some(target) = session.resolve(&self.param) else {
            return Ok(Reply::new(ReplyCode::CommandSyntaxError, "Command line too long"));
        };
        match session.storage.stat(&target).await {
            Ok(info) => Ok(Reply::new_with_string(ReplyCode::FileStatus, info.modified.to_string())),
            Err(_) => Ok(Reply::new(ReplyCode::FileError, "No such file")),
        }
    }
}
