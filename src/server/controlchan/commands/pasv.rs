//! The RFC 959 Passive (`PASV`) command
//
// This command requests the server-DTP to "listen" on a data port and to
// wait for a connection rather than initiate one upon receipt of a transfer
// command. The response includes the host and port this server is listening
// on. The port is the session's slot- and rotation-specific one, so two
// slots never contend and a freshly closed port is not bound again at once.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pasv;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pasv
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let CommandContext { session, control } = args;

        // A data connection a previous transfer left behind is stale now.
        session.data_close().await;
        if let Err(e) = session.pasv_open().await {
            control
                .reply(Reply::new(ReplyCode::CantOpenDataConnection, "Can't open data connection"))
                .await?;
            return Err(e);
        }

        let ip = session.server_ip.octets();
        let port = session.data_port;
        Ok(Reply::new_with_string(
            ReplyCode::EnteringPassiveMode,
            format!(
                "Entering Passive Mode ({},{},{},{},{},{}).",
                ip[0],
                ip[1],
                ip[2],
                ip[3],
                port >> 8,
                port & 0xff
            ),
        ))
    }
}
