//! The RFC 959 List (`LIST`) command
//
// Streams one line per entry of the working directory over the data channel,
// in an EPLF-style format clients parse without locale trouble. Dot-prefixed
// entries are skipped. `NLST` shares the traversal and emits names only.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ListFormat {
    Eplf,
    NamesOnly,
}

#[derive(Debug)]
pub struct List;

// Shared by LIST and NLST: directory scan, data channel, one line per entry.
pub(crate) async fn send_listing<Storage>(args: CommandContext<'_, Storage>, format: ListFormat) -> Result<Reply, ControlChanError>
where
    Storage: StorageBackend,
{
    let CommandContext { session, control } = args;

    let entries = match session.storage.list(&session.cwd).await {
        Ok(entries) => entries,
        Err(_) => {
            return Ok(Reply::new_with_string(
                ReplyCode::FileError,
                format!("Can't open directory {}", session.cwd),
            ));
        }
    };

    if let Err(e) = session.data_open().await {
        control.reply(Reply::new(ReplyCode::CantOpenDataConnection, "No data connection")).await?;
        return Err(e);
    }
    control.reply(Reply::new(ReplyCode::FileStatusOkay, "Accepted data connection")).await?;

    let mut broken = false;
    if let Some(conn) = session.data_conn.as_mut() {
        for entry in entries.iter().filter(|e| !e.name.starts_with('.')) {
            let line = match format {
                ListFormat::Eplf if entry.is_dir => format!("+/,\t{}\r\n", entry.name),
                ListFormat::Eplf => format!("+r,s{},\t{}\r\n", entry.size, entry.name),
                ListFormat::NamesOnly => format!("{}\r\n", entry.name),
            };
            if conn.write_all(line.as_bytes()).await.is_err() {
                broken = true;
                break;
            }
        }
    }
    session.data_close().await;

    if broken {
        Ok(Reply::new(ReplyCode::ConnectionClosed, "Error during directory transfer"))
    } else {
        Ok(Reply::new(ReplyCode::ClosingDataConnection, "Directory send OK."))
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for List
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        send_listing(args, ListFormat::Eplf).await
    }
}
