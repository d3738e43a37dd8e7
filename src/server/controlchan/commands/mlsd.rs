//! The RFC 3659 Machine Listing (`MLSD`) command
//
// Same traversal as LIST, but each entry comes out as machine-parseable
// facts. The Modify fact is omitted for entries the store has no timestamp
// for, and the trailer reports how many entries went out.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use std::fmt::Write as _;
use tokio::io::AsyncWriteExt;

#[derive(Debug)]
pub struct Mlsd;

#[async_trait]
impl<Storage> CommandHandler<Storage> for Mlsd
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
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

        let mut matches: usize = 0;
        let mut broken = false;
        if let Some(conn) = session.data_conn.as_mut() {
            for entry in entries.iter().filter(|e| !e.name.starts_with('.')) {
                let mut line = format!("Type={};Size={};", if entry.is_dir { "dir" } else { "file" }, entry.size);
                if entry.modified.is_set() {
                    let _ = write!(line, "Modify={};", entry.modified);
                }
                let _ = write!(line, " {}\r\n", entry.name);
                if conn.write_all(line.as_bytes()).await.is_err() {
                    broken = true;
                    break;
                }
                matches += 1;
            }
        }
        session.data_close().await;

        if broken {
            Ok(Reply::new(ReplyCode::ConnectionClosed, "Error during directory transfer"))
        } else {
            Ok(Reply::new_with_string(
                ReplyCode::ClosingDataConnection,
                format!("Options: -a -l, {matches} matches total"),
            ))
        }
    }
}
