//! The common interface of all command handlers.

use super::ControlChan;
use super::error::ControlChanError;
use crate::server::reply::Reply;
use crate::server::session::Session;
use crate::storage::StorageBackend;
use async_trait::async_trait;

// Common interface for the handlers of all `Command`s.
//
// A handler returns the final reply for its command; anything it needs to
// say before that (the `150` preliminary replies of transfers and listings)
// it sends itself through the context's control channel. Returning an error
// ends the session.
#[async_trait]
pub(crate) trait CommandHandler<Storage>: Send + Sync
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError>;
}

// What a handler gets to work with: the session it runs in and the control
// connection for preliminary replies. Commands are processed strictly one at
// a time per session, so the handler has both to itself.
pub(crate) struct CommandContext<'a, Storage>
where
    Storage: StorageBackend,
{
    pub session: &'a mut Session<Storage>,
    pub control: &'a mut ControlChan,
}
