//! The RFC 959 User Name (`USER`) command
//
// The argument field is a Telnet string identifying the user. This server
// knows exactly one user; any other name is turned away.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::server::session::UserState;
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> Self {
        User { username }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for User
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        if session.state.username() == self.username {
            session.user_state = UserState::NameGiven;
            session.username = self.username.clone();
            Ok(Reply::new(ReplyCode::NeedPassword, "OK. Password required"))
        } else {
            session.user_state = UserState::None;
            Ok(Reply::new(ReplyCode::NotLoggedIn, "Username not known"))
        }
    }
}
