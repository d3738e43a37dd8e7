//! The RFC 959 Password (`PASS`) command
//
// The argument field is a Telnet string specifying the user's password. This
// command must be immediately preceded by the user name command.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::password::Password;
use crate::server::reply::{Reply, ReplyCode};
use crate::server::session::UserState;
use crate::storage::StorageBackend;
use async_trait::async_trait;

#[derive(Debug)]
pub struct Pass {
    password: Password,
}

impl Pass {
    pub fn new(password: Password) -> Self {
        Pass { password }
    }
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Pass
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        if session.user_state == UserState::None {
            return Ok(Reply::new(ReplyCode::NotLoggedIn, "User not specified"));
        }
        if self.password.matches(&session.state.password()) {
            session.user_state = UserState::LoggedIn;
            slog::info!(session.logger, "Client logged in as {}", session.username);
            Ok(Reply::new_with_string(
                ReplyCode::UserLoggedIn,
                format!("OK, logged in as {}", session.username),
            ))
        } else {
            Ok(Reply::new(ReplyCode::NotLoggedIn, "Password not correct"))
        }
    }
}
