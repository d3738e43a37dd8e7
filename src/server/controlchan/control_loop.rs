//! The per-session command loop: read, gate, dispatch, reply.

use super::commands;
use super::handler::{CommandContext, CommandHandler};
use super::{Command, ControlChan, ControlChanError};
use crate::notification::SessionObserver;
use crate::server::reply::{Reply, ReplyCode};
use crate::server::session::{Session, UserState};
use crate::storage::StorageBackend;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Runs the command loop until the client quits, the supervisor raises the
/// stop flag, or the channel fails. The caller owns teardown.
pub(crate) async fn run<Storage>(
    session: &mut Session<Storage>,
    control: &mut ControlChan,
    stop: &AtomicBool,
    observer: &Arc<dyn SessionObserver>,
) -> Result<(), ControlChanError>
where
    Storage: StorageBackend,
{
    loop {
        let cmd = control.read_command(stop).await?;

        if cmd == Command::Quit {
            control.reply(Reply::new(ReplyCode::ClosingControlConnection, "Goodbye")).await?;
            return Ok(());
        }

        // Verbs absent from the dispatch table: anything unparsed, and PASV
        // when passive mode is configured off.
        let unknown = matches!(cmd, Command::Other { .. }) || (cmd == Command::Pasv && !session.options.passive_enabled);
        if unknown {
            control.reply(Reply::new(ReplyCode::CommandSyntaxError, "Unknown command")).await?;
            continue;
        }

        let verb = cmd.verb().to_string();
        observer.command_begin(&verb);
        let result = if gate_allows(session, &cmd) {
            dispatch(cmd, session, control).await
        } else {
            // Until login, everything except USER/PASS/AUTH/QUIT gets
            // silence, not a reply.
            Ok(Reply::none())
        };
        observer.command_end(&verb);

        control.reply(result?).await?;
    }
}

fn gate_allows<Storage>(session: &Session<Storage>, cmd: &Command) -> bool
where
    Storage: StorageBackend,
{
    session.user_state == UserState::LoggedIn || matches!(cmd, Command::User { .. } | Command::Pass { .. } | Command::Auth)
}

async fn dispatch<Storage>(cmd: Command, session: &mut Session<Storage>, control: &mut ControlChan) -> Result<Reply, ControlChanError>
where
    Storage: StorageBackend,
{
    let handler: Box<dyn CommandHandler<Storage>> = match cmd {
        Command::User { username } => Box::new(commands::User::new(username)),
        Command::Pass { password } => Box::new(commands::Pass::new(password)),
        Command::Auth => Box::new(commands::Auth),
        Command::Syst => Box::new(commands::Syst),
        Command::Stat => Box::new(commands::Stat),
        Command::Feat => Box::new(commands::Feat),
        Command::Noop => Box::new(commands::Noop),
        Command::Pwd => Box::new(commands::Pwd),
        Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
        Command::Cdup => Box::new(commands::Cdup),
        Command::Type { param } => Box::new(commands::Type::new(param)),
        Command::Stru { param } => Box::new(commands::Stru::new(param)),
        Command::Mode { param } => Box::new(commands::Mode::new(param)),
        Command::Pasv => Box::new(commands::Pasv),
        Command::Port { param } => Box::new(commands::Port::new(param)),
        Command::List => Box::new(commands::List),
        Command::Nlst => Box::new(commands::Nlst),
        Command::Mlsd => Box::new(commands::Mlsd),
        Command::Retr { path } => Box::new(commands::Retr::new(path)),
        Command::Stor { path } => Box::new(commands::Stor::new(path)),
        Command::Dele { path } => Box::new(commands::Dele::new(path)),
        Command::Rmd { path } => Box::new(commands::Rmd::new(path)),
        Command::Mkd { path } => Box::new(commands::Mkd::new(path)),
        Command::Rnfr { path } => Box::new(commands::Rnfr::new(path)),
        Command::Rnto { path } => Box::new(commands::Rnto::new(path)),
        Command::Mdtm { param } => Box::new(commands::Mdtm::new(param)),
        Command::Size { path } => Box::new(commands::Size::new(path)),
        Command::Site { param } => Box::new(commands::Site::new(param)),
        // Both handled before dispatch.
        Command::Quit | Command::Other { .. } => return Ok(Reply::none()),
    };
    handler.handle(CommandContext { session, control }).await
}
