//! The parsed form of one client command.

use crate::server::password::Password;
use std::fmt;

// One decoded control-channel line: the verb plus whatever parameter shape
// the verb's handler needs. Verbs with parameters the handler must validate
// itself (PORT's address tuple, MDTM's optional timestamp prefix, the
// single-letter TYPE/MODE/STRU arguments) carry the raw parameter string.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) enum Command {
    User { username: String },
    Pass { password: Password },
    Auth,
    Syst,
    Stat,
    Feat,
    Noop,
    Pwd,
    Cwd { path: String },
    Cdup,
    Type { param: String },
    Stru { param: String },
    Mode { param: String },
    Pasv,
    Port { param: String },
    List,
    Nlst,
    Mlsd,
    Retr { path: String },
    Stor { path: String },
    Dele { path: String },
    Rmd { path: String },
    Mkd { path: String },
    Rnfr { path: String },
    Rnto { path: String },
    Mdtm { param: String },
    Size { path: String },
    Site { param: String },
    Quit,
    Other { verb: String },
}

impl Command {
    // The verb, for log lines and the begin/end observer callbacks.
    pub fn verb(&self) -> &str {
        match self {
            Command::User { .. } => "USER",
            Command::Pass { .. } => "PASS",
            Command::Auth => "AUTH",
            Command::Syst => "SYST",
            Command::Stat => "STAT",
            Command::Feat => "FEAT",
            Command::Noop => "NOOP",
            Command::Pwd => "PWD",
            Command::Cwd { .. } => "CWD",
            Command::Cdup => "CDUP",
            Command::Type { .. } => "TYPE",
            Command::Stru { .. } => "STRU",
            Command::Mode { .. } => "MODE",
            Command::Pasv => "PASV",
            Command::Port { .. } => "PORT",
            Command::List => "LIST",
            Command::Nlst => "NLST",
            Command::Mlsd => "MLSD",
            Command::Retr { .. } => "RETR",
            Command::Stor { .. } => "STOR",
            Command::Dele { .. } => "DELE",
            Command::Rmd { .. } => "RMD",
            Command::Mkd { .. } => "MKD",
            Command::Rnfr { .. } => "RNFR",
            Command::Rnto { .. } => "RNTO",
            Command::Mdtm { .. } => "MDTM",
            Command::Size { .. } => "SIZE",
            Command::Site { .. } => "SITE",
            Command::Quit => "QUIT",
            Command::Other { verb } => verb,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
