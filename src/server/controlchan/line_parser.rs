//! Parses one control-channel line into a [`Command`].

use super::command::Command;
use super::error::{ControlChanError, ControlChanErrorKind};
use crate::options::PARAM_MAX;
use crate::server::password::Password;
use std::str;

// The verb is the leading run of ASCII letters, at most four of them; a
// longer run is an unknown command. Parameters follow one or more spaces and
// run to the end of the line, capped at PARAM_MAX - 1 bytes.
pub(crate) fn parse(line: &[u8]) -> Result<Command, ControlChanError> {
    let line = trim_crlf(line);

    let verb_len = line.iter().take_while(|b| b.is_ascii_alphabetic()).count();
    let verb: String = line[..verb_len].iter().map(|b| b.to_ascii_uppercase() as char).collect();
    if verb_len > 4 {
        return Ok(Command::Other { verb });
    }

    let mut rest = &line[verb_len..];
    let params = if rest.first() == Some(&b' ') {
        while rest.first() == Some(&b' ') {
            rest = &rest[1..];
        }
        if rest.len() > PARAM_MAX - 1 {
            return Err(ControlChanErrorKind::LineTooLong.into());
        }
        str::from_utf8(rest)?.to_string()
    } else {
        String::new()
    };

    let cmd = match verb.as_str() {
        "USER" => Command::User { username: params },
        "PASS" => Command::Pass {
            password: Password::new(params.into_bytes()),
        },
        "AUTH" => Command::Auth,
        "SYST" => Command::Syst,
        "STAT" => Command::Stat,
        "FEAT" => Command::Feat,
        "NOOP" => Command::Noop,
        "PWD" | "XPWD" => Command::Pwd,
        "CWD" | "XCWD" => Command::Cwd { path: params },
        "CDUP" => Command::Cdup,
        "TYPE" => Command::Type { param: params },
        "STRU" => Command::Stru { param: params },
        "MODE" => Command::Mode { param: params },
        "PASV" => Command::Pasv,
        "PORT" => Command::Port { param: params },
        "LIST" => Command::List,
        "NLST" => Command::Nlst,
        "MLSD" => Command::Mlsd,
        "RETR" => Command::Retr { path: params },
        "STOR" => Command::Stor { path: params },
        "DELE" => Command::Dele { path: params },
        "RMD" | "XRMD" => Command::Rmd { path: params },
        "MKD" | "XMKD" => Command::Mkd { path: params },
        "RNFR" => Command::Rnfr { path: params },
        "RNTO" => Command::Rnto { path: params },
        "MDTM" => Command::Mdtm { param: params },
        "SIZE" => Command::Size { path: params },
        "SITE" => Command::Site { param: params },
        "QUIT" => Command::Quit,
        _ => Command::Other { verb },
    };
    Ok(cmd)
}

fn trim_crlf(line: &[u8]) -> &[u8] {
    let end = line.iter().position(|&b| b == b'\r' || b == b'\n').unwrap_or(line.len());
    &line[..end]
}
