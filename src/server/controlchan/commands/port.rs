//! The RFC 959 Data Port (`PORT`) command
//
// The argument is `h1,h2,h3,h4,p1,p2`: the address and port the client will
// be listening on for the active-mode data connection.

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::reply::{Reply, ReplyCode};
use crate::server::session::DataMode;
use crate::storage::StorageBackend;
use async_trait::async_trait;
use std::net::Ipv4Addr;

#[derive(Debug)]
pub struct Port {
    param: String,
}

impl Port {
    pub fn new(param: String) -> Self {
        Port { param }
    }
}

fn parse_host_port(param: &str) -> Option<(Ipv4Addr, u16)> {
    let mut parts = param.split(',');
    let mut nums = [0u8; 6];
    for num in &mut nums {
        *num = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    let addr = Ipv4Addr::new(nums[0], nums[1], nums[2], nums[3]);
    let port = (u16::from(nums[4]) << 8) | u16::from(nums[5]);
    Some((addr, port))
}

#[async_trait]
impl<Storage> CommandHandler<Storage> for Port
where
    Storage: StorageBackend,
{
    async fn handle(&self, args: CommandContext<'_, Storage>) -> Result<Reply, ControlChanError> {
        let session = args.session;
        let Some((addr, port)) = parse_host_port(&self.param) else {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Can't interpret parameters"));
        };
        session.data_close().await;
        session.client_ip = addr;
        session.data_port = port;
        session.data_mode = DataMode::Active;
        Ok(Reply::new(ReplyCode::CommandOkay, "PORT command successful"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_the_six_octet_tuple() {
        assert_eq!(
            parse_host_port("192,168,1,10,217,48"),
            Some((Ipv4Addr::new(192, 168, 1, 10), 217 * 256 + 48))
        );
    }

    #[test]
    fn rejects_malformed_tuples() {
        assert_eq!(parse_host_port(""), None);
        assert_eq!(parse_host_port("1,2,3,4,5"), None);
        assert_eq!(parse_host_port("1,2,3,4,5,6,7"), None);
        assert_eq!(parse_host_port("1,2,3,4,5,300"), None);
        assert_eq!(parse_host_port("a,b,c,d,e,f"), None);
    }
}
