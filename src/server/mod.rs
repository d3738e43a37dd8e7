//! Everything behind the public [`Server`](crate::Server) handle: the
//! control channel, the data channel, the transfer engine, the session
//! workers and the supervisor.

pub(crate) mod controlchan;
pub(crate) mod datachan;
pub(crate) mod ftpserver;
pub(crate) mod password;
pub(crate) mod reply;
pub(crate) mod session;
pub(crate) mod state;
pub(crate) mod supervisor;
pub(crate) mod transfer;
