//! One module per supported verb, each implementing
//! [`CommandHandler`](super::handler::CommandHandler).

mod auth;
mod cdup;
mod cwd;
mod dele;
mod feat;
mod list;
mod mdtm;
mod mkd;
mod mlsd;
mod mode;
mod nlst;
mod noop;
mod pass;
mod pasv;
mod port;
mod pwd;
mod retr;
mod rmd;
mod rnfr;
mod rnto;
mod site;
mod size;
mod stat;
mod stor;
mod stru;
mod syst;
mod type_;
mod user;

pub(crate) use auth::Auth;
pub(crate) use cdup::Cdup;
pub(crate) use cwd::Cwd;
pub(crate) use dele::Dele;
pub(crate) use feat::Feat;
pub(crate) use list::List;
pub(crate) use mdtm::Mdtm;
pub(crate) use mkd::Mkd;
pub(crate) use mlsd::Mlsd;
pub(crate) use mode::Mode;
pub(crate) use nlst::Nlst;
pub(crate) use noop::Noop;
pub(crate) use pass::Pass;
pub(crate) use pasv::Pasv;
pub(crate) use port::Port;
pub(crate) use pwd::Pwd;
pub(crate) use retr::Retr;
pub(crate) use rmd::Rmd;
pub(crate) use rnfr::Rnfr;
pub(crate) use rnto::Rnto;
pub(crate) use site::Site;
pub(crate) use size::Size;
pub(crate) use stat::Stat;
pub(crate) use stor::Stor;
pub(crate) use stru::Stru;
pub(crate) use syst::Syst;
pub(crate) use type_::Type;
pub(crate) use user::User;
