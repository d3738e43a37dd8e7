#![deny(clippy::all)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

//! slotftp is a compact, async FTP server library built around a fixed
//! table of client slots, as found on small long-lived network endpoints.
//!
//! Each slot owns a worker task, a reusable sector-aligned transfer buffer
//! and a rotated passive-mode port; a supervisor task owns the listener and
//! a small status machine (`Idle` → `Starting` → `Running` → `Stopping`),
//! accumulating transport errors into a queryable set instead of crashing.
//! Exactly one username/password pair is honored, uploads are coalesced
//! into sector-sized writes, and there is no TLS; see the project README
//! for the full verb list.
//!
//! It runs on top of the Tokio asynchronous run-time.
//!
//! # Quick Start
//!
//! ```no_run
//! use slotftp::Server;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let server = Server::with_fs(std::env::temp_dir())
//!         .greeting("Welcome to my FTP server")
//!         .max_clients(2);
//!     server.set_port(2121);
//!     server.init();
//!     server.start();
//!     // The server runs on background tasks from here on.
//!     loop {
//!         tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
//!     }
//! }
//! ```

pub mod fat_time;
pub mod notification;
pub mod options;
pub mod storage;

pub(crate) mod path;
pub(crate) mod server;

pub use crate::server::ftpserver::Server;
pub use crate::server::state::{ErrorFlags, ServerStats, ServerStatus};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
