//! Abstraction over the file store exposed to FTP clients, plus the
//! local-disk implementation used by [`Server::with_fs`](crate::Server::with_fs).
//!
//! The trait carries exactly the call set the protocol layer consumes: stat,
//! directory listing, open for read with a size query, create-and-truncate
//! for write, unlink, mkdir, rename, a modification-time setter and a
//! free-space query.

mod error;
mod filesystem;

pub use error::{Error, ErrorKind};
pub use filesystem::Filesystem;

use crate::fat_time::FatTimestamp;
use async_trait::async_trait;
use std::fmt::Debug;
use tokio::io::{AsyncRead, AsyncWrite};

/// Result type of storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What `stat` and directory listings report about one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Bare object name, without directory components.
    pub name: String,
    /// Size in bytes; zero for directories.
    pub size: u64,
    /// Whether the object is a directory.
    pub is_dir: bool,
    /// Last modification time; an unset stamp when the store does not track
    /// one.
    pub modified: FatTimestamp,
}

/// Free and total capacity of the store, in whole megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsUsage {
    /// Megabytes still free.
    pub free_mb: u64,
    /// Total capacity in megabytes.
    pub total_mb: u64,
}

/// The file store behind a [`Server`](crate::Server).
///
/// All paths are absolute, `/`-separated strings as they appear on the wire;
/// implementations decide what they are relative to. Every method maps to one
/// primitive of the underlying store, so the protocol layer stays in control
/// of call ordering (stat before unlink, stat before mkdir, and so on).
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug + 'static {
    /// The reader returned by [`open_read`](StorageBackend::open_read).
    type Reader: AsyncRead + Send + Unpin;
    /// The writer returned by [`create`](StorageBackend::create).
    type Writer: AsyncWrite + Send + Unpin;

    /// Looks up one object.
    async fn stat(&self, path: &str) -> Result<FileInfo>;

    /// Reads all entries of a directory.
    async fn list(&self, path: &str) -> Result<Vec<FileInfo>>;

    /// Opens a file for reading and reports its size in bytes.
    async fn open_read(&self, path: &str) -> Result<(Self::Reader, u64)>;

    /// Creates a file for writing, truncating any previous content.
    async fn create(&self, path: &str) -> Result<Self::Writer>;

    /// Removes a file or an empty directory.
    async fn unlink(&self, path: &str) -> Result<()>;

    /// Creates a directory.
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// Renames or moves an object.
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Sets an object's modification time.
    async fn set_mtime(&self, path: &str, stamp: FatTimestamp) -> Result<()>;

    /// Reports free and total capacity.
    async fn usage(&self) -> Result<FsUsage>;
}
