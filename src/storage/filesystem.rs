//! A [`StorageBackend`] backed by a directory on the local filesystem.

use super::{Error, ErrorKind, FileInfo, FsUsage, Result, StorageBackend};
use crate::fat_time::FatTimestamp;
use async_trait::async_trait;
use chrono::{Datelike, Local, TimeZone, Timelike};
use nix::sys::time::TimeVal;
use std::path::PathBuf;
use std::time::SystemTime;

const MEGABYTE: u64 = 1024 * 1024;

/// Serves files from a root directory on local disk.
///
/// Wire paths are joined onto the root, so a client asking for
/// `/hello.txt` on a backend rooted at `/srv/ftp` reads
/// `/srv/ftp/hello.txt`.
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    /// Creates a backend rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Filesystem { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

fn name_of(path: &str) -> String {
    path.rsplit('/').find(|c| !c.is_empty()).unwrap_or("/").to_string()
}

fn stamp_of(mtime: std::io::Result<SystemTime>) -> FatTimestamp {
    let Ok(mtime) = mtime else {
        return FatTimestamp::default();
    };
    let local: chrono::DateTime<Local> = mtime.into();
    let year = u16::try_from(local.year()).unwrap_or(0);
    FatTimestamp::from_parts(
        year,
        local.month() as u16,
        local.day() as u16,
        local.hour() as u16,
        local.minute() as u16,
        local.second() as u16,
    )
}

fn info_of(name: String, meta: &std::fs::Metadata) -> FileInfo {
    FileInfo {
        name,
        size: if meta.is_dir() { 0 } else { meta.len() },
        is_dir: meta.is_dir(),
        modified: stamp_of(meta.modified()),
    }
}

#[async_trait]
impl StorageBackend for Filesystem {
    type Reader = tokio::fs::File;
    type Writer = tokio::fs::File;

    async fn stat(&self, path: &str) -> Result<FileInfo> {
        let meta = tokio::fs::metadata(self.full_path(path)).await?;
        Ok(info_of(name_of(path), &meta))
    }

    async fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        let mut dir = tokio::fs::read_dir(self.full_path(path)).await?;
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = entry.metadata().await?;
            entries.push(info_of(name, &meta));
        }
        Ok(entries)
    }

    async fn open_read(&self, path: &str) -> Result<(Self::Reader, u64)> {
        let file = tokio::fs::File::open(self.full_path(path)).await?;
        let size = file.metadata().await?.len();
        Ok((file, size))
    }

    async fn create(&self, path: &str) -> Result<Self::Writer> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.full_path(path))
            .await?;
        Ok(file)
    }

    async fn unlink(&self, path: &str) -> Result<()> {
        let full = self.full_path(path);
        if tokio::fs::metadata(&full).await?.is_dir() {
            tokio::fs::remove_dir(&full).await?;
        } else {
            tokio::fs::remove_file(&full).await?;
        }
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir(self.full_path(path)).await?;
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        tokio::fs::rename(self.full_path(from), self.full_path(to)).await?;
        Ok(())
    }

    async fn set_mtime(&self, path: &str, stamp: FatTimestamp) -> Result<()> {
        let naive = chrono::NaiveDate::from_ymd_opt(i32::from(stamp.year()), u32::from(stamp.month()), u32::from(stamp.day()))
            .and_then(|d| d.and_hms_opt(u32::from(stamp.hour()), u32::from(stamp.minute()), u32::from(stamp.second())))
            .ok_or_else(|| Error::from(ErrorKind::LocalError))?;
        let secs = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| Error::from(ErrorKind::LocalError))?
            .timestamp();
        let stamp = TimeVal::new(secs, 0);
        nix::sys::stat::utimes(&self.full_path(path), &stamp, &stamp).map_err(|e| Error::new(ErrorKind::LocalError, e))?;
        Ok(())
    }

    async fn usage(&self) -> Result<FsUsage> {
        let vfs = nix::sys::statvfs::statvfs(self.root.as_path()).map_err(|e| Error::new(ErrorKind::LocalError, e))?;
        let free = vfs.blocks_available() * vfs.fragment_size();
        let total = vfs.blocks() * vfs.fragment_size();
        Ok(FsUsage {
            free_mb: free / MEGABYTE,
            total_mb: total / MEGABYTE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::io::AsyncWriteExt;

    fn scratch_dir() -> PathBuf {
        static SEQ: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "slotftp-fs-test-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn create_stat_and_unlink_a_file() {
        let fs = Filesystem::new(scratch_dir());
        let mut w = fs.create("/hello.txt").await.unwrap();
        w.write_all(b"hello world").await.unwrap();
        w.flush().await.unwrap();
        drop(w);

        let info = fs.stat("/hello.txt").await.unwrap();
        assert_eq!(info.name, "hello.txt");
        assert_eq!(info.size, 11);
        assert!(!info.is_dir);
        assert!(info.modified.is_set());

        fs.unlink("/hello.txt").await.unwrap();
        assert!(fs.stat("/hello.txt").await.is_err());
    }

    #[tokio::test]
    async fn listing_reports_files_and_directories() {
        let fs = Filesystem::new(scratch_dir());
        fs.mkdir("/sub").await.unwrap();
        let mut w = fs.create("/data.bin").await.unwrap();
        w.write_all(&[0u8; 42]).await.unwrap();
        w.flush().await.unwrap();
        drop(w);

        let mut entries = fs.list("/").await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "data.bin");
        assert_eq!(entries[0].size, 42);
        assert!(entries[1].is_dir);
        assert_eq!(entries[1].name, "sub");
    }

    #[tokio::test]
    async fn rename_moves_between_directories() {
        let fs = Filesystem::new(scratch_dir());
        fs.mkdir("/a").await.unwrap();
        fs.create("/a/f.txt").await.unwrap();
        fs.rename("/a/f.txt", "/g.txt").await.unwrap();
        assert!(fs.stat("/a/f.txt").await.is_err());
        assert_eq!(fs.stat("/g.txt").await.unwrap().name, "g.txt");
    }

    #[tokio::test]
    async fn set_mtime_round_trips_through_stat() {
        let fs = Filesystem::new(scratch_dir());
        fs.create("/stamped.txt").await.unwrap();
        let stamp = FatTimestamp::from_parts(2021, 4, 5, 6, 7, 8);
        fs.set_mtime("/stamped.txt", stamp).await.unwrap();
        assert_eq!(fs.stat("/stamped.txt").await.unwrap().modified, stamp);
    }
}
