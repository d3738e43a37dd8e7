//! The streaming transfer engine behind RETR and STOR.
//!
//! The write path coalesces arbitrary inbound segments into sector-aligned
//! writes: all file writes except the final flush are exactly one buffer
//! (a multiple of 512 bytes), which is what FAT-style storage streams best.

use crate::options::{SECTOR_SIZE, TCP_MSS};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

// Which side of a transfer failed, deciding the reply: storage failures are
// 451, data-channel failures 426.
#[derive(Debug)]
pub(crate) enum TransferError {
    File(io::Error),
    Socket(io::Error),
}

// The session's reusable transfer buffer.
//
// `free` counts the unused bytes at the tail; the first `capacity - free`
// bytes hold data waiting for a full-buffer flush.
pub(crate) struct SectorBuffer {
    buf: Vec<u8>,
    free: usize,
}

impl SectorBuffer {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1024 && capacity % SECTOR_SIZE == 0);
        SectorBuffer {
            buf: vec![0; capacity],
            free: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn pending(&self) -> usize {
        self.capacity() - self.free
    }

    pub fn reset(&mut self) {
        self.free = self.capacity();
    }

    // Feeds one received segment into the buffer, flushing to `sink` in
    // whole-buffer units as it fills.
    pub async fn absorb<W>(&mut self, segment: &[u8], sink: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let cap = self.capacity();

        if segment.len() > cap {
            // Oversized segment: flush what is pending to keep byte order,
            // then write the segment through without a copy.
            if self.pending() > 0 {
                let pending = self.pending();
                sink.write_all(&self.buf[..pending]).await?;
                self.free = cap;
            }
            return sink.write_all(segment).await;
        }

        if segment.len() < self.free {
            let at = self.pending();
            self.buf[at..at + segment.len()].copy_from_slice(segment);
            self.free -= segment.len();
        } else {
            // The segment fills the buffer, possibly with bytes left over.
            let take = self.free;
            let at = self.pending();
            self.buf[at..].copy_from_slice(&segment[..take]);
            sink.write_all(&self.buf).await?;
            let rest = &segment[take..];
            self.buf[..rest.len()].copy_from_slice(rest);
            self.free = cap - rest.len();
        }
        Ok(())
    }

    // Flushes whatever is still pending; the one write that may fall short
    // of a full buffer.
    pub async fn finish<W>(&mut self, sink: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let pending = self.pending();
        if pending > 0 {
            sink.write_all(&self.buf[..pending]).await?;
            self.free = self.capacity();
        }
        Ok(())
    }

    // The leading chunk of the buffer used for file reads during RETR.
    fn read_chunk(&mut self) -> &mut [u8] {
        let n = TCP_MSS.min(self.buf.len());
        &mut self.buf[..n]
    }
}

// RETR: file to data channel in TCP_MSS-sized reads. Returns bytes sent.
pub(crate) async fn send_file<R, W>(buf: &mut SectorBuffer, file: &mut R, sink: &mut W) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut total: u64 = 0;
    loop {
        let chunk = buf.read_chunk();
        let n = file.read(chunk).await.map_err(TransferError::File)?;
        if n == 0 {
            return Ok(total);
        }
        sink.write_all(&chunk[..n]).await.map_err(TransferError::Socket)?;
        total += n as u64;
    }
}

// STOR: data channel to file through the coalescing buffer. Every receive is
// bounded by `recv_timeout`; EOF on the data channel ends the transfer and
// flushes the tail. Returns bytes received.
pub(crate) async fn receive_file<R, W>(
    buf: &mut SectorBuffer,
    conn: &mut R,
    file: &mut W,
    recv_timeout: Duration,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut segment = [0u8; TCP_MSS];
    let mut total: u64 = 0;
    loop {
        let n = match timeout(recv_timeout, conn.read(&mut segment)).await {
            Err(_elapsed) => {
                return Err(TransferError::Socket(io::Error::new(io::ErrorKind::TimedOut, "data receive timeout")));
            }
            Ok(Err(e)) => return Err(TransferError::Socket(e)),
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
        };
        buf.absorb(&segment[..n], file).await.map_err(TransferError::File)?;
        total += n as u64;
    }
    buf.finish(file).await.map_err(TransferError::File)?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    // A sink that remembers the size of every write it saw.
    #[derive(Default)]
    struct RecordingSink {
        data: Vec<u8>,
        writes: Vec<usize>,
    }

    impl AsyncWrite for RecordingSink {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.data.extend_from_slice(buf);
            this.writes.push(buf.len());
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    async fn run_segments(capacity: usize, segments: &[&[u8]]) -> RecordingSink {
        let mut buf = SectorBuffer::new(capacity);
        let mut sink = RecordingSink::default();
        for seg in segments {
            buf.absorb(seg, &mut sink).await.unwrap();
        }
        buf.finish(&mut sink).await.unwrap();
        sink
    }

    #[tokio::test]
    async fn three_segment_store_coalesces_into_sector_writes() {
        let payload: Vec<u8> = (0u32..2600).map(|i| (i % 251) as u8).collect();
        let segments = [&payload[..900], &payload[900..1700], &payload[1700..]];
        let sink = run_segments(1024, &segments).await;
        assert_eq!(sink.writes, vec![1024, 1024, 552]);
        assert_eq!(sink.data, payload);
    }

    #[tokio::test]
    async fn segment_ending_exactly_on_the_boundary_leaves_nothing_pending() {
        let payload = vec![7u8; 2048];
        let sink = run_segments(1024, &[&payload[..1000], &payload[1000..2048]]).await;
        assert_eq!(sink.writes, vec![1024, 1024]);
        assert_eq!(sink.data, payload);
    }

    #[tokio::test]
    async fn oversized_segment_flushes_pending_bytes_first() {
        let payload: Vec<u8> = (0u32..2000).map(|i| (i % 163) as u8).collect();
        // 300 buffered bytes, then a segment larger than the whole buffer.
        let sink = run_segments(1024, &[&payload[..300], &payload[300..]]).await;
        assert_eq!(sink.writes, vec![300, 1700]);
        assert_eq!(sink.data, payload);
    }

    #[tokio::test]
    async fn byte_at_a_time_arrival_still_reassembles() {
        let payload: Vec<u8> = (0u32..1500).map(|i| (i % 13) as u8).collect();
        let segments: Vec<&[u8]> = payload.chunks(1).collect();
        let sink = run_segments(1024, &segments).await;
        assert_eq!(sink.writes, vec![1024, 476]);
        assert_eq!(sink.data, payload);
    }

    #[tokio::test]
    async fn receive_file_reports_total_and_content() {
        let payload: Vec<u8> = (0u32..5000).map(|i| (i % 199) as u8).collect();
        let mut buf = SectorBuffer::new(2048);
        let mut reader = std::io::Cursor::new(payload.clone());
        let mut sink = RecordingSink::default();
        let total = receive_file(&mut buf, &mut reader, &mut sink, Duration::from_secs(1)).await.unwrap();
        assert_eq!(total, 5000);
        assert_eq!(sink.data, payload);
        // A Cursor delivers TCP_MSS-sized segments here; everything except
        // the tail flush must come out sector aligned.
        assert_eq!(sink.writes, vec![2048, 2048, 904]);
    }

    #[tokio::test]
    async fn send_file_streams_in_mss_chunks() {
        let payload: Vec<u8> = (0u32..4000).map(|i| (i % 241) as u8).collect();
        let mut buf = SectorBuffer::new(16 * 1024);
        let mut reader = std::io::Cursor::new(payload.clone());
        let mut sink = RecordingSink::default();
        let total = send_file(&mut buf, &mut reader, &mut sink).await.unwrap();
        assert_eq!(total, 4000);
        assert_eq!(sink.data, payload);
        assert!(sink.writes.iter().all(|&w| w <= TCP_MSS));
    }
}
