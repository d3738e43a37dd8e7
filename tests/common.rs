//! Support code for the end-to-end tests: spawning servers on local ports
//! and driving them with a bare-bones FTP client.

#![allow(dead_code)]

use slotftp::{Server, ServerStatus};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

/// A running test server together with its scratch root and listening port.
pub struct TestServer {
    /// The server handle under test.
    pub server: Server,
    /// Its scratch filesystem root.
    pub root: PathBuf,
    /// The control-channel port it's listening on.
    pub port: u16,
}

/// A directory of its own for every server so tests never see each other's
/// files.
pub fn scratch_dir() -> PathBuf {
    static SEQ: AtomicU32 = AtomicU32::new(0);
    let dir = std::env::temp_dir().join(format!(
        "slotftp-e2e-{}-{}",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Spawns a server and waits until its supervisor reports `Running`.
pub async fn spawn_server(port: u16, data_port_base: u16, max_clients: usize) -> TestServer {
    let root = scratch_dir();
    let server = Server::with_fs(root.clone())
        .max_clients(max_clients)
        .data_port_base(data_port_base)
        .buffer_size_mult(2);
    server.set_port(port);
    server.init();
    server.start();
    wait_for_status(&server, ServerStatus::Running).await;
    TestServer { server, root, port }
}

/// Polls until `server` reports `want`, panicking after a timeout.
pub async fn wait_for_status(server: &Server, want: ServerStatus) {
    for _ in 0..100 {
        if server.status() == want {
            return;
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("server never reached {want:?}, stuck in {:?}", server.status());
}

/// A minimal FTP control-channel client.
pub struct Client {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl Client {
    /// Connects and consumes the `220` banner.
    pub async fn connect(port: u16) -> Client {
        let mut client = Client::connect_raw(port).await;
        client.expect("220 ").await;
        client
    }

    /// Connects without reading anything.
    pub async fn connect_raw(port: u16) -> Client {
        for _ in 0..50 {
            if let Ok(stream) = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await {
                return Client { stream, buf: Vec::new() };
            }
            sleep(Duration::from_millis(100)).await;
        }
        panic!("could not connect to 127.0.0.1:{port}");
    }

    /// Sends a CRLF-terminated command line.
    pub async fn send(&mut self, line: &str) {
        self.stream.write_all(format!("{line}\r\n").as_bytes()).await.unwrap();
    }

    /// Reads one CRLF-terminated reply line.
    pub async fn read_line(&mut self) -> String {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                return String::from_utf8(line).unwrap();
            }
            let mut chunk = [0u8; 1024];
            let n = timeout(Duration::from_secs(10), self.stream.read(&mut chunk))
                .await
                .expect("timed out waiting for a reply")
                .unwrap();
            assert!(n > 0, "connection closed while waiting for a reply");
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Reads one line and asserts its prefix.
    pub async fn expect(&mut self, prefix: &str) -> String {
        let line = self.read_line().await;
        assert!(line.starts_with(prefix), "expected a {prefix:?} reply, got {line:?}");
        line
    }

    /// Reads lines of a multi-line reply until the final `<code> ` line.
    pub async fn read_until_final(&mut self, code: &str) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await;
            let done = line.starts_with(&format!("{code} "));
            lines.push(line);
            if done {
                return lines;
            }
        }
    }

    /// Logs in with the default credentials.
    pub async fn login(&mut self) {
        self.send("USER user").await;
        self.expect("331 ").await;
        self.send("PASS pass").await;
        self.expect("230 ").await;
    }

    /// EOF check: the server hung up on us.
    pub async fn expect_eof(&mut self) {
        let mut chunk = [0u8; 64];
        let n = timeout(Duration::from_secs(10), self.stream.read(&mut chunk))
            .await
            .expect("timed out waiting for EOF")
            .unwrap_or(0);
        assert_eq!(n, 0, "expected EOF, got {:?}", String::from_utf8_lossy(&chunk[..n]));
    }
}

/// Extracts the data-channel endpoint from a `227 Entering Passive Mode
/// (h1,h2,h3,h4,p1,p2).` reply.
pub fn pasv_addr(line: &str) -> (Ipv4Addr, u16) {
    let inner = line
        .split('(')
        .nth(1)
        .and_then(|rest| rest.split(')').next())
        .unwrap_or_else(|| panic!("malformed PASV reply: {line:?}"));
    let nums: Vec<u16> = inner.split(',').map(|s| s.trim().parse().unwrap()).collect();
    assert_eq!(nums.len(), 6, "malformed PASV reply: {line:?}");
    let addr = Ipv4Addr::new(nums[0] as u8, nums[1] as u8, nums[2] as u8, nums[3] as u8);
    (addr, nums[4] * 256 + nums[5])
}

/// Opens the data connection a PASV reply points at.
pub async fn open_data(line: &str) -> TcpStream {
    let (addr, port) = pasv_addr(line);
    TcpStream::connect((addr, port)).await.expect("data connection refused")
}

/// Drains a data connection to EOF.
pub async fn read_data_to_end(mut conn: TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    timeout(Duration::from_secs(10), conn.read_to_end(&mut data))
        .await
        .expect("timed out reading the data channel")
        .unwrap();
    data
}
