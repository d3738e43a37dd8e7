//! The server supervisor and the per-slot session workers.
//!
//! The supervisor owns the control listener and drives the status machine:
//! `Starting` binds the listener, `Running` accepts and hands connections to
//! free slots, `Stopping`/`ErrorStopping` signal every slot and wait for the
//! workers to drain. Workers are spawned once at init and live for the
//! process; each serves its slot's clients one after another.

use crate::notification::SessionObserver;
use crate::options::{PORT_ROTATION_SPAN, ServerOptions};
use crate::server::controlchan::{ControlChan, control_loop};
use crate::server::reply::{Reply, ReplyCode};
use crate::server::session::Session;
use crate::server::state::{ErrorFlags, ServerState, ServerStatus};
use crate::storage::StorageBackend;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::Notify;
use tokio::time::{sleep, timeout};

const REJECT_LINE: &[u8] = b"421 No more connections allowed\r\n";
const LISTEN_BACKLOG: u32 = 8;
const IDLE_POLL: Duration = Duration::from_millis(1000);
const SLOTS_FULL_BACKOFF: Duration = Duration::from_millis(500);

// Shared between the supervisor and one worker. The supervisor parks
// accepted connections in the handoff and raises the stop flag; the worker
// owns busy.
pub(crate) struct SlotShared {
    pub index: usize,
    busy: AtomicBool,
    stop: AtomicBool,
    handoff: Mutex<Option<TcpStream>>,
    doorbell: Notify,
}

impl SlotShared {
    pub fn new(index: usize) -> Self {
        SlotShared {
            index,
            busy: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            handoff: Mutex::new(None),
            doorbell: Notify::new(),
        }
    }

    // A slot counts as occupied while a connection is parked in the handoff
    // or the worker is busy serving one. Checked under the handoff lock so
    // it cannot race the worker picking a connection up.
    fn is_free(&self) -> bool {
        let parked = self.handoff.lock().unwrap_or_else(|e| e.into_inner());
        !self.busy.load(Ordering::SeqCst) && parked.is_none()
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    fn assign(&self, conn: TcpStream) {
        self.stop.store(false, Ordering::SeqCst);
        *self.handoff.lock().unwrap_or_else(|e| e.into_inner()) = Some(conn);
        self.doorbell.notify_one();
    }

    fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_flag(&self) -> &AtomicBool {
        &self.stop
    }

    // Marks the slot busy in the same critical section that empties the
    // handoff, so the slot never looks free in between.
    async fn next_connection(&self) -> TcpStream {
        loop {
            {
                let mut parked = self.handoff.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(conn) = parked.take() {
                    self.busy.store(true, Ordering::SeqCst);
                    return conn;
                }
            }
            self.doorbell.notified().await;
        }
    }
}

pub(crate) struct Supervisor {
    pub state: Arc<ServerState>,
    pub slots: Arc<Vec<Arc<SlotShared>>>,
    pub options: Arc<ServerOptions>,
    pub logger: slog::Logger,
}

impl Supervisor {
    pub async fn run(self) {
        let mut listener: Option<TcpListener> = None;
        loop {
            match self.state.status() {
                ServerStatus::Idle | ServerStatus::Error => sleep(IDLE_POLL).await,
                ServerStatus::Starting => {
                    if let Some(l) = self.bind_listener() {
                        slog::info!(self.logger, "Listening on port {}", self.state.port());
                        listener = Some(l);
                        self.state.set_status(ServerStatus::Running);
                    }
                }
                ServerStatus::Running => self.running_tick(&mut listener).await,
                ServerStatus::Stopping | ServerStatus::ErrorStopping => {
                    listener = None;
                    self.wind_down().await;
                }
            }
        }
    }

    // Creates, binds and starts the control listener; failures land in the
    // error set (which flips the status to ErrorStopping).
    fn bind_listener(&self) -> Option<TcpListener> {
        let port = self.state.port();
        if port == 0 {
            self.state.set_error(ErrorFlags::PORT_IS_ZERO);
            return None;
        }
        let socket = match TcpSocket::new_v4() {
            Ok(s) => s,
            Err(e) => {
                slog::error!(self.logger, "Creating server socket failed: {}", e);
                self.state.set_error(ErrorFlags::SERVER_SOCKET_CREATE);
                return None;
            }
        };
        let _ = socket.set_reuseaddr(true);
        if let Err(e) = socket.bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))) {
            slog::error!(self.logger, "Binding port {} failed: {}", port, e);
            self.state.set_error(ErrorFlags::SERVER_SOCKET_BIND);
            return None;
        }
        match socket.listen(LISTEN_BACKLOG) {
            Ok(listener) => Some(listener),
            Err(e) => {
                slog::error!(self.logger, "Listening on port {} failed: {}", port, e);
                self.state.set_error(ErrorFlags::SERVER_SOCKET_LISTEN);
                None
            }
        }
    }

    // One accept poll: hand the connection to the first free slot, or turn
    // it away when the table is full.
    async fn running_tick(&self, listener: &mut Option<TcpListener>) {
        let Some(l) = listener.as_ref() else {
            self.state.set_error(ErrorFlags::SERVER_SOCKET_CREATE);
            return;
        };
        match timeout(self.options.accept_tick, l.accept()).await {
            Err(_elapsed) => {}
            Ok(Err(e)) => slog::warn!(self.logger, "Accept failed: {}", e),
            Ok(Ok((conn, peer))) => {
                slog::info!(self.logger, "Incoming control connection from {}", peer);
                match self.slots.iter().find(|s| s.is_free()) {
                    Some(slot) => slot.assign(conn),
                    None => {
                        self.reject(conn).await;
                        sleep(SLOTS_FULL_BACKOFF).await;
                    }
                }
            }
        }
    }

    async fn reject(&self, mut conn: TcpStream) {
        slog::warn!(self.logger, "All client slots taken, refusing connection");
        match timeout(self.options.write_timeout, conn.write_all(REJECT_LINE)).await {
            Ok(Ok(())) => {}
            _ => self.state.set_error(ErrorFlags::CLIENT_SOCKET_WRITE),
        }
        match conn.shutdown().await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => {}
            Err(_) => self.state.set_error(ErrorFlags::CLIENT_SOCKET_CLOSE),
        }
    }

    // Signals every slot and waits out the grace period for workers to
    // drain, then settles the status machine.
    async fn wind_down(&self) {
        slog::info!(self.logger, "Winding down {} slots", self.slots.len());
        for slot in self.slots.iter() {
            slot.request_stop();
        }
        let mut all_stopped = false;
        for _ in 0..self.options.stop_polls_max {
            if self.slots.iter().all(|s| !s.is_busy()) {
                all_stopped = true;
                break;
            }
            sleep(self.options.stop_poll).await;
        }
        if !all_stopped {
            slog::error!(self.logger, "Workers still busy after the stop grace period");
            self.state.set_error(ErrorFlags::NOT_ALL_WORKERS_STOPPED);
        }
        match self.state.status() {
            ServerStatus::Stopping => self.state.set_status(ServerStatus::Idle),
            ServerStatus::ErrorStopping => self.state.set_status(ServerStatus::Error),
            _ => {}
        }
    }
}

/// One slot's worker: waits for the supervisor to hand over a connection,
/// serves the session, releases the slot, repeats.
pub(crate) async fn worker_loop<Storage>(
    slot: Arc<SlotShared>,
    state: Arc<ServerState>,
    storage: Arc<Storage>,
    options: Arc<ServerOptions>,
    observer: Arc<dyn SessionObserver>,
    logger: slog::Logger,
) where
    Storage: StorageBackend,
{
    let mut port_rotation: u16 = 0;
    loop {
        // next_connection marks the slot busy as it hands the stream over.
        let conn = slot.next_connection().await;
        port_rotation = (port_rotation + 1) % PORT_ROTATION_SPAN;
        state.stats.client_connected();
        observer.client_connected();

        serve_session(&slot, &state, &storage, &options, &observer, &logger, port_rotation, conn).await;

        observer.client_disconnected();
        state.stats.client_disconnected();
        slot.set_busy(false);
    }
}

#[allow(clippy::too_many_arguments)]
async fn serve_session<Storage>(
    slot: &SlotShared,
    state: &Arc<ServerState>,
    storage: &Arc<Storage>,
    options: &Arc<ServerOptions>,
    observer: &Arc<dyn SessionObserver>,
    logger: &slog::Logger,
    port_rotation: u16,
    conn: TcpStream,
) where
    Storage: StorageBackend,
{
    let Some((server_ip, client_ip)) = endpoints(&conn) else {
        slog::warn!(logger, "Client endpoints unavailable, dropping connection");
        return;
    };
    let session_logger = logger.new(slog::o!("peer" => client_ip.to_string()));
    slog::info!(session_logger, "Client connected");

    let mut session = Session::new(
        Arc::clone(storage),
        Arc::clone(state),
        Arc::clone(options),
        session_logger.clone(),
        slot.index,
        server_ip,
        client_ip,
        port_rotation,
    );
    let mut control = ControlChan::new(conn, options, session_logger.clone());

    let banner = format!("-> {}, FTP Version {}", options.greeting, env!("CARGO_PKG_VERSION"));
    let banner_ok = control.reply(Reply::new_with_string(ReplyCode::ServiceReady, banner)).await.is_ok();
    if banner_ok {
        match control_loop::run(&mut session, &mut control, slot.stop_flag(), observer).await {
            Ok(()) => slog::info!(session_logger, "Client quit"),
            Err(e) => slog::info!(session_logger, "Session ended: {}", e),
        }
    }

    session.pasv_close();
    session.data_close().await;
    match control.shutdown().await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotConnected => {}
        Err(e) => {
            slog::warn!(session_logger, "Closing control connection failed: {}", e);
            state.set_error(ErrorFlags::CLIENT_SOCKET_CLOSE);
        }
    }
    slog::info!(session_logger, "Client disconnected");
}

fn endpoints(conn: &TcpStream) -> Option<(Ipv4Addr, Ipv4Addr)> {
    let local = ipv4_of(conn.local_addr().ok()?)?;
    let peer = ipv4_of(conn.peer_addr().ok()?)?;
    Some((local, peer))
}

fn ipv4_of(addr: SocketAddr) -> Option<Ipv4Addr> {
    match addr.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}
