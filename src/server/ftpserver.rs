//! The public control surface: configuration, init/start/stop and the
//! status, error and statistics accessors.

use crate::notification::{SessionObserver, nop::NopObserver};
use crate::options::{DEFAULT_CONTROL_PORT, DEFAULT_PASSWORD, DEFAULT_USERNAME, ServerOptions};
use crate::server::state::{ErrorFlags, ServerState, ServerStats, ServerStatus};
use crate::server::supervisor::{SlotShared, Supervisor, worker_loop};
use crate::storage::{Filesystem, StorageBackend};
use slog::Drain;
use std::path::PathBuf;
use std::sync::Arc;

/// An FTP server with a fixed table of client slots.
///
/// Construct one with [`Server::with_fs`] (or [`Server::new`] for a custom
/// [`StorageBackend`]), adjust the configuration, then call
/// [`init`](Server::init) once from within a tokio runtime and toggle it
/// with [`start`](Server::start)/[`stop`](Server::stop). The listener and
/// all session work run on background tasks; this handle only flips and
/// reads the shared state.
///
/// ```no_run
/// use slotftp::Server;
///
/// #[tokio::main]
/// async fn main() {
///     let server = Server::with_fs(std::env::temp_dir()).max_clients(2);
///     server.set_port(2121);
///     server.init();
///     server.start();
///     loop {
///         tokio::time::sleep(std::time::Duration::from_secs(60)).await;
///     }
/// }
/// ```
pub struct Server<Storage = Filesystem>
where
    Storage: StorageBackend,
{
    storage: Arc<Storage>,
    state: Arc<ServerState>,
    options: ServerOptions,
    observer: Arc<dyn SessionObserver>,
    logger: slog::Logger,
}

impl Server<Filesystem> {
    /// Creates a server serving files from a local directory.
    pub fn with_fs<P: Into<PathBuf>>(root: P) -> Self {
        Server::new(Filesystem::new(root))
    }
}

impl<Storage> Server<Storage>
where
    Storage: StorageBackend,
{
    /// Creates a server on a custom storage back-end, with default
    /// configuration and credentials.
    pub fn new(storage: Storage) -> Self {
        Server {
            storage: Arc::new(storage),
            state: Arc::new(ServerState::new(DEFAULT_CONTROL_PORT, DEFAULT_USERNAME, DEFAULT_PASSWORD)),
            options: ServerOptions::default(),
            observer: Arc::new(NopObserver),
            logger: slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()),
        }
    }

    /// Sets the greeting shown in the `220` banner.
    pub fn greeting(mut self, greeting: &'static str) -> Self {
        self.options.greeting = greeting;
        self
    }

    /// Sets the number of client slots.
    pub fn max_clients(mut self, n: usize) -> Self {
        self.options.max_clients = n.max(1);
        self
    }

    /// Enables or disables passive mode. When disabled, `PASV` is treated
    /// like an unknown command.
    pub fn passive_mode(mut self, enabled: bool) -> Self {
        self.options.passive_enabled = enabled;
        self
    }

    /// Sets the base port for passive-mode data listeners.
    pub fn data_port_base(mut self, port: u16) -> Self {
        self.options.data_port_base = port;
        self
    }

    /// Sets the transfer buffer capacity as a multiple of the 512-byte
    /// sector size. Values below 2 are clamped.
    pub fn buffer_size_mult(mut self, mult: usize) -> Self {
        self.options.buffer_size_mult = mult;
        self
    }

    /// Replaces the whole option set, for tuning the timeouts.
    pub fn options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    /// Installs a [`SessionObserver`] that is notified around client
    /// lifecycle events and dispatched commands.
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Sets the logger. The default forwards to the `log` crate.
    pub fn logger(mut self, logger: slog::Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Spawns the supervisor and one worker task per slot. Idempotent; must
    /// be called from within a tokio runtime, before the first
    /// [`start`](Server::start).
    pub fn init(&self) {
        if !self.state.mark_inited() {
            return;
        }
        let options = Arc::new(self.options.clone());
        let n = options.max_clients;
        self.state.stats.set_clients_max(n as u32);

        let slots: Arc<Vec<Arc<SlotShared>>> = Arc::new((0..n).map(|i| Arc::new(SlotShared::new(i))).collect());
        for slot in slots.iter() {
            let logger = self.logger.new(slog::o!("slot" => slot.index));
            tokio::spawn(worker_loop(
                Arc::clone(slot),
                Arc::clone(&self.state),
                Arc::clone(&self.storage),
                Arc::clone(&options),
                Arc::clone(&self.observer),
                logger,
            ));
        }
        let supervisor = Supervisor {
            state: Arc::clone(&self.state),
            slots,
            options,
            logger: self.logger.new(slog::o!("task" => "supervisor")),
        };
        tokio::spawn(supervisor.run());
        slog::info!(self.logger, "Initialized with {} client slots", n);
    }

    /// Requests a start: `Idle` or `Error` moves to `Starting` and the
    /// supervisor brings the listener up.
    pub fn start(&self) {
        if !self.state.is_inited() {
            slog::warn!(self.logger, "start() before init(), ignored");
            return;
        }
        let ok = self.state.transition(ServerStatus::Idle, ServerStatus::Starting)
            || self.state.transition(ServerStatus::Error, ServerStatus::Starting);
        if !ok {
            slog::warn!(self.logger, "start() ignored in status {:?}", self.state.status());
        }
    }

    /// Requests a stop: `Running` moves to `Stopping` and the supervisor
    /// winds every session down.
    pub fn stop(&self) {
        if !self.state.transition(ServerStatus::Running, ServerStatus::Stopping) {
            slog::warn!(self.logger, "stop() ignored in status {:?}", self.state.status());
        }
    }

    /// Sets the username honored by `USER`. Takes effect for new logins.
    pub fn set_username(&self, name: &str) {
        self.state.set_username(name);
    }

    /// Sets the password honored by `PASS`. Takes effect for new logins.
    pub fn set_password(&self, pass: &str) {
        self.state.set_password(pass);
    }

    /// Sets the control port used by the next start.
    pub fn set_port(&self, port: u16) {
        self.state.set_port(port);
    }

    /// The configured control port.
    pub fn port(&self) -> u16 {
        self.state.port()
    }

    /// Where the status machine currently stands.
    pub fn status(&self) -> ServerStatus {
        self.state.status()
    }

    /// The accumulated transport error set.
    pub fn errors(&self) -> ErrorFlags {
        self.state.errors()
    }

    /// Clears the error set; only honored in [`ServerStatus::Error`].
    pub fn clear_errors(&self) {
        self.state.clear_errors();
    }

    /// A snapshot of the server statistics.
    pub fn stats(&self) -> ServerStats {
        self.state.stats.snapshot()
    }
}
