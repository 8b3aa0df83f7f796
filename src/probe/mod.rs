//! Host introspection subsystem.
//!
//! # Data Flow
//! ```text
//! RgwHealthCheck
//!     → ServiceProber   (service.rs: systemctl is-active / is-enabled)
//!     → InterfaceProber (interface.rs: ip -o addr show dev <if>)
//!     → SocketProber    (socket.rs: /proc/net/{tcp,tcp6,udp,udp6,unix})
//!         → command.rs (local process or ssh)
//! ```
//!
//! # Design Decisions
//! - Each capability is a narrow trait so checks can run against fakes
//! - Traits are synchronous; callers decide where blocking happens
//! - All concrete probers share one `CommandRunner` per host

pub mod command;
pub mod interface;
pub mod service;
pub mod socket;

use std::net::IpAddr;
use std::sync::Arc;

use thiserror::Error;

pub use command::{CommandOutput, CommandRunner, LocalRunner, SshRunner};
pub use interface::IpInterfaceProber;
pub use service::SystemdServiceProber;
pub use socket::{ProcNetSocketProber, SocketSpec};

/// Errors raised while inspecting a host.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The command could not be started at all.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but reported an error we cannot interpret.
    #[error("`{command}` exited with {status:?}: {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The inspected object does not exist on the host.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: &'static str, name: String },

    /// Output was not in the expected format.
    #[error("unexpected output from {source_name}: {detail}")]
    Parse { source_name: String, detail: String },

    /// A socket spec string could not be understood.
    #[error("invalid socket spec `{spec}`: {reason}")]
    InvalidSocketSpec { spec: String, reason: String },
}

/// Reports the state of a service unit.
pub trait ServiceProber: Send + Sync {
    /// Whether the unit is currently active.
    fn is_running(&self, unit: &str) -> Result<bool, ProbeError>;

    /// Whether the unit is configured to start at boot.
    fn is_enabled(&self, unit: &str) -> Result<bool, ProbeError>;
}

/// Reports the addresses bound to a network interface.
pub trait InterfaceProber: Send + Sync {
    /// Addresses in the order the host reports them.
    fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>, ProbeError>;
}

/// Reports whether something listens on a socket.
pub trait SocketProber: Send + Sync {
    fn is_listening(&self, spec: &SocketSpec) -> Result<bool, ProbeError>;
}

/// The three prober capabilities for one host.
#[derive(Clone)]
pub struct Probers {
    pub service: Arc<dyn ServiceProber>,
    pub interface: Arc<dyn InterfaceProber>,
    pub socket: Arc<dyn SocketProber>,
}

impl Probers {
    pub fn new(
        service: Arc<dyn ServiceProber>,
        interface: Arc<dyn InterfaceProber>,
        socket: Arc<dyn SocketProber>,
    ) -> Self {
        Self {
            service,
            interface,
            socket,
        }
    }

    /// Command-backed probers sharing one runner.
    pub fn from_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            service: Arc::new(SystemdServiceProber::new(runner.clone())),
            interface: Arc::new(IpInterfaceProber::new(runner.clone())),
            socket: Arc::new(ProcNetSocketProber::new(runner)),
        }
    }
}

impl std::fmt::Debug for Probers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probers").finish_non_exhaustive()
    }
}
