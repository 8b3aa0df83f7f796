//! Listening socket inspection.
//!
//! # Responsibilities
//! - Parse socket specs (`tcp://10.0.0.5:8080`, `udp://53`, `unix:///run/x.sock`)
//! - Read the kernel socket tables under `/proc/net`
//! - Decide whether a spec is served by some listener
//!
//! # Design Decisions
//! - A listener on the wildcard address serves every address of its family;
//!   `::` also serves IPv4 (dual-stack)
//! - IPv4-mapped IPv6 listeners match the plain IPv4 address
//! - Missing IPv6 tables (IPv6 disabled) are treated as empty

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use url::{Host, Url};

use crate::probe::{CommandRunner, ProbeError, SocketProber};

/// Transport protocol of a socket spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// A socket to look for on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketSpec {
    /// `host` of `None` means any local address.
    Inet {
        protocol: Protocol,
        host: Option<IpAddr>,
        port: u16,
    },
    Unix { path: String },
}

impl SocketSpec {
    pub fn tcp(host: IpAddr, port: u16) -> Self {
        SocketSpec::Inet {
            protocol: Protocol::Tcp,
            host: Some(host),
            port,
        }
    }
}

impl fmt::Display for SocketSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketSpec::Inet { protocol, host: Some(host), port } => {
                write!(f, "{}://{}", protocol, SocketAddr::new(*host, *port))
            }
            SocketSpec::Inet { protocol, host: None, port } => write!(f, "{}://{}", protocol, port),
            SocketSpec::Unix { path } => write!(f, "unix://{}", path),
        }
    }
}

impl FromStr for SocketSpec {
    type Err = ProbeError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ProbeError::InvalidSocketSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(spec).map_err(|e| invalid(&e.to_string()))?;
        let protocol = match url.scheme() {
            "tcp" => Protocol::Tcp,
            "udp" => Protocol::Udp,
            "unix" => {
                if url.path().is_empty() || url.path() == "/" {
                    return Err(invalid("missing socket path"));
                }
                let path = percent_decode_str(url.path())
                    .decode_utf8()
                    .map_err(|e| invalid(&e.to_string()))?;
                return Ok(SocketSpec::Unix { path: path.into_owned() });
            }
            other => return Err(invalid(&format!("unsupported scheme `{}`", other))),
        };

        let host = url.host().ok_or_else(|| invalid("missing host or port"))?;
        match (host, url.port()) {
            (Host::Ipv4(ip), Some(port)) => Ok(SocketSpec::Inet { protocol, host: Some(ip.into()), port }),
            (Host::Ipv6(ip), Some(port)) => Ok(SocketSpec::Inet { protocol, host: Some(ip.into()), port }),
            // Non-special schemes keep IPv4 literals as opaque hosts.
            (Host::Domain(name), Some(port)) => {
                let ip = name
                    .parse::<IpAddr>()
                    .map_err(|_| invalid("host must be an IP address"))?;
                Ok(SocketSpec::Inet { protocol, host: Some(ip), port })
            }
            // `tcp://8080`: the lone component is the port.
            (Host::Domain(name), None) => {
                let port = name.parse::<u16>().map_err(|_| invalid("missing port"))?;
                Ok(SocketSpec::Inet { protocol, host: None, port })
            }
            _ => Err(invalid("missing port")),
        }
    }
}

/// One row of `/proc/net/{tcp,tcp6,udp,udp6}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InetSocketEntry {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub state: u8,
}

/// TCP_LISTEN in the kernel's state table.
const TCP_LISTEN: u8 = 0x0A;

/// __SO_ACCEPTCON: a unix socket accepting connections.
const UNIX_ACCEPTCON: u32 = 0x0001_0000;

impl InetSocketEntry {
    fn is_listening(&self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::Tcp => self.state == TCP_LISTEN,
            Protocol::Udp => self.remote.port() == 0 && self.remote.ip().is_unspecified(),
        }
    }
}

/// One row of `/proc/net/unix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnixSocketEntry {
    pub flags: u32,
    pub path: Option<String>,
}

fn parse_error(table: &str, detail: String) -> ProbeError {
    ProbeError::Parse {
        source_name: table.to_string(),
        detail,
    }
}

/// Decode a `/proc/net` address column such as `0100007F:1F90`.
///
/// The kernel prints each 32-bit word in host byte order; every supported
/// target is little-endian.
pub fn parse_hex_socket_addr(field: &str) -> Result<SocketAddr, String> {
    let (addr_hex, port_hex) = field
        .split_once(':')
        .ok_or_else(|| format!("missing port in `{}`", field))?;
    let port = u16::from_str_radix(port_hex, 16).map_err(|e| format!("port `{}`: {}", port_hex, e))?;

    let word = |chunk: &str| u32::from_str_radix(chunk, 16).map_err(|e| format!("address `{}`: {}", chunk, e));
    let ip: IpAddr = match addr_hex.len() {
        8 => Ipv4Addr::from(word(addr_hex)?.to_le_bytes()).into(),
        32 if addr_hex.is_ascii() => {
            let mut octets = [0u8; 16];
            for (i, slot) in octets.chunks_exact_mut(4).enumerate() {
                slot.copy_from_slice(&word(&addr_hex[i * 8..i * 8 + 8])?.to_le_bytes());
            }
            Ipv6Addr::from(octets).into()
        }
        n => return Err(format!("address `{}` has unexpected length {}", addr_hex, n)),
    };
    Ok(SocketAddr::new(ip, port))
}

/// Parse a TCP or UDP table, skipping its header line.
pub fn parse_inet_table(table: &str, text: &str) -> Result<Vec<InetSocketEntry>, ProbeError> {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return Err(parse_error(table, format!("short row: {}", line.trim())));
            }
            let local = parse_hex_socket_addr(fields[1]).map_err(|e| parse_error(table, e))?;
            let remote = parse_hex_socket_addr(fields[2]).map_err(|e| parse_error(table, e))?;
            let state = u8::from_str_radix(fields[3], 16)
                .map_err(|e| parse_error(table, format!("state `{}`: {}", fields[3], e)))?;
            Ok(InetSocketEntry { local, remote, state })
        })
        .collect()
}

/// Parse `/proc/net/unix`, skipping its header line.
pub fn parse_unix_table(text: &str) -> Result<Vec<UnixSocketEntry>, ProbeError> {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 7 {
                return Err(parse_error("/proc/net/unix", format!("short row: {}", line.trim())));
            }
            let flags = u32::from_str_radix(fields[3], 16)
                .map_err(|e| parse_error("/proc/net/unix", format!("flags `{}`: {}", fields[3], e)))?;
            Ok(UnixSocketEntry {
                flags,
                path: fields.get(7).map(|p| p.to_string()),
            })
        })
        .collect()
}

fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

/// Whether a listener bound to `local` serves connections to `host`.
pub fn address_serves(local: IpAddr, host: IpAddr) -> bool {
    match local {
        IpAddr::V4(v4) if v4.is_unspecified() => canonical(host).is_ipv4(),
        IpAddr::V6(v6) if v6.is_unspecified() => true,
        _ => canonical(local) == canonical(host),
    }
}

/// Whether any listening entry serves the given host and port.
pub fn inet_listening(entries: &[InetSocketEntry], protocol: Protocol, host: Option<IpAddr>, port: u16) -> bool {
    entries
        .iter()
        .filter(|entry| entry.is_listening(protocol) && entry.local.port() == port)
        .any(|entry| host.map_or(true, |host| address_serves(entry.local.ip(), host)))
}

/// `SocketProber` that reads the kernel socket tables.
pub struct ProcNetSocketProber {
    runner: Arc<dyn CommandRunner>,
}

impl ProcNetSocketProber {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn read_table(&self, path: &str, optional: bool) -> Result<Option<String>, ProbeError> {
        let output = self.runner.run("cat", &[path])?;
        if output.success() {
            return Ok(Some(output.stdout));
        }
        if optional {
            tracing::debug!(target_host = %self.runner.target(), path, "Socket table unavailable, skipping");
            return Ok(None);
        }
        Err(ProbeError::CommandFailed {
            command: format!("cat {}", path),
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        })
    }

    fn inet_entries(&self, protocol: Protocol) -> Result<Vec<InetSocketEntry>, ProbeError> {
        let tables = match protocol {
            Protocol::Tcp => [("/proc/net/tcp", false), ("/proc/net/tcp6", true)],
            Protocol::Udp => [("/proc/net/udp", false), ("/proc/net/udp6", true)],
        };

        let mut entries = Vec::new();
        for (path, optional) in tables {
            if let Some(text) = self.read_table(path, optional)? {
                entries.extend(parse_inet_table(path, &text)?);
            }
        }
        Ok(entries)
    }
}

impl SocketProber for ProcNetSocketProber {
    fn is_listening(&self, spec: &SocketSpec) -> Result<bool, ProbeError> {
        let listening = match spec {
            SocketSpec::Inet { protocol, host, port } => {
                let entries = self.inet_entries(*protocol)?;
                inet_listening(&entries, *protocol, *host, *port)
            }
            SocketSpec::Unix { path } => {
                let text = self.read_table("/proc/net/unix", false)?.unwrap_or_default();
                parse_unix_table(&text)?
                    .iter()
                    .any(|entry| entry.flags & UNIX_ACCEPTCON != 0 && entry.path.as_deref() == Some(path.as_str()))
            }
        };

        tracing::debug!(
            target_host = %self.runner.target(),
            socket = %spec,
            listening,
            "Checked socket"
        );
        Ok(listening)
    }
}
