//! Network interface inspection via iproute2.

use std::net::IpAddr;
use std::sync::Arc;

use crate::probe::{CommandRunner, InterfaceProber, ProbeError};

/// `InterfaceProber` backed by `ip -o addr show dev <name>`.
pub struct IpInterfaceProber {
    runner: Arc<dyn CommandRunner>,
}

impl IpInterfaceProber {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl InterfaceProber for IpInterfaceProber {
    fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>, ProbeError> {
        let output = self.runner.run("ip", &["-o", "addr", "show", "dev", interface])?;
        if !output.success() {
            if output.stderr.contains("does not exist") {
                return Err(ProbeError::NotFound {
                    kind: "interface",
                    name: interface.to_string(),
                });
            }
            return Err(ProbeError::CommandFailed {
                command: format!("ip -o addr show dev {}", interface),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let addresses = parse_ip_addr_output(&output.stdout)?;
        tracing::debug!(
            target_host = %self.runner.target(),
            interface,
            count = addresses.len(),
            "Resolved interface addresses"
        );
        Ok(addresses)
    }
}

/// Extract `inet`/`inet6` addresses from one-line-per-address `ip` output,
/// preserving order.
pub fn parse_ip_addr_output(text: &str) -> Result<Vec<IpAddr>, ProbeError> {
    let mut addresses = Vec::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            if token != "inet" && token != "inet6" {
                continue;
            }
            let cidr = tokens.next().ok_or_else(|| ProbeError::Parse {
                source_name: "ip addr".to_string(),
                detail: format!("missing address after `{}`: {}", token, line.trim()),
            })?;
            let addr = cidr.split('/').next().unwrap_or(cidr);
            let ip = addr.parse::<IpAddr>().map_err(|e| ProbeError::Parse {
                source_name: "ip addr".to_string(),
                detail: format!("`{}`: {}", addr, e),
            })?;
            addresses.push(ip);
            break;
        }
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::CommandOutput;

    const ETH0: &str = "\
2: eth0    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0\\       valid_lft forever preferred_lft forever
2: eth0    inet 10.0.0.6/24 scope global secondary eth0\\       valid_lft forever preferred_lft forever
2: eth0    inet6 fe80::5054:ff:fe12:3456/64 scope link \\       valid_lft forever preferred_lft forever
";

    #[test]
    fn test_parse_keeps_order() {
        let addrs = parse_ip_addr_output(ETH0).unwrap();
        let expected: Vec<IpAddr> = vec![
            "10.0.0.5".parse().unwrap(),
            "10.0.0.6".parse().unwrap(),
            "fe80::5054:ff:fe12:3456".parse().unwrap(),
        ];
        assert_eq!(addrs, expected);
    }

    #[test]
    fn test_parse_peer_and_empty() {
        let addrs = parse_ip_addr_output("3: tun0    inet 10.8.0.1 peer 10.8.0.2/32 scope global tun0").unwrap();
        assert_eq!(addrs, vec!["10.8.0.1".parse::<IpAddr>().unwrap()]);
        assert!(parse_ip_addr_output("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_address() {
        let err = parse_ip_addr_output("2: eth0    inet not-an-ip/24").unwrap_err();
        assert!(matches!(err, ProbeError::Parse { .. }));
    }

    struct Missing;

    impl CommandRunner for Missing {
        fn run(&self, _program: &str, _args: &[&str]) -> Result<CommandOutput, ProbeError> {
            Ok(CommandOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "Device \"eth9\" does not exist.\n".to_string(),
            })
        }

        fn target(&self) -> String {
            "missing".to_string()
        }
    }

    #[test]
    fn test_missing_interface() {
        let prober = IpInterfaceProber::new(Arc::new(Missing));
        let err = prober.addresses("eth9").unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { kind: "interface", .. }));
    }
}
