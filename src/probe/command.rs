//! Command execution on the host under test.
//!
//! # Responsibilities
//! - Run a program with arguments and capture exit status and output
//! - Hide whether the host is this machine or reached over ssh
//!
//! # Design Decisions
//! - Blocking `std::process` calls; the runner moves them off the async
//!   executor and owns the timeout
//! - Non-zero exit is data, not an error: probers interpret exit codes

use std::process::Command;

use crate::probe::ProbeError;

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs commands on one host.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError>;

    /// Human-readable target, used in log fields.
    fn target(&self) -> String;
}

/// Runs commands on the local machine.
#[derive(Debug, Clone, Default)]
pub struct LocalRunner;

impl CommandRunner for LocalRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError> {
        tracing::trace!(program, ?args, "Running local command");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ProbeError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn target(&self) -> String {
        "local".to_string()
    }
}

/// Runs commands on a remote host through the `ssh` client.
#[derive(Debug, Clone)]
pub struct SshRunner {
    host: String,
    user: Option<String>,
    port: Option<u16>,
}

/// Exit code reserved by ssh for its own connection errors.
const SSH_CONNECTION_ERROR: i32 = 255;

impl SshRunner {
    pub fn new(host: impl Into<String>, user: Option<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            user,
            port,
        }
    }

    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    /// Arguments passed to the local `ssh` binary.
    pub fn ssh_args(&self, program: &str, args: &[&str]) -> Vec<String> {
        let mut ssh_args = vec!["-o".to_string(), "BatchMode=yes".to_string()];
        if let Some(port) = self.port {
            ssh_args.push("-p".to_string());
            ssh_args.push(port.to_string());
        }
        ssh_args.push(self.destination());
        ssh_args.push("--".to_string());

        let remote = std::iter::once(program)
            .chain(args.iter().copied())
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ");
        ssh_args.push(remote);
        ssh_args
    }
}

impl CommandRunner for SshRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProbeError> {
        let ssh_args = self.ssh_args(program, args);
        tracing::trace!(host = %self.host, ?ssh_args, "Running remote command");

        let output = LocalRunner.run("ssh", &ssh_args.iter().map(String::as_str).collect::<Vec<_>>())?;
        interpret_ssh_output(&self.destination(), output)
    }

    fn target(&self) -> String {
        self.destination()
    }
}

/// Separate ssh's own failures from the remote command's exit status.
///
/// Exit 255 means ssh never reached the remote command, so there is no
/// remote state to interpret. Every other status belongs to the remote side.
pub fn interpret_ssh_output(destination: &str, output: CommandOutput) -> Result<CommandOutput, ProbeError> {
    if output.status == Some(SSH_CONNECTION_ERROR) {
        return Err(ProbeError::CommandFailed {
            command: format!("ssh {}", destination),
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// Quote a word for a POSIX shell. Plain words pass through unchanged.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./@:=,+%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
