//! Inventory node description.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::probe::{CommandRunner, LocalRunner, SshRunner};

/// How to reach a node.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Connection {
    /// Probe the machine this process runs on.
    #[default]
    Local,
    /// Probe over `ssh`.
    Ssh {
        host: String,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        port: Option<u16>,
    },
}

/// Host variables supplied by the deployment inventory.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct NodeVars {
    #[serde(default)]
    pub inventory_hostname: Option<String>,

    /// Any other inventory variables, kept for reporting.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One host under test.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Node {
    /// Display name; defaults to the inventory hostname.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub connection: Connection,

    #[serde(default)]
    pub vars: NodeVars,
}

impl Node {
    /// A node on this machine with the given inventory hostname.
    pub fn local(inventory_hostname: impl Into<String>) -> Self {
        Self {
            name: None,
            connection: Connection::Local,
            vars: NodeVars {
                inventory_hostname: Some(inventory_hostname.into()),
                extra: BTreeMap::new(),
            },
        }
    }

    /// The `inventory_hostname` variable, if present and non-empty.
    pub fn inventory_hostname(&self) -> Option<&str> {
        self.vars
            .inventory_hostname
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.inventory_hostname().map(str::to_string))
            .unwrap_or_else(|| "<unnamed>".to_string())
    }

    /// Command runner for this node's connection.
    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        match &self.connection {
            Connection::Local => Arc::new(LocalRunner),
            Connection::Ssh { host, user, port } => Arc::new(SshRunner::new(host.clone(), user.clone(), *port)),
        }
    }
}
