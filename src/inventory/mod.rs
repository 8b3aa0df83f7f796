//! Inventory: the hosts under test and their variables.
//!
//! Nodes come from the `[[nodes]]` tables of the config file, or from a
//! single `--hostname` on the command line.

pub mod node;

pub use node::{Connection, Node, NodeVars};
