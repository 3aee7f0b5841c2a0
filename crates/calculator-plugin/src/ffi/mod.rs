//! C interface shared with hosts.

pub mod abi;
pub mod safety;
