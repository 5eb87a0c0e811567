//! Errors raised while resolving configuration and building allocations

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy_primitives::U256;

/// Errors that can occur while resolving a network profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The network identifier matches no known profile
    UnknownNetwork(String),
}

impl Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::UnknownNetwork(s) => write!(f, "unknown network: {}", s),
        }
    }
}

impl Error for ProfileError {}

/// Errors that can occur while building an allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The allocated amounts exceed the supply they are drawn from
    AllocationOverflow {
        /// The total amount allocated
        allocated: U256,
        /// The supply available to allocate from
        supply: U256,
    },
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::AllocationOverflow { allocated, supply } => write!(
                f,
                "allocation overflow: {} allocated from a supply of {}",
                allocated, supply
            ),
        }
    }
}

impl Error for LedgerError {}
