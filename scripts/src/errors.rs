//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use honey_common::errors::{LedgerError, ProfileError};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// The network identifier matches no known profile
    UnknownNetwork(String),
    /// An allocation exceeds the supply it is drawn from
    AllocationOverflow(String),
    /// A plan was requested before the steps it depends on completed
    PreconditionNotMet(String),
    /// An action referenced a contract that has not been deployed
    UndefinedHandle(String),
    /// A deploy action failed, aborting the plan
    DeployFailed {
        /// The index of the failed action in its plan
        index: usize,
        /// A description of the failed action
        action: String,
        /// The error reported by the runtime
        reason: String,
    },
    /// A call action failed, aborting the plan
    CallFailed {
        /// The index of the failed action in its plan
        index: usize,
        /// A description of the failed action
        action: String,
        /// The error reported by the runtime
        reason: String,
    },
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error reading the system clock
    Clock(String),
    /// One or more post-deploy checks failed
    VerificationFailed(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownNetwork(s) => write!(f, "unknown network: {}", s),
            ScriptError::AllocationOverflow(s) => write!(f, "allocation overflow: {}", s),
            ScriptError::PreconditionNotMet(s) => write!(f, "precondition not met: {}", s),
            ScriptError::UndefinedHandle(s) => write!(f, "undefined contract handle: {}", s),
            ScriptError::DeployFailed { index, action, reason } => {
                write!(f, "action #{} ({}) failed to deploy: {}", index, action, reason)
            }
            ScriptError::CallFailed { index, action, reason } => {
                write!(f, "action #{} ({}) failed: {}", index, action, reason)
            }
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Clock(s) => write!(f, "error reading clock: {}", s),
            ScriptError::VerificationFailed(s) => write!(f, "verification failed: {}", s),
        }
    }
}

impl Error for ScriptError {}

impl From<ProfileError> for ScriptError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::UnknownNetwork(s) => ScriptError::UnknownNetwork(s),
        }
    }
}

impl From<LedgerError> for ScriptError {
    fn from(e: LedgerError) -> Self {
        ScriptError::AllocationOverflow(e.to_string())
    }
}
