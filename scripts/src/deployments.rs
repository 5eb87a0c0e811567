//! The deployments record: which addresses correspond to which contracts on a
//! network, and how far each plan has progressed.
//!
//! The record is read at the start of every run and rewritten after every
//! confirmed action, so that a failed run can be resumed without redeploying
//! contracts that already exist.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::Address;
use honey_common::types::{ContractKind, NetworkId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{errors::ScriptError, types::Stage};

/// The progress of a plan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    /// The number of leading actions confirmed on chain
    pub confirmed: usize,
    /// The number of actions in the plan
    pub total: usize,
}

impl StageProgress {
    /// Whether every action of the plan has been confirmed
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.confirmed >= self.total
    }
}

/// The persisted state of a deployment on a single network
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// The network the record belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Deployed addresses, keyed by artifact name
    #[serde(default)]
    pub deployments: BTreeMap<String, Address>,
    /// Progress of each plan, keyed by stage
    #[serde(default)]
    pub progress: BTreeMap<String, StageProgress>,
    /// The locks whose tokens have been released
    #[serde(default)]
    pub released: BTreeSet<String>,
}

impl DeploymentRecord {
    /// Create an empty record for the given network
    pub fn new(network: NetworkId) -> Self {
        Self { network: Some(network.name().to_string()), ..Default::default() }
    }

    /// The recorded address of a contract
    pub fn address_of(&self, contract: ContractKind) -> Option<Address> {
        self.deployments.get(contract.artifact_name()).copied()
    }

    /// The recorded address of a contract, or an error naming the missing handle
    pub fn require(&self, contract: ContractKind) -> Result<Address, ScriptError> {
        self.address_of(contract).ok_or_else(|| {
            ScriptError::UndefinedHandle(format!("{contract} has not been deployed"))
        })
    }

    /// Record the address of a deployed contract
    pub fn record_deployment(&mut self, contract: ContractKind, address: Address) {
        self.deployments.insert(contract.artifact_name().to_string(), address);
    }

    /// The recorded progress of a stage
    pub fn progress_of(&self, stage: Stage) -> StageProgress {
        self.progress.get(stage.key()).copied().unwrap_or_default()
    }

    /// Record the progress of a stage
    pub fn set_progress(&mut self, stage: Stage, progress: StageProgress) {
        self.progress.insert(stage.key().to_string(), progress);
    }

    /// Whether every action of a stage has been confirmed
    pub fn is_stage_complete(&self, stage: Stage) -> bool {
        self.progress_of(stage).is_complete()
    }

    /// Mark a lock as released
    pub fn mark_released(&mut self, lock: ContractKind) {
        self.released.insert(lock.artifact_name().to_string());
    }

    /// Whether a lock has been released
    pub fn is_released(&self, lock: ContractKind) -> bool {
        self.released.contains(lock.artifact_name())
    }
}

/// The deployment state threaded through the planners and the executor
#[derive(Debug)]
pub struct DeploymentContext {
    /// The in-memory record
    pub record: DeploymentRecord,
    /// The file backing the record, if it is persisted
    path: Option<PathBuf>,
}

impl DeploymentContext {
    /// Create a context that is never written to disk
    pub fn in_memory(network: NetworkId) -> Self {
        Self { record: DeploymentRecord::new(network), path: None }
    }

    /// Load the record for a network from a file, starting a fresh record if
    /// the file does not exist yet
    pub fn load(path: &Path, network: NetworkId) -> Result<Self, ScriptError> {
        if !path.exists() {
            info!("no deployments file at {}, starting a new record", path.display());
            return Ok(Self { record: DeploymentRecord::new(network), path: Some(path.into()) });
        }

        let record = read_record(path)?;
        if let Some(recorded) = &record.network {
            if NetworkId::from_name(recorded) != Some(network) {
                return Err(ScriptError::ReadDeployments(format!(
                    "{} holds deployments for `{}`, not `{}`",
                    path.display(),
                    recorded,
                    network
                )));
            }
        }

        Ok(Self { record, path: Some(path.into()) })
    }

    /// The file backing the record, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the record to its backing file, if it has one
    pub fn persist(&self) -> Result<(), ScriptError> {
        match &self.path {
            Some(path) => write_record(path, &self.record),
            None => Ok(()),
        }
    }
}

/// Read a deployments record from a file
pub fn read_record(path: &Path) -> Result<DeploymentRecord, ScriptError> {
    let contents =
        fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Write a deployments record to a file
pub fn write_record(path: &Path, record: &DeploymentRecord) -> Result<(), ScriptError> {
    let contents = serde_json::to_string_pretty(record)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}
