//! Constants used in the deploy scripts

/// The RPC endpoint of a default local dev node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The network targeted when none is given
pub const DEFAULT_NETWORK: &str = "development";

/// The directory holding the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The prefix of the deployments file name, completed with the network name
pub const DEPLOYMENTS_FILE_PREFIX: &str = "deployments";

/// The key of the creation bytecode in a compilation artifact
pub const BYTECODE_KEY: &str = "bytecode";

/// The key of the hex-encoded bytecode when the artifact nests it in an object
pub const BYTECODE_OBJECT_KEY: &str = "object";

/// The block timestamp a simulated chain starts at
pub const DEFAULT_SIMULATION_START_TIME: u64 = 1_600_000_000;
