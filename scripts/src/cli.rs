//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy_stage1, deploy_stage2, print_plan, release_prelaunch, simulate, verify},
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_NETWORK, DEFAULT_RPC_URL},
    errors::ScriptError,
    types::Stage,
};

/// Deploy and configure the reward token ecosystem
#[derive(Parser)]
#[command(name = "honey-scripts")]
pub struct Cli {
    /// Arguments shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Arguments shared by every command
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", global = true)]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL, global = true)]
    pub rpc_url: String,

    /// The network to deploy to: `live`, `ropsten` or `development`
    #[arg(short, long, env = "NETWORK", default_value = DEFAULT_NETWORK, global = true)]
    pub network: String,

    /// Path to the deployments file, `deployments.<network>.json` by default
    #[arg(short, long, global = true)]
    pub deployments: Option<PathBuf>,

    /// Directory holding the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR, global = true)]
    pub artifacts: PathBuf,

    /// Use the development profile when the network is not recognized,
    /// instead of failing
    #[arg(long, global = true)]
    pub allow_network_fallback: bool,
}

impl GlobalArgs {
    /// The deployer's private key, required by every command that sends
    /// transactions
    pub fn require_priv_key(&self) -> Result<&str, ScriptError> {
        self.priv_key.as_deref().ok_or_else(|| {
            ScriptError::ClientInitialization(
                "a private key is required, pass --priv-key or set PKEY".to_string(),
            )
        })
    }
}

/// The commands of the deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the token, the mining contract and the locks, and mint the supply
    Stage1,
    /// Release the pre-launch reserve to its beneficiary
    ReleasePrelaunch,
    /// Deploy and configure the v2 mining contract and the stage 2 lock
    Stage2,
    /// Check the stage 1 balances of the deployed contracts
    Verify,
    /// Print a plan without sending any transaction
    Plan(PlanArgs),
    /// Run every stage against an in-process chain
    Simulate,
}

impl Command {
    /// Run the command
    pub async fn run(self, args: &GlobalArgs) -> Result<(), ScriptError> {
        match self {
            Command::Stage1 => deploy_stage1(args).await,
            Command::ReleasePrelaunch => release_prelaunch(args).await,
            Command::Stage2 => deploy_stage2(args).await,
            Command::Verify => verify(args).await,
            Command::Plan(plan_args) => print_plan(plan_args, args),
            Command::Simulate => simulate(args).await,
        }
    }
}

/// Print a deployment plan
#[derive(Args)]
pub struct PlanArgs {
    /// The stage to plan
    #[arg(short, long, value_enum)]
    pub stage: Stage,
}
