//! Scripts for deploying and configuring the reward token ecosystem: the
//! token, its liquidity-mining contracts and its token locks.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod chain;
pub mod cli;
mod commands;
pub mod constants;
pub mod deployments;
pub mod errors;
pub mod executor;
pub mod mock;
pub mod planner;
mod solidity;
pub mod types;
pub mod utils;
pub mod verify;
