//! Common types, constants, and configuration shared by the deployment scripts
//! and their tests

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod constants;
pub mod errors;
pub mod ledger;
pub mod profiles;
pub mod types;
