//! Scripts for deploying the NFT contracts and provisioning their dependencies.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod client;
mod commands;
pub mod constants;
pub mod constructor_args;
pub mod deployments;
pub mod errors;
pub mod network_config;
pub mod orchestrator;
pub mod publisher;
pub mod resolver;
pub mod solidity;
pub mod types;

#[cfg(test)]
mod test_helpers;
