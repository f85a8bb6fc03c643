//! Excavate Transport - Remote clock source and sampling
//!
//! This crate provides:
//! - The `RemoteClockSource` capability
//! - A Solana JSON-RPC implementation (getSlot + getEpochInfo)
//! - The sampler that stamps readings into `Sample`s

pub mod source;
pub mod rpc;
pub mod sampler;

pub use source::*;
pub use rpc::{read_once, EpochInfo, RpcClockSource, RpcConfig, DEFAULT_RPC_TIMEOUT, RPC_URL_ENV, RPC_URL_FALLBACK_ENV};
pub use sampler::*;
