//! Server-side resolution of NFT drop (mint) pages plus the descriptor-driven
//! contract-call layer it is built on: canonical function descriptors with
//! selector probing, read-call dispatch over an alloy HTTP provider, and
//! deferred write-call preparation with single-flight parameter resolution.

pub mod config;
pub mod drops;
pub mod ethereum;
pub mod extensions;
pub mod metadata;
pub mod wallets;
