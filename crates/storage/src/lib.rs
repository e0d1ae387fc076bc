//! Storage layer for Keystone
//!
//! This crate implements the reference-counted resource cache that higher
//! layers (pages, data items) build on:
//! - RefCache: key-addressed, capacity-bounded, reference-counted cache
//! - CacheSource: loader/evictor hooks supplied by the owning layer
//! - CacheConfig: capacity configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;

pub use cache::{CacheSource, RefCache};
pub use config::CacheConfig;
pub use keystone_core::CacheError;
