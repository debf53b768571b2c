//! Linklet - short-link resolution and click accounting service
//!
//! The core is a cache-aside resolution layer over an authoritative store,
//! a write-behind click accumulator held in the fast tier, and a sync
//! daemon that periodically reconciles the counters into the store.
//!
//! # Architecture
//! - `cache`: fast-tier client (Redis in production, in-memory for tests)
//! - `clicks`: click accumulator and synchronization daemon
//! - `services`: id allocator, resolver, link management
//! - `storage`: authoritative store backends (sea-orm)
//! - `api`: thin HTTP surface (redirect + management endpoints)
//! - `config`: static configuration
//! - `runtime`: startup wiring and shutdown sequencing

pub mod api;
pub mod cache;
pub mod clicks;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
