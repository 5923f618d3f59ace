//! Sheetserve Library
//!
//! This module exposes the data pipeline, cache, service, and API modules for
//! use in integration tests.

pub mod ads;
pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod service;
