//! Common test utilities for listing tests.
//!
//! - [`fixtures`] - Blog data set and schemas
//! - [`recording`] - Adapter that records every call it receives

#![allow(dead_code)]

pub mod fixtures;
pub mod recording;
