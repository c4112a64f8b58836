//! Shared test utilities
//!
//! Each integration test binary compiles its own copy of this module and uses
//! a different subset of the helpers.

#![allow(dead_code)]

pub mod mocks;
