//! Shared code for the vigil binaries

pub mod common;
