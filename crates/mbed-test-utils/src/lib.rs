//! Shared test utilities for the mbed config workspace.
//!
//! This crate provides standardised program-tree fixtures so crate test
//! suites do not each hand-roll temp directories. It is a dev-dependency
//! only and is never published.
//!
//! # Modules
//!
//! - [`program`]: [`TestProgram`](program::TestProgram) builder for
//!   descriptor trees on disk

pub mod program;
