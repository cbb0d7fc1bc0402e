//! Shared helpers for the bundler and finalizer.

pub mod fs;
