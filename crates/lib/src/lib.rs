//! bakelite-lib: Core types and logic for Bakelite
//!
//! This crate provides the pieces Bakelite uses to cross-compile packages:
//! - `Platform`: an OS/architecture target, with a curated default catalog
//! - `PlatformSet`: set algebra driven by `+os`, `-os/arch`, ... directives
//! - `Dispatcher`: runs one toolchain build per (platform, package) pair with bounded parallelism

pub mod execute;
pub mod platform;
pub mod util;
