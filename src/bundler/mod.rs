//! Standalone executable bundling.
//!
//! Drives an external ahead-of-time bundler (PyInstaller by default) from a
//! validated [`TargetSpec`](crate::config::TargetSpec) and checksums what it
//! produces.
//!
//! # Layout
//!
//! | Path | Produced by |
//! |------|-------------|
//! | `dist/<binary>/<binary>` | bundler, one directory per target |
//! | `dist/<binary>/<binary>.sha256` | [`checksum::write_sidecar`] |
//! | `build/<binary>/` | bundler work and spec files |
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use wems_release::bundler::Bundler;
//! use wems_release::config::{BuildTarget, ProjectConfig};
//!
//! # async fn example() -> wems_release::Result<()> {
//! let project = ProjectConfig::load(Path::new("."), None).await?;
//! let bundler = Bundler::new(&project, false)?;
//! let bundled = bundler.bundle_all(&[BuildTarget::Gui]).await?;
//! println!("Built {}", bundled[0].executable.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
pub mod checksum;
mod command;
pub mod error;
mod tool_detection;
pub mod utils;

pub use builder::{BundledTarget, Bundler, EXE_SUFFIX};
pub use command::{BundleCommand, DATA_SEPARATOR, OutputDirs};
pub use error::{Context, Error, ErrorExt, Result};
pub use tool_detection::resolve_program;
