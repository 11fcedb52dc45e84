//! # Print Frame
//!
//! Crop or place a photo inside a fixed 8x10 print frame and export a
//! pixel-exact, print-resolution file.
//!
//! # Pipeline
//!
//! ```text
//! bytes ──▶ metadata ──▶ crop / placement ──▶ imaging::compose ──▶ quality
//!           (size, DPI)   (selection rect)     (exact raster)       (report)
//!                                                    │
//!                                                    └──▶ imaging::export
//! ```
//!
//! Every stage but the compositor is pure geometry and can be tested
//! without decoding an image. The compositor goes through the
//! [`imaging::ImageBackend`] trait, so the same planning code runs against
//! the real `image`-crate backend or a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared value types: `SelectionRect`, `SelectionMode`, `TargetSpec`, ratios |
//! | [`metadata`] | Native size, embedded resolution, MIME checks, `ImageAsset` |
//! | [`crop`] | Ratio-locked crop with a minimum print size and size advisories |
//! | [`placement`] | Fixed frame, movable image |
//! | [`imaging`] | Print geometry, backend trait, `RustBackend`, compose and export |
//! | [`quality`] | Effective print DPI and its tier |
//! | [`session`] | Single-writer state: current image, selections, latest composite |
//! | [`store`] | The persisted current image, keyed by content hash |
//! | [`config`] | `print-frame.toml` loading, merging, and validation |
//! | [`naming`] | `8x10` parsing and export file names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Ratio In Native Pixels
//!
//! A crop is stored in percent of the image, but the 8:10 lock is enforced
//! on the native pixel size that percentage stands for. Percent width over
//! percent height equals the print ratio only for square images; native
//! pixels are what the printer sees.
//!
//! ## Correct, Don't Refuse
//!
//! Interaction ticks always produce a valid rectangle. A candidate that is
//! too small is enlarged, one that overhangs is moved back. Being under the
//! minimum print size is reported as a [`crop::SizeAdvisory`] and never
//! blocks export.
//!
//! ## One Default For Unknown Resolution
//!
//! Missing DPI metadata stays `None` everywhere. The single place it becomes
//! a number is [`types::TargetSpec::for_export`], which renders at
//! [`types::DEFAULT_EXPORT_DPI`] when no DPI is configured.

pub mod config;
pub mod crop;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod placement;
pub mod quality;
pub mod session;
pub mod store;
pub mod types;
