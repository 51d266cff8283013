//! # ridgeline-core
//!
//! Core types, traits, and errors for the ridgeline track builder.
//!
//! This crate provides the foundational building blocks shared by the
//! ridgeline crates:
//!
//! - **Core Data Types**: [`SpectrumSlice`] for one frequency-domain
//!   spectrum of a channel's stream, [`TrackPoint`] for one (slice, bin)
//!   track member, and the [`PowerSample`] capability trait that lets
//!   slices carry complex or magnitude samples with compile-time dispatch.
//!
//! - **Error Types**: [`CoreError`] for configuration and validation
//!   failures common to every layer.
//!
//! - **Traits**: [`Validate`], [`Resettable`], and the [`SliceTap`]
//!   debug-observer hook.
//!
//! ## Example
//!
//! ```rust
//! use ridgeline_core::{PowerSample, SpectrumSlice};
//!
//! let slice = SpectrumSlice::new(0, vec![1.0_f64, 4.0, 2.0]).unwrap();
//! assert_eq!(slice.len(), 3);
//! assert!((slice.samples()[1].power() - 16.0).abs() < 1e-12);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root
pub use error::{CoreError, CoreResult};
pub use traits::{Resettable, SliceTap, Validate};
pub use types::{PowerSample, SpectrumSlice, TrackPoint};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default excess-power threshold multiplier for simple clustering.
pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 10.0;

/// Default minimum group size; tracks at or below this size are pruned
/// once stale.
pub const DEFAULT_MINIMUM_GROUP_SIZE: usize = 2;

/// Prelude module for convenient imports.
///
/// ```rust
/// use ridgeline_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::traits::{Resettable, SliceTap, Validate};
    pub use crate::types::{PowerSample, SpectrumSlice, TrackPoint};
}
