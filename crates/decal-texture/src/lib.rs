//! Texture payload pipeline for NFS:HPR-style decal mod bundles.
//!
//! Given a source image and a target resource sidecar, this crate selects a
//! compressed pixel format, normalizes dimensions to the power-of-two sizes
//! the game engine accepts, drives an external block-compressor tool, and
//! writes the resulting payload plus an updated sidecar.
//!
//! The block-compression algorithm itself is out of scope: [`compressor`]
//! defines the [`compressor::BlockCompressor`] seam a caller implements
//! (or substitutes a fake for, in tests).

#![warn(missing_docs)]

pub mod alpha_mask;
pub mod compressor;
pub mod error;
pub mod pipeline;
pub mod scratch;

pub use compressor::{BlockCompressor, CompressedFormat, FakeBlockCompressor, ProcessBlockCompressor};
pub use error::{TextureError, TextureResult};
pub use pipeline::{DimensionPlan, TextureJob, TextureOutcome, TexturePipeline};
pub use scratch::ScratchFile;
