//! Bundle archive packer for NFS:HPR-style decal mod bundles.
//!
//! Reads a source archive's identity skeleton (header, entry table, notes,
//! debug region) and re-emits a new archive from a directory of
//! per-resource payload files, preserving entry identity and ordering and
//! recomputing offsets, sizes, and (optionally) per-stream zlib
//! compression.

#![warn(missing_docs)]

pub mod error;
pub mod pack;
pub mod skeleton;

pub use error::{PackError, PackResult};
pub use skeleton::BundleSkeleton;
