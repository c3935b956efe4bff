//! Bundle archive codec, resource sidecar codec, and block-compressed pixel
//! codec for NFS:HPR-style decal mod bundles.
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
//! This crate provides symmetric (parser and builder) implementations for
//! the `.BIN` bundle archive container, its resource sidecar metadata
//! records, and the block-compressed (DDS-style) pixel container it
//! references.
//!
//! # Supported Formats
//!
//! - **Bundle archive** (`bundle`): header + resource entry table + up to
//!   four data blocks.
//! - **Resource sidecar** (`sidecar`): the small per-texture metadata
//!   record, in its two on-disk dialects.
//! - **Block-compressed raster** (`raster`): the DDS-style container a
//!   texture's pixel payload is extracted from.
//!
//! # Design Principles
//!
//! - **Symmetric operations**: every format that can be read can be written
//!   back, byte-for-byte, when no field has changed.
//! - **No implicit recovery**: malformed input is always a typed error, never
//!   a best-effort guess.
//! - **Static lookup tables over derived constants**: values like the
//!   per-type alignment nibbles are data, not computed from other fields.

#![warn(missing_docs)]

pub mod bundle;
pub mod error;
pub mod raster;
pub mod sidecar;

pub use error::{FormatError, FormatResult};
