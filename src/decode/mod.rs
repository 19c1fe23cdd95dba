//! Response decoder module
//!
//! Decodes the flat, positional text returned by the device's tuner.cgi.
//!
//! # Overview
//!
//! The payload looks like `tuner:<f>,<f>,...`. Everything before the first
//! `:` is a tag. The remaining comma-separated tokens are consumed in
//! fixed-width chunks (9 tokens per tuner). Each chunk becomes a
//! [`TunerRecord`] or is dropped according to the per-field policy table
//! ([`DEVICE_FIELDS`]).

mod decoders;
mod types;

pub use decoders::{decode, TunerDecoder};
pub use types::{
    BerPolicy, BitErrorRate, DecodeResult, Field, FieldLayout, FieldPolicy, FieldSpec,
    SkipReason, SkippedChunk, TunerRecord, DEFAULT_CHUNK_WIDTH, DEVICE_FIELDS, DISCOVERY_MACRO,
};
