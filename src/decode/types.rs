//! Decoder types
//!
//! Defines the device field layout, the per-field parse policy table and the
//! records produced by a decode.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Number of comma-separated fields the device emits per tuner
pub const DEFAULT_CHUNK_WIDTH: usize = 9;

/// LLD macro the monitoring system uses to register per-tuner items
pub const DISCOVERY_MACRO: &str = "{#TUNER_ID}";

// ============================================================================
// Field Layout
// ============================================================================

/// A decoded field of a tuner chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Tuner identifier
    Id,
    /// Signal quality percentage
    Quality,
    /// Signal strength percentage
    Strength,
    /// Carrier-to-noise ratio (dB)
    CarrierToNoise,
    /// Input power (dBm)
    Power,
    /// Bit error rate
    BitErrorRate,
}

impl Field {
    /// Wire name of the field in the emitted item
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "tuner_id",
            Field::Quality => "quality",
            Field::Strength => "strength",
            Field::CarrierToNoise => "cn",
            Field::Power => "power",
            Field::BitErrorRate => "ber",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens when a field fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Blank, unparsable or zero drops the chunk (tuner id)
    Gate,
    /// Unparsable becomes 0, the chunk is kept
    DefaultZero,
    /// Unparsable drops the whole chunk
    Reject,
    /// Kept as trimmed text, validated only under [`BerPolicy::Strict`]
    Verbatim,
}

/// Position, policy and unit of one decoded field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Which field this is
    pub field: Field,
    /// Token index inside the chunk
    pub index: usize,
    /// Parse failure policy
    pub policy: FieldPolicy,
    /// Unit suffix stripped (case-insensitive) before parsing
    pub unit: Option<&'static str>,
}

/// Field table of the tuner.cgi response.
///
/// Indices 1, 2 and 5 are reserved by the device and ignored.
pub const DEVICE_FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        field: Field::Id,
        index: 0,
        policy: FieldPolicy::Gate,
        unit: None,
    },
    FieldSpec {
        field: Field::Quality,
        index: 3,
        policy: FieldPolicy::DefaultZero,
        unit: None,
    },
    FieldSpec {
        field: Field::Strength,
        index: 4,
        policy: FieldPolicy::DefaultZero,
        unit: None,
    },
    FieldSpec {
        field: Field::CarrierToNoise,
        index: 6,
        policy: FieldPolicy::Reject,
        unit: Some("db"),
    },
    FieldSpec {
        field: Field::Power,
        index: 7,
        policy: FieldPolicy::Reject,
        unit: Some("dbm"),
    },
    FieldSpec {
        field: Field::BitErrorRate,
        index: 8,
        policy: FieldPolicy::Verbatim,
        unit: None,
    },
];

/// Chunk width plus the field table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    chunk_width: usize,
    fields: [FieldSpec; 6],
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self::with_width(DEFAULT_CHUNK_WIDTH)
    }
}

impl FieldLayout {
    /// Device field table with a custom chunk width
    pub fn with_width(chunk_width: usize) -> Self {
        Self {
            chunk_width,
            fields: DEVICE_FIELDS,
        }
    }

    /// Tokens per chunk
    pub fn chunk_width(&self) -> usize {
        self.chunk_width
    }

    /// The field table
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Spec for a single field
    pub fn spec(&self, field: Field) -> FieldSpec {
        // Table rows follow the Field declaration order
        self.fields[field as usize]
    }

    /// Smallest chunk width that still contains every field
    pub fn min_width(&self) -> usize {
        self.fields.iter().map(|s| s.index + 1).max().unwrap_or(0)
    }
}

/// How the bit-error-rate field is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BerPolicy {
    /// Keep whatever text the device sent (trimmed)
    #[default]
    Preserve,
    /// Require a finite number, drop the chunk otherwise. The text is still kept.
    Strict,
}

// ============================================================================
// Records
// ============================================================================

/// Bit error rate in the device's own textual form (e.g. `1.2e-7`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BitErrorRate(String);

impl BitErrorRate {
    /// Wrap device text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Original text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the text is a finite number
    pub fn to_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for BitErrorRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One tuner snapshot decoded from a chunk
#[derive(Debug, Clone, PartialEq)]
pub struct TunerRecord {
    /// Tuner id (never 0)
    pub id: i64,
    /// Signal quality, 0 when the device sent garbage
    pub quality: u32,
    /// Signal strength, 0 when the device sent garbage
    pub strength: u32,
    /// Carrier-to-noise ratio in dB
    pub carrier_to_noise: f64,
    /// Input power in dBm
    pub power: f64,
    /// Bit error rate
    pub bit_error_rate: BitErrorRate,
}

impl TunerRecord {
    /// Value of the `{#TUNER_ID}` discovery macro
    pub fn discovery_key(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Serialize)]
struct LldItem<'a> {
    #[serde(rename = "{#TUNER_ID}")]
    discovery: String,
    tuner_id: String,
    quality: u32,
    strength: u32,
    cn: f64,
    power: f64,
    ber: &'a BitErrorRate,
}

impl Serialize for TunerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        LldItem {
            discovery: self.discovery_key(),
            tuner_id: self.discovery_key(),
            quality: self.quality,
            strength: self.strength,
            cn: self.carrier_to_noise,
            power: self.power,
            ber: &self.bit_error_rate,
        }
        .serialize(serializer)
    }
}

// ============================================================================
// Decode Result
// ============================================================================

/// Why a chunk contributed no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Id token empty or whitespace
    BlankId,
    /// Id token is not an integer
    InvalidId,
    /// Id is 0, the device's "no tuner" marker
    NoTuner,
    /// A rejecting field failed to parse
    InvalidField(Field),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BlankId => f.write_str("blank tuner id"),
            SkipReason::InvalidId => f.write_str("non-numeric tuner id"),
            SkipReason::NoTuner => f.write_str("no tuner present"),
            SkipReason::InvalidField(field) => write!(f, "invalid {field} field"),
        }
    }
}

/// A chunk that was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedChunk {
    /// Zero-based chunk position in the field stream
    pub index: usize,
    /// Why it was dropped
    pub reason: SkipReason,
}

/// Output of a decode: records in stream order plus what was dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeResult {
    /// Decoded records, in chunk order
    pub records: Vec<TunerRecord>,
    /// Full chunks that did not produce a record
    pub skipped: Vec<SkippedChunk>,
    /// Tokens left over in a trailing partial chunk
    pub tail_tokens: usize,
}

impl DecodeResult {
    /// Result for a payload with no data
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of decoded records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record was decoded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of full chunks that were dropped
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Take the records
    pub fn into_records(self) -> Vec<TunerRecord> {
        self.records
    }
}
