//! Tuner payload decoder
//!
//! Turns the raw `tag:f,f,f,...` text of tuner.cgi into [`TunerRecord`]s.
//! Decoding is total: bad chunks are dropped and reported in the
//! [`DecodeResult`], never raised as errors.

use super::types::{
    BerPolicy, BitErrorRate, DecodeResult, Field, FieldLayout, FieldPolicy, SkipReason,
    SkippedChunk, TunerRecord,
};
use tracing::{debug, trace};

/// Decoder for the tuner.cgi response body
#[derive(Debug, Clone, Default)]
pub struct TunerDecoder {
    layout: FieldLayout,
    ber_policy: BerPolicy,
}

impl TunerDecoder {
    /// Create a decoder for a layout and BER policy
    pub fn new(layout: FieldLayout, ber_policy: BerPolicy) -> Self {
        Self { layout, ber_policy }
    }

    /// The layout in use
    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// The BER policy in use
    pub fn ber_policy(&self) -> BerPolicy {
        self.ber_policy
    }

    /// Decode a raw payload
    pub fn decode(&self, raw: &str) -> DecodeResult {
        let Some(fields) = strip_tag(raw) else {
            debug!("Payload has no tag separator, treating as no data");
            return DecodeResult::empty();
        };

        let tokens = tokenize(fields);
        let width = self.layout.chunk_width();
        if width == 0 {
            return DecodeResult {
                tail_tokens: tokens.len(),
                ..DecodeResult::default()
            };
        }

        let windows = tokens.chunks_exact(width);
        let tail_tokens = windows.remainder().len();
        if tail_tokens > 0 {
            trace!(tail_tokens, "Discarding partial trailing chunk");
        }

        let mut result = DecodeResult {
            tail_tokens,
            ..DecodeResult::default()
        };

        for (index, chunk) in windows.enumerate() {
            match self.decode_chunk(chunk) {
                Ok(record) => result.records.push(record),
                Err(reason) => {
                    debug!(chunk = index, %reason, "Skipping tuner chunk");
                    result.skipped.push(SkippedChunk { index, reason });
                }
            }
        }

        result
    }

    /// Decode one full-width chunk
    fn decode_chunk(&self, chunk: &[&str]) -> Result<TunerRecord, SkipReason> {
        let id = self.parse_id(chunk)?;
        let quality = self.parse_percent(chunk, Field::Quality)?;
        let strength = self.parse_percent(chunk, Field::Strength)?;
        let carrier_to_noise = self.parse_level(chunk, Field::CarrierToNoise)?;
        let power = self.parse_level(chunk, Field::Power)?;
        let bit_error_rate = self.parse_ber(chunk)?;

        Ok(TunerRecord {
            id,
            quality,
            strength,
            carrier_to_noise,
            power,
            bit_error_rate,
        })
    }

    fn token<'a>(&self, chunk: &[&'a str], field: Field) -> Result<&'a str, SkipReason> {
        let spec = self.layout.spec(field);
        chunk
            .get(spec.index)
            .copied()
            .ok_or(SkipReason::InvalidField(field))
    }

    fn parse_id(&self, chunk: &[&str]) -> Result<i64, SkipReason> {
        let raw = self.token(chunk, Field::Id).map_err(|_| SkipReason::BlankId)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SkipReason::BlankId);
        }

        match raw.parse::<i64>() {
            Ok(0) => Err(SkipReason::NoTuner),
            Ok(id) => Ok(id),
            Err(_) => Err(SkipReason::InvalidId),
        }
    }

    fn parse_percent(&self, chunk: &[&str], field: Field) -> Result<u32, SkipReason> {
        let value = parse_digits(self.token(chunk, field)?);
        match (value, self.layout.spec(field).policy) {
            (Some(v), _) => Ok(v),
            (None, FieldPolicy::DefaultZero) => Ok(0),
            (None, _) => Err(SkipReason::InvalidField(field)),
        }
    }

    fn parse_level(&self, chunk: &[&str], field: Field) -> Result<f64, SkipReason> {
        let spec = self.layout.spec(field);
        let value = parse_float(self.token(chunk, field)?, spec.unit);
        match (value, spec.policy) {
            (Some(v), _) => Ok(v),
            (None, FieldPolicy::DefaultZero) => Ok(0.0),
            (None, _) => Err(SkipReason::InvalidField(field)),
        }
    }

    fn parse_ber(&self, chunk: &[&str]) -> Result<BitErrorRate, SkipReason> {
        let ber = BitErrorRate::new(self.token(chunk, Field::BitErrorRate)?.trim());
        if self.ber_policy == BerPolicy::Strict && ber.to_f64().is_none() {
            return Err(SkipReason::InvalidField(Field::BitErrorRate));
        }
        Ok(ber)
    }
}

/// Decode a raw payload with the device layout at the given chunk width
pub fn decode(raw: &str, chunk_width: usize) -> DecodeResult {
    TunerDecoder::new(FieldLayout::with_width(chunk_width), BerPolicy::default()).decode(raw)
}

/// Everything after the first `:`, or `None` when there is no tag
fn strip_tag(raw: &str) -> Option<&str> {
    raw.split_once(':').map(|(_, fields)| fields)
}

fn tokenize(fields: &str) -> Vec<&str> {
    if fields.is_empty() {
        Vec::new()
    } else {
        fields.split(',').collect()
    }
}

/// Unsigned decimal digits only, surrounding whitespace allowed
fn parse_digits(token: &str) -> Option<u32> {
    let token = token.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Finite float with an optional case-insensitive unit suffix
fn parse_float(token: &str, unit: Option<&str>) -> Option<f64> {
    let mut value = token.trim();
    if let Some(unit) = unit {
        value = strip_unit(value, unit).trim_end();
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn strip_unit<'a>(value: &'a str, unit: &str) -> &'a str {
    match value.len().checked_sub(unit.len()) {
        Some(at) if value.is_char_boundary(at) && value[at..].eq_ignore_ascii_case(unit) => {
            &value[..at]
        }
        _ => value,
    }
}
