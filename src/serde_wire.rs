//! Binary and textual canonical encodings (spec §6.2). The binary form is
//! this crate's own wire format, not a compatibility layer for any other
//! system's serialization: a 1-byte duration tag, a 1-byte base-type tag, a
//! flags byte (continuous / Z / geodetic), an optional SRID (point bases
//! only), and variant-specific payload — each instant's timestamp +
//! `BaseValue::encode` payload, sequences additionally carrying bound
//! inclusivity and interpolation.

use crate::collections::datetime::Timestamp;
use crate::error::{Error, Result};
use crate::geom::GeomKernel;
use crate::temporal::{Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal};
use crate::value::{BaseKind, BaseValue};

const TAG_INSTANT: u8 = 0;
const TAG_INSTANT_SET: u8 = 1;
const TAG_SEQUENCE: u8 = 2;
const TAG_SEQUENCE_SET: u8 = 3;

const FLAG_CONTINUOUS: u8 = 0b001;
const FLAG_Z: u8 = 0b010;
const FLAG_GEODETIC: u8 = 0b100;

fn base_kind_tag(kind: BaseKind) -> u8 {
    match kind {
        BaseKind::Bool => 0,
        BaseKind::Int32 => 1,
        BaseKind::Float64 => 2,
        BaseKind::Text => 3,
        BaseKind::Double2 => 4,
        BaseKind::Double3 => 5,
        BaseKind::Double4 => 6,
        BaseKind::Geometry => 7,
        BaseKind::Geography => 8,
    }
}

fn is_point_kind(kind: BaseKind) -> bool {
    matches!(kind, BaseKind::Geometry | BaseKind::Geography)
}

fn sample_value<V: BaseValue>(value: &Temporal<V>) -> &V {
    match value {
        Temporal::Instant(i) => i.value(),
        Temporal::InstantSet(s) => s.instants()[0].value(),
        Temporal::Sequence(s) => s.instants()[0].value(),
        Temporal::SequenceSet(s) => s.sequences()[0].instants()[0].value(),
    }
}

/// Derives the common `{base_type, continuous_flag, geodetic_flag,
/// z_flag, srid?}` header (spec §6.2) from one sample value of `value` —
/// every instant of a given `Temporal<V>` already shares the same base
/// type, Z-flag and SRID by construction (§4.10's uniform-spatial-key
/// check), so the first is representative of all.
fn header_flags<V: BaseValue>(value: &Temporal<V>) -> (u8, Option<i32>) {
    let mut flags = 0u8;
    if V::CONTINUOUS {
        flags |= FLAG_CONTINUOUS;
    }
    if matches!(V::KIND, BaseKind::Geography) {
        flags |= FLAG_GEODETIC;
    }
    let srid = sample_value(value).spatial_key().map(|(srid, has_z)| {
        if has_z {
            flags |= FLAG_Z;
        }
        srid
    });
    (flags, srid)
}

/// Appends the binary encoding of `value` to `buf` (spec §6.2).
pub fn encode<V: BaseValue>(value: &Temporal<V>, buf: &mut Vec<u8>) {
    let duration_tag = match value {
        Temporal::Instant(_) => TAG_INSTANT,
        Temporal::InstantSet(_) => TAG_INSTANT_SET,
        Temporal::Sequence(_) => TAG_SEQUENCE,
        Temporal::SequenceSet(_) => TAG_SEQUENCE_SET,
    };
    buf.push(duration_tag);
    buf.push(base_kind_tag(V::KIND));
    let (flags, srid) = header_flags(value);
    buf.push(flags);
    if let Some(srid) = srid {
        buf.extend_from_slice(&srid.to_le_bytes());
    }

    match value {
        Temporal::Instant(i) => {
            encode_instant(i, buf);
        }
        Temporal::InstantSet(s) => {
            buf.extend_from_slice(&(s.num_instants() as u32).to_le_bytes());
            for i in s.instants() {
                encode_instant(i, buf);
            }
        }
        Temporal::Sequence(s) => {
            encode_sequence(s, buf);
        }
        Temporal::SequenceSet(s) => {
            buf.extend_from_slice(&(s.num_sequences() as u32).to_le_bytes());
            for seq in s.sequences() {
                encode_sequence(seq, buf);
            }
        }
    }
}

fn encode_instant<V: BaseValue>(i: &TInstant<V>, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&i.timestamp().as_micros().to_le_bytes());
    i.value().encode(buf);
}

fn encode_sequence<V: BaseValue>(s: &TSequence<V>, buf: &mut Vec<u8>) {
    let period = s.period();
    let mut flags = 0u8;
    if period.is_lower_inclusive() {
        flags |= 0b01;
    }
    if period.is_upper_inclusive() {
        flags |= 0b10;
    }
    if s.interpolation() == Interpolation::Linear {
        flags |= 0b100;
    }
    buf.push(flags);
    buf.extend_from_slice(&(s.num_instants() as u32).to_le_bytes());
    for i in s.instants() {
        encode_instant(i, buf);
    }
}

/// Decodes a `Temporal<V>` from the front of `buf`, returning the value
/// and the number of bytes consumed. Validates the wire's base-type tag
/// against `V::KIND` so a caller can't decode a blob as the wrong base
/// type even though the payload bytes happen to be the right length.
pub fn decode<V: BaseValue>(buf: &[u8], kernel: &dyn GeomKernel) -> Result<(Temporal<V>, usize)> {
    let tag = *buf.first().ok_or_else(|| Error::Internal("truncated temporal tag".into()))?;
    let base_tag = *buf.get(1).ok_or_else(|| Error::Internal("truncated base-type tag".into()))?;
    let expected_base_tag = base_kind_tag(V::KIND);
    if base_tag != expected_base_tag {
        return Err(Error::Internal(format!("wire base-type tag {base_tag} does not match expected {expected_base_tag}")));
    }
    let _flags = *buf.get(2).ok_or_else(|| Error::Internal("truncated flags byte".into()))?;
    let mut off = 3;
    if is_point_kind(V::KIND) {
        off += 4;
    }
    match tag {
        TAG_INSTANT => {
            let (i, n) = decode_instant::<V>(&buf[off..])?;
            Ok((Temporal::Instant(i), off + n))
        }
        TAG_INSTANT_SET => {
            let count = read_u32(buf, off)? as usize;
            off += 4;
            let mut instants = Vec::with_capacity(count);
            for _ in 0..count {
                let (i, n) = decode_instant::<V>(&buf[off..])?;
                instants.push(i);
                off += n;
            }
            Ok((Temporal::InstantSet(TInstantSet::new(instants)?), off))
        }
        TAG_SEQUENCE => {
            let (s, n) = decode_sequence::<V>(&buf[off..], kernel)?;
            Ok((Temporal::Sequence(s), off + n))
        }
        TAG_SEQUENCE_SET => {
            let count = read_u32(buf, off)? as usize;
            off += 4;
            let mut sequences = Vec::with_capacity(count);
            for _ in 0..count {
                let (s, n) = decode_sequence::<V>(&buf[off..], kernel)?;
                sequences.push(s);
                off += n;
            }
            Ok((Temporal::SequenceSet(TSequenceSet::new(sequences)?), off))
        }
        other => Err(Error::Internal(format!("unknown temporal duration tag {other}"))),
    }
}

fn decode_instant<V: BaseValue>(buf: &[u8]) -> Result<(TInstant<V>, usize)> {
    let micros = read_i64(buf, 0)?;
    let (value, n) = V::decode(&buf[8..])?;
    Ok((TInstant::new(value, Timestamp::from_micros(micros)), 8 + n))
}

fn decode_sequence<V: BaseValue>(buf: &[u8], kernel: &dyn GeomKernel) -> Result<(TSequence<V>, usize)> {
    let flags = *buf.first().ok_or_else(|| Error::Internal("truncated sequence flags".into()))?;
    let lower_inc = flags & 0b01 != 0;
    let upper_inc = flags & 0b10 != 0;
    let interp = if flags & 0b100 != 0 { Interpolation::Linear } else { Interpolation::Step };
    let mut off = 1;
    let count = read_u32(buf, off)? as usize;
    off += 4;
    let mut instants = Vec::with_capacity(count);
    for _ in 0..count {
        let (i, n) = decode_instant::<V>(&buf[off..])?;
        instants.push(i);
        off += n;
    }
    let seq = TSequence::new(instants, lower_inc, upper_inc, interp, false, kernel)?;
    Ok((seq, off))
}

fn read_u32(buf: &[u8], off: usize) -> Result<u32> {
    let bytes: [u8; 4] = buf.get(off..off + 4).and_then(|s| s.try_into().ok()).ok_or_else(|| Error::Internal("truncated u32".into()))?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_i64(buf: &[u8], off: usize) -> Result<i64> {
    let bytes: [u8; 8] = buf.get(off..off + 8).and_then(|s| s.try_into().ok()).ok_or_else(|| Error::Internal("truncated i64".into()))?;
    Ok(i64::from_le_bytes(bytes))
}

/// Textual canonical form (spec §6.2): `value@timestamp` for an instant,
/// `{i1, i2, ...}` for a set, `[i1, i2, ...]`/`(i1, i2, ...)` for a
/// sequence (bracket style mirrors bound inclusivity), and
/// `{seq1, seq2, ...}` for a sequence set.
pub fn to_text<V: BaseValue>(value: &Temporal<V>) -> String {
    match value {
        Temporal::Instant(i) => instant_text(i),
        Temporal::InstantSet(s) => format!("{{{}}}", s.instants().iter().map(instant_text).collect::<Vec<_>>().join(", ")),
        Temporal::Sequence(s) => sequence_text(s),
        Temporal::SequenceSet(s) => format!("{{{}}}", s.sequences().iter().map(sequence_text).collect::<Vec<_>>().join(", ")),
    }
}

fn instant_text<V: BaseValue>(i: &TInstant<V>) -> String {
    format!("{}@{}", i.value().to_text(), i.timestamp())
}

fn sequence_text<V: BaseValue>(s: &TSequence<V>) -> String {
    let period = s.period();
    let open = if period.is_lower_inclusive() { "[" } else { "(" };
    let close = if period.is_upper_inclusive() { "]" } else { ")" };
    let body = s.instants().iter().map(instant_text).collect::<Vec<_>>().join(", ");
    format!("{open}{body}{close}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PlanarKernel;

    fn ts(v: i64) -> Timestamp {
        Timestamp::from_micros(v)
    }

    #[test]
    fn round_trips_a_linear_sequence() {
        let k = PlanarKernel;
        let seq = TSequence::new(vec![TInstant::new(1.0f64, ts(0)), TInstant::new(2.0f64, ts(10))], true, false, Interpolation::Linear, false, &k)
            .unwrap();
        let original = Temporal::Sequence(seq);
        let mut buf = Vec::new();
        encode(&original, &mut buf);
        let (decoded, n): (Temporal<f64>, usize) = decode(&buf, &k).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(decoded, original);
    }

    #[test]
    fn textual_form_brackets_match_bound_inclusivity() {
        let k = PlanarKernel;
        let seq = TSequence::new(vec![TInstant::new(1i32, ts(0)), TInstant::new(1i32, ts(10))], true, false, Interpolation::Step, false, &k)
            .unwrap();
        let text = to_text(&Temporal::Sequence(seq));
        assert!(text.starts_with('['));
        assert!(text.ends_with(')'));
    }

    #[test]
    fn header_carries_base_type_and_srid_for_points() {
        use crate::value::point::GeomPoint;

        let k = PlanarKernel;
        let original = Temporal::Instant(TInstant::new(GeomPoint::xy(1.0, 2.0, 4326), ts(0)));
        let mut buf = Vec::new();
        encode(&original, &mut buf);
        assert_eq!(buf[1], base_kind_tag(BaseKind::Geometry));
        assert_eq!(buf[2] & FLAG_GEODETIC, 0);
        let srid = i32::from_le_bytes(buf[3..7].try_into().unwrap());
        assert_eq!(srid, 4326);

        let (decoded, n): (Temporal<GeomPoint>, usize) = decode(&buf, &k).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_rejects_mismatched_base_type_tag() {
        let k = PlanarKernel;
        let seq = TSequence::new(vec![TInstant::new(1i32, ts(0)), TInstant::new(2i32, ts(10))], true, true, Interpolation::Step, false, &k)
            .unwrap();
        let mut buf = Vec::new();
        encode(&Temporal::Sequence(seq), &mut buf);
        buf[1] = base_kind_tag(BaseKind::Float64);
        let result: Result<(Temporal<i32>, usize)> = decode(&buf, &k);
        assert!(result.is_err());
    }
}
