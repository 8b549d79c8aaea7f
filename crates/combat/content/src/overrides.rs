//! Binary codec for party-member profile overrides.
//!
//! Records are written back to back, each field a big-endian 32-bit integer
//! in [`ProfileOverride`] field order. The record count is implied by the
//! party roster, so the stream carries no header.

use std::io::Read;

use bincode::Options;
use combat_core::{ErrorSeverity, GameError, ProfileOverride};

#[derive(Debug, thiserror::Error)]
pub enum OverrideCodecError {
    #[error("failed to encode override for packet {packet}: {source}")]
    Encode {
        packet: i32,
        #[source]
        source: bincode::Error,
    },

    #[error("override record {index} of {expected} is unreadable: {source}")]
    Decode {
        index: usize,
        expected: usize,
        #[source]
        source: bincode::Error,
    },
}

impl GameError for OverrideCodecError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Encode { .. } => "OVERRIDE_ENCODE",
            Self::Decode { .. } => "OVERRIDE_DECODE",
        }
    }
}

/// Encoder/decoder for override records.
pub struct OverrideCodec;

impl OverrideCodec {
    /// Bytes per record.
    pub const RECORD_LEN: usize = ProfileOverride::WORDS * 4;

    fn options() -> impl Options {
        bincode::DefaultOptions::new()
            .with_big_endian()
            .with_fixint_encoding()
            .allow_trailing_bytes()
    }

    pub fn encode(records: &[ProfileOverride]) -> Result<Vec<u8>, OverrideCodecError> {
        let mut bytes = Vec::with_capacity(records.len() * Self::RECORD_LEN);
        for record in records {
            Self::options()
                .serialize_into(&mut bytes, record)
                .map_err(|source| OverrideCodecError::Encode {
                    packet: record.packet_num,
                    source,
                })?;
        }
        Ok(bytes)
    }

    /// Reads exactly `count` records from the front of `reader`.
    pub fn decode_from<R: Read>(
        mut reader: R,
        count: usize,
    ) -> Result<Vec<ProfileOverride>, OverrideCodecError> {
        (0..count)
            .map(|index| {
                Self::options()
                    .deserialize_from(&mut reader)
                    .map_err(|source| OverrideCodecError::Decode {
                        index,
                        expected: count,
                        source,
                    })
            })
            .collect()
    }

    pub fn decode(bytes: &[u8], count: usize) -> Result<Vec<ProfileOverride>, OverrideCodecError> {
        Self::decode_from(bytes, count)
    }
}

#[cfg(test)]
mod tests {
    use combat_core::{
        AttackWho, BehaviorProfile, DamageFlags, MessageRange, ProfileId, ProtoId,
    };

    use super::*;

    fn companion(id: i32) -> ProfileOverride {
        let mut profile = BehaviorProfile::new("Companion", ProfileId(id));
        profile.max_dist = 12;
        profile.min_to_hit = 35;
        profile.min_hp = 18;
        profile.hurt_too_much = DamageFlags::BLIND;
        profile.attack_who = Some(AttackWho::Strongest);
        profile.taunts.hit[0] = MessageRange::new(900, 905);
        profile.chem_primary_desire.push(ProtoId(144));
        ProfileOverride::from(&profile)
    }

    #[test]
    fn record_is_one_big_endian_word_per_field() {
        let bytes = OverrideCodec::encode(&[companion(1600)]).unwrap();
        assert_eq!(bytes.len(), OverrideCodec::RECORD_LEN);
        assert_eq!(&bytes[0..4], &1600_i32.to_be_bytes());
        assert_eq!(&bytes[4..8], &12_i32.to_be_bytes());
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let records = vec![companion(1600), companion(1605)];
        let bytes = OverrideCodec::encode(&records).unwrap();
        let decoded = OverrideCodec::decode(&bytes, 2).unwrap();
        assert_eq!(decoded, records);
        assert_eq!(OverrideCodec::encode(&decoded).unwrap(), bytes);
    }

    #[test]
    fn truncated_stream_reports_record_index() {
        let bytes = OverrideCodec::encode(&[companion(1600)]).unwrap();
        let error = OverrideCodec::decode(&bytes[..bytes.len() - 4], 1).unwrap_err();
        assert!(matches!(error, OverrideCodecError::Decode { index: 0, .. }));
        assert_eq!(error.severity(), ErrorSeverity::Fatal);
    }
}
