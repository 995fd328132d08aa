//! `EvmLogDecoder`: the `LogDecoder` implementation for EVM event logs.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use chainlens_core::{
    decoder::{decode_or_mark, LogDecoder},
    error::DecodeError,
    log::{DecodedLog, EventMatch, LogRecord},
    schema::{EventSignature, FieldDef, SignatureRegistry},
    types::{CanonicalType, NormalizedValue},
};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::normalizer;

/// Key under which a failed `data` decode is recorded in `decode_errors`.
pub const DATA_ERROR_KEY: &str = "__data__";

/// The EVM log decoder.
/// Thread-safe, cheap to clone (no heap state).
#[derive(Debug, Default, Clone)]
pub struct EvmLogDecoder;

impl EvmLogDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Build alloy `DynSolType` from a `CanonicalType`.
    fn canonical_to_dyn(ty: &CanonicalType) -> Result<DynSolType, DecodeError> {
        match ty {
            CanonicalType::Uint(bits) => Ok(DynSolType::Uint(*bits as usize)),
            CanonicalType::Int(bits) => Ok(DynSolType::Int(*bits as usize)),
            CanonicalType::Bool => Ok(DynSolType::Bool),
            CanonicalType::Bytes(n) => Ok(DynSolType::FixedBytes(*n as usize)),
            CanonicalType::BytesVec => Ok(DynSolType::Bytes),
            CanonicalType::Str => Ok(DynSolType::String),
            CanonicalType::Address => Ok(DynSolType::Address),
            CanonicalType::Array { elem, len } => {
                let len = usize::try_from(*len)
                    .map_err(|_| DecodeError::UnsupportedType { ty: ty.to_string() })?;
                let inner = Self::canonical_to_dyn(elem)?;
                Ok(DynSolType::FixedArray(Box::new(inner), len))
            }
            CanonicalType::Vec(elem) => {
                let inner = Self::canonical_to_dyn(elem)?;
                Ok(DynSolType::Array(Box::new(inner)))
            }
            CanonicalType::Tuple(fields) => {
                let types: Result<Vec<DynSolType>, _> =
                    fields.iter().map(|(_, t)| Self::canonical_to_dyn(t)).collect();
                Ok(DynSolType::Tuple(types?))
            }
        }
    }

    /// Decode the log data (non-indexed params) as an ABI parameter sequence.
    fn decode_data(
        &self,
        raw_data: &[u8],
        data_fields: &[(&str, &FieldDef)],
    ) -> Result<HashMap<String, NormalizedValue>, DecodeError> {
        if data_fields.is_empty() {
            return Ok(HashMap::new());
        }

        let tuple_types: Result<Vec<DynSolType>, _> = data_fields
            .iter()
            .map(|(_, f)| Self::canonical_to_dyn(&f.ty))
            .collect();

        let decoded = DynSolType::Tuple(tuple_types?)
            .abi_decode_params(raw_data)
            .map_err(|e| DecodeError::AbiDecodeFailed { reason: e.to_string() })?;

        let values = match decoded {
            DynSolValue::Tuple(vals) => vals,
            other => vec![other],
        };

        Ok(data_fields
            .iter()
            .zip(values)
            .map(|((name, _), val)| (name.to_string(), normalizer::normalize(val)))
            .collect())
    }

    /// Decode a single indexed topic (always one 32-byte word).
    ///
    /// Value types are padded into the word and decode normally. Reference
    /// types (string, bytes, arrays, tuples) are stored as the keccak256 of
    /// their encoding, so the raw word is returned as `Bytes`.
    fn decode_topic(
        &self,
        index: usize,
        topic_hex: &str,
        ty: &CanonicalType,
    ) -> Result<NormalizedValue, DecodeError> {
        let hex = topic_hex.strip_prefix("0x").unwrap_or(topic_hex);
        let bytes = hex::decode(hex).map_err(|e| DecodeError::InvalidTopic {
            index,
            reason: format!("invalid hex: {e}"),
        })?;
        if bytes.len() != 32 {
            return Err(DecodeError::InvalidTopic {
                index,
                reason: format!("expected 32 bytes, got {}", bytes.len()),
            });
        }

        if ty.is_reference() {
            return Ok(NormalizedValue::Bytes(bytes));
        }

        let dyn_type = Self::canonical_to_dyn(ty)?;
        dyn_type
            .abi_decode(&bytes)
            .map(normalizer::normalize)
            .map_err(|e| DecodeError::AbiDecodeFailed { reason: format!("topic decode: {e}") })
    }
}

impl LogDecoder for EvmLogDecoder {
    fn decode_log(
        &self,
        log: &LogRecord,
        signature: &EventSignature,
    ) -> Result<DecodedLog, DecodeError> {
        let mut decode_errors: HashMap<String, String> = HashMap::new();

        let mut data_values = match self.decode_data(&log.data, &signature.data_fields()) {
            Ok(values) => values,
            Err(e) => {
                // Record and keep going: indexed params may still decode
                decode_errors.insert(DATA_ERROR_KEY.into(), e.to_string());
                HashMap::new()
            }
        };

        // Walk the declaration order so `params` reads like the signature
        let mut params = IndexMap::with_capacity(signature.fields.len());
        let mut topic_idx = 1; // topics[0] is the selector
        for (name, field) in &signature.fields {
            if field.indexed {
                let topic = log
                    .topics
                    .get(topic_idx)
                    .ok_or_else(|| DecodeError::MissingField { field: name.clone() })?;
                match self.decode_topic(topic_idx, topic, &field.ty) {
                    Ok(val) => {
                        params.insert(name.clone(), val);
                    }
                    Err(e) => {
                        decode_errors.insert(name.clone(), e.to_string());
                    }
                }
                topic_idx += 1;
            } else if let Some(val) = data_values.remove(name) {
                params.insert(name.clone(), val);
            }
        }

        Ok(DecodedLog {
            log: log.clone(),
            event: EventMatch::Recognized {
                name: signature.name.clone(),
                signature: signature.canonical(),
                params,
                decode_errors,
            },
        })
    }

    /// Override the sequential default with a Rayon parallel decode.
    /// `collect` on an indexed parallel iterator keeps input order.
    fn decode_logs(&self, logs: &[LogRecord], registry: &dyn SignatureRegistry) -> Vec<DecodedLog> {
        logs.par_iter()
            .map(|log| decode_or_mark(self, log, registry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use chainlens_registry::{MemoryRegistry, SignatureParser};

    const TRANSFER: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    fn registry() -> MemoryRegistry {
        let reg = MemoryRegistry::new();
        for line in [
            "event Transfer(address indexed from, address indexed to, uint256 value)",
            "event Transfer(address indexed from, address indexed to, uint256 indexed tokenId)",
        ] {
            reg.insert(SignatureParser::parse_event(line).unwrap()).unwrap();
        }
        reg
    }

    fn word(value: u64) -> Vec<u8> {
        let mut d = vec![0u8; 32];
        d[24..].copy_from_slice(&value.to_be_bytes());
        d
    }

    fn erc20_transfer() -> LogRecord {
        LogRecord {
            transaction_hash: "0xabc".into(),
            address: "0xb97ef9ef8734c71904d8002f8b6bc66dd9c48a6e".into(),
            topics: vec![
                TRANSFER.into(),
                "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045".into(),
                "0x000000000000000000000000ab5801a7d398351b8be11c439e05c5b3259aec9b".into(),
            ],
            data: Bytes::from(word(1_000_000)),
            log_index: 0,
        }
    }

    #[test]
    fn decodes_erc20_transfer_in_declaration_order() {
        let reg = registry();
        let out = EvmLogDecoder::new().decode_logs(&[erc20_transfer()], &reg);
        let log = &out[0];
        assert!(!log.has_errors());
        match &log.event {
            EventMatch::Recognized { signature, params, .. } => {
                assert_eq!(signature, "Transfer(address,address,uint256)");
                let keys: Vec<&str> = params.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["from", "to", "value"]);
            }
            EventMatch::Unrecognized => panic!("expected a recognized event"),
        }
        assert_eq!(log.param("value"), Some(&NormalizedValue::Uint(1_000_000)));
        assert_eq!(
            log.param("from").and_then(NormalizedValue::as_address),
            Some("0xd8da6bf26964af9d7eed9e03e53415d37aa96045")
        );
    }

    #[test]
    fn topic_count_selects_erc721_variant() {
        let mut log = erc20_transfer();
        log.topics.push(format!("0x{}", hex::encode(word(7))));
        log.data = Bytes::new();
        let out = EvmLogDecoder::new().decode_logs(&[log], &registry());
        assert_eq!(out[0].param("tokenId"), Some(&NormalizedValue::Uint(7)));
        assert!(out[0].param("value").is_none());
    }

    #[test]
    fn unknown_selector_is_unrecognized() {
        let mut log = erc20_transfer();
        log.topics[0] = format!("0x{}", "11".repeat(32));
        let out = EvmLogDecoder::new().decode_logs(&[log.clone()], &registry());
        assert_eq!(out[0], DecodedLog::unrecognized(log));
    }

    #[test]
    fn log_without_topics_is_unrecognized() {
        let mut log = erc20_transfer();
        log.topics.clear();
        let out = EvmLogDecoder::new().decode_logs(&[log], &registry());
        assert!(!out[0].is_recognized());
    }

    #[test]
    fn bad_data_is_recorded_not_fatal() {
        let mut log = erc20_transfer();
        log.data = Bytes::from(vec![0x01, 0x02]);
        let out = EvmLogDecoder::new().decode_logs(&[log], &registry());
        assert!(out[0].is_recognized());
        assert!(out[0].has_errors());
        assert!(out[0].param("from").is_some());
    }

    #[test]
    fn missing_indexed_topic_marks_whole_event() {
        let mut log = erc20_transfer();
        log.topics.truncate(1);
        let out = EvmLogDecoder::new().decode_logs(&[log.clone()], &registry());
        assert_eq!(out[0].log, log);
        match &out[0].event {
            EventMatch::Recognized { name, params, decode_errors, .. } => {
                assert_eq!(name, "Transfer");
                assert!(params.is_empty());
                let err = &decode_errors[chainlens_core::decoder::EVENT_ERROR_KEY];
                assert!(err.contains("from"), "{err}");
                assert_eq!(decode_errors.len(), 1);
            }
            EventMatch::Unrecognized => panic!("expected a recognized event"),
        }
    }

    #[test]
    fn parallel_decode_keeps_order() {
        let logs: Vec<LogRecord> = (0..64u64)
            .map(|i| {
                let mut log = erc20_transfer();
                log.log_index = i;
                log.data = Bytes::from(word(i));
                log
            })
            .collect();
        let out = EvmLogDecoder::new().decode_logs(&logs, &registry());
        for (i, log) in out.iter().enumerate() {
            assert_eq!(log.log.log_index, i as u64);
            assert_eq!(log.param("value"), Some(&NormalizedValue::Uint(i as u128)));
        }
    }
}
