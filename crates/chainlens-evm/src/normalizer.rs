//! Converts alloy-core `DynSolValue` → ChainLens `NormalizedValue`.

use alloy_core::dyn_abi::DynSolValue;
use chainlens_core::types::NormalizedValue;

/// Convert a decoded `DynSolValue` into a `NormalizedValue`.
///
/// Integers that fit in 128 bits stay numeric whatever their declared width;
/// anything larger becomes a decimal string.
pub fn normalize(val: DynSolValue) -> NormalizedValue {
    match val {
        DynSolValue::Bool(b) => NormalizedValue::Bool(b),

        DynSolValue::Int(i, _bits) => match i128::try_from(i) {
            Ok(v) => NormalizedValue::Int(v),
            Err(_) => NormalizedValue::BigInt(i.to_string()),
        },

        DynSolValue::Uint(u, _bits) => match u128::try_from(u) {
            Ok(v) => NormalizedValue::Uint(v),
            Err(_) => NormalizedValue::BigUint(u.to_string()),
        },

        DynSolValue::FixedBytes(word, size) => NormalizedValue::Bytes(word[..size].to_vec()),

        DynSolValue::Bytes(b) => NormalizedValue::Bytes(b),

        DynSolValue::String(s) => NormalizedValue::Str(s),

        // lowercase 0x-prefixed hex, matching how indexers report addresses
        DynSolValue::Address(a) => NormalizedValue::Address(format!("{a:#x}")),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            NormalizedValue::Array(vals.into_iter().map(normalize).collect())
        }

        DynSolValue::Tuple(fields) => {
            // Unnamed tuple fields get positional names "0", "1", ...
            let named: Vec<(String, NormalizedValue)> = fields
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), normalize(v)))
                .collect();
            NormalizedValue::Tuple(named)
        }

        DynSolValue::Function(f) => NormalizedValue::Bytes(f.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, I256, U256};

    #[test]
    fn normalize_bool() {
        assert_eq!(normalize(DynSolValue::Bool(true)), NormalizedValue::Bool(true));
    }

    #[test]
    fn normalize_uint256_small() {
        let v = normalize(DynSolValue::Uint(U256::from(42u64), 256));
        assert_eq!(v, NormalizedValue::Uint(42));
    }

    #[test]
    fn normalize_uint256_large() {
        let v = normalize(DynSolValue::Uint(U256::MAX, 256));
        assert_eq!(
            v,
            NormalizedValue::BigUint(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935".into()
            )
        );
    }

    #[test]
    fn normalize_negative_int() {
        let v = normalize(DynSolValue::Int(I256::try_from(-5i64).unwrap(), 24));
        assert_eq!(v, NormalizedValue::Int(-5));
    }

    #[test]
    fn normalize_fixed_bytes_keeps_declared_width() {
        let mut word = B256::ZERO;
        word[0] = 0xab;
        word[1] = 0xcd;
        let v = normalize(DynSolValue::FixedBytes(word, 2));
        assert_eq!(v, NormalizedValue::Bytes(vec![0xab, 0xcd]));
    }

    #[test]
    fn normalize_address_is_lowercase() {
        let addr: Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        let v = normalize(DynSolValue::Address(addr));
        assert_eq!(v.as_address(), Some("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"));
    }
}
