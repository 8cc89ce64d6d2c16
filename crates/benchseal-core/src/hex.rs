//! Lowercase hex encoding shared by digests, keys and signatures.

/// Encode bytes as a lowercase hex string.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (either case) into bytes.
pub fn decode(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    if !hex.is_ascii() {
        return Err("hex string must be ASCII".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}

/// Decode a hex string into a fixed-size array.
pub fn decode_array<const N: usize>(hex: &str) -> Result<[u8; N], String> {
    let bytes = decode(hex)?;
    if bytes.len() != N {
        return Err(format!("expected {N} bytes, got {}", bytes.len()));
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// First four bytes as hex, for `Debug` output that must not dump full keys.
pub fn prefix(bytes: &[u8]) -> String {
    encode(&bytes[..bytes.len().min(4)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        assert_eq!(encode(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(decode("00ABff").unwrap(), vec![0x00, 0xab, 0xff]);
    }

    #[test]
    fn odd_length_rejected() {
        assert!(decode("abc").is_err());
    }

    #[test]
    fn non_ascii_rejected_without_panic() {
        assert!(decode("éé").is_err());
    }

    #[test]
    fn decode_array_checks_length() {
        assert!(decode_array::<2>("aabb").is_ok());
        assert!(decode_array::<3>("aabb").is_err());
    }

    #[test]
    fn prefix_is_short() {
        assert_eq!(prefix(&[1, 2, 3, 4, 5, 6]), "01020304");
        assert_eq!(prefix(&[7]), "07");
    }
}
