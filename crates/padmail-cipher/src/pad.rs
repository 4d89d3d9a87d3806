//! The pad transform: key normalization, XOR combination, base64 framing.

use std::borrow::Cow;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::{RngCore, rngs::OsRng};

use crate::error::CipherError;

/// Adjust a key to exactly `target_len` bytes.
///
/// - Equal length: the key is returned unchanged (borrowed, no copy).
/// - Longer: truncated to the first `target_len` bytes.
/// - Shorter: extended by cyclic repetition, `out[i] = key[i % key.len()]`.
///
/// An empty key cannot be extended; against a non-zero `target_len` it yields
/// an empty slice, which [`encrypt`] and [`decrypt`] reject up front as
/// [`CipherError::EmptyKey`].
///
/// Truncation and repetition both reuse pad material and are kept only for
/// byte-level compatibility with existing key files.
pub fn normalize_key(key: &[u8], target_len: usize) -> Cow<'_, [u8]> {
    if key.len() == target_len {
        return Cow::Borrowed(key);
    }

    if key.len() > target_len {
        return Cow::Borrowed(&key[..target_len]);
    }

    Cow::Owned(key.iter().copied().cycle().take(target_len).collect())
}

/// Encrypt UTF-8 text with a key, producing unwrapped standard base64.
///
/// The key is normalized to the plaintext's byte length before the XOR, so
/// the decoded ciphertext always has exactly the plaintext's length.
///
/// # Errors
///
/// [`CipherError::EmptyKey`] when `key` is empty and `plaintext` is not.
pub fn encrypt(plaintext: &str, key: &[u8]) -> Result<String, CipherError> {
    let plain = plaintext.as_bytes();
    if key.is_empty() && !plain.is_empty() {
        return Err(CipherError::EmptyKey);
    }

    let key = normalize_key(key, plain.len());
    Ok(BASE64.encode(xor(plain, &key)))
}

/// Decrypt base64 ciphertext with a key, recovering UTF-8 text.
///
/// The key is normalized to the *decoded* ciphertext length, mirroring
/// [`encrypt`]; an oversized stored key therefore decrypts a shorter message
/// correctly because both sides truncate identically.
///
/// # Errors
///
/// - [`CipherError::Base64`] on malformed base64
/// - [`CipherError::EmptyKey`] when `key` is empty and the ciphertext is not
/// - [`CipherError::Utf8`] when the XOR output is not UTF-8 (wrong key)
pub fn decrypt(ciphertext_b64: &str, key: &[u8]) -> Result<String, CipherError> {
    let cipher = BASE64.decode(ciphertext_b64)?;
    if key.is_empty() && !cipher.is_empty() {
        return Err(CipherError::EmptyKey);
    }

    let key = normalize_key(key, cipher.len());
    Ok(String::from_utf8(xor(&cipher, &key))?)
}

/// Generate `len` bytes from the OS CSPRNG.
///
/// No length validation: callers own the choice, and `len == 0` yields an
/// empty key that round-trips only the empty message.
pub fn generate_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    OsRng.fill_bytes(&mut key);
    key
}

/// Byte-wise XOR of two equal-length slices.
fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    debug_assert_eq!(data.len(), key.len());
    data.iter().zip(key).map(|(d, k)| d ^ k).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn normalize_equal_length_borrows_unchanged() {
        let key = [1u8, 2, 3, 4];
        let normalized = normalize_key(&key, 4);

        assert!(matches!(normalized, Cow::Borrowed(_)));
        assert_eq!(normalized.as_ref(), &key);
    }

    #[test]
    fn normalize_truncates_to_prefix() {
        let key = [9u8, 8, 7, 6, 5, 4, 3, 2, 1, 0];
        assert_eq!(normalize_key(&key, 4).as_ref(), &[9, 8, 7, 6]);
    }

    #[test]
    fn normalize_extends_cyclically() {
        let key = [0xAA, 0xBB, 0xCC];
        let extended = normalize_key(&key, 8);

        for (i, byte) in extended.iter().enumerate() {
            assert_eq!(*byte, key[i % key.len()]);
        }
        assert_eq!(extended.len(), 8);
    }

    #[test]
    fn normalize_to_zero_is_empty() {
        assert!(normalize_key(&[1, 2, 3], 0).is_empty());
    }

    #[test]
    fn encrypt_rejects_empty_key() {
        assert_eq!(encrypt("hello", &[]), Err(CipherError::EmptyKey));
    }

    #[test]
    fn decrypt_rejects_empty_key() {
        assert_eq!(decrypt("aGVsbG8=", &[]), Err(CipherError::EmptyKey));
    }

    #[test]
    fn empty_message_round_trips_with_empty_key() {
        let ciphertext = encrypt("", &[]).unwrap();
        assert_eq!(decrypt(&ciphertext, &[]).unwrap(), "");
    }

    #[test]
    fn decrypt_rejects_malformed_base64() {
        let result = decrypt("not!!base64@@", &[1, 2, 3]);
        assert!(matches!(result, Err(CipherError::Base64(_))));
    }

    #[test]
    fn ciphertext_decodes_to_plaintext_length() {
        let key = generate_key(5);
        let ciphertext = encrypt("HELLO", &key).unwrap();

        let decoded = BASE64.decode(&ciphertext).unwrap();
        assert_eq!(decoded.len(), 5);
    }

    #[test]
    fn oversized_key_decrypts_consistently() {
        // Both sides truncate to the data length, so a 10-byte stored key
        // must recover a 4-byte message.
        let key = generate_key(10);
        let ciphertext = encrypt("1234", &key).unwrap();

        assert_eq!(decrypt(&ciphertext, &key).unwrap(), "1234");
    }

    #[test]
    fn short_key_encrypts_via_repetition() {
        let key = [0x42u8];
        let ciphertext = encrypt("abcd", &key).unwrap();

        let decoded = BASE64.decode(&ciphertext).unwrap();
        assert_eq!(decoded, vec![b'a' ^ 0x42, b'b' ^ 0x42, b'c' ^ 0x42, b'd' ^ 0x42]);
        assert_eq!(decrypt(&ciphertext, &key).unwrap(), "abcd");
    }

    #[test]
    fn wrong_key_fails_or_garbles() {
        let key = generate_key(32);
        let other = generate_key(32);
        let ciphertext = encrypt("attack at dawn, bring the big keys", &key).unwrap();

        match decrypt(&ciphertext, &other) {
            Ok(text) => assert_ne!(text, "attack at dawn, bring the big keys"),
            Err(CipherError::Utf8(_)) => {},
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn generated_keys_are_distinct() {
        // Statistical distinctness: 32 random bytes colliding means a broken
        // RNG, not bad luck.
        let a = generate_key(32);
        let b = generate_key(32);

        assert_eq!(a.len(), 32);
        assert_eq!(b.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn generate_zero_length_key_is_empty() {
        assert!(generate_key(0).is_empty());
    }

    proptest! {
        #[test]
        fn round_trip_any_text_any_key(
            plaintext in ".{0,256}",
            key in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let ciphertext = encrypt(&plaintext, &key).unwrap();
            prop_assert_eq!(decrypt(&ciphertext, &key).unwrap(), plaintext);
        }

        #[test]
        fn normalize_never_changes_prefix(
            key in proptest::collection::vec(any::<u8>(), 1..64),
            target in 0usize..128,
        ) {
            let normalized = normalize_key(&key, target);
            prop_assert_eq!(normalized.len(), target);

            let common = target.min(key.len());
            prop_assert_eq!(&normalized[..common], &key[..common]);
        }
    }
}
