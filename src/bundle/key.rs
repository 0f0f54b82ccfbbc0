//! Symmetric key acquisition.
//!
//! The bundle is sealed with a 32-byte AES-256-GCM key. Precedence: a
//! caller-supplied key, then `SOSUMI_ENCRYPTION_KEY` from the process
//! environment (hex or base64, auto-detected), then a build-time embedded
//! constant. The key material never appears in logs or error values.

use crate::error::BundleError;
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

/// Environment variable holding the bundle decryption key.
pub const KEY_ENV_VAR: &str = "SOSUMI_ENCRYPTION_KEY";

/// Required key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// Key baked in at build time; absent in developer builds.
const EMBEDDED_KEY: Option<&str> = option_env!("SOSUMI_EMBEDDED_KEY");

/// Obtains the 32-byte bundle key.
///
/// # Errors
///
/// [`BundleError::KeyInvalid`] if any source yields material that is not
/// exactly 32 bytes, [`BundleError::KeyAbsent`] if no source is available.
pub fn obtain(explicit: Option<&[u8]>) -> Result<[u8; KEY_LENGTH], BundleError> {
    let env_value = std::env::var(KEY_ENV_VAR).ok();
    obtain_from(explicit, env_value.as_deref(), EMBEDDED_KEY)
}

/// Key acquisition with injected sources, for tests.
pub(crate) fn obtain_from(
    explicit: Option<&[u8]>,
    env_value: Option<&str>,
    embedded: Option<&str>,
) -> Result<[u8; KEY_LENGTH], BundleError> {
    if let Some(bytes) = explicit {
        return to_fixed(bytes.to_vec());
    }
    if let Some(material) = env_value {
        return decode_material(material);
    }
    if let Some(material) = embedded {
        return decode_material(material);
    }
    Err(BundleError::KeyAbsent)
}

/// Decodes textual key material, auto-detecting hex vs base64.
///
/// 64 characters drawn from the hex alphabet decode as hex; anything else is
/// tried as standard base64 (padded, then unpadded).
fn decode_material(material: &str) -> Result<[u8; KEY_LENGTH], BundleError> {
    let material = material.trim();

    if material.len() == KEY_LENGTH * 2 && material.bytes().all(|b| b.is_ascii_hexdigit()) {
        let bytes = hex::decode(material).map_err(|_| BundleError::KeyInvalid {
            length: material.len(),
        })?;
        return to_fixed(bytes);
    }

    let decoded = STANDARD
        .decode(material)
        .or_else(|_| STANDARD_NO_PAD.decode(material))
        .map_err(|_| BundleError::KeyInvalid {
            length: material.len(),
        })?;
    to_fixed(decoded)
}

fn to_fixed(bytes: Vec<u8>) -> Result<[u8; KEY_LENGTH], BundleError> {
    let length = bytes.len();
    bytes
        .try_into()
        .map_err(|_| BundleError::KeyInvalid { length })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    const KEY: [u8; KEY_LENGTH] = [0x42; KEY_LENGTH];

    #[test]
    fn test_explicit_key_wins_over_env() {
        let env_hex = hex::encode([0x01; KEY_LENGTH]);
        let key =
            obtain_from(Some(&KEY), Some(&env_hex), None).expect("explicit key should be used");
        assert_eq!(key, KEY);
    }

    #[test]
    fn test_explicit_key_wrong_length() {
        let err = obtain_from(Some(&[0u8; 31]), None, None).expect_err("31 bytes must fail");
        assert!(matches!(err, BundleError::KeyInvalid { length: 31 }));

        let err = obtain_from(Some(&[0u8; 33]), None, None).expect_err("33 bytes must fail");
        assert!(matches!(err, BundleError::KeyInvalid { length: 33 }));
    }

    #[test]
    fn test_hex_env_key() {
        let material = hex::encode(KEY);
        let key = obtain_from(None, Some(&material), None).expect("hex key should decode");
        assert_eq!(key, KEY);
    }

    #[test]
    fn test_uppercase_hex_env_key() {
        let material = hex::encode(KEY).to_uppercase();
        let key = obtain_from(None, Some(&material), None).expect("hex key should decode");
        assert_eq!(key, KEY);
    }

    #[test]
    fn test_base64_env_key() {
        let material = STANDARD.encode(KEY);
        let key = obtain_from(None, Some(&material), None).expect("base64 key should decode");
        assert_eq!(key, KEY);
    }

    #[test]
    fn test_base64_unpadded_env_key() {
        let material = STANDARD_NO_PAD.encode(KEY);
        let key = obtain_from(None, Some(&material), None).expect("base64 key should decode");
        assert_eq!(key, KEY);
    }

    #[test]
    fn test_env_key_surrounding_whitespace() {
        let material = format!("  {}\n", STANDARD.encode(KEY));
        let key = obtain_from(None, Some(&material), None).expect("trimmed key should decode");
        assert_eq!(key, KEY);
    }

    #[test]
    fn test_env_key_wrong_decoded_length() {
        let material = STANDARD.encode([0u8; 16]);
        let err = obtain_from(None, Some(&material), None).expect_err("16 bytes must fail");
        assert!(matches!(err, BundleError::KeyInvalid { length: 16 }));
    }

    #[test]
    fn test_env_key_garbage() {
        let err = obtain_from(None, Some("!!not-a-key!!"), None).expect_err("garbage must fail");
        assert!(matches!(err, BundleError::KeyInvalid { .. }));
    }

    #[test]
    fn test_embedded_fallback() {
        let material = hex::encode(KEY);
        let key = obtain_from(None, None, Some(&material)).expect("embedded key should be used");
        assert_eq!(key, KEY);
    }

    #[test]
    fn test_no_source_is_absent() {
        let err = obtain_from(None, None, None).expect_err("no source must fail");
        assert!(matches!(err, BundleError::KeyAbsent));
    }

    #[test]
    fn test_error_messages_never_contain_material() {
        let material = hex::encode(KEY);
        let truncated = &material[..62];
        let err = obtain_from(None, Some(truncated), None).expect_err("must fail");
        assert!(!err.to_string().contains(truncated));
    }
}
