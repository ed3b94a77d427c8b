//! Decryption of the play URLs returned for paid tracks.

use aes::Aes128;
use aes::cipher::{BlockDecryptMut, KeyInit, block_padding::Pkcs7};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::ApiError;

type Aes128EcbDec = ecb::Decryptor<Aes128>;

const PLAY_URL_KEY: [u8; 16] = [
    0xaa, 0xad, 0x3e, 0x4f, 0xd5, 0x40, 0xb0, 0xf7, 0x9d, 0xca, 0x95, 0x60, 0x6e, 0x72, 0xbf, 0x93,
];

/// Decrypt an encrypted play URL.
///
/// Input is base64 in either alphabet, with or without padding.
pub fn decrypt_play_url(encrypted: &str) -> Result<String, ApiError> {
    let normalized: String = encrypted
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    let mut buf = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| ApiError::Decrypt(format!("invalid base64: {e}")))?;

    let plain = Aes128EcbDec::new(&PLAY_URL_KEY.into())
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| ApiError::Decrypt("invalid padding".to_string()))?;

    String::from_utf8(plain.to_vec())
        .map_err(|e| ApiError::Decrypt(format!("play url is not utf-8: {e}")))
}
