//! Share token generation.
//!
//! Tokens double as the record's store key and the public identifier that
//! appears in shared URLs, so they stick to letters only: no digits or
//! punctuation that get mangled when pasted into chat clients.

use rand::Rng;

/// Alphabet for generated tokens: upper and lower case ASCII letters.
pub const TOKEN_ALPHABET: &[u8; 52] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default token length for share URLs.
pub const DEFAULT_TOKEN_LENGTH: usize = 6;

/// Generate a random token of exactly `length` characters drawn uniformly
/// from [`TOKEN_ALPHABET`].
///
/// Tokens are collision-resistant but not globally unique; callers that use
/// them as store keys must treat an insert conflict as a retryable
/// condition and regenerate.
pub fn generate(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
