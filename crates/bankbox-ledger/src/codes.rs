//! Room-code generation.

use bankbox_protocol::RoomCode;
use rand::Rng;

/// Codes are four characters drawn from this alphabet.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub(crate) const CODE_LENGTH: usize = 4;

/// How many collisions the manager tolerates before giving up on a
/// creation request.
pub(crate) const MAX_CODE_ATTEMPTS: usize = 10;

/// Draws a random code. Uniqueness is the caller's problem — the manager
/// checks the store and rerolls on collision.
pub(crate) fn random_code() -> RoomCode {
    let mut rng = rand::rng();
    let code: String = (0..CODE_LENGTH)
        .map(|_| {
            let i = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[i] as char
        })
        .collect();
    RoomCode::new(code)
}
