// utils/secret_key.rs
use rand::Rng;

pub const SECRET_KEY_LENGTH: usize = 16;

// Lowercase alphanumerics minus the visually ambiguous 0, 1, i, l, o.
const CHARSET: &[u8] = b"23456789abcdefghjkmnpqrstuvwxyz";

/// Generate the 16-character secret key paired with a ticket number for
/// unauthenticated lookup. The 31^16 keyspace makes collisions negligible;
/// uniqueness is not enforced by the store.
pub fn generate_secret_key() -> String {
    let mut rng = rand::rng();
    (0..SECRET_KEY_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_is_16_lowercase_alphanumeric_chars() {
        for _ in 0..50 {
            let key = generate_secret_key();
            assert_eq!(key.len(), SECRET_KEY_LENGTH);
            assert!(key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn secret_key_avoids_ambiguous_characters() {
        for _ in 0..50 {
            let key = generate_secret_key();
            assert!(!key.contains(['0', '1', 'i', 'l', 'o']));
        }
    }

    #[test]
    fn consecutive_keys_differ() {
        // Not a uniqueness proof, just a sanity check that the generator
        // is not degenerate.
        let a = generate_secret_key();
        let b = generate_secret_key();
        assert_ne!(a, b);
    }
}
