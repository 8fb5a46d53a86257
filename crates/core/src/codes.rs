use rand::Rng;

/// Code alphabet without the look-alikes I/1/O/0.
pub const CODE_CHARS: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const GAME_CODE_LEN: usize = 6;
pub const CARD_SEED_LEN: usize = 4;

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let alphabet = CODE_CHARS.as_bytes();
    (0..len)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}

pub fn generate_game_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    generate_code(rng, GAME_CODE_LEN)
}

pub fn generate_card_seed<R: Rng + ?Sized>(rng: &mut R) -> String {
    generate_code(rng, CARD_SEED_LEN)
}

/// Canonical form used for storage and comparison.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn is_valid_code(code: &str, len: usize) -> bool {
    code.chars().count() == len && code.chars().all(|ch| CODE_CHARS.contains(ch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_codes_use_alphabet_and_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let game = generate_game_code(&mut rng);
            let seed = generate_card_seed(&mut rng);
            assert!(is_valid_code(&game, GAME_CODE_LEN), "{game}");
            assert!(is_valid_code(&seed, CARD_SEED_LEN), "{seed}");
        }
    }

    #[test]
    fn alphabet_has_no_ambiguous_characters() {
        assert_eq!(CODE_CHARS.len(), 32);
        for ambiguous in ['I', '1', 'O', '0'] {
            assert!(!CODE_CHARS.contains(ambiguous));
        }
    }

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(normalize_code("  abcdef "), "ABCDEF");
        assert!(is_valid_code(&normalize_code("xy23"), CARD_SEED_LEN));
        assert!(!is_valid_code("XY10", CARD_SEED_LEN));
        assert!(!is_valid_code("XY2", CARD_SEED_LEN));
    }
}
