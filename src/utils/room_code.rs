use rand::Rng;

/// Number of digits in a room code.
pub const ROOM_CODE_LENGTH: usize = 6;

/// Generate a random 6-digit room code (not yet checked for uniqueness).
///
/// Codes never start with `0` so they stay readable when typed as a number.
pub fn random_room_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..1_000_000_u32).to_string()
}

/// Validate room code format: exactly six ASCII digits.
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize a room code typed by a user (surrounding whitespace removed).
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_string()
}
