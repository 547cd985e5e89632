use rand::RngExt;

/// Charset for session codes (uppercase alphanumeric, QR alphanumeric-mode friendly).
const SESSION_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Charset for verification codes typed by hand.
const DIGITS: &[u8] = b"0123456789";

fn generate(charset: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

pub fn session_code(len: usize) -> String {
    generate(SESSION_CODE_CHARSET, len)
}

pub fn verification_code(len: usize) -> String {
    generate(DIGITS, len)
}
