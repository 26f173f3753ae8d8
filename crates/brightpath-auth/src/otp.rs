//! One-time passcode generation.

use rand::Rng;

/// Number of digits in a verification code.
pub const OTP_DIGITS: usize = 6;

/// Generates a random zero-padded 6-digit code.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}
