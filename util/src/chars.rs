//! Byte classes of the SIP grammar (RFC 3261 section 25.1).

use crate::lookup_table;

/// Alphanumeric is valid in all sip message components.
pub const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Token characters besides alphanumerics.
pub const TOKEN: &[u8] = b"-.!%*_`'~+";

lookup_table!(TOKEN_TAB => ALPHANUMERIC, TOKEN);

/// `SP` or `HTAB`.
#[inline(always)]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

/// `CR` or `LF`.
#[inline(always)]
pub fn is_newline(b: u8) -> bool {
    matches!(b, b'\r' | b'\n')
}

/// ASCII decimal digit.
#[inline(always)]
pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// A byte allowed in an RFC 3261 `token`.
#[inline(always)]
pub fn is_token(b: u8) -> bool {
    TOKEN_TAB[b as usize]
}
