use util::chars::is_digit;
use util::Scanner;

use crate::error::{GrammarFault, ParseResult};
use crate::parser::trim;

/// Parses a header value made only of decimal digits.
///
/// Used by `Content-Length`, `Max-Forwards`, `Expires` and `Min-Expires`.
///
/// # Examples
///
/// ```
/// use sipwire::headers::parse_numeric;
///
/// assert_eq!(parse_numeric(b" 0068 ").unwrap(), 68);
/// assert!(parse_numeric(b"12a").is_err());
/// ```
pub fn parse_numeric(src: &[u8]) -> ParseResult<u32> {
    let value = trim(src);

    if value.is_empty() || !value.iter().all(|&b| is_digit(b)) {
        return Err(GrammarFault::new(format!(
            "'{}' is not a decimal number",
            String::from_utf8_lossy(value)
        )));
    }

    Ok(Scanner::new(value).read_u32()?)
}
