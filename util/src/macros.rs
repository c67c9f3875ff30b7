//! Helper macros shared by the scanner and the SIP grammar.

/// Builds a `[bool; 256]` byte class table from one or more byte slices.
///
/// # Examples
///
/// ```
/// util::lookup_table!(DIGITS => b"0123456789");
///
/// assert!(DIGITS[b'7' as usize]);
/// assert!(!DIGITS[b'a' as usize]);
/// ```
#[macro_export]
macro_rules! lookup_table {
    ($name:ident => $( $slice:expr ),+) => {
        const $name: [bool; 256] = {
            let mut arr = [false; 256];
            $(
                let mut i = 0;
                while i < $slice.len() {
                    arr[$slice[i] as usize] = true;
                    i += 1;
                }
            )*
            arr
        };
    };
}

/// Reads the decimal digits at the scanner position.
#[macro_export]
macro_rules! digits {
    ($scanner:ident) => {{
        $scanner.read_while($crate::chars::is_digit)
    }};
}

/// Reads until one of `\r` or `\n` is found.
#[macro_export]
macro_rules! until_newline {
    ($scanner:ident) => {{
        $scanner.read_while(|b| !$crate::chars::is_newline(b))
    }};
}
