use std::fmt;

use crate::error::ParseResult;
use crate::headers::HeaderParse;
use crate::macros::parse_error;
use crate::message::Method;
use crate::parser::Parser;

/// The `CSeq` SIP header.
///
/// Orders the transactions within a dialog.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CSeq {
    /// The sequence number.
    pub seq: u32,
    /// The request method.
    pub method: Method,
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seq, self.method)
    }
}

impl HeaderParse for CSeq {
    /*
     * CSeq  =  "CSeq" HCOLON 1*DIGIT LWS Method
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        parser.lws();
        let seq = parser.parse_u32("sequence number")?;

        if !matches!(parser.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            return parse_error!("Expected whitespace after CSeq number", parser);
        }
        parser.lws();
        let method = parser.parse_token("method")?.into();

        Ok(CSeq { seq, method })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let cseq = CSeq::from_bytes(b"0009\r\n  INVITE").unwrap();

        assert_eq!(cseq.seq, 9);
        assert_eq!(cseq.method, Method::Invite);
        assert_eq!(cseq.to_string(), "9 INVITE");
    }

    #[test]
    fn test_parse_non_numeric() {
        assert!(CSeq::from_bytes(b"12a INVITE").is_err());
        assert!(CSeq::from_bytes(b"INVITE").is_err());
        assert!(CSeq::from_bytes(b"1 INVITE extra").is_err());
    }
}
