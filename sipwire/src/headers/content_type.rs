use std::fmt;

use util::ArcStr;

use crate::error::ParseResult;
use crate::headers::HeaderParse;
use crate::message::Params;
use crate::parser::Parser;

/// The `Content-Type` SIP header.
///
/// Indicates the media type of the message body.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ContentType {
    mtype: ArcStr,
    subtype: ArcStr,
    params: Params,
}

impl ContentType {
    /// Returns the top-level type, e.g. `application`.
    pub fn mtype(&self) -> &str {
        &self.mtype
    }

    /// Returns the subtype, e.g. `sdp`.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Returns the media type parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns `true` if the media type is `type/subtype`, ignoring case.
    pub fn is(&self, mtype: &str, subtype: &str) -> bool {
        self.mtype.eq_ignore_ascii_case(mtype) && self.subtype.eq_ignore_ascii_case(subtype)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.mtype, self.subtype, self.params)
    }
}

impl HeaderParse for ContentType {
    /*
     * Content-Type     =  ( "Content-Type" / "c" ) HCOLON media-type
     * media-type       =  m-type SLASH m-subtype *(SEMI m-parameter)
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        parser.lws();
        let mtype = parser.parse_token("media type")?.into();
        parser.lws();
        parser.must_read(b'/')?;
        parser.lws();
        let subtype = parser.parse_token("media subtype")?.into();
        let params = parser.parse_header_params()?;

        Ok(ContentType { mtype, subtype, params })
    }
}
