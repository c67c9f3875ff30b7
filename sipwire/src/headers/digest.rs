use std::fmt;

use util::ArcStr;

use crate::error::{GrammarFault, ParseResult};
use crate::headers::HeaderParse;
use crate::macros::{comma_separated, parse_error};
use crate::message::{Param, Params, SipUri};
use crate::parser::Parser;

const DIGEST: &str = "Digest";

/// Digest credentials or a Digest challenge.
///
/// One type serves `Authorization`, `Proxy-Authorization`,
/// `WWW-Authenticate` and `Proxy-Authenticate`: every field is optional and
/// parameters without a dedicated field are kept in [`Digest::params`].
///
/// # Examples
///
/// ```
/// use sipwire::headers::{Digest, HeaderParse};
///
/// let src = br#"Digest username="bob", realm="biloxi.com", nc=0000000a, uri="sip:bob@biloxi.com""#;
/// let digest = Digest::from_bytes(src).unwrap();
///
/// assert_eq!(digest.username.as_deref(), Some("bob"));
/// assert_eq!(digest.nc, Some(10));
/// assert_eq!(digest.uri.unwrap().domain(), "biloxi.com");
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Digest {
    /// The `username` parameter.
    pub username: Option<ArcStr>,
    /// The `realm` parameter.
    pub realm: Option<ArcStr>,
    /// The `nonce` parameter.
    pub nonce: Option<ArcStr>,
    /// The `uri` parameter.
    pub uri: Option<SipUri>,
    /// The `qop` parameter.
    pub qop: Option<ArcStr>,
    /// The `nc` parameter, read as hexadecimal.
    pub nc: Option<u32>,
    /// The `cnonce` parameter.
    pub cnonce: Option<ArcStr>,
    /// The `response` parameter.
    pub response: Option<ArcStr>,
    /// The `opaque` parameter.
    pub opaque: Option<ArcStr>,
    /// The `algorithm` parameter.
    pub algorithm: Option<ArcStr>,
    /// The URIs of the `domain` parameter.
    pub domain: Vec<SipUri>,
    /// The `stale` parameter.
    pub stale: Option<bool>,
    /// Any other parameter.
    pub params: Params,
}

impl Digest {
    fn set(&mut self, name: &str, value: ArcStr) -> ParseResult<()> {
        match name.to_ascii_lowercase().as_str() {
            "username" => self.username = Some(value),
            "realm" => self.realm = Some(value),
            "nonce" => self.nonce = Some(value),
            "uri" => self.uri = Some(value.parse()?),
            "qop" => self.qop = Some(value),
            "nc" => match u32::from_str_radix(&value, 16) {
                Ok(nc) => self.nc = Some(nc),
                Err(_) => return parse_error!(format!("Invalid nonce count '{value}'")),
            },
            "cnonce" => self.cnonce = Some(value),
            "response" => self.response = Some(value),
            "opaque" => self.opaque = Some(value),
            "algorithm" => self.algorithm = Some(value),
            "domain" => {
                self.domain = value
                    .split_ascii_whitespace()
                    .map(str::parse::<SipUri>)
                    .collect::<Result<Vec<_>, GrammarFault>>()?
            }
            "stale" => {
                self.stale = Some(match value.as_str() {
                    v if v.eq_ignore_ascii_case("true") => true,
                    v if v.eq_ignore_ascii_case("false") => false,
                    _ => return parse_error!(format!("Invalid stale flag '{value}'")),
                })
            }
            _ => self.params.push(Param::new(name, Some(&value))),
        }
        Ok(())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = " ";
        let mut field = |f: &mut fmt::Formatter<'_>, name: &str, value: &dyn fmt::Display, quoted: bool| {
            let result = if quoted {
                write!(f, "{sep}{name}=\"{value}\"")
            } else {
                write!(f, "{sep}{name}={value}")
            };
            sep = ", ";
            result
        };

        f.write_str(DIGEST)?;
        if let Some(v) = &self.username {
            field(f, "username", v, true)?;
        }
        if let Some(v) = &self.realm {
            field(f, "realm", v, true)?;
        }
        if !self.domain.is_empty() {
            let domain = self.domain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
            field(f, "domain", &domain, true)?;
        }
        if let Some(v) = &self.nonce {
            field(f, "nonce", v, true)?;
        }
        if let Some(v) = &self.uri {
            field(f, "uri", v, true)?;
        }
        if let Some(v) = &self.response {
            field(f, "response", v, true)?;
        }
        if let Some(v) = &self.algorithm {
            field(f, "algorithm", v, false)?;
        }
        if let Some(v) = &self.cnonce {
            field(f, "cnonce", v, true)?;
        }
        if let Some(v) = &self.opaque {
            field(f, "opaque", v, true)?;
        }
        if let Some(v) = &self.qop {
            field(f, "qop", v, false)?;
        }
        if let Some(v) = self.nc {
            field(f, "nc", &format!("{v:08x}"), false)?;
        }
        if let Some(v) = self.stale {
            field(f, "stale", &if v { "TRUE" } else { "FALSE" }, false)?;
        }
        for param in self.params.iter() {
            field(f, param.name(), &param.value().unwrap_or_default(), true)?;
        }
        Ok(())
    }
}

impl HeaderParse for Digest {
    /*
     * credentials       =  ("Digest" LWS digest-response)
     * digest-response   =  dig-resp *(COMMA dig-resp)
     * challenge         =  ("Digest" LWS digest-cln *(COMMA digest-cln))
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        parser.lws();
        let scheme = parser.parse_token("auth scheme")?;
        if !scheme.eq_ignore_ascii_case(DIGEST) {
            return parse_error!(format!("Unsupported auth scheme '{scheme}'"));
        }

        let mut digest = Digest::default();
        comma_separated!(parser => {
            let name = parser.parse_token("auth param")?;
            parser.lws();
            parser.must_read(b'=')?;
            parser.lws();
            let value = parser.parse_gen_value()?;
            digest.set(name, value)?
        });

        Ok(digest)
    }
}
