//! SIP Parser
//!
//! The module provides the [`Parser`] struct, which reads the grammar shared by
//! the start-line and the header values: URIs, parameters, `name-addr`
//! entries and the SIP version.

use std::net::Ipv6Addr;
use std::str;

use util::chars::{is_digit, is_newline, is_space, is_token, ALPHANUMERIC, TOKEN};
use util::{digits, lookup_table, until_newline, ArcStr, Position, Scanner};

use crate::error::ParseResult;
use crate::macros::parse_error;
use crate::message::*;

// ---------------------------------------------------------------------
// Parser constants
// ---------------------------------------------------------------------
/// Unreserved characters in user, password, uri and header
/// parameters in SIP uris.
const UNRESERVED: &[u8] = b"-_.!~*'()%";
/// Unreserverd charaters in user part of SIP URIs.
const USER_UNRESERVED: &[u8] = b"&=+$,;?/";
/// Password valid characters in SIP URIs.
const PASS: &[u8] = b"&=+$,";
/// Valid characters in SIP URIs host part. `+` keeps global tel numbers.
const HOST: &[u8] = b"_-.+";
/// The SIP version prefix.
const B_SIP: &[u8] = b"SIP/";

// ---------------------------------------------------------------------
// Lookup Tables
// ---------------------------------------------------------------------
// For reading user in uri.
lookup_table!(USER_TAB => ALPHANUMERIC, UNRESERVED, USER_UNRESERVED);
// For reading password in uri.
lookup_table!(PASS_TAB => ALPHANUMERIC, UNRESERVED, PASS);
// For reading host in uri.
lookup_table!(HOST_TAB => ALPHANUMERIC, HOST);
// For reading parameter in uri.
lookup_table!(PARAM_TAB => b"[]/:&+$", ALPHANUMERIC, UNRESERVED);
// For reading the headers part of an uri.
lookup_table!(HDR_TAB => b"[]/?:+$=&", ALPHANUMERIC, UNRESERVED);
// For reading unquoted header parameter values.
lookup_table!(GEN_VALUE_TAB => b"[:]", ALPHANUMERIC, TOKEN);

/// A SIP grammar parser.
///
/// This struct provides methods for parsing the components of SIP messages,
/// such as URIs, parameters and start lines. Header value grammars build
/// on top of it, see [`HeaderParse`](crate::headers::HeaderParse).
pub struct Parser<'buf> {
    /// The scanner used to read the input buffer.
    scanner: Scanner<'buf>,
}

impl<'buf> Parser<'buf> {
    /// Creates a new `Parser` from the given byte slice.
    #[inline]
    pub fn new<B>(buf: &'buf B) -> Self
    where
        B: AsRef<[u8]> + ?Sized,
    {
        Self {
            scanner: Scanner::new(buf.as_ref()),
        }
    }

    /// Parses a request line or a status line.
    ///
    /// The line must not contain its CRLF terminator.
    ///
    /// # Examples
    ///
    /// ```
    /// use sipwire::message::StartLine;
    /// use sipwire::parser::Parser;
    ///
    /// let line = Parser::new("SIP/2.0 180 Ringing").parse_start_line().unwrap();
    ///
    /// assert!(matches!(line, StartLine::Response(status) if status.code == 180));
    /// ```
    pub fn parse_start_line(&mut self) -> ParseResult<StartLine> {
        if self.scanner.starts_with_ignore_case(B_SIP) {
            // Is an status line, e.g, "SIP/2.0 200 OK".
            self.parse_status_line().map(StartLine::Response)
        } else {
            // Is an request line, e.g, "OPTIONS sip:localhost SIP/2.0".
            self.parse_request_line().map(StartLine::Request)
        }
    }

    fn parse_status_line(&mut self) -> ParseResult<StatusLine> {
        let version = self.parse_sip_version()?;
        self.require_space()?;

        let scanner = &mut self.scanner;
        let digits = digits!(scanner);
        if digits.len() != 3 {
            return parse_error!("Status code must have three digits", self);
        }
        let code = Scanner::new(digits).read_u16()?;
        if !(100..=699).contains(&code) {
            return parse_error!(format!("Status code {code} out of range"), self);
        }
        if !self.scanner.is_eof() {
            self.require_space()?;
        }
        let scanner = &mut self.scanner;
        let reason = until_newline!(scanner);

        Ok(StatusLine {
            version,
            code,
            reason: to_arcstr(reason),
        })
    }

    fn parse_request_line(&mut self) -> ParseResult<RequestLine> {
        let method = self.scanner.read_word();
        if method.is_empty() {
            return parse_error!("Missing request method", self);
        }
        self.require_space()?;
        let uri = self.parse_uri(true)?;
        self.require_space()?;
        let version = self.parse_sip_version()?;
        self.scanner.skip_ws();

        if !self.scanner.is_eof() {
            return parse_error!("Unexpected data after SIP version", self);
        }

        Ok(RequestLine {
            method: method.into(),
            uri,
            version,
        })
    }

    /// Parses `SIP/<digits>.<digits>`.
    pub(crate) fn parse_sip_version(&mut self) -> ParseResult<ArcStr> {
        if !self.scanner.starts_with_ignore_case(B_SIP) {
            return parse_error!("Expected SIP version", self);
        }
        let version = self.scanner.read_while(|b| !is_space(b) && !is_newline(b));
        let mut numbers = version[B_SIP.len()..].split(|&b| b == b'.');

        let valid = matches!(
            (numbers.next(), numbers.next(), numbers.next()),
            (Some(major), Some(minor), None)
                if is_number(major) && is_number(minor)
        );
        if !valid {
            return parse_error!(format!("Invalid SIP version '{}'", to_arcstr(version)), self);
        }

        Ok(to_arcstr(version))
    }

    /// Parses a URI.
    ///
    /// With `parse_params` the URI owns the `;params` and `?headers` that
    /// follow it, as inside `<...>` or in the Request-URI. Without it the URI
    /// stops before the first `;`, which then belongs to the header.
    pub fn parse_uri(&mut self, parse_params: bool) -> ParseResult<SipUri> {
        self.scanner.skip_ws();
        // [scheme ":"] [ userinfo "@" ] hostport uri-parameters [ headers ]
        let scheme = self.parse_scheme();

        let (user, password) = if self.exists_user_part_in_uri(parse_params) {
            let user = self.scanner.read_while(is_user);
            if user.is_empty() {
                return parse_error!("Empty user part in URI", self);
            }
            let password = match self.scanner.consume(b":") {
                Some(_) => Some(to_arcstr(self.scanner.read_while(is_pass))),
                None => None,
            };
            // Take '@'.
            self.must_read(b'@')?;

            (Some(to_arcstr(user)), password)
        } else {
            (None, None)
        };

        let (domain, port) = self.parse_host_port()?;

        let (params, headers) = if parse_params {
            let params = self.parse_uri_params()?;
            let headers = match self.scanner.consume(b"?") {
                Some(_) => Some(to_arcstr(self.scanner.read_while(is_hdr_uri))),
                None => None,
            };
            (params, headers)
        } else {
            (Params::new(), None)
        };

        Ok(SipUri {
            scheme,
            user,
            password,
            domain,
            port,
            params,
            headers,
        })
    }

    fn parse_scheme(&mut self) -> Option<Scheme> {
        self.scanner.mark();
        let token = self.scanner.read_word();

        if self.scanner.consume(b":").is_some() {
            if let Some(scheme) = Scheme::from_bytes(token) {
                self.scanner.unmark();
                return Some(scheme);
            }
        }
        self.scanner.reset();

        None
    }

    fn exists_user_part_in_uri(&self, parse_params: bool) -> bool {
        self.remaining()
            .iter()
            .take_while(|&&b| {
                !is_space(b) && !is_newline(b) && b != b'>' && b != b',' && (parse_params || b != b';')
            })
            .any(|&b| b == b'@')
    }

    /// Parses `host [":" port]`. IPv6 references keep their brackets.
    pub(crate) fn parse_host_port(&mut self) -> ParseResult<(ArcStr, Option<u16>)> {
        let host = match self.scanner.peek() {
            Some(b'[') => {
                let start = self.remaining();
                self.scanner.read_while(|b| b != b']' && !is_newline(b));
                self.must_read(b']')?;
                let reference = &start[..start.len() - self.remaining().len()];
                let address = str::from_utf8(&reference[1..reference.len() - 1])?;

                if address.parse::<Ipv6Addr>().is_err() {
                    return parse_error!(format!("Invalid IPv6 address '{address}'"), self);
                }
                to_arcstr(reference)
            }
            _ => {
                let host = self.scanner.read_while(is_host);
                if host.is_empty() {
                    return parse_error!("Can't parse the host", self);
                }
                to_arcstr(host)
            }
        };

        let port = match self.scanner.consume(b":") {
            Some(_) => match self.scanner.read_u16() {
                Ok(port) => Some(port),
                Err(_) => return parse_error!("Invalid port", self),
            },
            None => None,
        };

        Ok((host, port))
    }

    fn parse_uri_params(&mut self) -> ParseResult<Params> {
        let mut params = Params::new();

        while self.scanner.consume(b";").is_some() {
            let name = self.scanner.read_while(is_param);
            if name.is_empty() {
                return parse_error!("Empty URI parameter name", self);
            }
            let value = match self.scanner.consume(b"=") {
                Some(_) if self.scanner.peek() == Some(b'"') => Some(ArcStr::from(self.scanner.read_quoted()?)),
                Some(_) => Some(to_arcstr(self.scanner.read_while(is_param))),
                None => None,
            };
            params.push(Param {
                name: to_arcstr(name).to_ascii_lowercase(),
                value,
            });
        }

        Ok(params)
    }

    /// Parses `*( SEMI param )` after a header element, tolerating whitespace
    /// around `;` and `=`.
    pub(crate) fn parse_header_params(&mut self) -> ParseResult<Params> {
        let mut params = Params::new();

        loop {
            self.lws();
            if self.scanner.consume(b";").is_none() {
                break;
            }
            params.push(self.parse_param()?);
        }

        Ok(params)
    }

    /// Parses a single `name [= (token / host / quoted-string)]`.
    pub(crate) fn parse_param(&mut self) -> ParseResult<Param> {
        self.lws();
        let name = self.scanner.read_word();
        if name.is_empty() {
            return parse_error!("Empty parameter name", self);
        }
        self.lws();

        let value = match self.scanner.consume(b"=") {
            Some(_) => {
                self.lws();
                Some(self.parse_gen_value()?)
            }
            None => None,
        };

        Ok(Param {
            name: to_arcstr(name).to_ascii_lowercase(),
            value,
        })
    }

    /// Parses a quoted string, returning its unescaped content, or a run of
    /// token and host characters.
    pub(crate) fn parse_gen_value(&mut self) -> ParseResult<ArcStr> {
        if self.scanner.peek() == Some(b'"') {
            Ok(self.scanner.read_quoted()?.into())
        } else {
            Ok(to_arcstr(self.scanner.read_while(is_gen_value)))
        }
    }

    /// Parses `[display-name] "<" URI ">"` or a bare URI.
    ///
    /// A display name, quoted or not, requires the angle brackets. A bare
    /// URI leaves its `;params` to the caller.
    pub(crate) fn parse_name_addr(&mut self) -> ParseResult<(Option<ArcStr>, SipUri)> {
        self.lws();
        let display = match self.scanner.peek() {
            Some(b'"') => Some(ArcStr::from(self.scanner.read_quoted()?)),
            Some(b'<') => None,
            None => return parse_error!("Expected address", self),
            Some(_) => {
                // Token display names are told apart from bare URIs by
                // looking for the '<' before the element ends.
                self.scanner.mark();
                self.scanner.read_until(b"<,");
                let has_angle = self.scanner.peek() == Some(b'<');
                self.scanner.reset();

                if has_angle {
                    let name = trim(self.scanner.read_until(b"<"));
                    (!name.is_empty()).then(|| to_arcstr(name))
                } else {
                    None
                }
            }
        };
        self.lws();

        let uri = if display.is_some() || self.scanner.peek() == Some(b'<') {
            // must be an '<'
            self.must_read(b'<')?;
            let uri = self.parse_uri(true)?;
            self.scanner.skip_ws();
            // must be an '>'
            self.must_read(b'>')?;
            uri
        } else {
            self.parse_uri(false)?
        };

        Ok((display, uri))
    }

    /// Reads a non-empty token.
    pub(crate) fn parse_token(&mut self, what: &str) -> ParseResult<&'buf str> {
        let token = self.scanner.read_word();
        if token.is_empty() {
            return parse_error!(format!("Expected {what}"), self);
        }

        Ok(str::from_utf8(token)?)
    }

    /// Reads a run of digits as a `u32`.
    pub(crate) fn parse_u32(&mut self, what: &str) -> ParseResult<u32> {
        match self.scanner.read_u32() {
            Ok(n) => Ok(n),
            Err(_) => parse_error!(format!("Expected {what}"), self),
        }
    }

    /// Fails unless only whitespace remains.
    pub(crate) fn finish(&mut self) -> ParseResult<()> {
        self.lws();
        if self.scanner.is_eof() {
            Ok(())
        } else {
            parse_error!(format!("Unexpected trailing data '{}'", to_arcstr(self.remaining())), self)
        }
    }

    fn require_space(&mut self) -> ParseResult<()> {
        if self.scanner.consume_if(is_space).is_none() {
            return parse_error!("Expected space", self);
        }
        self.scanner.skip_ws();
        Ok(())
    }

    /// Skips linear whitespace, folded line breaks included.
    #[inline]
    pub(crate) fn lws(&mut self) {
        self.scanner.read_while(|b| is_space(b) || is_newline(b));
    }

    #[inline]
    pub(crate) fn must_read(&mut self, byte: u8) -> ParseResult<()> {
        Ok(self.scanner.must_read(byte)?)
    }

    #[inline]
    pub(crate) fn consume(&mut self, any_of: &[u8]) -> Option<u8> {
        self.scanner.consume(any_of)
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.scanner.peek()
    }

    /// Skips a `( comment )`, nested parentheses included.
    pub(crate) fn skip_comment(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;

        while let Some(b) = self.scanner.advance() {
            match b {
                b'(' => depth += 1,
                b')' if depth == 1 => return Ok(()),
                b')' => depth = depth.saturating_sub(1),
                _ => (),
            }
        }
        parse_error!("Unterminated comment", self)
    }

    #[inline]
    pub(crate) fn position(&self) -> &Position {
        self.scanner.position()
    }

    #[inline]
    pub(crate) fn remaining(&self) -> &'buf [u8] {
        self.scanner.remaining()
    }
}

/// Converts bytes read from the wire, replacing invalid UTF-8.
#[inline]
pub(crate) fn to_arcstr(bytes: &[u8]) -> ArcStr {
    String::from_utf8_lossy(bytes).into()
}

/// Strips leading and trailing spaces and tabs.
pub(crate) fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| !is_space(b)).map_or(start, |i| i + 1);

    &bytes[start..end]
}

fn is_number(digits: &[u8]) -> bool {
    !digits.is_empty() && digits.iter().all(|&b| is_digit(b))
}

#[inline(always)]
fn is_host(b: u8) -> bool {
    HOST_TAB[b as usize]
}

#[inline(always)]
fn is_user(b: u8) -> bool {
    USER_TAB[b as usize]
}

#[inline(always)]
fn is_pass(b: u8) -> bool {
    PASS_TAB[b as usize]
}

#[inline(always)]
fn is_param(b: u8) -> bool {
    PARAM_TAB[b as usize]
}

#[inline(always)]
fn is_hdr_uri(b: u8) -> bool {
    HDR_TAB[b as usize]
}

#[inline(always)]
fn is_gen_value(b: u8) -> bool {
    GEN_VALUE_TAB[b as usize] || is_token(b)
}

#[cfg(test)]
mod tests;
