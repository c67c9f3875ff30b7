//! SIP Headers types
//!
//! The module provides the [`Headers`] map of a message, the [`Header`] enum
//! of parsed values and one module per header grammar.

use std::fmt;

use enum_as_inner::EnumAsInner;
use util::ArcStr;

use crate::error::{GrammarFault, ParseResult};
use crate::parser::Parser;

mod contact;
mod content_type;
mod cseq;
mod digest;
mod numeric;
mod route;
mod tokens;
mod via;

pub use contact::*;
pub use content_type::ContentType;
pub use cseq::CSeq;
pub use digest::Digest;
pub use numeric::parse_numeric;
pub use route::*;
pub use tokens::TokenList;
pub use via::*;

/// A trait for parsing a header value into a typed value.
pub trait HeaderParse: Sized {
    /// Parses the value at the parser position.
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self>;

    /// Parses a whole header value, rejecting trailing data.
    fn from_bytes(src: &[u8]) -> ParseResult<Self> {
        let mut parser = Parser::new(src);
        let value = Self::parse(&mut parser)?;
        parser.finish()?;

        Ok(value)
    }
}

/// A parsed header value.
///
/// Which variant a header produces is decided by the parser registered for
/// its name in the [`HeaderRegistry`](crate::registry::HeaderRegistry).
#[derive(Debug, PartialEq, Eq, Clone, EnumAsInner)]
pub enum Header {
    /// A value kept as text, for headers without a registered grammar.
    Text(ArcStr),
    /// A non-negative decimal value, as in `Content-Length` or `Expires`.
    Numeric(u32),
    /// `CSeq`
    CSeq(CSeq),
    /// `Contact`, `From`, `To` and other address headers.
    Contact(ContactList),
    /// `Route` and `Record-Route`.
    Route(RouteList),
    /// `Via`
    Via(ViaList),
    /// Digest credentials or challenges.
    Digest(Digest),
    /// A comma separated token list, as in `Allow` or `Supported`.
    Tokens(TokenList),
    /// `Content-Type`
    ContentType(ContentType),
}

impl Header {
    /// Merges `other` into `self` when both are lists of the same kind.
    ///
    /// Returns `other` back when the headers do not merge, in which case the
    /// caller replaces the previous value.
    fn merge(&mut self, other: Header) -> Option<Header> {
        match (self, other) {
            (Header::Via(list), Header::Via(more)) => list.extend(more),
            (Header::Contact(list), Header::Contact(more)) if !list.is_wildcard() && !more.is_wildcard() => {
                list.extend(more)
            }
            (Header::Route(list), Header::Route(more)) => list.extend(more),
            (Header::Tokens(list), Header::Tokens(more)) => list.extend(more),
            (_, other) => return Some(other),
        }
        None
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Header::Text(text) => f.write_str(text),
            Header::Numeric(n) => write!(f, "{n}"),
            Header::CSeq(cseq) => write!(f, "{cseq}"),
            Header::Contact(contacts) => write!(f, "{contacts}"),
            Header::Route(routes) => write!(f, "{routes}"),
            Header::Via(vias) => write!(f, "{vias}"),
            Header::Digest(digest) => write!(f, "{digest}"),
            Header::Tokens(tokens) => write!(f, "{tokens}"),
            Header::ContentType(ctype) => write!(f, "{ctype}"),
        }
    }
}

/// The headers of a message, keyed by lowercased canonical name.
///
/// Inserting a list header whose name is already present extends the stored
/// list, so the `Via` entries of several `Via` lines accumulate in wire
/// order. Any other repeated header replaces the previous value.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Headers {
    entries: Vec<(ArcStr, Header)>,
}

impl Headers {
    /// Creates an empty `Headers`.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Creates an empty `Headers` with room for `capacity` names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts a header under `name`, see the type documentation for how
    /// repeated names are handled.
    pub fn insert(&mut self, name: &str, header: Header) {
        match self.entries.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => {
                if let Some(replacement) = existing.merge(header) {
                    *existing = replacement;
                }
            }
            None => self.entries.push((name.to_ascii_lowercase().into(), header)),
        }
    }

    /// Inserts like [`Headers::insert`] but refuses to mix `Contact: *` with
    /// contact addresses, leaving the stored value untouched.
    pub fn append(&mut self, name: &str, header: Header) -> ParseResult<()> {
        if let (Some(Header::Contact(stored)), Header::Contact(incoming)) = (self.get(name), &header) {
            if stored.is_wildcard() != incoming.is_wildcard() {
                return Err(GrammarFault::new("'*' cannot be combined with other Contact addresses"));
            }
        }
        self.insert(name, header);
        Ok(())
    }

    /// Returns the header stored under `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Header> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, header)| header)
    }

    /// Removes and returns the header stored under `name`.
    pub fn remove(&mut self, name: &str) -> Option<Header> {
        let index = self.entries.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))?;

        Some(self.entries.remove(index).1)
    }

    /// Returns `true` if a header is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the names and values, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Header)> {
        self.entries.iter().map(|(key, header)| (key.as_str(), header))
    }

    /// Returns the `Via` entries.
    pub fn via(&self) -> Option<&ViaList> {
        self.get("via")?.as_via()
    }

    /// Returns the `Contact` list.
    pub fn contact(&self) -> Option<&ContactList> {
        self.get("contact")?.as_contact()
    }

    /// Returns the `From` address.
    pub fn from(&self) -> Option<&Contact> {
        self.get("from")?.as_contact()?.first()
    }

    /// Returns the `To` address.
    pub fn to(&self) -> Option<&Contact> {
        self.get("to")?.as_contact()?.first()
    }

    /// Returns the `Route` set.
    pub fn route(&self) -> Option<&RouteList> {
        self.get("route")?.as_route()
    }

    /// Returns the `Record-Route` set.
    pub fn record_route(&self) -> Option<&RouteList> {
        self.get("record-route")?.as_route()
    }

    /// Returns the `CSeq`.
    pub fn cseq(&self) -> Option<&CSeq> {
        match self.get("cseq")? {
            Header::CSeq(cseq) => Some(cseq),
            _ => None,
        }
    }

    /// Returns the `Call-ID`.
    pub fn call_id(&self) -> Option<&str> {
        self.text("call-id")
    }

    /// Returns the `Max-Forwards` value.
    pub fn max_forwards(&self) -> Option<u32> {
        self.numeric("max-forwards")
    }

    /// Returns the `Expires` value.
    pub fn expires(&self) -> Option<u32> {
        self.numeric("expires")
    }

    /// Returns the `Content-Length` value.
    pub fn content_length(&self) -> Option<u32> {
        self.numeric("content-length")
    }

    /// Returns the `Content-Type`.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.get("content-type")?.as_content_type()
    }

    /// Returns the `Authorization` credentials.
    pub fn authorization(&self) -> Option<&Digest> {
        self.get("authorization")?.as_digest()
    }

    /// Returns the `WWW-Authenticate` challenge.
    pub fn www_authenticate(&self) -> Option<&Digest> {
        self.get("www-authenticate")?.as_digest()
    }

    /// Returns the value of a header kept as text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_text().map(ArcStr::as_str)
    }

    /// Returns the value of a numeric header.
    pub fn numeric(&self, name: &str) -> Option<u32> {
        self.get(name)?.as_numeric().copied()
    }
}
