//! Header dispatch table.
//!
//! The [`HeaderRegistry`] maps a header name, or its single-letter compact
//! form, to the grammar that parses its value. It is built once through
//! [`RegistryBuilder`] and shared read-only between assemblers.

use std::fmt;

use util::ArcStr;

use crate::error::ParseResult;
use crate::headers::*;
use crate::parser::to_arcstr;

/// A parser function supplied by the embedding application.
pub type HeaderParserFn = fn(&[u8]) -> ParseResult<Header>;

/// The grammar used for a header value.
#[derive(Clone, Copy)]
pub enum HeaderKind {
    /// Kept verbatim as [`Header::Text`].
    Text,
    /// [`parse_numeric`]
    Numeric,
    /// [`CSeq`]
    CSeq,
    /// [`ContactList`]
    Contact,
    /// [`RouteList`]
    Route,
    /// [`ViaList`]
    Via,
    /// [`Digest`]
    Digest,
    /// [`TokenList`]
    Tokens,
    /// [`ContentType`]
    ContentType,
    /// A parser registered with [`RegistryBuilder::register_parser`].
    Custom(HeaderParserFn),
}

impl HeaderKind {
    /// Parses an unfolded header value.
    pub fn parse(&self, value: &[u8]) -> ParseResult<Header> {
        match self {
            HeaderKind::Text => Ok(Header::Text(to_arcstr(value))),
            HeaderKind::Numeric => parse_numeric(value).map(Header::Numeric),
            HeaderKind::CSeq => CSeq::from_bytes(value).map(Header::CSeq),
            HeaderKind::Contact => ContactList::from_bytes(value).map(Header::Contact),
            HeaderKind::Route => RouteList::from_bytes(value).map(Header::Route),
            HeaderKind::Via => ViaList::from_bytes(value).map(Header::Via),
            HeaderKind::Digest => Digest::from_bytes(value).map(Header::Digest),
            HeaderKind::Tokens => TokenList::from_bytes(value).map(Header::Tokens),
            HeaderKind::ContentType => ContentType::from_bytes(value).map(Header::ContentType),
            HeaderKind::Custom(func) => func(value),
        }
    }
}

impl fmt::Debug for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderKind::Text => "Text",
            HeaderKind::Numeric => "Numeric",
            HeaderKind::CSeq => "CSeq",
            HeaderKind::Contact => "Contact",
            HeaderKind::Route => "Route",
            HeaderKind::Via => "Via",
            HeaderKind::Digest => "Digest",
            HeaderKind::Tokens => "Tokens",
            HeaderKind::ContentType => "ContentType",
            HeaderKind::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

/// One entry of the registry.
#[derive(Debug, Clone)]
pub struct ParserRegistration {
    name: ArcStr,
    key: ArcStr,
    alias: Option<u8>,
    kind: HeaderKind,
}

impl ParserRegistration {
    /// Returns the canonical name, as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lowercased name the parsed header is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the compact form, if any.
    pub fn alias(&self) -> Option<char> {
        self.alias.map(char::from)
    }

    /// Returns the value grammar.
    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    fn matches(&self, name: &[u8]) -> bool {
        match name {
            [c] => self.alias.is_some_and(|alias| alias.eq_ignore_ascii_case(c)),
            name => self.name.as_bytes().eq_ignore_ascii_case(name),
        }
    }
}

/// The name and alias to grammar dispatch table.
///
/// # Examples
///
/// ```
/// use sipwire::registry::{HeaderKind, HeaderRegistry};
///
/// let registry = HeaderRegistry::default();
///
/// assert_eq!(registry.lookup(b"v").unwrap().name(), "Via");
/// assert_eq!(registry.lookup(b"CONTENT-LENGTH").unwrap().key(), "content-length");
/// assert!(registry.lookup(b"X-Custom").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct HeaderRegistry {
    entries: Vec<ParserRegistration>,
}

impl HeaderRegistry {
    /// Returns a builder preloaded with the RFC3261 headers.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Finds the registration for a header name or compact alias, ignoring
    /// case.
    pub fn lookup(&self, name: &[u8]) -> Option<&ParserRegistration> {
        self.entries.iter().find(|entry| entry.matches(name))
    }

    /// Returns the number of registered headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HeaderRegistry {
    fn default() -> Self {
        RegistryBuilder::new().build()
    }
}

/// Builds a [`HeaderRegistry`].
///
/// Registering a name twice replaces the earlier entry, so the defaults can
/// be overridden.
///
/// # Examples
///
/// ```
/// use sipwire::headers::Header;
/// use sipwire::registry::HeaderRegistry;
///
/// let registry = HeaderRegistry::builder()
///     .register_parser("X-Priority", None, |value| Ok(Header::Text(String::from_utf8_lossy(value).to_uppercase().into())))
///     .build();
///
/// let kind = registry.lookup(b"x-priority").unwrap().kind();
///
/// assert_eq!(kind.parse(b"urgent").unwrap(), Header::Text("URGENT".into()));
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    entries: Vec<ParserRegistration>,
}

impl RegistryBuilder {
    /// Creates a builder with the default registrations.
    pub fn new() -> Self {
        let builder = Self::empty();

        builder
            .register("Via", Some('v'), HeaderKind::Via)
            .register("From", Some('f'), HeaderKind::Contact)
            .register("To", Some('t'), HeaderKind::Contact)
            .register("Contact", Some('m'), HeaderKind::Contact)
            .register("Reply-To", None, HeaderKind::Contact)
            .register("Route", None, HeaderKind::Route)
            .register("Record-Route", None, HeaderKind::Route)
            .register("Call-ID", Some('i'), HeaderKind::Text)
            .register("CSeq", None, HeaderKind::CSeq)
            .register("Max-Forwards", None, HeaderKind::Numeric)
            .register("Expires", None, HeaderKind::Numeric)
            .register("Min-Expires", None, HeaderKind::Numeric)
            .register("Content-Length", Some('l'), HeaderKind::Numeric)
            .register("Content-Type", Some('c'), HeaderKind::ContentType)
            .register("Content-Encoding", Some('e'), HeaderKind::Text)
            .register("Subject", Some('s'), HeaderKind::Text)
            .register("Allow", None, HeaderKind::Tokens)
            .register("Supported", Some('k'), HeaderKind::Tokens)
            .register("Require", None, HeaderKind::Tokens)
            .register("Proxy-Require", None, HeaderKind::Tokens)
            .register("Unsupported", None, HeaderKind::Tokens)
            .register("Authorization", None, HeaderKind::Digest)
            .register("Proxy-Authorization", None, HeaderKind::Digest)
            .register("WWW-Authenticate", None, HeaderKind::Digest)
            .register("Proxy-Authenticate", None, HeaderKind::Digest)
    }

    /// Creates a builder without any registration.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers `name`, and optionally its compact `alias`, with a grammar.
    pub fn register(mut self, name: &str, alias: Option<char>, kind: HeaderKind) -> Self {
        let registration = ParserRegistration {
            name: name.into(),
            key: name.to_ascii_lowercase().into(),
            alias: alias.filter(char::is_ascii).map(|c| c as u8),
            kind,
        };

        match self.entries.iter_mut().find(|e| e.name.eq_ignore_ascii_case(name)) {
            Some(existing) => *existing = registration,
            None => self.entries.push(registration),
        }
        self
    }

    /// Registers `name` with an application supplied parser.
    pub fn register_parser(self, name: &str, alias: Option<char>, parser: HeaderParserFn) -> Self {
        self.register(name, alias, HeaderKind::Custom(parser))
    }

    /// Finalize the builder into a [`HeaderRegistry`].
    pub fn build(self) -> HeaderRegistry {
        HeaderRegistry { entries: self.entries }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
