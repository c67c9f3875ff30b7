use std::fmt;
use std::ops::Deref;

use util::ArcStr;

use crate::error::ParseResult;
use crate::headers::HeaderParse;
use crate::macros::comma_separated;
use crate::message::{Params, Quoted, SipUri};
use crate::parser::Parser;

const TAG_PARAM: &str = "tag";
const Q_PARAM: &str = "q";
const EXPIRES_PARAM: &str = "expires";

/// An address with its header parameters.
///
/// Used for `Contact` entries and for the single address of `From`, `To` and
/// `Reply-To`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Contact {
    display_name: Option<ArcStr>,
    uri: SipUri,
    params: Params,
}

impl Contact {
    /// Returns the display name, unquoted.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the address URI.
    pub fn uri(&self) -> &SipUri {
        &self.uri
    }

    /// Returns the header parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the `tag` parameter.
    pub fn tag(&self) -> Option<&str> {
        self.params.get_named(TAG_PARAM)
    }

    /// Returns the `q` parameter.
    pub fn q(&self) -> Option<f32> {
        self.params.get_named(Q_PARAM)?.parse().ok()
    }

    /// Returns the `expires` parameter.
    pub fn expires(&self) -> Option<u32> {
        self.params.get_named(EXPIRES_PARAM)?.parse().ok()
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(display_name) = &self.display_name {
            write!(f, "{} ", Quoted(display_name))?;
        }
        write!(f, "<{}>{}", self.uri, self.params)
    }
}

impl HeaderParse for Contact {
    /*
     * contact-param  =  (name-addr / addr-spec) *(SEMI contact-params)
     * name-addr      =  [ display-name ] LAQUOT addr-spec RAQUOT
     * addr-spec      =  SIP-URI / SIPS-URI / absoluteURI
     * display-name   =  *(token LWS)/ quoted-string
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        let (display_name, uri) = parser.parse_name_addr()?;
        let params = parser.parse_header_params()?;

        Ok(Contact {
            display_name,
            uri,
            params,
        })
    }
}

/// The `Contact` header, or any address header.
///
/// # Examples
///
/// ```
/// use sipwire::headers::{ContactList, HeaderParse};
///
/// let contacts = ContactList::from_bytes(b"\"Mr. Watson\" <sip:watson@worcester.bell-telephone.com>;q=0.7, <mailto:watson@bell-telephone.com>;q=0.1").unwrap();
///
/// assert_eq!(contacts.len(), 2);
/// assert_eq!(contacts[0].display_name(), Some("Mr. Watson"));
/// assert_eq!(contacts[1].q(), Some(0.1));
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ContactList {
    entries: Vec<Contact>,
    wildcard: bool,
}

impl ContactList {
    /// Returns `true` for `Contact: *`.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Appends the entries of `other`.
    pub fn extend(&mut self, other: ContactList) {
        self.entries.extend(other.entries)
    }
}

impl Deref for ContactList {
    type Target = [Contact];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl fmt::Display for ContactList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            return f.write_str("*");
        }
        for (i, contact) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{contact}")?;
        }
        Ok(())
    }
}

impl HeaderParse for ContactList {
    /*
     * Contact        =  ("Contact" / "m" ) HCOLON
     *                   ( STAR / (contact-param *(COMMA contact-param)))
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        parser.lws();
        if parser.consume(b"*").is_some() {
            return Ok(ContactList {
                entries: Vec::new(),
                wildcard: true,
            });
        }

        let mut entries = Vec::with_capacity(1);
        comma_separated!(parser => {
            entries.push(Contact::parse(parser)?)
        });

        Ok(ContactList {
            entries,
            wildcard: false,
        })
    }
}
