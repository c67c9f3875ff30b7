use std::fmt;
use std::ops::Deref;

use itertools::Itertools;
use util::ArcStr;

use crate::error::ParseResult;
use crate::headers::HeaderParse;
use crate::macros::comma_separated;
use crate::message::{Params, Quoted, SipUri};
use crate::parser::Parser;

/// One hop of a `Route` or `Record-Route` header.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RouteEntry {
    display_name: Option<ArcStr>,
    uri: SipUri,
    params: Params,
}

impl RouteEntry {
    /// Returns the display name, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the hop URI.
    pub fn uri(&self) -> &SipUri {
        &self.uri
    }

    /// Returns `true` if the hop URI carries the `lr` parameter.
    pub fn is_loose(&self) -> bool {
        self.uri.is_loose()
    }

    /// Returns the header parameters after `>`.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(display_name) = &self.display_name {
            write!(f, "{} ", Quoted(display_name))?;
        }
        write!(f, "<{}>{}", self.uri, self.params)
    }
}

impl HeaderParse for RouteEntry {
    /*
     * route-param  =  name-addr *( SEMI rr-param )
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        let (display_name, uri) = parser.parse_name_addr()?;
        let params = parser.parse_header_params()?;

        Ok(RouteEntry {
            display_name,
            uri,
            params,
        })
    }
}

/// The `Route` and `Record-Route` headers.
///
/// # Examples
///
/// ```
/// use sipwire::headers::{HeaderParse, RouteList};
///
/// let routes = RouteList::from_bytes(b"<sip:bigbox3.site3.atlanta.com;lr>, <sip:server10.biloxi.com>").unwrap();
///
/// assert!(routes[0].is_loose());
/// assert!(!routes[1].is_loose());
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct RouteList(Vec<RouteEntry>);

impl RouteList {
    /// Appends the hops of `other`.
    pub fn extend(&mut self, other: RouteList) {
        self.0.extend(other.0)
    }
}

impl Deref for RouteList {
    type Target = [RouteEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for RouteList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(", "))
    }
}

impl HeaderParse for RouteList {
    /*
     * Route        =  "Route" HCOLON route-param *(COMMA route-param)
     * Record-Route =  "Record-Route" HCOLON rec-route *(COMMA rec-route)
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        let mut entries = Vec::with_capacity(1);
        comma_separated!(parser => {
            entries.push(RouteEntry::parse(parser)?)
        });

        Ok(RouteList(entries))
    }
}
