use std::fmt;
use std::ops::Deref;

use itertools::Itertools;
use util::ArcStr;

use crate::error::{GrammarFault, ParseResult};
use crate::headers::HeaderParse;
use crate::macros::comma_separated;
use crate::message::Params;
use crate::parser::Parser;

const MADDR_PARAM: &str = "maddr";
const BRANCH_PARAM: &str = "branch";
const TTL_PARAM: &str = "ttl";
const RPORT_PARAM: &str = "rport";
const RECEIVED_PARAM: &str = "received";

/// One `via-parm` of the `Via` header.
///
/// Indicates the path taken by the request so far and the path that should
/// be followed in routing responses.
///
/// # Examples
///
/// ```
/// use sipwire::headers::{HeaderParse, ViaList};
///
/// let vias = ViaList::from_bytes(b"SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bK776asdhds").unwrap();
///
/// assert_eq!(vias[0].transport(), "UDP");
/// assert_eq!(vias[0].branch(), Some("z9hG4bK776asdhds"));
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Via {
    protocol: ArcStr,
    version: ArcStr,
    transport: ArcStr,
    host: ArcStr,
    port: Option<u16>,
    rport: Option<u16>,
    params: Params,
}

impl Via {
    /// Returns the protocol name, usually `SIP`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the protocol version, usually `2.0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the transport, uppercased.
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Returns the sent-by host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the sent-by port.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the `branch` parameter.
    pub fn branch(&self) -> Option<&str> {
        self.params.get_named(BRANCH_PARAM)
    }

    /// Returns the `received` parameter.
    pub fn received(&self) -> Option<&str> {
        self.params.get_named(RECEIVED_PARAM)
    }

    /// Returns the `maddr` parameter.
    pub fn maddr(&self) -> Option<&str> {
        self.params.get_named(MADDR_PARAM)
    }

    /// Returns the `ttl` parameter.
    pub fn ttl(&self) -> Option<&str> {
        self.params.get_named(TTL_PARAM)
    }

    /// Returns the `rport` value, when one was filled in.
    pub fn rport(&self) -> Option<u16> {
        self.rport
    }

    /// Returns `true` if `rport` is present, with or without a value.
    pub fn has_rport(&self) -> bool {
        self.params.contains(RPORT_PARAM)
    }

    /// Returns all the parameters, the well-known ones included.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{} {}", self.protocol, self.version, self.transport, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.params)
    }
}

impl HeaderParse for Via {
    /*
     * via-parm          =  sent-protocol LWS sent-by *( SEMI via-params )
     * via-params        =  via-ttl / via-maddr
     *                      / via-received / via-branch
     *                      / via-extension
     * sent-protocol     =  protocol-name SLASH protocol-version
     *                      SLASH transport
     * protocol-name     =  "SIP" / token
     * protocol-version  =  token
     * sent-by           =  host [ COLON port ]
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        parser.lws();
        let protocol = parser.parse_token("protocol name")?.into();
        parser.lws();
        parser.must_read(b'/')?;
        parser.lws();
        let version = parser.parse_token("protocol version")?.into();
        parser.lws();
        parser.must_read(b'/')?;
        parser.lws();
        let transport = parser.parse_token("transport")?.to_ascii_uppercase().into();
        parser.lws();

        let (host, port) = parser.parse_host_port()?;
        let params = parser.parse_header_params()?;

        let rport = match params.get_named(RPORT_PARAM) {
            Some(rport) if !rport.is_empty() => match rport.parse() {
                Ok(rport) => Some(rport),
                Err(_) => return Err(GrammarFault::new(format!("Via param rport '{rport}' is invalid"))),
            },
            _ => None,
        };

        parser.lws();
        if parser.peek() == Some(b'(') {
            parser.skip_comment()?;
        }

        Ok(Via {
            protocol,
            version,
            transport,
            host,
            port,
            rport,
            params,
        })
    }
}

/// The `Via` header: every `via-parm` of every `Via` line, in wire order.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ViaList(Vec<Via>);

impl ViaList {
    /// Appends the entries of `other`.
    pub fn extend(&mut self, other: ViaList) {
        self.0.extend(other.0)
    }

    /// Returns the topmost entry.
    pub fn top(&self) -> Option<&Via> {
        self.0.first()
    }
}

impl Deref for ViaList {
    type Target = [Via];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ViaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(", "))
    }
}

impl HeaderParse for ViaList {
    /*
     * Via               =  ( "Via" / "v" ) HCOLON via-parm *(COMMA via-parm)
     */
    fn parse(parser: &mut Parser<'_>) -> ParseResult<Self> {
        let mut entries = Vec::with_capacity(1);
        comma_separated!(parser => {
            entries.push(Via::parse(parser)?)
        });

        Ok(ViaList(entries))
    }
}
