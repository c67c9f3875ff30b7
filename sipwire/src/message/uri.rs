use std::fmt;
use std::str::FromStr;

use util::ArcStr;

use crate::error::GrammarFault;
use crate::parser::Parser;

use super::Params;

/// The URI schemes recognized in front of a URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// `sip:`
    Sip,
    /// `sips:`
    Sips,
    /// `tel:`
    Tel,
    /// `mailto:`
    Mailto,
}

impl Scheme {
    /// Returns the scheme matching `bytes`, ignoring case.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        [Scheme::Sip, Scheme::Sips, Scheme::Tel, Scheme::Mailto]
            .into_iter()
            .find(|scheme| scheme.as_str().as_bytes().eq_ignore_ascii_case(bytes))
    }

    /// Returns the scheme name, lowercased.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Sip => "sip",
            Scheme::Sips => "sips",
            Scheme::Tel => "tel",
            Scheme::Mailto => "mailto",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URI as it appears in the Request-URI and in address headers.
///
/// The scheme is optional so that bare `user@domain` forms survive parsing.
/// Equality follows RFC3261 19.1.4 loosely: scheme and domain compare
/// without case, user and password with case, and parameters as a set.
///
/// # Examples
///
/// ```
/// use sipwire::message::{Scheme, SipUri};
///
/// let uri: SipUri = "sip:alice@Atlanta.com:5061;transport=tcp".parse().unwrap();
///
/// assert_eq!(uri.scheme(), Some(Scheme::Sip));
/// assert_eq!(uri.user(), Some("alice"));
/// assert_eq!(uri.port(), Some(5061));
/// assert_eq!(uri.transport_param(), Some("tcp"));
/// assert_eq!(uri, "SIP:alice@atlanta.com:5061;transport=tcp".parse().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct SipUri {
    pub(crate) scheme: Option<Scheme>,
    pub(crate) user: Option<ArcStr>,
    pub(crate) password: Option<ArcStr>,
    pub(crate) domain: ArcStr,
    pub(crate) port: Option<u16>,
    pub(crate) params: Params,
    pub(crate) headers: Option<ArcStr>,
}

impl SipUri {
    /// Returns the scheme, if one was written.
    pub fn scheme(&self) -> Option<Scheme> {
        self.scheme
    }

    /// Returns the user part.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns the password that followed the user, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the host. IPv6 references keep their brackets.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the port.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the URI parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the raw text after `?`.
    pub fn headers(&self) -> Option<&str> {
        self.headers.as_deref()
    }

    /// Returns `true` if the URI carries the `lr` parameter.
    pub fn is_loose(&self) -> bool {
        self.params.contains("lr")
    }

    /// Returns the value of the `transport` parameter.
    pub fn transport_param(&self) -> Option<&str> {
        self.params.get_named("transport")
    }

    /// Returns the value of the `maddr` parameter.
    pub fn maddr_param(&self) -> Option<&str> {
        self.params.get_named("maddr")
    }

    /// Returns the value of the `user` parameter.
    pub fn user_param(&self) -> Option<&str> {
        self.params.get_named("user")
    }
}

impl PartialEq for SipUri {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.user == other.user
            && self.password == other.password
            && self.domain.eq_ignore_ascii_case(&other.domain)
            && self.port == other.port
            && self.params == other.params
            && self.headers == other.headers
    }
}

impl Eq for SipUri {}

impl fmt::Display for SipUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = self.scheme {
            write!(f, "{scheme}:")?;
        }
        if let Some(user) = &self.user {
            f.write_str(user)?;
            if let Some(password) = &self.password {
                write!(f, ":{password}")?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.domain)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.params)?;
        if let Some(headers) = &self.headers {
            write!(f, "?{headers}")?;
        }
        Ok(())
    }
}

impl FromStr for SipUri {
    type Err = GrammarFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let uri = parser.parse_uri(true)?;
        parser.finish()?;

        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_display_round_trip() {
        let text = "sips:bob:secret@[2001:db8::10]:5061;maddr=10.0.0.1;lr?subject=project";
        let uri: SipUri = text.parse().unwrap();

        assert_eq!(uri.to_string(), text);
        assert_eq!(uri.domain(), "[2001:db8::10]");
        assert_eq!(uri.password(), Some("secret"));
        assert_eq!(uri.maddr_param(), Some("10.0.0.1"));
        assert_eq!(uri.headers(), Some("subject=project"));
        assert!(uri.is_loose());
    }

    #[test]
    fn test_uri_equality() {
        let a: SipUri = "sip:carol@chicago.com;security=on;transport=tcp".parse().unwrap();
        let b: SipUri = "sip:carol@CHICAGO.com;transport=tcp;security=on".parse().unwrap();
        let c: SipUri = "sip:Carol@chicago.com;transport=tcp;security=on".parse().unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_scheme_from_bytes() {
        assert_eq!(Scheme::from_bytes(b"SIPS"), Some(Scheme::Sips));
        assert_eq!(Scheme::from_bytes(b"http"), None);
    }
}
