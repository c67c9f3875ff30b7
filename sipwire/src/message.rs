#![deny(missing_docs)]
//! SIP message types
//!
//! The module provides the [`Message`] enum, which is either a
//! [`Message::Request`] or a [`Message::Response`], together with the URI and
//! parameter types shared by the start-line and the header grammars.

use bytes::Bytes;
use util::ArcStr;

use crate::assembler::FrameAssembler;
use crate::error::{Error, HeaderFault, Result};
use crate::headers::Headers;

mod method;
mod param;
mod uri;

pub use method::*;
pub use param::*;
pub(crate) use param::Quoted;
pub use uri::*;

/// A SIP message as defined in [RFC 3261].
///
/// [RFC 3261]: https://datatracker.ietf.org/doc/html/rfc3261
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// An SIP Request.
    Request(Request),
    /// An SIP Response.
    Response(Response),
}

impl Message {
    /// Parses one complete message held in `buf`.
    ///
    /// The buffer is framed like a datagram: bytes past the body are
    /// ignored and a body shorter than `Content-Length` is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sipwire::message::Message;
    ///
    /// let message = Message::parse(b"SIP/2.0 200 OK\r\nContent-Length: 0\r\n\r\n").unwrap();
    ///
    /// assert!(message.is_response());
    /// assert_eq!(message.response().unwrap().status_line.code, 200);
    /// ```
    pub fn parse(buf: &[u8]) -> Result<Message> {
        let mut assembler = FrameAssembler::builder().with_datagram_framing().build();
        let mut messages: Vec<Message> = Vec::with_capacity(1);

        assembler.feed(buf, &mut messages)?;

        messages.pop().ok_or(Error::Incomplete)
    }

    /// Returns `true` if this message is a [`Request`].
    pub const fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    /// Returns `true` if this message is a [`Response`].
    pub const fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    /// Returns a reference to the [`Request`] if this is a
    /// [`Message::Request`] variant.
    pub fn request(&self) -> Option<&Request> {
        if let Message::Request(request) = self {
            Some(request)
        } else {
            None
        }
    }

    /// Returns a reference to the [`Response`] if this is a
    /// [`Message::Response`] variant.
    pub fn response(&self) -> Option<&Response> {
        if let Message::Response(response) = self {
            Some(response)
        } else {
            None
        }
    }

    /// Returns a reference to the headers of the message.
    pub fn headers(&self) -> &Headers {
        match self {
            Message::Request(req) => &req.headers,
            Message::Response(res) => &res.headers,
        }
    }

    /// Returns the message body. Empty when the message has none.
    pub fn body(&self) -> &Bytes {
        match self {
            Message::Request(req) => &req.body,
            Message::Response(res) => &res.body,
        }
    }

    /// Returns the headers that failed their grammar.
    pub fn faults(&self) -> &[HeaderFault] {
        match self {
            Message::Request(req) => &req.faults,
            Message::Response(res) => &res.faults,
        }
    }
}

impl From<Request> for Message {
    fn from(request: Request) -> Self {
        Message::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Self {
        Message::Response(response)
    }
}

/// The first line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    /// `Method SP Request-URI SP SIP-Version`
    Request(RequestLine),
    /// `SIP-Version SP Status-Code SP Reason-Phrase`
    Response(StatusLine),
}

/// The first line of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// The request method.
    pub method: Method,
    /// The Request-URI.
    pub uri: SipUri,
    /// The protocol version, usually `SIP/2.0`.
    pub version: ArcStr,
}

/// The first line of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// The protocol version, usually `SIP/2.0`.
    pub version: ArcStr,
    /// The status code, between 100 and 699.
    pub code: u16,
    /// The reason phrase, possibly empty.
    pub reason: ArcStr,
}

/// A SIP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The request line.
    pub req_line: RequestLine,
    /// The parsed headers.
    pub headers: Headers,
    /// The message body.
    pub body: Bytes,
    pub(crate) faults: Vec<HeaderFault>,
}

impl Request {
    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.req_line.method
    }

    /// Returns the Request-URI.
    pub fn uri(&self) -> &SipUri {
        &self.req_line.uri
    }

    /// Returns the headers that failed their grammar.
    pub fn faults(&self) -> &[HeaderFault] {
        &self.faults
    }
}

/// A SIP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The status line.
    pub status_line: StatusLine,
    /// The parsed headers.
    pub headers: Headers,
    /// The message body.
    pub body: Bytes,
    pub(crate) faults: Vec<HeaderFault>,
}

impl Response {
    /// Returns the status code.
    pub fn code(&self) -> u16 {
        self.status_line.code
    }

    /// Returns the reason phrase.
    pub fn reason(&self) -> &str {
        &self.status_line.reason
    }

    /// Returns the headers that failed their grammar.
    pub fn faults(&self) -> &[HeaderFault] {
        &self.faults
    }
}
