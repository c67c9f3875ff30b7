//! # sipwire
//!
//! Decoding of SIP (RFC3261) messages off the wire.
//!
//! Bytes read from a stream or a datagram socket are fed to a
//! [`FrameAssembler`](assembler::FrameAssembler), which frames them into
//! [`Message`](message::Message)s with typed headers. Header grammars are
//! dispatched through a shared [`HeaderRegistry`](registry::HeaderRegistry),
//! and assemblers and buffers can be recycled through a [`pool::Pool`].
//!
//! ```
//! use sipwire::assembler::FrameAssembler;
//! use sipwire::message::Message;
//!
//! let mut assembler = FrameAssembler::new();
//! let mut messages: Vec<Message> = Vec::new();
//!
//! let input = b"REGISTER sip:registrar.biloxi.com SIP/2.0\r\n\
//!     Via: SIP/2.0/UDP bobspc.biloxi.com:5060;branch=z9hG4bKnashds7\r\n\
//!     v: SIP/2.0/UDP relay.biloxi.com;branch=z9hG4bK4b43c2ff8.1\r\n\
//!     To: Bob <sip:bob@biloxi.com>\r\n\
//!     f: Bob <sip:bob@biloxi.com>;tag=456248\r\n\
//!     CSeq: 1826 REGISTER\r\n\
//!     l: 0\r\n\r\n";
//!
//! assembler.feed(input, &mut messages).unwrap();
//!
//! let headers = messages[0].headers();
//! assert_eq!(headers.via().unwrap().len(), 2);
//! assert_eq!(headers.from().unwrap().tag(), Some("456248"));
//! assert_eq!(headers.cseq().unwrap().seq, 1826);
//! ```

pub mod assembler;
pub mod error;
pub mod headers;
pub mod message;
pub mod parser;
pub mod pool;
pub mod registry;
pub mod transport;

pub(crate) mod macros;

pub use error::{Error, Result};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
