//! Hand-off of completed messages.
//!
//! The [`MessageListener`] receives what a
//! [`FrameAssembler`](crate::assembler::FrameAssembler) completes, and
//! [`SipCodec`] drives an assembler from a `tokio_util` framed transport.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::message::{Message, Request, Response};

mod decoder;

pub use decoder::SipCodec;

/// Receives the messages completed by an assembler.
///
/// Each fully framed message is delivered exactly once, in arrival order.
pub trait MessageListener {
    /// A request was completed.
    fn on_request(&mut self, request: Request);

    /// A response was completed.
    fn on_response(&mut self, response: Response);
}

impl MessageListener for Vec<Message> {
    fn on_request(&mut self, request: Request) {
        self.push(request.into());
    }

    fn on_response(&mut self, response: Response) {
        self.push(response.into());
    }
}

impl MessageListener for VecDeque<Message> {
    fn on_request(&mut self, request: Request) {
        self.push_back(request.into());
    }

    fn on_response(&mut self, response: Response) {
        self.push_back(response.into());
    }
}

impl MessageListener for mpsc::UnboundedSender<Message> {
    fn on_request(&mut self, request: Request) {
        if self.send(request.into()).is_err() {
            tracing::debug!("Receiver closed, request dropped");
        }
    }

    fn on_response(&mut self, response: Response) {
        if self.send(response.into()).is_err() {
            tracing::debug!("Receiver closed, response dropped");
        }
    }
}
