//! Incremental message framing.
//!
//! A [`FrameAssembler`] turns the bytes of one connection, or the datagrams
//! of one peer, into complete [`Message`]s. Bytes can arrive in arbitrary
//! pieces: the assembler consumes what it can, tells the caller how much
//! that was, and picks up where it left off on the next call.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::BytesMut;
use tracing::Span;
use util::Scanner;

use crate::error::{FeedError, FramingFault, GrammarFault, HeaderFault};
use crate::headers::{Header, Headers};
use crate::message::{Message, Request, Response, StartLine};
use crate::parser::{to_arcstr, trim, Parser};
use crate::registry::HeaderRegistry;
use crate::transport::MessageListener;

mod builder;

pub use builder::*;

/// Where the assembler is within the current message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Waiting for a request line or a status line. Blank lines are skipped.
    #[default]
    AwaitingStartLine,
    /// Reading header lines until the empty line.
    AwaitingHeaders,
    /// Reading `remaining` more body bytes.
    AwaitingBody {
        /// Body bytes still expected.
        remaining: usize,
    },
    /// A message was handed to the listener. Transient: the assembler moves
    /// on to [`Stage::AwaitingStartLine`] right after.
    Complete,
    /// Skipping lines after a framing fault until a valid start-line shows up.
    Resync,
}

/// The message under construction.
#[derive(Debug)]
struct Pending {
    start: StartLine,
    headers: Headers,
    faults: Vec<HeaderFault>,
}

impl Pending {
    fn into_message(self, body: bytes::Bytes) -> Message {
        let Pending { start, headers, faults } = self;

        match start {
            StartLine::Request(req_line) => Message::Request(Request {
                req_line,
                headers,
                body,
                faults,
            }),
            StartLine::Response(status_line) => Message::Response(Response {
                status_line,
                headers,
                body,
                faults,
            }),
        }
    }
}

/// Per-connection parse state.
///
/// Holds at most one message under construction. The body buffer outlives
/// the messages so its allocation is reused.
#[derive(Debug, Default)]
pub struct ParseState {
    stage: Stage,
    pending: Option<Pending>,
    body: BytesMut,
}

/// Assembles messages out of the bytes of one connection.
///
/// # Examples
///
/// ```
/// use sipwire::assembler::FrameAssembler;
/// use sipwire::message::Message;
///
/// let mut assembler = FrameAssembler::builder().build();
/// let mut messages: Vec<Message> = Vec::new();
///
/// let input = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\nContent-Length: 0\r\n\r\n";
/// let (first, second) = input.split_at(20);
///
/// let consumed = assembler.feed(first, &mut messages).unwrap();
/// assert!(messages.is_empty());
///
/// // The caller keeps the unconsumed bytes and appends the new ones.
/// let mut rest = first[consumed..].to_vec();
/// rest.extend_from_slice(second);
/// assembler.feed(&rest, &mut messages).unwrap();
///
/// assert_eq!(messages.len(), 1);
/// ```
#[derive(Debug)]
pub struct FrameAssembler {
    pub(crate) config: AssemblerConfig,
    pub(crate) registry: Arc<HeaderRegistry>,
    pub(crate) span: Span,
    pub(crate) state: ParseState,
}

impl FrameAssembler {
    /// Creates an assembler with the default configuration.
    pub fn new() -> Self {
        AssemblerBuilder::new().build()
    }

    /// Returns a builder to configure a new assembler.
    pub fn builder() -> AssemblerBuilder {
        AssemblerBuilder::new()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Returns the header registry.
    pub fn registry(&self) -> &Arc<HeaderRegistry> {
        &self.registry
    }

    /// Returns the span events are emitted under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Returns the current stage.
    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    /// Feeds bytes to the assembler.
    ///
    /// Every message completed by these bytes is handed to `listener`, in
    /// order. Returns the number of bytes consumed.
    ///
    /// With [`Framing::Stream`] only whole lines are consumed, and a header
    /// line only once the byte after it shows it is not folded. The caller
    /// keeps the unconsumed tail and feeds it again, followed by the next
    /// bytes read. Feeding should be repeated until no progress is made.
    ///
    /// With [`Framing::Datagram`], `buf` is a whole datagram and is always
    /// consumed entirely.
    ///
    /// # Errors
    ///
    /// A [`FeedError`] when the current message cannot be framed. The
    /// message is dropped and, for streams, the assembler skips input until
    /// the next start-line. `FeedError::consumed` tells how much of `buf`
    /// was used up.
    pub fn feed<L>(&mut self, buf: &[u8], listener: &mut L) -> Result<usize, FeedError>
    where
        L: MessageListener + ?Sized,
    {
        match self.config.framing {
            Framing::Stream => self.run(buf, false, listener),
            Framing::Datagram => {
                if self.state.stage != Stage::AwaitingStartLine {
                    self.reset();
                }
                let result = self.run(buf, true, listener).and_then(|_| self.end_of_datagram());
                if let Err(err) = result {
                    self.reset();
                    return Err(FeedError {
                        consumed: buf.len(),
                        fault: err.fault,
                    });
                }
                Ok(buf.len())
            }
        }
    }

    /// Discards the message under construction, as when its connection
    /// closes.
    pub fn abandon(&mut self) {
        if self.state.pending.is_some() || self.state.stage != Stage::AwaitingStartLine {
            tracing::debug!(parent: &self.span, stage = ?self.state.stage, "Discarding partial message");
        }
        self.reset();
    }

    /// Restores the initial state, keeping the body buffer allocation.
    pub fn reset(&mut self) {
        self.state.pending = None;
        self.state.body.clear();
        self.state.stage = Stage::AwaitingStartLine;
    }

    fn run<L>(&mut self, buf: &[u8], last: bool, listener: &mut L) -> Result<usize, FeedError>
    where
        L: MessageListener + ?Sized,
    {
        let max_line_len = self.config.max_line_len;
        let mut pos = 0;

        loop {
            let rest = &buf[pos..];

            match self.state.stage {
                Stage::AwaitingStartLine | Stage::Resync => {
                    let resync = self.state.stage == Stage::Resync;
                    let Some(used) = next_line(rest, last) else {
                        if rest.len() > max_line_len {
                            if resync {
                                pos = buf.len();
                                break;
                            }
                            return Err(self.fault(buf.len(), FramingFault::LineTooLong { limit: max_line_len }));
                        }
                        break;
                    };
                    pos += used;

                    let line = strip_eol(&rest[..used]);
                    if line.is_empty() {
                        // Keep-alive.
                        continue;
                    }
                    if line.len() > max_line_len && !resync {
                        return Err(self.fault(pos, FramingFault::LineTooLong { limit: max_line_len }));
                    }
                    match Parser::new(line).parse_start_line() {
                        Ok(start) => self.begin(start),
                        Err(err) if resync => {
                            tracing::trace!(parent: &self.span, "Skipping line while resyncing: {err}");
                        }
                        Err(err) => return Err(self.fault(pos, FramingFault::StartLine(err))),
                    }
                }
                Stage::AwaitingHeaders => {
                    let blank = match rest {
                        [b'\n', ..] => Some(1),
                        [b'\r', b'\n', ..] => Some(2),
                        [b'\r'] if last => Some(1),
                        _ => None,
                    };
                    if let Some(used) = blank {
                        pos += used;
                        if let Err(fault) = self.end_headers(buf.len() - pos) {
                            return Err(self.fault(pos, fault));
                        }
                        continue;
                    }

                    let Some(used) = logical_line(rest, last) else {
                        if rest.len() > max_line_len {
                            return Err(self.fault(buf.len(), FramingFault::LineTooLong { limit: max_line_len }));
                        }
                        break;
                    };
                    pos += used;

                    if used > max_line_len {
                        return Err(self.fault(pos, FramingFault::LineTooLong { limit: max_line_len }));
                    }
                    let line = unfold(&rest[..used]);
                    if let Err(fault) = self.on_header(&line) {
                        return Err(self.fault(pos, fault));
                    }
                }
                Stage::AwaitingBody { remaining } => {
                    let take = remaining.min(rest.len());
                    self.state.body.extend_from_slice(&rest[..take]);
                    pos += take;

                    if take < remaining {
                        self.set_stage(Stage::AwaitingBody {
                            remaining: remaining - take,
                        });
                        break;
                    }
                    self.complete(listener);

                    if last {
                        let trailing = buf.len() - pos;
                        if trailing > 0 {
                            tracing::trace!(parent: &self.span, "Discarding {trailing} bytes after the message");
                        }
                        pos = buf.len();
                        break;
                    }
                }
                Stage::Complete => self.set_stage(Stage::AwaitingStartLine),
            }
        }

        Ok(pos)
    }

    fn begin(&mut self, start: StartLine) {
        self.state.pending = Some(Pending {
            start,
            headers: Headers::with_capacity(16),
            faults: Vec::new(),
        });
        self.state.body.clear();
        self.set_stage(Stage::AwaitingHeaders);
    }

    fn on_header(&mut self, line: &[u8]) -> Result<(), FramingFault> {
        let span = &self.span;
        let policy = self.config.header_fault_policy;
        let Some(pending) = self.state.pending.as_mut() else {
            return Ok(());
        };
        let mut scanner = Scanner::new(line);
        let name = scanner.read_word();
        scanner.skip_ws();

        if name.is_empty() || scanner.consume(b":").is_none() {
            tracing::debug!(parent: span, "Dropping header line without ':'");
            pending.faults.push(HeaderFault {
                name: to_arcstr(name),
                value: to_arcstr(line),
                fault: GrammarFault::new("Missing ':' after header name"),
            });
            return Ok(());
        }
        let value = trim(scanner.remaining());

        let Some(registration) = self.registry.lookup(name) else {
            pending.headers.insert(&to_arcstr(name), Header::Text(to_arcstr(value)));
            return Ok(());
        };

        let fault = match registration.kind().parse(value) {
            Ok(header) => match pending.headers.append(registration.key(), header) {
                Ok(()) => return Ok(()),
                Err(fault) => fault,
            },
            Err(fault) if registration.key() == "content-length" => {
                return Err(FramingFault::ContentLength(fault));
            }
            Err(fault) => {
                // A raw value must not replace entries merged from earlier
                // lines of the same header.
                if policy == HeaderFaultPolicy::KeepRaw && !pending.headers.contains(registration.key()) {
                    pending.headers.insert(registration.key(), Header::Text(to_arcstr(value)));
                }
                fault
            }
        };
        tracing::debug!(parent: span, header = registration.name(), "Invalid header: {fault}");
        pending.faults.push(HeaderFault {
            name: to_arcstr(name),
            value: to_arcstr(value),
            fault,
        });
        Ok(())
    }

    fn end_headers(&mut self, available: usize) -> Result<(), FramingFault> {
        let content_length = self
            .state
            .pending
            .as_ref()
            .and_then(|pending| pending.headers.content_length());

        let length = match (content_length, self.config.framing) {
            (Some(length), _) => length as usize,
            (None, Framing::Datagram) => available,
            (None, Framing::Stream) => 0,
        };
        if length > self.config.max_body_len {
            return Err(FramingFault::BodyTooLarge {
                length,
                limit: self.config.max_body_len,
            });
        }
        self.state.body.reserve(length);
        self.set_stage(Stage::AwaitingBody { remaining: length });

        Ok(())
    }

    fn end_of_datagram(&mut self) -> Result<(), FeedError> {
        let fault = match self.state.stage {
            Stage::AwaitingHeaders => FramingFault::UnterminatedHeaders,
            Stage::AwaitingBody { remaining } => {
                let received = self.state.body.len();
                FramingFault::TruncatedBody {
                    expected: received + remaining,
                    received,
                }
            }
            _ => return Ok(()),
        };

        Err(FeedError { consumed: 0, fault })
    }

    fn complete<L>(&mut self, listener: &mut L)
    where
        L: MessageListener + ?Sized,
    {
        self.set_stage(Stage::Complete);
        let body = self.state.body.split().freeze();

        if let Some(pending) = self.state.pending.take() {
            match pending.into_message(body) {
                Message::Request(request) => {
                    tracing::debug!(
                        parent: &self.span,
                        faults = request.faults.len(),
                        "=> Request {} {}",
                        request.req_line.method,
                        request.req_line.uri
                    );
                    listener.on_request(request);
                }
                Message::Response(response) => {
                    tracing::debug!(
                        parent: &self.span,
                        faults = response.faults.len(),
                        "=> Response {} {}",
                        response.status_line.code,
                        response.status_line.reason
                    );
                    listener.on_response(response);
                }
            }
        }
        self.set_stage(Stage::AwaitingStartLine);
    }

    fn fault(&mut self, consumed: usize, fault: FramingFault) -> FeedError {
        tracing::debug!(parent: &self.span, "Dropping message: {fault}");
        self.state.pending = None;
        self.state.body.clear();
        self.set_stage(Stage::Resync);

        FeedError { consumed, fault }
    }

    fn set_stage(&mut self, stage: Stage) {
        tracing::trace!(parent: &self.span, "State Changed [{:?} -> {:?}]", self.state.stage, stage);
        self.state.stage = stage;
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the next physical line, terminator included.
fn next_line(rest: &[u8], last: bool) -> Option<usize> {
    match rest.iter().position(|&b| b == b'\n') {
        Some(i) => Some(i + 1),
        None if last && !rest.is_empty() => Some(rest.len()),
        None => None,
    }
}

/// Length of the next logical header line, continuation lines included.
///
/// Returns `None` until the byte after a line break is known, since a
/// following space or tab folds the next line into this one.
fn logical_line(rest: &[u8], last: bool) -> Option<usize> {
    let mut used = 0;

    loop {
        match rest[used..].iter().position(|&b| b == b'\n') {
            Some(i) => {
                used += i + 1;
                match rest.get(used) {
                    Some(b' ' | b'\t') => continue,
                    Some(_) => return Some(used),
                    None if last => return Some(used),
                    None => return None,
                }
            }
            None if last && used < rest.len() => return Some(rest.len()),
            None => return None,
        }
    }
}

fn strip_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Joins folded lines with a single space.
fn unfold(raw: &[u8]) -> Cow<'_, [u8]> {
    let line = strip_eol(raw);
    if !line.contains(&b'\n') {
        return Cow::Borrowed(line);
    }

    let mut unfolded = Vec::with_capacity(line.len());
    for (i, part) in line.split(|&b| b == b'\n').enumerate() {
        if i > 0 {
            unfolded.push(b' ');
        }
        unfolded.extend_from_slice(part.strip_suffix(b"\r").unwrap_or(part));
    }
    Cow::Owned(unfolded)
}

#[cfg(test)]
mod tests;
