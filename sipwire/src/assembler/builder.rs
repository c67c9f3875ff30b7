use std::sync::Arc;

use tracing::Span;

use super::{FrameAssembler, ParseState};
use crate::registry::HeaderRegistry;

/// Default limit for a start-line or an unfolded header line.
pub const DEFAULT_MAX_LINE_LEN: usize = 8 * 1024;

/// Default limit for a message body.
pub const DEFAULT_MAX_BODY_LEN: usize = 1024 * 1024;

/// How message boundaries are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Byte stream, as over TCP or TLS. The body length comes from
    /// `Content-Length`, zero when absent.
    #[default]
    Stream,
    /// One feed is one whole datagram, as over UDP. Without
    /// `Content-Length` the body is the rest of the datagram; bytes past the
    /// body are discarded.
    Datagram,
}

/// What happens to a header value that fails its grammar.
///
/// The [`HeaderFault`](crate::error::HeaderFault) is recorded on the message
/// in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderFaultPolicy {
    /// Keep the value as [`Header::Text`](crate::headers::Header::Text).
    #[default]
    KeepRaw,
    /// Drop the header.
    Drop,
}

/// Settings of a [`FrameAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Message boundaries.
    pub framing: Framing,
    /// Longest accepted start-line or unfolded header line.
    pub max_line_len: usize,
    /// Largest accepted `Content-Length`.
    pub max_body_len: usize,
    /// Handling of header values that fail their grammar.
    pub header_fault_policy: HeaderFaultPolicy,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            framing: Framing::Stream,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_body_len: DEFAULT_MAX_BODY_LEN,
            header_fault_policy: HeaderFaultPolicy::KeepRaw,
        }
    }
}

/// Builder for creating a new [`FrameAssembler`].
#[derive(Debug, Default)]
pub struct AssemblerBuilder {
    config: AssemblerConfig,
    registry: Option<Arc<HeaderRegistry>>,
    span: Option<Span>,
}

impl AssemblerBuilder {
    /// Creates a builder with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use sipwire::assembler::{AssemblerBuilder, Framing};
    ///
    /// let assembler = AssemblerBuilder::new()
    ///     .with_framing(Framing::Datagram)
    ///     .with_max_body_len(64 * 1024)
    ///     .build();
    ///
    /// assert_eq!(assembler.config().framing, Framing::Datagram);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the framing.
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.config.framing = framing;

        self
    }

    /// Shorthand for `with_framing(Framing::Datagram)`.
    pub fn with_datagram_framing(self) -> Self {
        self.with_framing(Framing::Datagram)
    }

    /// Sets the longest accepted line.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.config.max_line_len = max_line_len;

        self
    }

    /// Sets the largest accepted body.
    pub fn with_max_body_len(mut self, max_body_len: usize) -> Self {
        self.config.max_body_len = max_body_len;

        self
    }

    /// Sets the handling of header values that fail their grammar.
    pub fn with_header_fault_policy(mut self, policy: HeaderFaultPolicy) -> Self {
        self.config.header_fault_policy = policy;

        self
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;

        self
    }

    /// Sets the shared header registry. A default registry is created
    /// otherwise.
    pub fn with_registry(mut self, registry: Arc<HeaderRegistry>) -> Self {
        self.registry = Some(registry);

        self
    }

    /// Sets the span every event of the assembler is emitted under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);

        self
    }

    /// Finalize the builder into a [`FrameAssembler`].
    pub fn build(self) -> FrameAssembler {
        FrameAssembler {
            config: self.config,
            registry: self.registry.unwrap_or_default(),
            span: self.span.unwrap_or_else(Span::none),
            state: ParseState::default(),
        }
    }
}
