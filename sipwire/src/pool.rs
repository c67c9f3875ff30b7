//! Shared pool of reusable items.
//!
//! Items are created lazily by a factory and handed out with
//! [`Pool::dequeue`]. Returning them with [`Pool::enqueue`] is voluntary; an
//! item that is never returned is simply dropped. The pool never blocks and
//! never bounds its size.

use std::fmt;

use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::Span;

use crate::assembler::FrameAssembler;

/// A pool of byte buffers.
pub type BufferPool = Pool<BytesMut>;

/// A pool of assemblers, one per live connection.
pub type AssemblerPool = Pool<FrameAssembler>;

/// A thread-safe free list with a factory.
///
/// # Examples
///
/// ```
/// use sipwire::pool::BufferPool;
/// use bytes::BytesMut;
///
/// let pool = BufferPool::new(|| BytesMut::with_capacity(4096));
///
/// let mut buf = pool.dequeue();
/// buf.extend_from_slice(b"OPTIONS");
/// buf.clear();
/// pool.enqueue(buf);
///
/// assert_eq!(pool.len(), 1);
/// ```
pub struct Pool<T> {
    free: Mutex<Vec<T>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    span: Span,
}

impl<T> Pool<T> {
    /// Creates an empty pool building items with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            free: Mutex::new(Vec::new()),
            factory: Box::new(factory),
            span: Span::none(),
        }
    }

    /// Sets the span every event of the pool is emitted under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;

        self
    }

    /// Takes an idle item, or creates one.
    pub fn dequeue(&self) -> T {
        let idle = self.free.lock().pop();

        match idle {
            Some(item) => item,
            None => {
                tracing::trace!(parent: &self.span, "Pool empty, creating item");
                (self.factory)()
            }
        }
    }

    /// Returns an item. The caller resets it before giving it back.
    pub fn enqueue(&self, item: T) {
        self.free.lock().push(item);
    }

    /// Creates `count` items ahead of use.
    pub fn prefill(&self, count: usize) {
        let items: Vec<T> = (0..count).map(|_| (self.factory)()).collect();

        self.free.lock().extend(items);
    }

    /// Returns the number of idle items.
    pub fn len(&self) -> usize {
        self.free.lock().len()
    }

    /// Returns `true` if no item is idle.
    pub fn is_empty(&self) -> bool {
        self.free.lock().is_empty()
    }
}

impl AssemblerPool {
    /// Returns an assembler to the pool after discarding any partial
    /// message it holds.
    pub fn release(&self, mut assembler: FrameAssembler) {
        assembler.abandon();
        self.enqueue(assembler);
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").field("idle", &self.len()).finish()
    }
}
