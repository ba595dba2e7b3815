/// Handle for one chapter request. Only tickets from the latest
/// [`ReadingSession::open`] are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Display-side state of progressive reading: the chapter the reader
/// opened plus the chapters appended below it as they scroll.
///
/// Opening a chapter supersedes every request still in flight; results
/// for superseded tickets must be dropped by the caller when
/// [`ReadingSession::complete_open`] or
/// [`ReadingSession::finish_append`] returns false.
#[derive(Debug, Default)]
pub struct ReadingSession {
    generation: u64,
    pending: Option<usize>,
    loaded: Vec<usize>,
    appending: bool,
}

impl ReadingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `index` from scratch.
    pub fn open(&mut self, index: usize) -> Ticket {
        self.generation += 1;
        self.pending = Some(index);
        self.loaded.clear();
        self.appending = false;
        Ticket(self.generation)
    }

    /// Record the opened chapter as displayed. False for a stale ticket.
    pub fn complete_open(&mut self, ticket: Ticket) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        match self.pending.take() {
            Some(index) => {
                self.loaded = vec![index];
                true
            }
            None => false,
        }
    }

    /// Reserve the chapter after the last one displayed, if any.
    ///
    /// At most one append runs at a time; `None` while one is in flight,
    /// before the opened chapter is displayed, or at the end of a
    /// catalog of `catalog_len` entries.
    pub fn begin_append(&mut self, catalog_len: usize) -> Option<(Ticket, usize)> {
        if self.appending {
            return None;
        }
        let next = self.loaded.last()?.checked_add(1)?;
        if next >= catalog_len {
            return None;
        }
        self.appending = true;
        Some((Ticket(self.generation), next))
    }

    /// Record an appended chapter as displayed. False for a stale
    /// ticket, whose result must be discarded.
    pub fn finish_append(&mut self, ticket: Ticket, index: usize) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.appending = false;
        self.loaded.push(index);
        true
    }

    /// Release the append slot after a failed fetch.
    pub fn abort_append(&mut self, ticket: Ticket) {
        if ticket.0 == self.generation {
            self.appending = false;
        }
    }

    /// Chapter indices on display, in order.
    pub fn loaded(&self) -> &[usize] {
        &self.loaded
    }

    /// The chapter the reader opened, once displayed.
    pub fn current(&self) -> Option<usize> {
        self.loaded.first().copied()
    }

    pub fn has_more(&self, catalog_len: usize) -> bool {
        self.loaded
            .last()
            .is_some_and(|last| last + 1 < catalog_len)
    }
}
