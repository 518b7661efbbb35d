//! Savepoint bookkeeping shared by every rewindable stream.

use crate::errors::{RecognitionError, RecognitionResult};

/// Handle returned by `mark()`.
///
/// A mark remembers its depth on the mark stack and a serial number, so a
/// handle that was popped (by rewinding an older mark) is rejected even if a
/// newer mark now occupies the same depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mark {
    depth: usize,
    serial: u64,
}

impl Mark {
    /// Position of this mark on the stack (0 is outermost).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// LIFO stack of saved stream positions.
#[derive(Debug, Clone)]
pub struct MarkStack<P> {
    entries: Vec<(u64, P)>,
    next_serial: u64,
}

impl<P> Default for MarkStack<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_serial: 0,
        }
    }
}

impl<P: Clone> MarkStack<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, position: P) -> Mark {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.entries.push((serial, position));
        Mark {
            depth: self.entries.len() - 1,
            serial,
        }
    }

    /// Pop `mark` and every mark taken after it, returning the saved position.
    pub fn rewind(&mut self, mark: Mark) -> RecognitionResult<P> {
        let position = self.lookup(mark)?;
        self.entries.truncate(mark.depth);
        Ok(position)
    }

    /// Pop `mark` without restoring it. Only the innermost mark may be
    /// released.
    pub fn release(&mut self, mark: Mark) -> RecognitionResult<()> {
        self.lookup(mark)?;
        if mark.depth + 1 != self.entries.len() {
            return Err(RecognitionError::invalid_argument(format!(
                "release of mark at depth {} while {} marks are open",
                mark.depth,
                self.entries.len()
            )));
        }
        self.entries.pop();
        Ok(())
    }

    /// Saved position of a live mark.
    pub fn lookup(&self, mark: Mark) -> RecognitionResult<P> {
        match self.entries.get(mark.depth) {
            Some((serial, position)) if *serial == mark.serial => Ok(position.clone()),
            _ => Err(RecognitionError::invalid_argument(format!(
                "stale mark at depth {}",
                mark.depth
            ))),
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest saved position still open.
    pub fn outermost(&self) -> Option<&P> {
        self.entries.first().map(|(_, p)| p)
    }
}
