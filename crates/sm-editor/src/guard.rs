//! Scoped re-entrancy guards.
//!
//! Programmatic graph edits fire the same change notifications as user
//! edits. While a guard is held, handlers must not react to them. Holding is
//! tied to a value's lifetime so every exit path releases it.
//!
//! Hosts that deliver events after the editing call returns are covered too:
//! the guard also remembers the event sequence ranges emitted while it was
//! held, and handlers treat events in those ranges as muted.

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;

/// A nestable "updates suspended" flag.
#[derive(Debug, Clone, Default)]
pub struct UpdateGuard {
    depth: Rc<Cell<u32>>,
    muted: Vec<Range<u64>>,
}

/// Keeps an `UpdateGuard` held until dropped.
#[must_use = "the guard is released as soon as the hold is dropped"]
#[derive(Debug)]
pub struct GuardHold {
    depth: Rc<Cell<u32>>,
}

impl Drop for GuardHold {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl UpdateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self) -> GuardHold {
        self.depth.set(self.depth.get() + 1);
        GuardHold {
            depth: Rc::clone(&self.depth),
        }
    }

    pub fn is_held(&self) -> bool {
        self.depth.get() > 0
    }

    /// Remember that events in `range` were emitted while held.
    pub fn mute(&mut self, range: Range<u64>) {
        if range.is_empty() {
            return;
        }
        if let Some(last) = self.muted.last_mut()
            && last.end >= range.start
        {
            last.end = last.end.max(range.end);
            return;
        }
        self.muted.push(range);
    }

    /// Was event `seq` emitted while held? Ranges entirely before `seq` are
    /// forgotten, so events must be checked in emission order.
    pub fn is_muted(&mut self, seq: u64) -> bool {
        self.muted.retain(|r| r.end > seq);
        self.muted.first().is_some_and(|r| r.contains(&seq))
    }

    /// Forget every muted range.
    pub fn clear_muted(&mut self) {
        self.muted.clear();
    }

    pub fn has_muted(&self) -> bool {
        !self.muted.is_empty()
    }
}
