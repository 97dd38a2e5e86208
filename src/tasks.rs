//! In-flight tracking for asynchronous remote tasks.
//!
//! One slot per task kind: a second submission while a kind is already
//! in flight is refused outright, never queued.

/// Categories of asynchronous remote work, tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Image search against the remote collection
    Search,
    /// AI analysis of the open image
    Analysis,
    /// Cross-image pattern discovery
    Discovery,
    /// Label create/delete (shared slot for both mutations)
    LabelMutation,
}

impl TaskKind {
    /// Display name for logs and status output.
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Search => "search",
            TaskKind::Analysis => "analysis",
            TaskKind::Discovery => "discovery",
            TaskKind::LabelMutation => "label-mutation",
        }
    }

    fn slot(&self) -> usize {
        match self {
            TaskKind::Search => 0,
            TaskKind::Analysis => 1,
            TaskKind::Discovery => 2,
            TaskKind::LabelMutation => 3,
        }
    }
}

/// Tracks at most one outstanding request per task kind.
#[derive(Debug, Default)]
pub struct TaskTracker {
    in_flight: [bool; 4],
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` in-flight.
    ///
    /// Returns `false` (with no state change) if the kind is already busy.
    pub fn begin(&mut self, kind: TaskKind) -> bool {
        let slot = &mut self.in_flight[kind.slot()];
        if *slot {
            log::debug!("suppressed duplicate {} request", kind.name());
            return false;
        }
        *slot = true;
        true
    }

    /// Release `kind` back to idle.
    ///
    /// Called on every completion path, success or failure, so a failed
    /// request can never leave a kind stuck busy. Idempotent.
    pub fn end(&mut self, kind: TaskKind) {
        self.in_flight[kind.slot()] = false;
    }

    /// Whether `kind` currently has a request in flight.
    pub fn is_busy(&self, kind: TaskKind) -> bool {
        self.in_flight[kind.slot()]
    }

    /// Whether any kind is in flight.
    pub fn any_busy(&self) -> bool {
        self.in_flight.iter().any(|b| *b)
    }
}
