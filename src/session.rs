//! Bookkeeping between a host UI and the one report of a process.
//!
//! Hosts come and go (an Android Activity is recreated on rotation) while the
//! report is being built. A [`Session`] remembers the latest host, starts
//! the run only once, and hands the finished text to whichever host is
//! attached when it arrives, or to the next one that attaches.

/// What the caller of [`Session::attach`] should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attach {
    /// Start the run; pass the token to [`Session::finish`].
    Launch(RunToken),
    /// A run is in flight and will deliver to this host.
    Wait,
    /// The report is already built; show it.
    Deliver(String),
}

/// Identifies one run, so a run abandoned by [`Session::reset`] cannot
/// deliver into its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Done(String),
}

/// Run state shared by every host of one process.
#[derive(Debug)]
pub struct Session<H> {
    generation: u64,
    phase: Phase,
    host: Option<H>,
}

impl<H> Default for Session<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Session<H> {
    /// An idle session with no host.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: 0,
            phase: Phase::Idle,
            host: None,
        }
    }

    /// Make `host` the current host.
    pub fn attach(&mut self, host: H) -> Attach {
        self.host = Some(host);
        match &self.phase {
            Phase::Idle => {
                self.phase = Phase::Running;
                Attach::Launch(RunToken(self.generation))
            }
            Phase::Running => Attach::Wait,
            Phase::Done(report) => Attach::Deliver(report.clone()),
        }
    }

    /// The current host went away but another will replace it; the run
    /// keeps going.
    pub fn detach(&mut self) {
        self.host = None;
    }

    /// The host is gone for good; forget the run and any finished report.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
        self.host = None;
    }

    /// The current host, if one is attached.
    pub const fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    /// Store the finished report.
    ///
    /// Returns the host to deliver to now, or `None` when no host is
    /// attached (the next [`attach`](Self::attach) delivers it) or the run
    /// was abandoned.
    pub fn finish(&mut self, token: RunToken, report: String) -> Option<&H> {
        if token.0 != self.generation || self.phase != Phase::Running {
            return None;
        }
        self.phase = Phase::Done(report);
        self.host.as_ref()
    }
}
