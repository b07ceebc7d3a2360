/// Pipeline state definitions for tracking a run
///
/// A run moves forward through these states exactly once; no state is
/// re-entered.
use std::fmt;

/// Represents the current phase of a harvesting run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Nothing has happened yet
    Init,

    /// Fetching the listing root to learn the page count
    Probing,

    /// Fetching and extracting listing pages
    Crawling,

    /// Writing the collected records
    Exporting,

    /// Run finished and the output file is complete
    Done,

    /// Run aborted; no further work is attempted
    Failed,
}

impl PipelineState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if a run in `self` may move to `next`
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Probing)
                | (Self::Probing, Self::Crawling)
                | (Self::Probing, Self::Failed)
                | (Self::Crawling, Self::Exporting)
                | (Self::Crawling, Self::Failed)
                | (Self::Exporting, Self::Done)
                | (Self::Exporting, Self::Failed)
        )
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Probing => "probing",
            Self::Crawling => "crawling",
            Self::Exporting => "exporting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all states in pipeline order
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Init,
            Self::Probing,
            Self::Crawling,
            Self::Exporting,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
