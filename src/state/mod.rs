//! State tracking for a harvesting run
//!
//! A run walks `Init → Probing → Crawling → Exporting → Done`, with `Failed`
//! reachable from the three working phases.

mod pipeline_state;

pub use pipeline_state::PipelineState;
