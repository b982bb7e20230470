use tracing::info;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    Extract,
    Evaluate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Evaluate => "evaluate",
        }
    }
}

/// Receives discrete progress events from the pipeline. Implementations hold
/// no timing state of their own; everything they need arrives in the call.
pub trait ProgressSink {
    fn advance(&self, stage: Stage, completed: usize, total: usize);
}

pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn advance(&self, stage: Stage, completed: usize, total: usize) {
        info!(stage = stage.as_str(), completed, total, "progress");
    }
}
