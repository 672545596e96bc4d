//! Analysis steps and the lifecycle of their results.

use std::fmt;

/// The three session-keyed backend steps, in the order they must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Extract,
    Match,
    Categorize,
}

impl Step {
    /// Name used in export file names (`extract_20250101_120000.json`).
    pub fn name(&self) -> &'static str {
        match self {
            Step::Extract => "extract",
            Step::Match => "match",
            Step::Categorize => "categorize",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Extract => "Extract Attributes from Reviews",
            Step::Match => "Match with Seller Description",
            Step::Categorize => "Categorize Results",
        }
    }

    /// Step whose result must exist before this one can run.
    pub fn prerequisite(&self) -> Option<Step> {
        match self {
            Step::Extract => None,
            Step::Match => Some(Step::Extract),
            Step::Categorize => Some(Step::Match),
        }
    }

    pub fn all() -> &'static [Step] {
        &[Step::Extract, Step::Match, Step::Categorize]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// absent -> loading -> ready, reset to absent when upstream is redone.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StepState<T> {
    #[default]
    Absent,
    Loading,
    Ready(T),
}

impl<T> StepState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, StepState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, StepState::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            StepState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = StepState::Absent;
    }

    /// Store a result and hand back a reference to it.
    pub fn store(&mut self, value: T) -> &T {
        *self = StepState::Ready(value);
        match self {
            StepState::Ready(value) => value,
            _ => unreachable!("state was just set to Ready"),
        }
    }
}
