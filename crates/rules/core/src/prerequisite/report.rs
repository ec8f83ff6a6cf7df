/// A recorded failure.
///
/// `fail == false` marks an informational failure: shown to the user, but it
/// never blocks (GM-adjudicated conditions).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Failure {
    pub fail: bool,
    pub message: String,
}

impl Failure {
    pub fn hard(message: impl Into<String>) -> Self {
        Self {
            fail: true,
            message: message.into(),
        }
    }

    pub fn soft(message: impl Into<String>) -> Self {
        Self {
            fail: false,
            message: message.into(),
        }
    }
}

/// A satisfied node and how many times it was satisfied.
///
/// Ownership leaves count every qualifying match, which is what `Or` nodes
/// with a `count` above one add up.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Success {
    pub prerequisite: String,
    pub count: u32,
}

/// Result of evaluating prerequisites against a target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrerequisiteReport {
    /// True iff any recorded failure, visible or silent, is hard.
    pub does_fail: bool,
    pub failures: Vec<Failure>,
    /// Details explaining why owned entities did not qualify; not meant for
    /// the top-level summary.
    pub silent_failures: Vec<Failure>,
    pub successes: Vec<Success>,
}

impl PrerequisiteReport {
    /// Human-readable messages of the blocking failures.
    pub fn blocking_messages(&self) -> Vec<&str> {
        self.failures
            .iter()
            .filter(|failure| failure.fail)
            .map(|failure| failure.message.as_str())
            .collect()
    }

    pub fn success_count(&self) -> u32 {
        self.successes.iter().map(|success| success.count).sum()
    }
}

/// Working state for one subtree; folded into a report at the end.
#[derive(Debug, Default)]
pub(super) struct Outcome {
    pub failures: Vec<Failure>,
    pub silent_failures: Vec<Failure>,
    pub successes: Vec<Success>,
}

impl Outcome {
    pub fn blocks(&self) -> bool {
        self.failures
            .iter()
            .chain(&self.silent_failures)
            .any(|failure| failure.fail)
    }

    pub fn success_count(&self) -> u32 {
        self.successes.iter().map(|success| success.count).sum()
    }

    pub fn absorb_failures(&mut self, other: Outcome) {
        self.failures.extend(other.failures);
        self.silent_failures.extend(other.silent_failures);
    }

    pub fn into_report(self) -> PrerequisiteReport {
        PrerequisiteReport {
            does_fail: self.blocks(),
            failures: self.failures,
            silent_failures: self.silent_failures,
            successes: self.successes,
        }
    }
}
