use serde::{Deserialize, Serialize};

/// A contiguous region of difference between the original and candidate
/// texts. `original_start` counts the original lines preceding the region,
/// so a pure insertion lands immediately after original line
/// `original_start` (0 means before the first line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub original_start: usize,
    pub candidate_start: usize,
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

impl Hunk {
    pub(crate) fn starting_at(original_start: usize, candidate_start: usize) -> Self {
        Self {
            original_start,
            candidate_start,
            removed: Vec::new(),
            added: Vec::new(),
        }
    }

    /// True when no original line is removed or replaced by this hunk.
    pub fn is_pure_insertion(&self) -> bool {
        self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The hunk removes or replaces at least one original line.
    TouchesOriginal,
    /// The hunk inserts at least one line that is not a comment.
    NonCommentLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedHunk {
    Insertion(Hunk),
    Rejected { hunk: Hunk, reason: RejectReason },
}

/// Accepted/rejected tallies for one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub accepted: usize,
    pub rejected: usize,
    pub rejected_touches_original: usize,
    pub rejected_non_comment: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub text: String,
    pub report: MergeReport,
}
