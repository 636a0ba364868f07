use serde::{Deserialize, Serialize};

use crate::services::merge::MergeReport;

/// End-of-run observability summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Units extracted from the source file (preamble excluded).
    pub units_total: usize,
    /// Units for which the service returned a usable completion.
    pub units_commented: usize,
    /// Units kept verbatim because the service errored, timed out, or
    /// returned an empty completion.
    pub units_fallback: usize,
    pub merge: MergeReport,
}
