mod types;

pub use types::{ClassifiedHunk, Hunk, MergeOutcome, MergeReport, RejectReason};

use similar::{ChangeTag, TextDiff};

use crate::error::{CommenterError, Result};
use crate::shared::languages::LanguageProfile;

/// Merge comment-only insertions from `candidate` into `original`.
///
/// Every hunk of the line diff is classified; only pure insertions whose
/// added lines all pass the language's comment predicate survive. Hunks that
/// remove or replace original lines, and insertions carrying non-comment
/// lines, are dropped, so the original code passes through unchanged wherever
/// the candidate diverged in a disallowed way.
pub fn merge_comments(
    original: &str,
    candidate: &str,
    profile: &LanguageProfile,
) -> Result<MergeOutcome> {
    let original_lines: Vec<&str> = original.lines().collect();
    let candidate_lines: Vec<&str> = candidate.lines().collect();

    let mut report = MergeReport::default();
    let mut accepted: Vec<Hunk> = Vec::new();

    for hunk in collect_hunks(&original_lines, &candidate_lines) {
        match classify_hunk(hunk, profile) {
            ClassifiedHunk::Insertion(hunk) => {
                report.accepted += 1;
                accepted.push(hunk);
            }
            ClassifiedHunk::Rejected { hunk, reason } => {
                report.rejected += 1;
                match reason {
                    RejectReason::TouchesOriginal => report.rejected_touches_original += 1,
                    RejectReason::NonCommentLine => report.rejected_non_comment += 1,
                }
                tracing::debug!(
                    original_start = hunk.original_start,
                    removed = hunk.removed.len(),
                    added = hunk.added.len(),
                    ?reason,
                    "rejected hunk"
                );
            }
        }
    }

    // Stable: hunks reporting the same insertion point keep diff output order.
    accepted.sort_by_key(|hunk| hunk.original_start);

    let inserted_total: usize = accepted.iter().map(|hunk| hunk.added.len()).sum();
    let final_lines = splice(&original_lines, &accepted);
    verify_insertion_only(&original_lines, &final_lines, inserted_total)?;

    let mut text = final_lines.join("\n");
    if original.ends_with('\n') && !text.is_empty() {
        text.push('\n');
    }

    Ok(MergeOutcome { text, report })
}

/// Collect contiguous non-equal runs of the line diff into hunks, tracking
/// how many original and candidate lines precede each run.
fn collect_hunks(original: &[&str], candidate: &[&str]) -> Vec<Hunk> {
    let diff = TextDiff::from_slices(original, candidate);

    let mut hunks: Vec<Hunk> = Vec::new();
    let mut current: Option<Hunk> = None;
    let mut original_pos = 0usize;
    let mut candidate_pos = 0usize;

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                if let Some(hunk) = current.take() {
                    hunks.push(hunk);
                }
                original_pos += 1;
                candidate_pos += 1;
            }
            ChangeTag::Delete => {
                current
                    .get_or_insert_with(|| Hunk::starting_at(original_pos, candidate_pos))
                    .removed
                    .push(change.value().to_string());
                original_pos += 1;
            }
            ChangeTag::Insert => {
                current
                    .get_or_insert_with(|| Hunk::starting_at(original_pos, candidate_pos))
                    .added
                    .push(change.value().to_string());
                candidate_pos += 1;
            }
        }
    }
    if let Some(hunk) = current {
        hunks.push(hunk);
    }

    hunks
}

/// Accept a hunk only if it removes nothing and inserts nothing but comment
/// lines. Classification is a pure per-hunk filter; re-running it can never
/// change the verdict.
pub fn classify_hunk(hunk: Hunk, profile: &LanguageProfile) -> ClassifiedHunk {
    if !hunk.is_pure_insertion() {
        return ClassifiedHunk::Rejected {
            hunk,
            reason: RejectReason::TouchesOriginal,
        };
    }
    if hunk
        .added
        .iter()
        .any(|line| !profile.is_comment_line(line))
    {
        return ClassifiedHunk::Rejected {
            hunk,
            reason: RejectReason::NonCommentLine,
        };
    }
    ClassifiedHunk::Insertion(hunk)
}

/// Interleave original lines with accepted insertions. Hunks anchored past
/// the last original line are emitted at the end of file.
fn splice<'a>(original: &[&'a str], accepted: &'a [Hunk]) -> Vec<&'a str> {
    let inserted: usize = accepted.iter().map(|hunk| hunk.added.len()).sum();
    let mut out: Vec<&str> = Vec::with_capacity(original.len() + inserted);
    let mut pending = accepted.iter().peekable();

    for (index, line) in original.iter().enumerate() {
        while let Some(hunk) = pending.peek() {
            if hunk.original_start == index {
                out.extend(hunk.added.iter().map(String::as_str));
                pending.next();
            } else {
                break;
            }
        }
        out.push(line);
    }
    for hunk in pending {
        out.extend(hunk.added.iter().map(String::as_str));
    }

    out
}

/// The insertion-only guarantee: removing all inserted lines from the final
/// text must reproduce the original exactly. A violation means the diff or
/// the splice itself is broken, and no output may be written.
fn verify_insertion_only(original: &[&str], fin: &[&str], inserted_total: usize) -> Result<()> {
    if fin.len() != original.len() + inserted_total {
        return Err(CommenterError::diff(format!(
            "spliced line count {} does not match original {} plus {} insertions",
            fin.len(),
            original.len(),
            inserted_total
        )));
    }

    let mut remaining = fin.iter();
    for line in original {
        if !remaining.any(|candidate| candidate == line) {
            return Err(CommenterError::diff(format!(
                "original line {line:?} missing or reordered after splice"
            )));
        }
    }
    Ok(())
}
