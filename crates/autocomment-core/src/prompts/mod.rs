use crate::shared::languages::LanguageProfile;

/// Label preceding a unit's original form in the prompt. Doubles as the stop
/// sequence: the service halts before it would start a new pair.
pub const ORIGINAL_LABEL: &str = "Original code:";
pub const COMMENTED_LABEL: &str = "Same function with verbose inline comments:";
pub const STOP_SEQUENCE: &str = ORIGINAL_LABEL;

/// A unit that has already been through one generation round trip, in both
/// forms. Passed around as an immutable slice; prompt construction never
/// mutates shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUnit {
    pub original: String,
    pub commented: String,
}

impl ProcessedUnit {
    fn prompt_len(&self) -> usize {
        self.original.len() + self.commented.len()
    }
}

/// Build the prompt for one unit: the language exemplar, previously processed
/// units as additional labeled pairs, then the unit itself followed by the
/// instruction label the completion is expected to continue from.
pub fn build_unit_prompt(
    profile: &LanguageProfile,
    processed: &[ProcessedUnit],
    unit: &str,
    window_size: usize,
    max_prompt_bytes: usize,
) -> String {
    let window = select_window(processed, window_size, max_prompt_bytes);

    let mut prompt = String::from(profile.exemplar);
    for pair in window {
        push_pair(&mut prompt, &pair.original, &pair.commented);
    }
    prompt.push_str(ORIGINAL_LABEL);
    prompt.push('\n');
    prompt.push_str(unit.trim_end_matches('\n'));
    prompt.push('\n');
    prompt.push_str(COMMENTED_LABEL);
    prompt.push('\n');
    prompt
}

/// Everything up to the stop sequence, if the service echoed it back.
pub fn truncate_at_stop(completion: &str) -> &str {
    match completion.find(STOP_SEQUENCE) {
        Some(index) => &completion[..index],
        None => completion,
    }
}

/// While the accumulated pairs fit in `max_prompt_bytes`, keep them all.
/// Past the budget, keep only the `window_size` most recent, still dropping
/// oldest-first if those alone overflow the budget.
fn select_window(
    processed: &[ProcessedUnit],
    window_size: usize,
    max_prompt_bytes: usize,
) -> &[ProcessedUnit] {
    let total: usize = processed.iter().map(ProcessedUnit::prompt_len).sum();
    if total <= max_prompt_bytes {
        return processed;
    }

    let start = processed.len().saturating_sub(window_size);
    let mut window = &processed[start..];
    while window.len() > 1
        && window.iter().map(ProcessedUnit::prompt_len).sum::<usize>() > max_prompt_bytes
    {
        window = &window[1..];
    }
    window
}

fn push_pair(prompt: &mut String, original: &str, commented: &str) {
    prompt.push_str(ORIGINAL_LABEL);
    prompt.push('\n');
    prompt.push_str(original.trim_end_matches('\n'));
    prompt.push('\n');
    prompt.push_str(COMMENTED_LABEL);
    prompt.push('\n');
    prompt.push_str(commented.trim_end_matches('\n'));
    prompt.push_str("\n\n");
}
