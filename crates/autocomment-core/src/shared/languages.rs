use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_LANGUAGE_SLUG: &str = "python";

/// Per-language knowledge: how to recognize a comment line, where a unit of
/// code begins, and the few-shot exemplar used to steer the completion
/// service toward "same code, more comments" output.
#[derive(Debug)]
pub struct LanguageProfile {
    pub slug: &'static str,
    pub name: &'static str,
    pub comment_markers: &'static [&'static str],
    pub unit_boundary: Regex,
    pub exemplar: &'static str,
}

impl LanguageProfile {
    /// A line counts as a comment when, after stripping leading whitespace,
    /// it starts with one of the language's single-line comment markers.
    /// Blank lines are never comments.
    pub fn is_comment_line(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        !trimmed.is_empty()
            && self
                .comment_markers
                .iter()
                .any(|marker| trimmed.starts_with(marker))
    }

    pub fn is_unit_boundary(&self, line: &str) -> bool {
        self.unit_boundary.is_match(line)
    }
}

const PYTHON_EXEMPLAR: &str = r#"Original code:
def mean(values):
    if not values:
        return 0.0
    return sum(values) / len(values)
Same function with verbose inline comments:
def mean(values):
    # An empty sequence has no mean; report zero instead of dividing by it
    if not values:
        return 0.0
    # Average is the total divided by the number of values
    return sum(values) / len(values)

"#;

const RUST_EXEMPLAR: &str = r#"Original code:
fn clamp(value: i64, lo: i64, hi: i64) -> i64 {
    if value < lo {
        return lo;
    }
    if value > hi {
        return hi;
    }
    value
}
Same function with verbose inline comments:
fn clamp(value: i64, lo: i64, hi: i64) -> i64 {
    // Values below the lower bound snap up to it
    if value < lo {
        return lo;
    }
    // Values above the upper bound snap down to it
    if value > hi {
        return hi;
    }
    // Anything else is already inside the range
    value
}

"#;

const JAVASCRIPT_EXEMPLAR: &str = r#"Original code:
function unique(items) {
    return [...new Set(items)];
}
Same function with verbose inline comments:
function unique(items) {
    // A Set keeps one copy of each value; spreading it back out
    // yields the de-duplicated array in first-seen order
    return [...new Set(items)];
}

"#;

const JAVA_EXEMPLAR: &str = r#"Original code:
public int indexOf(int[] haystack, int needle) {
    for (int i = 0; i < haystack.length; i++) {
        if (haystack[i] == needle) {
            return i;
        }
    }
    return -1;
}
Same function with verbose inline comments:
public int indexOf(int[] haystack, int needle) {
    // Scan left to right so the first match wins
    for (int i = 0; i < haystack.length; i++) {
        if (haystack[i] == needle) {
            return i;
        }
    }
    // Conventional sentinel for "not found"
    return -1;
}

"#;

pub static LANGUAGES: Lazy<Vec<LanguageProfile>> = Lazy::new(|| {
    vec![
        LanguageProfile {
            slug: "python",
            name: "Python",
            comment_markers: &["#"],
            unit_boundary: Regex::new(r"^\s*(async\s+)?(def|class)\s").expect("static regex"),
            exemplar: PYTHON_EXEMPLAR,
        },
        LanguageProfile {
            slug: "rust",
            name: "Rust",
            comment_markers: &["//"],
            unit_boundary: Regex::new(r"^\s*(pub(\([^)]*\))?\s+)?(async\s+)?(unsafe\s+)?fn\s")
                .expect("static regex"),
            exemplar: RUST_EXEMPLAR,
        },
        LanguageProfile {
            slug: "javascript",
            name: "JavaScript",
            comment_markers: &["//"],
            unit_boundary: Regex::new(r"^\s*(export\s+)?(async\s+)?function\s")
                .expect("static regex"),
            exemplar: JAVASCRIPT_EXEMPLAR,
        },
        LanguageProfile {
            slug: "java",
            name: "Java",
            comment_markers: &["//"],
            unit_boundary: Regex::new(r"^\s*(public|private|protected|static)\s")
                .expect("static regex"),
            exemplar: JAVA_EXEMPLAR,
        },
    ]
});

pub fn get_language_by_slug(slug: &str) -> Option<&'static LanguageProfile> {
    LANGUAGES.iter().find(|language| language.slug == slug)
}
