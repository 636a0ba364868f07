use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;

use crate::chunks::split_chunks;
use crate::error::{CommenterError, Result};
use crate::prompts::{build_unit_prompt, truncate_at_stop, ProcessedUnit, STOP_SEQUENCE};
use crate::services::completion::{CompletionClient, CompletionClientTrait, CompletionRequest};
use crate::services::merge::merge_comments;
use crate::shared::languages::{get_language_by_slug, LanguageProfile, DEFAULT_LANGUAGE_SLUG};
use crate::shared::report::RunReport;

#[derive(Debug, Clone)]
pub struct CommenterConfig {
    pub language: String,
    pub model: String,
    /// Processed units kept as prompt context once the byte budget is hit.
    pub window_size: usize,
    pub max_prompt_bytes: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for CommenterConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE_SLUG.to_string(),
            model: "code-davinci-002".to_string(),
            window_size: 4,
            max_prompt_bytes: 16 * 1024,
            max_tokens: 1500,
            temperature: 0.0,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub text: String,
    pub report: RunReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub output_path: PathBuf,
    pub report: RunReport,
}

/// Drives the whole pipeline: chunk the source, regenerate each unit through
/// the completion service, assemble the candidate file, and merge the
/// comment-only insertions back into the pristine original.
pub struct Commenter {
    client: Arc<dyn CompletionClientTrait>,
    config: CommenterConfig,
}

impl fmt::Debug for Commenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commenter")
            .field("config", &self.config)
            .finish()
    }
}

impl Commenter {
    pub fn new(config: CommenterConfig) -> Result<Self> {
        let client = CompletionClient::new(config.request_timeout)?;
        Ok(Self::with_client(Arc::new(client), config))
    }

    pub fn with_client(client: Arc<dyn CompletionClientTrait>, config: CommenterConfig) -> Self {
        Self { client, config }
    }

    fn profile(&self) -> Result<&'static LanguageProfile> {
        get_language_by_slug(&self.config.language).ok_or_else(|| {
            CommenterError::usage(format!("unknown language: {}", self.config.language))
        })
    }

    /// Comment a source text in memory. The returned text is the original
    /// with accepted comment insertions spliced in, and nothing else changed.
    pub async fn comment_source(&self, source: &str) -> Result<RunOutcome> {
        let profile = self.profile()?;
        let chunks = split_chunks(source, profile);

        let mut report = RunReport {
            units_total: chunks.units.len(),
            ..RunReport::default()
        };

        let mut processed: Vec<ProcessedUnit> = Vec::new();
        let mut candidate_units: Vec<String> = Vec::with_capacity(chunks.units.len());

        for (index, unit) in chunks.units.iter().enumerate() {
            let commented = match self.comment_unit(profile, &processed, unit).await {
                Some(text) => {
                    report.units_commented += 1;
                    text
                }
                None => {
                    tracing::info!(unit = index + 1, "keeping original text for unit");
                    report.units_fallback += 1;
                    unit.clone()
                }
            };
            processed.push(ProcessedUnit {
                original: unit.clone(),
                commented: commented.clone(),
            });
            candidate_units.push(commented);
        }

        let mut candidate = String::with_capacity(source.len());
        candidate.push_str(&chunks.preamble);
        for unit in &candidate_units {
            candidate.push_str(unit);
        }

        let outcome = merge_comments(source, &candidate, profile)?;
        report.merge = outcome.report;
        tracing::info!(
            units = report.units_total,
            fallbacks = report.units_fallback,
            accepted = report.merge.accepted,
            rejected = report.merge.rejected,
            "merge complete"
        );

        Ok(RunOutcome {
            text: outcome.text,
            report,
        })
    }

    /// Comment a file on disk, writing the result to a `.new` sibling. The
    /// input file is never touched.
    pub async fn comment_file(&self, path: &Path) -> Result<FileOutcome> {
        let source = fs::read_to_string(path).await.map_err(|error| {
            CommenterError::usage(format!("cannot read {}: {error}", path.display()))
        })?;

        let outcome = self.comment_source(&source).await?;

        let output_path = output_path_for(path);
        fs::write(&output_path, &outcome.text).await.map_err(|error| {
            CommenterError::usage(format!("cannot write {}: {error}", output_path.display()))
        })?;

        Ok(FileOutcome {
            output_path,
            report: outcome.report,
        })
    }

    /// One generation round trip. `None` means identity fallback: the
    /// service errored, timed out, or produced an empty completion.
    async fn comment_unit(
        &self,
        profile: &LanguageProfile,
        processed: &[ProcessedUnit],
        unit: &str,
    ) -> Option<String> {
        let prompt = build_unit_prompt(
            profile,
            processed,
            unit,
            self.config.window_size,
            self.config.max_prompt_bytes,
        );
        let request = CompletionRequest {
            model: self.config.model.clone(),
            prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stop: STOP_SEQUENCE.to_string(),
        };

        match self.client.complete(request).await {
            Ok(completion) => {
                let completion = truncate_at_stop(&completion);
                if completion.trim().is_empty() {
                    tracing::warn!("empty completion");
                    return None;
                }
                Some(restore_unit_shape(completion, unit))
            }
            Err(error) => {
                tracing::warn!(%error, "completion failed");
                None
            }
        }
    }
}

/// Sibling output path: `<name>.new` next to the input.
fn output_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".new");
    PathBuf::from(name)
}

/// Replace `original` with the `.new` output produced earlier. This is the
/// only operation that modifies the input file, and it is explicit.
pub async fn apply_output(original: &Path, output: &Path) -> Result<()> {
    fs::rename(output, original).await.map_err(|error| {
        CommenterError::usage(format!(
            "cannot apply {} over {}: {error}",
            output.display(),
            original.display()
        ))
    })
}

/// The completion starts right after the instruction label and may carry
/// stray surrounding newlines; give it back the exact trailing whitespace of
/// the unit it replaces so the candidate file keeps the original's spacing
/// between units.
fn restore_unit_shape(completion: &str, original_unit: &str) -> String {
    let core = completion.trim_start_matches('\n').trim_end();
    let trailing = &original_unit[original_unit.trim_end().len()..];
    let mut unit = String::with_capacity(core.len() + trailing.len());
    unit.push_str(core);
    unit.push_str(trailing);
    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::MockCompletionClientTrait;
    use pretty_assertions::assert_eq;

    fn commenter_with(mock: MockCompletionClientTrait) -> Commenter {
        Commenter::with_client(Arc::new(mock), CommenterConfig::default())
    }

    #[test]
    fn restores_trailing_whitespace_from_original() {
        let original = "def f():\n    return 1\n\n";
        let completion = "\ndef f():\n    # one\n    return 1\n";
        assert_eq!(
            restore_unit_shape(completion, original),
            "def f():\n    # one\n    return 1\n\n"
        );
    }

    #[test]
    fn output_path_appends_new_suffix() {
        assert_eq!(
            output_path_for(Path::new("/tmp/example.py")),
            PathBuf::from("/tmp/example.py.new")
        );
    }

    #[tokio::test]
    async fn commented_units_are_merged_into_source() {
        let mut mock = MockCompletionClientTrait::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok("def f():\n    # returns one\n    return 1\n".to_string()));

        let commenter = commenter_with(mock);
        let outcome = commenter
            .comment_source("def f():\n    return 1\n")
            .await
            .unwrap();

        assert_eq!(outcome.text, "def f():\n    # returns one\n    return 1\n");
        assert_eq!(outcome.report.units_total, 1);
        assert_eq!(outcome.report.units_commented, 1);
        assert_eq!(outcome.report.merge.accepted, 1);
    }

    #[tokio::test]
    async fn service_error_falls_back_to_original() {
        let mut mock = MockCompletionClientTrait::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection reset")));

        let commenter = commenter_with(mock);
        let source = "def f():\n    return 1\n";
        let outcome = commenter.comment_source(source).await.unwrap();

        assert_eq!(outcome.text, source);
        assert_eq!(outcome.report.units_fallback, 1);
        assert_eq!(outcome.report.merge, Default::default());
    }

    #[tokio::test]
    async fn empty_completion_falls_back_to_original() {
        let mut mock = MockCompletionClientTrait::new();
        mock.expect_complete().times(1).returning(|_| Ok("\n\n".to_string()));

        let commenter = commenter_with(mock);
        let source = "def f():\n    return 1\n";
        let outcome = commenter.comment_source(source).await.unwrap();

        assert_eq!(outcome.text, source);
        assert_eq!(outcome.report.units_fallback, 1);
    }

    #[tokio::test]
    async fn unknown_language_is_a_usage_error() {
        let commenter = Commenter::with_client(
            Arc::new(MockCompletionClientTrait::new()),
            CommenterConfig {
                language: "cobol".into(),
                ..CommenterConfig::default()
            },
        );
        let error = commenter.comment_source("x\n").await.unwrap_err();
        assert!(matches!(error, CommenterError::Usage { .. }));
    }

    #[tokio::test]
    async fn preamble_only_source_needs_no_completions() {
        let mock = MockCompletionClientTrait::new();
        let commenter = commenter_with(mock);
        let source = "import os\nx = 1\n";
        let outcome = commenter.comment_source(source).await.unwrap();
        assert_eq!(outcome.text, source);
        assert_eq!(outcome.report.units_total, 0);
    }

    #[tokio::test]
    async fn rewritten_code_from_service_is_filtered_out() {
        let mut mock = MockCompletionClientTrait::new();
        mock.expect_complete().times(1).returning(|_| {
            // The comment rides in the same hunk as the rewritten return, so
            // the whole region is dropped and the original passes through.
            Ok("def f():\n    # tries to be clever\n    return 2\n".to_string())
        });

        let commenter = commenter_with(mock);
        let source = "def f():\n    return 1\n";
        let outcome = commenter.comment_source(source).await.unwrap();

        assert_eq!(outcome.text, source);
        assert_eq!(outcome.report.merge.accepted, 0);
        assert_eq!(outcome.report.merge.rejected_touches_original, 1);
    }
}
