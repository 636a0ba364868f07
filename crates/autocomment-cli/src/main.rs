use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autocomment_core::{apply_output, Commenter, CommenterConfig};

#[derive(Parser)]
#[command(
    name = "autocomment",
    about = "Add machine-generated explanatory comments to source code without changing the code itself"
)]
struct Cli {
    /// File to comment. Output goes to a `<filename>.new` sibling.
    filename: PathBuf,
    #[arg(long, default_value = "python")]
    language: String,
    #[arg(long, default_value = "code-davinci-002")]
    model: String,
    /// Processed units kept as prompt context once the byte budget is hit.
    #[arg(long, default_value = "4")]
    window_size: usize,
    #[arg(long, default_value = "16384")]
    max_prompt_bytes: usize,
    #[arg(long, default_value = "1500")]
    max_tokens: u32,
    /// Per-request completion timeout, in seconds.
    #[arg(long, default_value = "30")]
    timeout: u64,
    /// Replace the input file with the generated output.
    #[arg(long)]
    apply: bool,
    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("AUTOCOMMENT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("autocomment=info,autocomment_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> autocomment_core::Result<()> {
    let config = CommenterConfig {
        language: cli.language,
        model: cli.model,
        window_size: cli.window_size,
        max_prompt_bytes: cli.max_prompt_bytes,
        max_tokens: cli.max_tokens,
        request_timeout: Duration::from_secs(cli.timeout),
        ..CommenterConfig::default()
    };

    let commenter = Commenter::new(config)?;
    let outcome = commenter.comment_file(&cli.filename).await?;

    tracing::info!(
        output = %outcome.output_path.display(),
        units = outcome.report.units_total,
        fallbacks = outcome.report.units_fallback,
        accepted = outcome.report.merge.accepted,
        rejected = outcome.report.merge.rejected,
        "done"
    );
    if cli.json {
        match serde_json::to_string_pretty(&outcome.report) {
            Ok(json) => println!("{json}"),
            Err(error) => tracing::warn!(%error, "cannot serialize report"),
        }
    }

    if cli.apply {
        apply_output(&cli.filename, &outcome.output_path).await?;
        tracing::info!(path = %cli.filename.display(), "applied in place");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    // Bad flags are a usage error (exit 1), same as a bad path.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return ExitCode::from(if error.use_stderr() { 1 } else { 0 });
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "run failed");
            ExitCode::from(error.exit_code())
        }
    }
}
