//! Server binary for scn2reply.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `DraftConfig`, builds the app state, and serves the router.

use anyhow::{Context, Result};
use clap::Parser;
use scn2reply::{router, AppState, DraftConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address
  export OPENAI_API_KEY=sk-...
  scn2reply

  # Different model and listen address
  scn2reply --listen 0.0.0.0:9000 --model gpt-4o

  # Point at a compatible gateway
  scn2reply --api-base http://localhost:4000/v1

  # Draft a reply
  curl -F file=@notice.pdf http://127.0.0.1:8080/upload/

  # Draft with an instruction, then fetch the letter
  curl -F file=@notice.pdf -F prompt='contest limitation under s.73(10)' \
       http://127.0.0.1:8080/upload/
  curl -OJ http://127.0.0.1:8080/download/

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY        API credential (required)
  SCN2REPLY_LISTEN      Listen address
  SCN2REPLY_MODEL       Chat model id
  SCN2REPLY_API_BASE    OpenAI-compatible base URL
  SCN2REPLY_OUTPUT_DIR  Directory for generated letters
  RUST_LOG              Tracing filter (overrides -v/-q)
"#;

/// Draft replies to GST show-cause notices over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "scn2reply",
    version,
    about = "Draft replies to GST show-cause notices with hosted LLMs",
    long_about = "HTTP service that accepts an uploaded show-cause notice (PDF or DOCX), \
extracts its text, scrapes the GSTIN, drafts a reply via an OpenAI-compatible chat \
endpoint, and serves the result as a formatted .docx letter.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Listen address.
    #[arg(long, env = "SCN2REPLY_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Chat model id.
    #[arg(long, env = "SCN2REPLY_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible API.
    #[arg(
        long,
        env = "SCN2REPLY_API_BASE",
        default_value = "https://api.openai.com/v1"
    )]
    api_base: String,

    /// Directory for generated letters.
    #[arg(long, env = "SCN2REPLY_OUTPUT_DIR", default_value = "generated")]
    output_dir: PathBuf,

    /// Character budget for the extracted notice text.
    #[arg(long, env = "SCN2REPLY_NOTICE_CHARS", default_value_t = 4000)]
    notice_chars: usize,

    /// Letterhead line rendered at the top of every reply.
    #[arg(
        long,
        env = "SCN2REPLY_LETTERHEAD",
        default_value = "Tax Consultants & Associates"
    )]
    letterhead: String,

    /// Retries per completion call on transient failure.
    #[arg(long, env = "SCN2REPLY_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-completion-call timeout in seconds.
    #[arg(long, env = "SCN2REPLY_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Skip the second model call that derives the noticee's name/address.
    #[arg(long, env = "SCN2REPLY_NO_PARTY")]
    no_party: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCN2REPLY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCN2REPLY_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and state ───────────────────────────────────────────
    let config = DraftConfig::builder()
        .model(&cli.model)
        .api_base(&cli.api_base)
        .notice_char_budget(cli.notice_chars)
        .letterhead(&cli.letterhead)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .derive_party(!cli.no_party)
        .build()
        .context("Invalid configuration")?;

    let state = AppState::new(config, &cli.output_dir)
        .context("Failed to initialise server state (is OPENAI_API_KEY set?)")?;

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;

    tracing::info!(
        listen = %cli.listen,
        model = %cli.model,
        output_dir = %cli.output_dir.display(),
        "scn2reply listening"
    );

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
