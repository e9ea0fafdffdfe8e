//! # scn2reply
//!
//! Draft replies to GST show-cause notices using hosted LLMs.
//!
//! ## What it does
//!
//! A show-cause notice arrives as a PDF (or DOCX). This crate extracts its
//! text, scrapes the GSTIN, sends the notice text plus a drafting
//! instruction to an OpenAI-compatible chat endpoint, and renders the
//! model's reply into a fixed-layout `.docx` letter ready for filing. The
//! same pipeline is available as a library call and over HTTP.
//!
//! ## Pipeline Overview
//!
//! ```text
//! notice (PDF/DOCX)
//!  │
//!  ├─ 1. Extract  text layer via pdf-extract / docx-rs, char-budgeted
//!  ├─ 2. Scrape   GSTIN by fixed pattern (independent of the model)
//!  ├─ 3. Prompt   reference doc > form field > built-in default
//!  ├─ 4. Model    one system+user exchange, retry with backoff
//!  ├─ 5. Compose  fixed-layout letter, grounds numbered from reply lines
//!  └─ 6. Store    UUID-named .docx + latest pointer, served for download
//! ```
//!
//! ## Quick Start (library)
//!
//! ```rust,no_run
//! use scn2reply::{draft, DraftConfig, InstructionSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from OPENAI_API_KEY
//!     let config = DraftConfig::default();
//!     let notice = std::fs::read("notice.pdf")?;
//!     let output = draft(&notice, InstructionSource::Default, &config).await?;
//!     println!("{}", output.reply);
//!     eprintln!("GSTIN: {:?}", output.record.gstin);
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start (server)
//!
//! ```text
//! export OPENAI_API_KEY=sk-...
//! scn2reply --listen 127.0.0.1:8080
//! curl -F file=@notice.pdf http://127.0.0.1:8080/upload/
//! ```
//!
//! ## Feature Flags
//!
//! | Feature      | Default | Description |
//! |--------------|---------|-------------|
//! | `server-bin` | on      | Enables the `scn2reply` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `server-bin` when using only the library:
//! ```toml
//! scn2reply = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod draft;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DraftConfig, DraftConfigBuilder, DEFAULT_API_KEY_VAR};
pub use draft::{draft, draft_to_file, draft_with_client, InstructionSource};
pub use error::DraftError;
pub use output::{DraftOutput, DraftStats, NoticeRecord};
pub use pipeline::llm::ChatClient;
pub use server::{router, AppState};
