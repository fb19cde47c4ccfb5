//! Terminal chat agent answering Aadhaar questions from official documents.
//!
//! The agent extracts text from the PDF corpus, indexes it in a local
//! vector store, and answers questions with an OpenAI chat model grounded
//! in retrieved context.
//!
//! # Usage
//!
//! ```bash
//! # Interactive chat session
//! aadhaar chat
//!
//! # Single question, useful for scripting
//! aadhaar ask "What documents are required for enrollment?"
//!
//! # Setup instructions
//! aadhaar setup
//! ```

mod agent;
mod credentials;
mod input;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use aadhaar_openai::OpenAI;
use aadhaar_rag::{RagConfig, RagStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::agent::{AadhaarAgent, IndexProgress};
use crate::credentials::{CredentialProvider, EnvCredential, PromptCredential, resolve_chain};
use crate::session::{Session, ask_with_reauth, run_chat};

#[derive(Debug, Parser)]
#[command(name = "aadhaar", version, about = "Aadhaar document chat agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the Aadhaar PDF documents.
    #[arg(long, global = true, default_value = "Supporting Documents")]
    docs: PathBuf,

    /// Directory for the persisted vector index.
    #[arg(long, global = true, default_value = ".aadhaar_index")]
    index: PathBuf,

    /// Chat model to use.
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// OpenAI-compatible API base URL.
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    /// Number of document chunks retrieved per question.
    #[arg(long, global = true, default_value_t = 3)]
    top_k: usize,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start an interactive chat session.
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        /// The Aadhaar-related question.
        question: String,
    },
    /// Show setup instructions.
    Setup,
}

const SETUP_TEXT: &str = "\
Aadhaar Chat Agent Setup

1. Build the agent:
   cargo install --path cli

2. Configure your OpenAI API key:
   - Visit: https://platform.openai.com/api-keys
   - Create a new API key
   - Open 'config.env'
   - Replace 'your_openai_api_key_here' with your actual API key
   - Save the file

3. Ensure PDF files are in the 'Supporting Documents' folder

4. Run the agent:
   aadhaar chat

The agent will:
- Automatically load your API key from config.env
- Process PDFs and build a vector index on first run
- Reuse the persisted index on subsequent runs
- Maintain conversation context throughout the session

Tip: without config.env the agent still works by asking for your
API key each run (the key is never saved).";

#[tokio::main]
async fn main() -> ExitCode {
    // Keys in config.env are optional; the environment wins either way.
    dotenvy::from_filename("config.env").ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Setup => {
            println!("{SETUP_TEXT}");
            Ok(())
        }
        Command::Chat => {
            let mut agent = prepare_agent(&cli).await?;
            let mut reauth = reauth_for(&cli);
            run_chat(&mut agent, &mut reauth).await
        }
        Command::Ask { ref question } => {
            let mut agent = prepare_agent(&cli).await?;
            let mut session = Session::new();
            let mut reauth = reauth_for(&cli);
            let answer = ask_with_reauth(&mut agent, &mut session, question, &mut reauth)
                .await
                .context("could not answer the question")?;
            println!("{answer}");
            Ok(())
        }
    }
}

/// Builds one API client from the CLI options and a credential.
fn build_model(cli: &Cli, api_key: String) -> OpenAI {
    let mut builder = OpenAI::builder(api_key);
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    if let Some(base_url) = &cli.base_url {
        builder = builder.base_url(base_url);
    }
    builder.build()
}

/// Builds the model client and the retrieval store for one credential.
fn build_agent(cli: &Cli, api_key: String) -> Result<AadhaarAgent<OpenAI, OpenAI>> {
    let model = build_model(cli, api_key);
    let config = RagConfig::builder().index_dir(&cli.index).build();
    let store = RagStore::open(model.clone(), config)
        .context("could not open the vector index")?;

    Ok(AadhaarAgent::new(model, store, cli.top_k))
}

/// Resolves a key from the environment or an interactive prompt, then
/// builds the agent and prepares its index.
async fn prepare_agent(cli: &Cli) -> Result<AadhaarAgent<OpenAI, OpenAI>> {
    let api_key = resolve_chain(&[&EnvCredential::new(), &PromptCredential])
        .context("no API key provided")?;

    println!("Initializing Aadhaar Chat Agent...");
    let agent = build_agent(cli, api_key)?;
    agent
        .init(&cli.docs, report_progress)
        .await
        .context("could not prepare the document index")?;
    println!("Agent ready! Ask me anything about Aadhaar.");
    Ok(agent)
}

fn report_progress(progress: IndexProgress<'_>) {
    match progress {
        IndexProgress::Restored { chunks } => {
            println!("Vector index already initialized ({chunks} chunks)");
        }
        IndexProgress::Extracting => println!("Processing PDF documents..."),
        IndexProgress::Extracted { documents } => {
            println!("Found {documents} PDF documents");
        }
        IndexProgress::Indexing {
            file,
            position,
            total,
        } => println!("Indexing {file} ({position}/{total})..."),
        IndexProgress::Saved { chunks } => {
            println!("Indexed {chunks} chunks");
        }
        IndexProgress::NoDocuments => {
            println!("No PDF documents found; answering without document context");
        }
    }
}

/// Re-prompts for a key after an authentication failure and issues fresh
/// clients around it. Declining leaves the original error in place.
fn reauth_for(cli: &Cli) -> impl FnMut() -> Option<(OpenAI, OpenAI)> + '_ {
    move || {
        eprintln!("Authentication failed. The configured API key was rejected.");
        let api_key = PromptCredential.resolve()?;
        let model = build_model(cli, api_key);
        Some((model.clone(), model))
    }
}
