use std::{num::NonZeroUsize, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use text_digest::{server, tracing::init_tracing_subscriber, DigestBuilder};
use text_generation::{Provider, ProviderKind, TransportConfig};
use tokio::{io::AsyncReadExt, net::TcpListener};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "text-digest", about = "Chunked LLM text summarizer")]
struct Cli {
    /// Generation backend
    #[arg(long, env = "LLM_PROVIDER", value_enum, default_value_t = ProviderArg::Gemini)]
    provider: ProviderArg,

    /// API key for the generation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model override, provider default when absent
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// API base URL override, provider default when absent
    #[arg(long, env = "LLM_BASE_URL")]
    base_url: Option<String>,

    /// Segment size in characters
    #[arg(long, env = "CHUNK_SIZE", default_value = "5000")]
    chunk_size: NonZeroUsize,

    /// Maximum in-flight segment requests, unbounded when absent
    #[arg(long, env = "MAX_CONCURRENCY")]
    max_concurrency: Option<NonZeroUsize>,

    /// Per-attempt request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    request_timeout_secs: u64,

    /// Retries for transient transport failures
    #[arg(long, env = "MAX_RETRIES", default_value = "3")]
    max_retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    Gemini,
    #[value(name = "openai")]
    OpenAi,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Gemini => ProviderKind::Gemini,
            ProviderArg::OpenAi => ProviderKind::OpenAi,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a file (or stdin) once and print the summary
    Run {
        /// Text file to summarize, stdin when absent
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Start the HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value = "3000")]
        port: u16,
    },
}

async fn read_input(input: Option<PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    tracing::info!(
        provider = ?cli.provider,
        api_key_loaded = !cli.api_key.is_empty(),
        chunk_size = cli.chunk_size.get(),
        max_concurrency = ?cli.max_concurrency,
        "Starting text-digest"
    );

    let transport = TransportConfig {
        timeout: Duration::from_secs(cli.request_timeout_secs),
        max_retries: cli.max_retries,
    };
    let provider = Provider::new(
        cli.provider.into(),
        cli.api_key,
        cli.model,
        cli.base_url,
        &transport,
    )
    .context("Failed to configure generation provider")?;

    let digest = DigestBuilder::new()
        .generator(provider)
        .chunk_size(cli.chunk_size)
        .max_concurrency(cli.max_concurrency)
        .build();

    match cli.command {
        Command::Run { input } => {
            let text = read_input(input).await?;
            let summary = digest.summarize(&text).await?;
            println!("{summary}");
        }
        Command::Serve { port } => {
            let listener = TcpListener::bind(("0.0.0.0", port))
                .await
                .with_context(|| format!("Failed to bind port {port}"))?;

            let shutdown = CancellationToken::new();
            tokio::spawn({
                let shutdown = shutdown.clone();
                async move {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "Failed to listen for shutdown signal");
                    }
                    tracing::info!("Shutdown signal received");
                    shutdown.cancel();
                }
            });

            server::serve(listener, Arc::new(digest), shutdown).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_flag_parses_into_kind() {
        let cli = Cli::try_parse_from([
            "text-digest",
            "--api-key",
            "key",
            "--provider",
            "openai",
            "run",
        ])
        .unwrap();
        assert_eq!(ProviderKind::from(cli.provider), ProviderKind::OpenAi);

        let cli = Cli::try_parse_from(["text-digest", "--api-key", "key", "run"]).unwrap();
        assert_eq!(ProviderKind::from(cli.provider), ProviderKind::Gemini);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = Cli::try_parse_from([
            "text-digest",
            "--api-key",
            "key",
            "--provider",
            "claude",
            "run",
        ]);
        assert!(result.is_err());
    }
}
