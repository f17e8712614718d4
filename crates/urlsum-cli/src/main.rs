//! urlsum CLI - summarize YouTube videos and web pages from the terminal

use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Input, Password};
use std::io::{self, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use urlsum::{summarize, validate_api_key, Session, SummarizeError, Summary, SummarizerConfig};

/// Output format for summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// urlsum - summarize YouTube videos and web pages with Groq
///
/// Without a subcommand, prompts for the API key and then for URLs until
/// interrupted.
#[derive(Parser, Debug)]
#[command(name = "urlsum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, global = true)]
    model: Option<String>,

    /// OpenAI-compatible API root
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Custom User-Agent for content requests
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Verify TLS certificates when fetching web pages
    #[arg(long, global = true)]
    verify_tls: bool,

    /// Output format
    #[arg(long, short, default_value = "md", global = true)]
    output: OutputFormat,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize one URL and exit
    Summarize {
        /// YouTube video or web page URL
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli);
    debug!(model = %config.model.model, verify_tls = cli.verify_tls, "Starting");

    match cli.command {
        Some(Commands::Summarize { url }) => {
            let session = Session::new(cli.api_key.unwrap_or_default(), url);
            run_once(&session, &config, cli.output).await;
        }
        None => run_interactive(cli.api_key, &config, cli.output).await,
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> SummarizerConfig {
    let mut builder = SummarizerConfig::builder().accept_invalid_certs(!cli.verify_tls);

    if let Some(model) = &cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(base_url) = &cli.base_url {
        builder = builder.base_url(base_url.as_str());
    }
    if let Some(ua) = &cli.user_agent {
        builder = builder.user_agent(ua.as_str());
    }

    builder.build()
}

async fn run_once(session: &Session, config: &SummarizerConfig, output: OutputFormat) {
    match summarize(session, config).await {
        Ok(summary) => print_summary(&summary, output),
        Err(e) => {
            eprintln!("{}", error_message(&e));
            std::process::exit(1);
        }
    }
}

async fn run_interactive(api_key: Option<String>, config: &SummarizerConfig, output: OutputFormat) {
    let api_key = match api_key {
        Some(key) => key,
        None => match Password::new()
            .with_prompt("Groq API Key")
            .allow_empty_password(true)
            .interact()
        {
            Ok(key) => key,
            Err(_) => return,
        },
    };

    if let Err(e) = validate_api_key(&api_key) {
        eprintln!("{}", error_message(&e));
        std::process::exit(1);
    }
    writeln_safe("Groq API Key successfully captured.");

    loop {
        let url = match Input::<String>::new()
            .with_prompt("URL (YouTube or website)")
            .allow_empty(true)
            .interact_text()
        {
            Ok(url) => url,
            // Interrupted or stdin closed
            Err(_) => break,
        };

        eprintln!("Waiting...");
        let session = Session::new(api_key.as_str(), url);
        match summarize(&session, config).await {
            Ok(summary) => print_summary(&summary, output),
            Err(e) => eprintln!("{}", error_message(&e)),
        }
    }
}

/// Input problems are shown as-is; everything else is an exception
fn error_message(err: &SummarizeError) -> String {
    if err.is_input_error() {
        err.to_string()
    } else {
        format!("Exception: {}", err)
    }
}

fn print_summary(summary: &Summary, output: OutputFormat) {
    match output {
        OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(summary)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary).unwrap_or_else(|e| {
                eprintln!("Error serializing summary: {}", e);
                std::process::exit(1);
            });
            writeln_safe(&json);
        }
    }
}

/// Format a summary as markdown with YAML frontmatter
fn format_md_with_frontmatter(summary: &Summary) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", yaml_scalar(&summary.url)));
    output.push_str(&format!("loader: {}\n", summary.loader));
    if let Some(title) = summary.metadata_str("title") {
        output.push_str(&format!("title: {}\n", yaml_scalar(title)));
    }
    if let Some(author) = summary.metadata_str("author") {
        output.push_str(&format!("author: {}\n", yaml_scalar(author)));
    }
    output.push_str("---\n");

    output.push_str(&summary.summary);
    output
}

/// Quote values YAML would misread; JSON strings are valid YAML scalars
fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.contains(": ")
        || value.contains(" #")
        || value.contains('\n')
        || value.starts_with(|c: char| "!&*[]{}|>'\"%@`#,?-".contains(c) || c.is_whitespace())
        || value.ends_with(char::is_whitespace);

    if needs_quotes {
        serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    fn summary() -> Summary {
        Summary {
            url: "https://example.com/article".to_string(),
            loader: "web".to_string(),
            summary: "A short summary.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_md_basic() {
        let output = format_md_with_frontmatter(&summary());

        assert!(output.starts_with("---\n"));
        assert!(output.contains("url: https://example.com/article\n"));
        assert!(output.contains("loader: web\n"));
        assert!(!output.contains("title:"));
        assert!(output.ends_with("---\nA short summary."));
    }

    #[test]
    fn test_format_md_with_video_info() {
        let mut summary = summary();
        summary.loader = "youtube".to_string();
        summary.metadata.insert("title".to_string(), json!("Rust: The Talk"));
        summary.metadata.insert("author".to_string(), json!("Ferris"));
        summary.metadata.insert("length".to_string(), json!(212));

        let output = format_md_with_frontmatter(&summary);

        assert!(output.contains("loader: youtube\n"));
        assert!(output.contains("title: \"Rust: The Talk\"\n"));
        assert!(output.contains("author: Ferris\n"));
        // Only url, loader, title and author go in the frontmatter
        assert!(!output.contains("length"));
    }

    #[test]
    fn test_yaml_scalar() {
        assert_eq!(yaml_scalar("plain title"), "plain title");
        assert_eq!(yaml_scalar("https://example.com/a?b=c"), "https://example.com/a?b=c");
        assert_eq!(yaml_scalar("key: value"), "\"key: value\"");
        assert_eq!(yaml_scalar("- list"), "\"- list\"");
        assert_eq!(yaml_scalar("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(yaml_scalar(""), "\"\"");
    }

    #[test]
    fn test_error_message_categories() {
        assert_eq!(
            error_message(&SummarizeError::MissingApiKey),
            "Please enter a valid Groq API Key."
        );
        assert_eq!(
            error_message(&SummarizeError::MissingUrl),
            "Please provide the information to get started"
        );
        assert_eq!(
            error_message(&SummarizeError::LoaderError("boom".to_string())),
            "Exception: Loader error: boom"
        );
    }

    #[test]
    fn test_parse_summarize_subcommand() {
        let cli = Cli::try_parse_from([
            "urlsum",
            "summarize",
            "https://www.youtube.com/watch?v=abc123",
            "--output",
            "json",
            "--verify-tls",
            "--model",
            "llama3-8b-8192",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Some(Commands::Summarize { ref url }) if url == "https://www.youtube.com/watch?v=abc123"
        ));
        assert_eq!(cli.output, OutputFormat::Json);

        let config = build_config(&cli);
        assert!(!config.load.accept_invalid_certs);
        assert_eq!(config.model.model, "llama3-8b-8192");
    }

    #[test]
    fn test_parse_interactive_defaults() {
        let cli = Cli::try_parse_from(["urlsum"]).unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.output, OutputFormat::Md);
        assert!(!cli.verbose);

        let config = build_config(&cli);
        assert!(config.load.accept_invalid_certs);
        assert_eq!(config.model, urlsum::ModelConfig::default());
    }

    #[test]
    fn test_build_config_overrides() {
        let cli = Cli::try_parse_from([
            "urlsum",
            "--base-url",
            "http://127.0.0.1:8080/v1",
            "--user-agent",
            "urlsum-test",
        ])
        .unwrap();

        let config = build_config(&cli);
        assert_eq!(config.model.base_url, "http://127.0.0.1:8080/v1");
        assert_eq!(config.load.user_agent, "urlsum-test");
    }
}
