mod echo;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use llms_txt_core::{
    FetchConfig, FetchedPage, LlmsTxt, LlmsTxtConfig, MachineView, fetch_file, fetch_stdin, fetch_url,
};
use owo_colors::OwoColorize;

use crate::echo::{
    format_size, print_banner, print_conversion_details, print_detail, print_info, print_step, print_success,
    print_timing_summary, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serve pages as clean Markdown for agents and generate llms.txt files
#[derive(Parser, Debug)]
#[command(name = "llms-txt")]
#[command(version)]
#[command(about = "Machine-readable Markdown views of web pages and llms.txt discovery documents", long_about = None)]
struct Cli {
    /// Configuration file (default: ./llms-txt.json, then the user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a page to its machine view
    Convert(ConvertArgs),
    /// Print the llms.txt discovery document
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// CSS selector of the main content (default: from config)
    #[arg(long, value_name = "SELECTOR", conflicts_with = "no_selector")]
    selector: Option<String>,

    /// Convert the whole page instead of the main content
    #[arg(long)]
    no_selector: bool,

    /// Truncate HTML above this many bytes, 0 for unlimited (default: from config)
    #[arg(long, value_name = "BYTES")]
    max_html_length: Option<usize>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing();
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Convert(args) => convert(args, &config, cli.verbose).await,
        Command::Generate(args) => generate(args, &config, cli.verbose),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("llms_txt_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LlmsTxtConfig> {
    let config = match path {
        Some(path) => {
            LlmsTxtConfig::load(path).with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => LlmsTxtConfig::discover().context("Failed to load config")?,
    };

    config.with_env_overrides().context("Invalid LLMS_TXT_* environment override")
}

async fn convert(args: ConvertArgs, config: &LlmsTxtConfig, verbose: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut timings: Vec<(String, Duration)> = Vec::new();

    let page = read_input(&args, verbose).await?;
    timings.push(("Read".to_string(), started.elapsed()));

    if verbose {
        print_detail("Size", &format_size(page.body.len()));
        print_detail("Content-Type", &page.content_type);
        eprintln!();
    }

    let output = if page.is_html() {
        let mut view_config = config.machine_view();
        if let Some(selector) = args.selector {
            view_config.selector = Some(selector);
        }
        if args.no_selector {
            view_config.selector = None;
        }
        if let Some(max) = args.max_html_length {
            view_config.max_html_length = max;
        }

        if verbose {
            print_step(2, 3, "Converting to Markdown");
            print_detail("Selector", view_config.selector.as_deref().unwrap_or("(none)"));
            print_detail("Max HTML", &view_config.max_html_length.to_string());
        }

        let render_started = Instant::now();
        let result = MachineView::new(view_config).render(&page.body);
        timings.push(("Convert".to_string(), render_started.elapsed()));

        if verbose {
            print_conversion_details(&result);
        }
        if result.fallback {
            print_warning("Conversion failed, wrote the fallback document");
        }

        result.markdown
    } else {
        print_warning(&format!(
            "Input is not HTML ({}), writing it unchanged",
            if page.content_type.is_empty() { "no content type" } else { &page.content_type }
        ));
        page.body
    };

    if verbose {
        print_step(3, 3, "Writing output");
    }
    write_output(args.output.as_deref(), &output)?;

    if verbose {
        print_timing_summary(started.elapsed(), &timings);
    }

    Ok(())
}

async fn read_input(args: &ConvertArgs, verbose: bool) -> anyhow::Result<FetchedPage> {
    if args.input == "-" {
        if verbose {
            print_step(1, 3, "Reading from stdin");
        }
        let body = fetch_stdin().context("Failed to read from stdin")?;
        Ok(FetchedPage::local(body))
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if verbose {
            print_step(1, 3, &format!("Fetching from {}", args.input.bright_white().underline()));
        }

        let mut fetch_config = FetchConfig { timeout: args.timeout, ..Default::default() };
        if let Some(user_agent) = &args.user_agent {
            fetch_config.user_agent = user_agent.clone();
        }

        fetch_url(&args.input, &fetch_config).await.context("Failed to fetch URL")
    } else {
        if verbose {
            print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        let body = fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?;
        Ok(FetchedPage::local(body))
    }
}

fn generate(args: GenerateArgs, config: &LlmsTxtConfig, verbose: bool) -> anyhow::Result<()> {
    if !config.enabled {
        print_warning("llms.txt is disabled in the configuration");
    }

    if verbose {
        print_step(1, 1, &format!("Generating /{}", config.path));
        print_detail("Use case", &format!("{:?}", config.use_case).to_lowercase());
        eprintln!();
    }

    write_output(args.output.as_deref(), &LlmsTxt::generate(config))
}

fn write_output(path: Option<&Path>, output: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
