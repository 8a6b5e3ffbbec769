//! Codescroll CLI - render a repository as one navigable document
//!
//! Local directories are read in place; remote locators are shallow-cloned
//! into a temporary directory that is removed when the command finishes.

// CLI tools legitimately use print macros for user output
#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use codescroll_engine::{
    build_document,
    config::{Config, ConfigFileFormat},
    git::revision_of,
    output::{OutputFormat, OutputFormatter},
    remote::{Acquired, RemoteRepo},
    Classifier, Disposition, DocumentStats, PipelineOptions,
};

/// Codescroll - repository to single-page document
#[derive(Parser)]
#[command(
    name = "codescroll",
    version,
    about = "Render a repository as one navigable HTML document",
    long_about = "Codescroll turns a repository into a single page: a directory tree, a table of\ncontents and rendered file sections, plus a raw-text view ready to paste into an LLM."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a repository into a single document
    Render {
        /// Local directory or remote locator (URL, owner/repo, github:owner/repo)
        #[arg(default_value = ".")]
        source: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from config, else html)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Skip files larger than this many bytes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_bytes: Option<u64>,

        /// Branch or tag to clone for remote sources
        #[arg(long)]
        branch: Option<String>,

        /// Worker threads (0 = one per core)
        #[arg(long)]
        threads: Option<usize>,

        /// Path to config file (default: .codescroll.toml/.yaml/.json in current directory)
        #[arg(long, env = "CODESCROLL_CONFIG")]
        config: Option<PathBuf>,

        /// Leave the stylesheet out of HTML output
        #[arg(long)]
        no_style: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify a repository's files and show counts
    Scan {
        /// Local directory or remote locator
        #[arg(default_value = ".")]
        source: String,

        /// Skip files larger than this many bytes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_bytes: Option<u64>,

        /// Path to config file
        #[arg(long, env = "CODESCROLL_CONFIG")]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show every file and its disposition
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version and effective configuration
    Info,

    /// Initialize a new configuration file
    Init {
        /// Configuration format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ConfigFormat,

        /// Output path (default: .codescroll.<ext> in current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum Format {
    /// Single HTML page with human and LLM views
    Html,
    /// LLM view only (<documents> text)
    Llm,
    /// Document model as JSON
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Html => OutputFormat::Html,
            Format::Llm => OutputFormat::Llm,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum ConfigFormat {
    /// TOML format
    Toml,
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl From<ConfigFormat> for ConfigFileFormat {
    fn from(f: ConfigFormat) -> Self {
        match f {
            ConfigFormat::Toml => ConfigFileFormat::Toml,
            ConfigFormat::Yaml => ConfigFileFormat::Yaml,
            ConfigFormat::Json => ConfigFileFormat::Json,
        }
    }
}

/// A tree ready to be read, plus what to call it
struct Workspace {
    root: PathBuf,
    locator: String,
    revision: String,
    /// Removes the clone on drop
    _remote: Option<Acquired>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(
        cli.command,
        Commands::Render { verbose: true, .. } | Commands::Scan { verbose: true, .. }
    );
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "info" } else { "warn" }),
    )
    .init();

    match cli.command {
        Commands::Render {
            source,
            output,
            format,
            max_bytes,
            branch,
            threads,
            config,
            no_style,
            verbose,
        } => {
            let mut effective = load_config(config.as_deref())?;
            if let Some(format) = format {
                effective.format = format.into();
            }
            if let Some(max_bytes) = max_bytes {
                effective.max_bytes = max_bytes;
            }
            if let Some(threads) = threads {
                effective.threads = threads;
            }
            if no_style {
                effective.embed_style = false;
            }
            cmd_render(&source, output, branch, &effective, verbose)
        },
        Commands::Scan { source, max_bytes, config, json, verbose } => {
            let mut effective = load_config(config.as_deref())?;
            if let Some(max_bytes) = max_bytes {
                effective.max_bytes = max_bytes;
            }
            cmd_scan(&source, &effective, json, verbose)
        },
        Commands::Info => cmd_info(),
        Commands::Init { format, output, force } => cmd_init(format.into(), output, force),
    }
}

fn cmd_render(
    source: &str,
    output: Option<PathBuf>,
    branch: Option<String>,
    config: &Config,
    verbose: bool,
) -> Result<()> {
    let start = Instant::now();

    if verbose {
        eprintln!("{}", "Codescroll - Repository Document Renderer".cyan().bold());
        eprintln!();
    }

    let pb = if verbose { Some(spinner("Preparing source...")?) } else { None };

    let workspace = prepare_source(source, branch, pb.as_ref())?;

    if let Some(pb) = &pb {
        pb.set_message("Rendering files...");
    }

    let options = PipelineOptions::from(config);
    let doc = build_document(&workspace.root, &workspace.locator, &workspace.revision, &options)
        .with_context(|| format!("Failed to render {}", workspace.locator))?;

    if let Some(pb) = &pb {
        pb.set_message("Formatting output...");
    }

    let formatter = OutputFormatter::by_format_with_options(config.format, config.embed_style);
    let output_text = formatter.format(&doc).context("Failed to format output")?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let stats = doc.stats();
    let render_errors = doc.sections.iter().filter(|s| s.is_error()).count();

    if let Some(ref output_path) = output {
        std::fs::write(output_path, &output_text)
            .with_context(|| format!("Failed to write output: {}", output_path.display()))?;

        eprintln!(
            "{} Wrote {} ({}) to {}",
            "✓".green(),
            formatter.name(),
            format_size(output_text.len() as u64, BINARY),
            output_path.display()
        );
        print_summary(&stats, render_errors, &doc.revision);
        if verbose {
            eprintln!("  Time:       {:?}", start.elapsed());
        }
    } else {
        print!("{}", output_text);
        if verbose {
            print_summary(&stats, render_errors, &doc.revision);
            eprintln!("  Time:       {:?}", start.elapsed());
        }
    }

    Ok(())
}

fn print_summary(stats: &DocumentStats, render_errors: usize, revision: &str) {
    eprintln!("  Revision:   {}", revision.yellow());
    eprintln!(
        "  Files:      {} total, {} rendered, {} skipped",
        stats.total_files, stats.rendered, stats.skipped
    );
    if render_errors > 0 {
        eprintln!("  {} {} file(s) could not be rendered", "Warning:".yellow().bold(), render_errors);
    }
}

fn cmd_scan(source: &str, config: &Config, json_output: bool, verbose: bool) -> Result<()> {
    let start = Instant::now();

    let workspace = prepare_source(source, None, None)?;

    let classifier = Classifier::new(config.max_bytes)
        .with_binary_extensions(&config.extra_binary_extensions);
    let records = classifier
        .classify(&workspace.root)
        .with_context(|| format!("Failed to scan {}", workspace.locator))?;

    let stats = DocumentStats::from_records(&records);
    let included_bytes: u64 = records
        .iter()
        .filter(|r| r.disposition.is_included())
        .map(|r| r.size_bytes)
        .sum();
    let elapsed = start.elapsed();

    if json_output {
        let mut value = serde_json::json!({
            "source": workspace.locator,
            "revision": workspace.revision,
            "max_bytes": config.max_bytes,
            "stats": stats,
            "included_bytes": included_bytes,
            "scan_time_ms": elapsed.as_millis(),
        });
        if verbose {
            value["files"] = serde_json::to_value(&records)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("{}", "━".repeat(50).dimmed());
    println!("  {}", "Scan Results".cyan().bold());
    println!("{}", "━".repeat(50).dimmed());
    println!();
    println!("  Source:        {}", workspace.locator.yellow());
    println!("  Revision:      {}", workspace.revision);
    println!("  Files:         {}", stats.total_files);
    println!("  Included:      {} ({})", stats.rendered, format_size(included_bytes, BINARY));
    println!("  Binary:        {}", stats.skipped_binary);
    println!(
        "  Oversize:      {} (> {})",
        stats.skipped_oversize,
        format_size(config.max_bytes, BINARY)
    );
    println!("  VCS metadata:  {}", stats.skipped_ignored);
    println!("  Scan Time:     {:?}", elapsed);
    println!();

    if verbose {
        for disposition in Disposition::ALL {
            let files: Vec<_> = records.iter().filter(|r| r.disposition == disposition).collect();
            if files.is_empty() {
                continue;
            }
            println!("  {} ({}):", disposition.name().cyan(), files.len());
            for file in files {
                println!("    {} - {}", file.relative_path, format_size(file.size_bytes, BINARY));
            }
            println!();
        }
    }

    Ok(())
}

fn cmd_info() -> Result<()> {
    let config = load_config(None)?;

    println!();
    println!("{}", "Codescroll - Repository Document Renderer".cyan().bold());
    println!("{}", "━".repeat(50).dimmed());
    println!();
    println!("  Version:      {}", env!("CARGO_PKG_VERSION"));
    println!("  Engine:       {}", codescroll_engine::VERSION);
    println!();
    println!("  {}:", "Output Formats".yellow());
    println!("    html      - Single page with human and LLM views (default)");
    println!("    llm       - <documents> text only");
    println!("    json      - Document model as JSON");
    println!();
    println!("  {}:", "Highlighted Languages".yellow());
    println!("    {}", codescroll_engine::highlight::supported_languages().join(", "));
    println!();
    println!("  {}:", "Effective Configuration".yellow());
    println!("    max_bytes:    {} ({})", config.max_bytes, format_size(config.max_bytes, BINARY));
    println!("    format:       {}", config.format.extension());
    println!("    threads:      {}", if config.threads == 0 { "auto".to_owned() } else { config.threads.to_string() });
    println!("    embed_style:  {}", config.embed_style);
    if !config.extra_binary_extensions.is_empty() {
        println!("    binary +:     {}", config.extra_binary_extensions.join(", "));
    }
    if !config.extra_markdown_extensions.is_empty() {
        println!("    markdown +:   {}", config.extra_markdown_extensions.join(", "));
    }
    println!();

    Ok(())
}

fn cmd_init(format: ConfigFileFormat, output: Option<PathBuf>, force: bool) -> Result<()> {
    let output_path = output.unwrap_or_else(|| PathBuf::from(format.default_file_name()));

    if output_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            output_path.display()
        );
    }

    let config_content = Config::default()
        .to_file_string(format)
        .context("Failed to serialize default configuration")?;

    std::fs::write(&output_path, &config_content)
        .with_context(|| format!("Failed to write config file: {}", output_path.display()))?;

    println!("{} Created configuration file: {}", "✓".green(), output_path.display());
    println!();
    println!("Edit this file to customize Codescroll behavior.");
    println!("Environment variables prefixed with CODESCROLL_ override it.");

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Config::load(explicit, &cwd).context("Failed to load configuration")
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

/// URLs are always remote; shorthands only when no such local path exists
fn is_remote(source: &str) -> bool {
    source.contains("://") || (!Path::new(source).exists() && RemoteRepo::is_remote_url(source))
}

fn prepare_source(
    source: &str,
    branch: Option<String>,
    pb: Option<&ProgressBar>,
) -> Result<Workspace> {
    if is_remote(source) {
        let mut remote = RemoteRepo::parse(source)
            .with_context(|| format!("Invalid remote locator: {}", source))?;

        if branch.is_some() {
            remote.branch = branch;
        }

        if let Some(pb) = pb {
            let branch_info = remote.branch.as_deref().unwrap_or("default");
            pb.set_message(format!(
                "Cloning {} from {:?} (branch: {})...",
                remote.name, remote.provider, branch_info
            ));
        }

        let acquired = remote
            .acquire()
            .with_context(|| format!("Failed to clone repository: {}", remote.url))?;

        return Ok(Workspace {
            root: acquired.root.clone(),
            locator: source.to_owned(),
            revision: acquired.revision.clone(),
            _remote: Some(acquired),
        });
    }

    if branch.is_some() {
        log::warn!("--branch is ignored for local sources");
    }

    let root = PathBuf::from(source);
    let locator = root
        .canonicalize()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| source.to_owned());
    let revision = revision_of(&root);

    Ok(Workspace { root, locator, revision, _remote: None })
}
