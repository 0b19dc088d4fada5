// Inline critical CSS from the command line
//
// Reads an HTML document and a critical stylesheet from files or stdin and
// writes the rewritten document to stdout.

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use critical_inline::config::{IgnoreRule, InlineOptions, InlineOptionsBuilder, NoscriptPlacement, Strategy};
use critical_inline::css::looks_like_css;
use critical_inline::inline_css::{InlineError, inline};

/// Inline critical CSS and load the remaining stylesheets asynchronously
#[derive(Parser, Debug)]
#[command(name = "inline-critical")]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
struct Cli {
    /// HTML and CSS files, told apart by their content
    files: Vec<PathBuf>,

    /// Critical CSS file
    #[arg(short, long)]
    css: Option<PathBuf>,

    /// HTML file
    #[arg(short = 'h', long)]
    html: Option<PathBuf>,

    /// Skip matching stylesheets, `/expr/flags` is a regular expression
    #[arg(short, long, value_parser = IgnoreRule::parse)]
    ignore: Vec<IgnoreRule>,

    /// Minify the inlined styles
    #[arg(short, long, num_args = 0..=1, default_missing_value = "true")]
    minify: Option<bool>,

    /// Remove the inlined rules from the referenced stylesheets
    #[arg(short, long)]
    extract: bool,

    /// Base directory for resolving stylesheets [default: current directory]
    #[arg(short, long)]
    base: Option<PathBuf>,

    /// Insert the critical styles before this element
    #[arg(short, long)]
    selector: Option<String>,

    /// Async loading strategy (body, media, swap, polyfill)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Use the loadCSS polyfill
    #[arg(long)]
    polyfill: bool,

    /// Position of the noscript fallback (head, body, false)
    #[arg(long)]
    noscript: Option<NoscriptPlacement>,

    /// Replace the stylesheets with this href, repeatable
    #[arg(long = "replace")]
    replace: Vec<String>,

    /// JSON options file, explicit flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

struct Inputs {
    html: Option<Vec<u8>>,
    css: Option<Vec<u8>>,
}

impl Inputs {
    /// File it under CSS when it parses as a stylesheet, HTML otherwise
    fn classify(&mut self, content: Vec<u8>) {
        let is_css = std::str::from_utf8(&content).is_ok_and(looks_like_css);
        let slot = if is_css { &mut self.css } else { &mut self.html };
        if slot.is_none() {
            *slot = Some(content);
        } else {
            log::warn!("Ignoring extra {} input", if is_css { "CSS" } else { "HTML" });
        }
    }

    fn is_complete(&self) -> bool {
        self.html.is_some() && self.css.is_some()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn collect_inputs(cli: &Cli) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut inputs = Inputs {
        html: cli.html.as_deref().map(read_file).transpose()?,
        css: cli.css.as_deref().map(read_file).transpose()?,
    };

    for file in &cli.files {
        inputs.classify(read_file(file)?);
    }

    let stdin = io::stdin();
    if !inputs.is_complete() && !stdin.is_terminal() {
        let mut piped = Vec::new();
        stdin
            .lock()
            .read_to_end(&mut piped)
            .context("Failed to read stdin")?;
        if !piped.is_empty() {
            inputs.classify(piped);
        }
    }

    match (inputs.html, inputs.css) {
        (Some(html), Some(css)) => Ok((html, css)),
        (None, _) => bail!("Missing HTML input"),
        (_, None) => bail!("Missing CSS input"),
    }
}

fn build_options(cli: &Cli) -> Result<InlineOptions> {
    let loaded = match &cli.config {
        Some(path) => InlineOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => InlineOptions::default(),
    };

    let base = match (&cli.base, loaded.base_path()) {
        (Some(base), _) => Some(base.clone()),
        (None, Some(_)) => None,
        (None, None) => Some(std::env::current_dir().context("Failed to resolve current directory")?),
    };

    let mut builder = InlineOptionsBuilder::from(loaded).ignore_all(cli.ignore.iter().cloned());

    if cli.extract {
        builder = builder.extract(true);
    }
    if let Some(base) = base {
        builder = builder.base_path(base);
    }
    if let Some(selector) = &cli.selector {
        builder = builder.selector(selector.as_str());
    }
    if let Some(strategy) = cli.strategy {
        builder = builder.strategy(strategy);
    }
    if cli.polyfill {
        builder = builder.polyfill(true);
    }
    if let Some(noscript) = cli.noscript {
        builder = builder.noscript(noscript);
    }
    if !cli.replace.is_empty() {
        builder = builder.replace_stylesheets(cli.replace.iter().cloned());
    }
    if let Some(minify) = cli.minify {
        builder = builder.minify(minify);
    }

    Ok(builder.build())
}

fn run(cli: &Cli) -> Result<()> {
    let options = build_options(cli)?;
    let (html, css) = collect_inputs(cli)?;

    let output = inline(html, css, &options)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output).context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let usage = e
                .downcast_ref::<InlineError>()
                .is_none_or(InlineError::is_usage_error);
            if usage {
                eprintln!();
                eprintln!("{}", Cli::command().render_help());
            }
            ExitCode::FAILURE
        }
    }
}
