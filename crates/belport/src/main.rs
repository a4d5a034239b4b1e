use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use belport_core::boundary::starts_unit;
use belport_core::classify::Classifier;
use belport_core::config::{DEFAULT_CONFIG_FILENAME, ScrapeConfig, ValueSource, load_config};
use belport_core::fetch::{FilePageSource, HttpPageSource, PageSource};
use belport_core::pipeline::{
    ParseOptions, ParseStrategy, ScrapeReport, ScrapeSettings, scrape_with_source,
};
use belport_core::render::render_lines;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "belport",
    version,
    about = "Scrape geriatric unit bed capacity from the Belport status page into CSV and JSON"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    output_dir: Option<PathBuf>,
    #[arg(long, global = true, value_name = "NAME", help = "Parse strategy (lines|dom)")]
    strategy: Option<String>,
    #[arg(long, global = true, help = "Print resolved settings and their sources")]
    diagnostics: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    config: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    strategy: Option<String>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            output_dir: cli.output_dir.clone(),
            strategy: cli.strategy.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Fetch the live page and write both artifacts (default)")]
    Scrape,
    #[command(about = "Parse a saved copy of the page and write both artifacts")]
    Parse(PageArgs),
    #[command(about = "Print the rendered line sequence of a saved page")]
    Lines(PageArgs),
}

#[derive(Debug, Args)]
struct PageArgs {
    #[arg(value_name = "HTML_FILE")]
    html_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        None | Some(Commands::Scrape) => run_scrape(&runtime),
        Some(Commands::Parse(args)) => run_parse(&runtime, args),
        Some(Commands::Lines(args)) => run_lines(&runtime, args),
    }
}

fn run_scrape(runtime: &RuntimeOptions) -> Result<()> {
    let settings = resolve_settings(runtime)?;
    let source = HttpPageSource::new(&settings.config.fetch_settings())?;
    run_pipeline(runtime, &settings, &source)
}

fn run_parse(runtime: &RuntimeOptions, args: PageArgs) -> Result<()> {
    let settings = resolve_settings(runtime)?;
    let source = FilePageSource {
        path: args.html_file,
    };
    run_pipeline(runtime, &settings, &source)
}

fn run_pipeline<S: PageSource>(
    runtime: &RuntimeOptions,
    settings: &ResolvedSettings,
    source: &S,
) -> Result<()> {
    let report = scrape_with_source(source, &settings.scrape_settings())?;
    print_report(settings, &report);
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", settings.diagnostics());
    }
    Ok(())
}

fn run_lines(runtime: &RuntimeOptions, args: PageArgs) -> Result<()> {
    let settings = resolve_settings(runtime)?;
    let html = fs::read_to_string(&args.html_file)
        .with_context(|| format!("failed to read {}", args.html_file.display()))?;
    let lines = render_lines(&html);

    if !runtime.diagnostics {
        for line in &lines {
            println!("{line}");
        }
        return Ok(());
    }

    let classifier = Classifier::new(settings.config.labels.clone())?;
    for (pos, line) in lines.iter().enumerate() {
        let tag = if starts_unit(&lines, pos, classifier.labels()) {
            "unit"
        } else {
            classifier.matcher_name(line).unwrap_or("-")
        };
        println!("{pos:>4} {tag:<13} {line}");
    }
    println!("\n[diagnostics]\n{}", settings.diagnostics());
    Ok(())
}

fn print_report(settings: &ResolvedSettings, report: &ScrapeReport) {
    println!("scrape complete");
    println!("source_url: {}", report.payload.source_url);
    println!("scraped_at_utc: {}", report.payload.scraped_at_utc);
    println!("strategy: {}", settings.strategy.as_str());
    println!("dedupe: {}", format_flag(settings.parse_options().dedupe_enabled()));
    println!("units: {}", report.payload.rows.len());
    println!("csv_path: {}", normalize_path(&report.outputs.csv_path));
    println!("json_path: {}", normalize_path(&report.outputs.json_path));
    if report.payload.rows.is_empty() {
        eprintln!("warning: no units extracted; the page layout may have changed");
    }
}

struct ResolvedSettings {
    config: ScrapeConfig,
    config_path: PathBuf,
    config_source: ValueSource,
    source_url: (String, ValueSource),
    strategy: ParseStrategy,
    strategy_source: ValueSource,
    output_dir: (PathBuf, ValueSource),
}

impl ResolvedSettings {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strategy: self.strategy,
            dedupe: self.config.parse.dedupe,
            labels: self.config.labels.clone(),
        }
    }

    fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            source_url: self.source_url.0.clone(),
            parse: self.parse_options(),
            outputs: self.config.output_paths(&self.output_dir.0),
        }
    }

    fn diagnostics(&self) -> String {
        let (user_agent, user_agent_source) = self.config.user_agent();
        let (timeout_ms, timeout_source) = self.config.timeout_ms();
        format!(
            "config_path={} ({})\nsource_url={} ({})\nuser_agent={} ({})\ntimeout_ms={} ({})\nstrategy={} ({})\noutput_dir={} ({})",
            normalize_path(&self.config_path),
            self.config_source.as_str(),
            self.source_url.0,
            self.source_url.1.as_str(),
            user_agent,
            user_agent_source.as_str(),
            timeout_ms,
            timeout_source.as_str(),
            self.strategy.as_str(),
            self.strategy_source.as_str(),
            normalize_path(&self.output_dir.0),
            self.output_dir.1.as_str(),
        )
    }
}

fn resolve_settings(runtime: &RuntimeOptions) -> Result<ResolvedSettings> {
    dotenvy::dotenv().ok();

    let (config_path, config_source) = match &runtime.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", normalize_path(path));
            }
            (path.clone(), ValueSource::Flag)
        }
        None => {
            let cwd = env::current_dir().context("failed to read current directory")?;
            (cwd.join(DEFAULT_CONFIG_FILENAME), ValueSource::Default)
        }
    };
    let config = load_config(&config_path)?;
    let config_source = if config_source == ValueSource::Default && config_path.exists() {
        ValueSource::Config
    } else {
        config_source
    };

    let (strategy, strategy_source) = match &runtime.strategy {
        Some(value) => (ParseStrategy::parse(value)?, ValueSource::Flag),
        None => config.strategy()?,
    };
    let output_dir = match &runtime.output_dir {
        Some(dir) => (dir.clone(), ValueSource::Flag),
        None => config.output_dir(),
    };
    let source_url = config.source_url();

    Ok(ResolvedSettings {
        config,
        config_path,
        config_source,
        source_url,
        strategy,
        strategy_source,
        output_dir,
    })
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
