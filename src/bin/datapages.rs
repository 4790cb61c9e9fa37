use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use datapages::client::HttpClient;
use datapages::config::{ConfigLoader, ResolvedConfig};
use datapages::domain::{Project, Selection};
use datapages::error::PageError;
use datapages::navigation::{SessionHistory, encode_query};
use datapages::output::{JsonOutput, OutputMode, SpeciesEntry};
use datapages::page::Page;
use datapages::registry::SourceRegistry;
use datapages::runtime::Runtime;
use datapages::tui::Tui;

const DEFAULT_PAGE_PATH: &str = "/data.html";

#[derive(Parser)]
#[command(name = "datapages")]
#[command(about = "Browse per-species sequencing data tables by project")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List configured species and their data sources")]
    Species,
    #[command(about = "Load a species/project view and print it as JSON")]
    View(ViewArgs),
}

#[derive(Args, Clone, Default)]
struct ViewArgs {
    #[arg(long)]
    species: Option<String>,

    #[arg(long)]
    project: Option<String>,

    #[arg(long, conflicts_with_all = ["species", "project"])]
    query: Option<String>,

    #[arg(long, default_value = DEFAULT_PAGE_PATH)]
    page_path: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<PageError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PageError) -> u8 {
    match error {
        PageError::MissingConfig
        | PageError::ConfigRead(_)
        | PageError::ConfigParse(_)
        | PageError::NoSpecies(_) => 2,
        PageError::DatasetHttp(_)
        | PageError::DatasetStatus { .. }
        | PageError::ReferencesHttp(_)
        | PageError::ReferencesStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Species) => run_species(&config),
        Some(Commands::View(args)) => run_view(&config, args),
        None => match output_mode {
            OutputMode::Interactive => run_browser(&config),
            OutputMode::NonInteractive => run_view(&config, ViewArgs::default_view()),
        },
    }
}

impl ViewArgs {
    fn default_view() -> Self {
        Self {
            page_path: DEFAULT_PAGE_PATH.to_string(),
            ..Self::default()
        }
    }

    fn initial_url(&self) -> String {
        if let Some(query) = &self.query {
            let query = query.strip_prefix('?').unwrap_or(query);
            return format!("{}?{query}", self.page_path);
        }
        match &self.species {
            Some(species) => {
                let project = self
                    .project
                    .as_deref()
                    .map(Project::named)
                    .unwrap_or_default();
                let selection = Selection::new(species.clone(), project);
                format!("{}{}", self.page_path, encode_query(&selection))
            }
            None => self.page_path.clone(),
        }
    }
}

fn runtime(config: &ResolvedConfig) -> miette::Result<Runtime<HttpClient, HttpClient>> {
    let client = HttpClient::new(&config.references_url, config.base_url.as_deref())?;
    Ok(Runtime::new(client.clone(), client))
}

fn run_species(config: &ResolvedConfig) -> miette::Result<()> {
    let registry = SourceRegistry::from_config(config)?;
    let entries = registry
        .species()
        .map(|species| SpeciesEntry {
            species: species.to_string(),
            location: registry
                .location_for(species)
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
        .collect::<Vec<_>>();
    JsonOutput::print_species(&entries).into_diagnostic()
}

fn run_view(config: &ResolvedConfig, args: ViewArgs) -> miette::Result<()> {
    let runtime = runtime(config)?;
    let mut page = Page::from_config(config, SessionHistory::new(args.initial_url()))?;
    let effect = page.open();
    runtime.drive(&mut page, effect);
    JsonOutput::print_snapshot(&page.snapshot()).into_diagnostic()
}

fn run_browser(config: &ResolvedConfig) -> miette::Result<()> {
    let runtime = runtime(config)?;
    let page = Page::from_config(config, SessionHistory::new(DEFAULT_PAGE_PATH))?;
    let mut tui = Tui::new(page, runtime);
    let snapshot = tui.run()?;
    println!("{}", snapshot.url);
    Ok(())
}
