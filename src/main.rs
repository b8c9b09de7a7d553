//! bpm-lifecycle - run a business process through the BPM lifecycle with an LLM.
//!
//! Each of the five stages (identification, discovery, analysis, redesign,
//! monitoring) is one prompt; discovery and redesign are additionally
//! exported as flow diagrams and BPMN process definitions.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bpm_lifecycle::bpm::{extract_tasks, FlowDiagram, ProcessDefinition, Stage, SCENARIOS};
use bpm_lifecycle::core::{Config, LOCAL_CONFIG_FILE};
use bpm_lifecycle::lifecycle::{Lifecycle, ProcessRequest};
use bpm_lifecycle::llm::{Credential, LanguageModel, OpenAIProvider, KNOWN_MODELS};
use bpm_lifecycle::output::{write_artifacts, RenderOptions, Reporter};

/// Walk a business process through the BPM lifecycle with an LLM
#[derive(Parser)]
#[command(name = "bpm-lifecycle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all five lifecycle stages on a process description
    Run(RunArgs),

    /// List the built-in example scenarios
    Scenarios {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// Show the prompt template of each stage
    Prompts {
        /// Stage name or number (all stages when omitted)
        stage: Option<Stage>,
    },

    /// Extract tasks from text and build the diagram and BPMN document, without calling a model
    Extract {
        /// Read text from a file ('-' or omitted for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Process name for the BPMN document
        #[arg(short, long, default_value = "Business Process")]
        name: String,

        /// What to print
        #[arg(long, value_enum, default_value_t = ExtractFormat::Tasks)]
        format: ExtractFormat,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Built-in scenario to analyze (see `scenarios`)
    #[arg(short, long, conflicts_with_all = ["description", "file"])]
    scenario: Option<String>,

    /// Process description text
    #[arg(short, long, conflicts_with = "file")]
    description: Option<String>,

    /// Read the description from a file ('-' for stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Process name used in exported documents
    #[arg(short, long)]
    name: Option<String>,

    /// Model identifier (gpt-4, gpt-4-turbo, gpt-3.5-turbo, ...)
    #[arg(short, long)]
    model: Option<String>,

    /// API key (defaults to the configured environment variable, OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Print the prompt sent for each stage
    #[arg(long)]
    show_prompts: bool,

    /// Print the generated BPMN XML
    #[arg(long)]
    show_xml: bool,

    /// Write .bpmn (and .dot) files into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ListFormat::Text)]
    format: ListFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExtractFormat {
    /// Numbered task list
    Tasks,
    /// Graphviz DOT diagram
    Dot,
    /// BPMN XML document
    Bpmn,
    /// Tasks, diagram and definition as JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    // Pick up OPENAI_API_KEY from a local .env file
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Run(args) => cmd_run(args)?,
        Commands::Scenarios { format } => cmd_scenarios(format)?,
        Commands::Prompts { stage } => cmd_prompts(stage),
        Commands::Extract { file, name, format } => cmd_extract(file.as_deref(), &name, format)?,
        Commands::Config { path } => cmd_config(path)?,
        Commands::Completions { shell } => cmd_completions(shell),
    }

    Ok(())
}

/// Run the full lifecycle.
fn cmd_run(args: RunArgs) -> Result<()> {
    let mut config = Config::load()?;

    let mut request = if let Some(key) = &args.scenario {
        ProcessRequest::for_scenario(key)?
    } else if let Some(description) = &args.description {
        ProcessRequest::custom(description.as_str())
    } else if let Some(file) = &args.file {
        ProcessRequest::custom(read_input(Some(file))?)
    } else {
        anyhow::bail!(
            "No process description given.\n\
             Use --scenario <KEY>, --description <TEXT> or --file <PATH>. \
             Run `bpm-lifecycle scenarios` to list the examples."
        );
    };
    if let Some(name) = args.name {
        request.name = name;
    }
    request.validate()?;

    let api_key = Credential::resolve(args.api_key.as_deref(), &config.llm.api_key_env)?;

    if let Some(model) = args.model {
        config.llm.model = model;
    }
    let provider = OpenAIProvider::from_config(&config.llm, api_key)?;

    let options = RenderOptions {
        show_prompts: args.show_prompts || config.output.show_prompts,
        show_xml: args.show_xml || config.output.show_xml,
    };
    let output_dir = args.output_dir.or_else(|| config.output.dir.clone());

    let rt = tokio::runtime::Runtime::new()?;
    let lifecycle = Lifecycle::new(provider);

    let report = match args.format {
        ListFormat::Json => {
            let report = rt.block_on(lifecycle.run(&request))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            report
        }
        ListFormat::Text => {
            let stdout = io::stdout();
            let mut reporter = Reporter::new(stdout.lock(), options);
            reporter.header(
                &request.name,
                lifecycle.model().name(),
                lifecycle.model().model(),
            )?;

            let mut render_error = None;
            let report = rt.block_on(lifecycle.run_with(&request, |stage| {
                if let Err(e) = reporter.stage(stage).and_then(|()| reporter.flush()) {
                    if render_error.is_none() {
                        render_error = Some(e);
                    }
                }
            }))?;
            if let Some(e) = render_error {
                return Err(e.into());
            }
            reporter.summary(&report)?;
            report
        }
    };

    if let Some(dir) = output_dir {
        for path in write_artifacts(&report, &dir, config.output.write_diagrams)? {
            eprintln!("Saved {}", path.display());
        }
    }

    Ok(())
}

/// List the scenario catalog.
fn cmd_scenarios(format: ListFormat) -> Result<()> {
    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&SCENARIOS)?);
        }
        ListFormat::Text => {
            for scenario in &SCENARIOS {
                println!(
                    "{:<12} {} ({} - {})",
                    scenario.key, scenario.title, scenario.complexity, scenario.industry
                );
            }
            println!("\nRun one with: bpm-lifecycle run --scenario <KEY>");
        }
    }
    Ok(())
}

/// Print prompt templates.
fn cmd_prompts(stage: Option<Stage>) {
    let stages: Vec<Stage> = stage.map_or_else(|| Stage::ALL.to_vec(), |s| vec![s]);
    for stage in stages {
        println!("# {}. {}", stage.number(), stage.label());
        println!("{}\n", stage.template());
    }
}

/// Run extraction and artifact generation locally.
fn cmd_extract(file: Option<&Path>, name: &str, format: ExtractFormat) -> Result<()> {
    let text = read_input(file)?;
    let tasks = extract_tasks(&text);

    match format {
        ExtractFormat::Tasks => {
            for (i, task) in tasks.iter().enumerate() {
                println!("{}. {task}", i + 1);
            }
        }
        ExtractFormat::Dot => {
            print!("{}", FlowDiagram::build(&tasks, name).to_dot());
        }
        ExtractFormat::Bpmn => {
            print!("{}", ProcessDefinition::build(&tasks, name).to_xml()?);
        }
        ExtractFormat::Json => {
            let value = serde_json::json!({
                "tasks": tasks,
                "diagram": FlowDiagram::build(&tasks, name),
                "definition": ProcessDefinition::build(&tasks, name),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            println!("{}", local.display());
        } else if let Some(path) = Config::config_file() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");
    println!("# Known models: {}", KNOWN_MODELS.join(", "));

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "bpm-lifecycle", &mut io::stdout());
}

/// Read text from a file, or stdin when `path` is `None` or `-`.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
