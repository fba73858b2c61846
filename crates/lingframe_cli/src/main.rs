//! `lingframe` command-line interface.
//!
//! Thin orchestration over `lingframe_core`: resolves a project directory,
//! populates a registry, and drives atomization, analysis, and
//! visualization. Errors print as one line and exit non-zero; `--verbose`
//! adds detail.

mod project;

use clap::{Parser, Subcommand};
use lingframe_core::{
    register_builtins, AnalysisOutput, Atomizer, Corpus, Pipeline, Registry, RunOptions,
};
use project::{
    corpus_path, load_project, resolve_schema, to_module_config, to_pipeline_config, CliError,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "lingframe",
    version,
    about = "Schema-driven text atomization and analysis"
)]
struct Cli {
    /// Directory containing project definitions.
    #[arg(long, global = true, default_value = "projects")]
    projects_dir: PathBuf,

    /// Directory containing domain profile definitions.
    #[arg(long, global = true, default_value = "domains")]
    domains_dir: PathBuf,

    /// Print full error detail.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the complete pipeline for a project.
    Run {
        #[arg(long, short)]
        project: String,
        /// Also run the configured visualization adapters.
        #[arg(long)]
        visualize: bool,
    },
    /// Atomize a project's documents and export the corpus.
    Atomize {
        #[arg(long, short)]
        project: String,
    },
    /// Run analysis modules against an already-atomized corpus.
    Analyze {
        #[arg(long, short)]
        project: String,
        /// Run only this module instead of the configured list.
        #[arg(long, short)]
        module: Option<String>,
    },
    /// Generate visualization artifacts from exported analysis data.
    Visualize {
        #[arg(long, short)]
        project: String,
    },
    /// List registered modules, adapters, domains, and schemas.
    ListModules,
    /// List projects under the projects directory.
    ListProjects,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            if cli.verbose {
                eprintln!("{err:?}");
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Run { project, visualize } => cmd_run(cli, project, *visualize),
        Command::Atomize { project } => cmd_atomize(cli, project),
        Command::Analyze { project, module } => cmd_analyze(cli, project, module.as_deref()),
        Command::Visualize { project } => cmd_visualize(cli, project),
        Command::ListModules => cmd_list_modules(cli),
        Command::ListProjects => cmd_list_projects(cli),
    }
}

/// Builds the process registry: built-ins plus discovered domain profiles.
fn setup_registry(cli: &Cli) -> Result<Registry, CliError> {
    let mut registry = Registry::new();
    register_builtins(&mut registry);
    registry
        .discover_domains(&cli.domains_dir)
        .map_err(|err| CliError::Core(err.to_string()))?;
    Ok(registry)
}

/// Best-effort file logging under the project directory.
fn init_project_logging(project_dir: &Path, verbose: bool) {
    let Ok(absolute) = std::fs::canonicalize(project_dir) else {
        return;
    };
    let log_dir = absolute.join(".logs");
    if let Err(err) = lingframe_core::init_logging(
        lingframe_core::default_log_level(),
        &log_dir.to_string_lossy(),
    ) {
        if verbose {
            eprintln!("logging disabled: {err}");
        }
    }
}

fn cmd_run(cli: &Cli, project: &str, visualize: bool) -> Result<(), CliError> {
    let (config, project_dir) = load_project(&cli.projects_dir, project)?;
    init_project_logging(&project_dir, cli.verbose);
    let registry = setup_registry(cli)?;

    let pipeline_config = to_pipeline_config(&config, &project_dir, &registry);
    let mut pipeline = Pipeline::new(pipeline_config, &registry);
    let report = pipeline
        .run(&RunOptions {
            export: true,
            visualize,
        })
        .map_err(|err| CliError::Core(err.to_string()))?;

    println!("Pipeline completed: {}", report.corpus_name);
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    println!(
        "  Analyses: {}",
        report
            .analyses
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    for (name, detail) in &report.failures {
        println!("  Failed: {name} ({detail})");
    }
    for (analysis, artifacts) in &report.visualizations {
        for artifact in artifacts {
            println!("  Artifact [{analysis}]: {}", artifact.display());
        }
    }
    Ok(())
}

fn cmd_atomize(cli: &Cli, project: &str) -> Result<(), CliError> {
    let (config, project_dir) = load_project(&cli.projects_dir, project)?;
    init_project_logging(&project_dir, cli.verbose);
    let registry = setup_registry(cli)?;

    let schema = resolve_schema(&config, &registry);
    let mut atomizer =
        Atomizer::new(schema.clone()).map_err(|err| CliError::Core(err.to_string()))?;

    let mut documents = Vec::new();
    let mut failed = 0usize;
    for entry in &config.corpus.documents {
        let source = project_dir.join(&entry.source);
        match atomizer.atomize_document(
            &source,
            entry.id.clone(),
            entry.title.clone().or_else(|| config.project.title.clone()),
            entry
                .author
                .clone()
                .or_else(|| config.project.author.clone()),
        ) {
            Ok(document) => {
                println!("Atomized: {}", source.display());
                documents.push(document);
            }
            Err(err) => {
                // One undecodable document does not block the others.
                eprintln!("Skipped {}: {err}", source.display());
                failed += 1;
            }
        }
    }

    if documents.is_empty() && failed > 0 {
        return Err(CliError::Core(
            "no document could be atomized".to_string(),
        ));
    }

    let corpus = Corpus::new(config.project.name.clone(), documents, schema);
    let output_path = corpus_path(&config, &project_dir);
    Atomizer::export_json(&corpus, &output_path)
        .map_err(|err| CliError::Core(err.to_string()))?;

    println!("Exported: {}", output_path.display());
    for level in lingframe_core::AtomLevel::ALL {
        if corpus.schema.contains(level) {
            println!("  {level}s: {}", corpus.count_atoms(level));
        }
    }
    Ok(())
}

fn cmd_analyze(cli: &Cli, project: &str, module: Option<&str>) -> Result<(), CliError> {
    let (config, project_dir) = load_project(&cli.projects_dir, project)?;
    init_project_logging(&project_dir, cli.verbose);
    let registry = setup_registry(cli)?;

    let path = corpus_path(&config, &project_dir);
    if !path.is_file() {
        return Err(CliError::CorpusMissing(path));
    }
    let corpus = Atomizer::load_json(&path).map_err(|err| CliError::Core(err.to_string()))?;
    println!("Loaded corpus: {}", corpus.name);

    let domain = config
        .domain
        .profile
        .as_deref()
        .and_then(|name| registry.get_domain(name));
    if let Some(profile) = domain {
        println!("Using domain: {}", profile.name);
    }

    let selected: Vec<(String, lingframe_core::ModuleConfig)> = match module {
        Some(name) => vec![(name.to_string(), lingframe_core::ModuleConfig::new())],
        None => config
            .analysis
            .modules
            .iter()
            .map(|entry| (entry.module.clone(), to_module_config(&entry.config)))
            .collect(),
    };

    let processed_dir = project_dir.join(&config.output.processed_dir);
    std::fs::create_dir_all(&processed_dir).map_err(|err| CliError::Core(err.to_string()))?;

    let mut missing: Option<String> = None;
    for (name, module_config) in &selected {
        println!("Running: {name}");
        let instance = match registry.create_analysis(name) {
            Ok(instance) => instance,
            Err(err) => {
                eprintln!("  {err}");
                missing.get_or_insert_with(|| name.clone());
                continue;
            }
        };
        match instance.analyze(&corpus, domain, module_config) {
            Ok(output) => {
                let output_path = processed_dir.join(format!("{name}_data.json"));
                let json = output
                    .to_json_string()
                    .map_err(|err| CliError::Core(err.to_string()))?;
                std::fs::write(&output_path, json)
                    .map_err(|err| CliError::Core(err.to_string()))?;
                println!("  Exported: {}", output_path.display());
            }
            Err(err) => eprintln!("  {err}"),
        }
    }

    match missing {
        Some(name) => Err(CliError::ModuleNotFound(name)),
        None => Ok(()),
    }
}

fn cmd_visualize(cli: &Cli, project: &str) -> Result<(), CliError> {
    let (config, project_dir) = load_project(&cli.projects_dir, project)?;
    init_project_logging(&project_dir, cli.verbose);
    let registry = setup_registry(cli)?;

    let processed_dir = project_dir.join(&config.output.processed_dir);
    let viz_dir = project_dir.join(&config.output.visualizations_dir);

    let mut missing: Option<String> = None;
    for entry in &config.visualization.adapters {
        let data_path = processed_dir.join(format!("{}_data.json", entry.analysis));
        let Ok(content) = std::fs::read_to_string(&data_path) else {
            println!(
                "Skipping {}: analysis data not found ({})",
                entry.adapter,
                data_path.display()
            );
            continue;
        };
        let analysis: AnalysisOutput =
            serde_json::from_str(&content).map_err(|err| CliError::Core(err.to_string()))?;

        println!("Generating: {} for {}", entry.adapter, entry.analysis);
        let adapter = match registry.create_adapter(&entry.adapter) {
            Ok(adapter) => adapter,
            Err(err) => {
                eprintln!("  {err}");
                missing.get_or_insert_with(|| entry.adapter.clone());
                continue;
            }
        };
        match adapter.generate(&analysis, &viz_dir, &to_module_config(&entry.config)) {
            Ok(artifact) => println!("  Created: {}", artifact.display()),
            Err(err) => eprintln!("  {err}"),
        }
    }

    match missing {
        Some(name) => Err(CliError::AdapterNotFound(name)),
        None => Ok(()),
    }
}

fn cmd_list_modules(cli: &Cli) -> Result<(), CliError> {
    let registry = setup_registry(cli)?;
    let summary = registry.summary();

    println!("Analysis modules:");
    for name in &summary.analysis_modules {
        println!("  - {name}");
    }
    println!("\nVisualization adapters:");
    for name in &summary.visualization_adapters {
        println!("  - {name}");
    }
    println!("\nDomain profiles:");
    for name in &summary.domain_profiles {
        println!("  - {name}");
    }
    println!("\nSchemas:");
    for name in &summary.schemas {
        println!("  - {name}");
    }
    Ok(())
}

fn cmd_list_projects(cli: &Cli) -> Result<(), CliError> {
    let projects = project::list_projects(&cli.projects_dir);
    if projects.is_empty() {
        println!("No projects found under {}", cli.projects_dir.display());
        return Ok(());
    }

    println!("Projects:");
    for (reference, title) in projects {
        match title {
            Some(title) => println!("  - {reference} ({title})"),
            None => println!("  - {reference}"),
        }
    }
    Ok(())
}
