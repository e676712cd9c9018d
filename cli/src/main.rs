use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vmimpact_kernel::kb::{self, loader};
use vmimpact_kernel::{
    Action, ActionKind, ImpactEngine, ImpactReport, KnowledgeBase, MachineDescription, SkuCatalog,
    StaticSkuCatalog,
};

mod config;
mod render;

use config::{read_document, CliConfig, OutputFormat};

/// VM Change Impact CLI
#[derive(Parser, Debug)]
#[command(name = "vmimpact")]
#[command(about = "Predict the impact of planned VM changes", long_about = None)]
struct Cli {
    /// Path to CLI config (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one action against one machine
    Evaluate(EvaluateArgs),

    /// Validate a knowledge base
    ValidateKb {
        /// Authoring tree; defaults to the configured or bundled one
        #[arg(long)]
        kb: Option<PathBuf>,
    },

    /// Show a SKU record
    Sku { name: String },

    /// List supported action types
    Actions,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Machine description (JSON or YAML)
    #[arg(long)]
    machine: PathBuf,

    /// Action request (JSON or YAML)
    #[arg(long, conflicts_with = "action_type", required_unless_present = "action_type")]
    action: Option<PathBuf>,

    /// Action type, e.g. ResizeVM
    #[arg(long)]
    action_type: Option<ActionKind>,

    #[arg(long, requires = "action_type")]
    target_sku: Option<String>,

    #[arg(long, requires = "action_type")]
    target_lun: Option<u32>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    // stdout carries the report
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default_config(),
    };

    match cli.command {
        Command::Evaluate(args) => evaluate(&config, args),
        Command::ValidateKb { kb } => validate_kb(&config, kb.as_deref()),
        Command::Sku { name } => show_sku(&config, &name),
        Command::Actions => {
            for kind in ActionKind::ALL {
                println!("{:<18} {}", kind.as_str(), kind.display_name());
            }
            Ok(())
        }
    }
}

// ----------------------------
// Loading
// ----------------------------

fn load_kb(path: Option<&Path>) -> Result<KnowledgeBase> {
    let kb = match path {
        Some(dir) => loader::load_dir(dir)
            .with_context(|| format!("failed to load knowledge base from {}", dir.display()))?,
        None => KnowledgeBase::builtin().context("bundled knowledge base is invalid")?,
    };
    info!(
        rules = kb.rules.len(),
        mitigations = kb.mitigations.len(),
        "knowledge base loaded"
    );
    Ok(kb)
}

fn load_catalog(config: &CliConfig) -> Result<StaticSkuCatalog> {
    match &config.sku_catalog {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            StaticSkuCatalog::from_json_str(&data)
                .with_context(|| format!("invalid SKU catalog {}", path.display()))
        }
        None => Ok(StaticSkuCatalog::builtin()),
    }
}

// ----------------------------
// Commands
// ----------------------------

fn evaluate(config: &CliConfig, args: EvaluateArgs) -> Result<()> {
    let kb = load_kb(config.knowledge_base.as_deref())?;
    let validation = kb::validate(&kb);
    if !validation.is_ok() {
        if config.strict {
            for finding in validation.errors() {
                eprintln!("{finding}");
            }
            bail!("knowledge base failed validation (strict mode)");
        }
        for finding in validation.errors() {
            warn!(%finding, "knowledge base validation");
        }
    }

    let machine: MachineDescription = read_document(&args.machine)?;
    machine
        .validate()
        .with_context(|| format!("invalid machine description {}", args.machine.display()))?;

    let action = match (&args.action, args.action_type) {
        (Some(path), _) => read_document::<Action>(path)?,
        (None, Some(kind)) => {
            let mut action = Action::new(kind);
            action.target_sku = args.target_sku;
            action.target_lun = args.target_lun;
            action
        }
        (None, None) => bail!("either --action or --action-type is required"),
    };

    let engine = ImpactEngine::new(kb, load_catalog(config)?);

    // The engine does not panic on well-typed input; anything that does
    // escape is still turned into a report.
    let report = panic::catch_unwind(AssertUnwindSafe(|| engine.evaluate(&machine, &action)))
        .unwrap_or_else(|payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            ImpactReport::report_for_failure(detail)
        });

    match args.format.unwrap_or(config.format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render::text(&action, &report)),
    }

    Ok(())
}

fn validate_kb(config: &CliConfig, dir: Option<&Path>) -> Result<()> {
    let kb = load_kb(dir.or(config.knowledge_base.as_deref()))?;
    let report = kb::validate(&kb);

    for finding in &report.findings {
        println!("{finding}");
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    println!(
        "{} rules, {} mitigations: {errors} errors, {warnings} warnings",
        kb.rules.len(),
        kb.mitigations.len()
    );

    if errors > 0 {
        bail!("knowledge base has {errors} validation errors");
    }
    Ok(())
}

fn show_sku(config: &CliConfig, name: &str) -> Result<()> {
    let catalog = load_catalog(config)?;
    match catalog.lookup(name) {
        Some(sku) => {
            println!("{}", serde_json::to_string_pretty(sku)?);
            Ok(())
        }
        None => bail!("unknown SKU: {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_inline_action() {
        let cli = Cli::try_parse_from([
            "vmimpact",
            "evaluate",
            "--machine",
            "vm.json",
            "--action-type",
            "ResizeVM",
            "--target-sku",
            "Standard_E4s_v5",
            "--format",
            "text",
        ])
        .unwrap();

        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.action_type, Some(ActionKind::ResizeVm));
        assert_eq!(args.target_sku.as_deref(), Some("Standard_E4s_v5"));
        assert_eq!(args.format, Some(OutputFormat::Text));
    }

    #[test]
    fn rejects_unknown_action_type() {
        let err = Cli::try_parse_from([
            "vmimpact",
            "evaluate",
            "--machine",
            "vm.json",
            "--action-type",
            "ResizeEverything",
        ])
        .unwrap_err();

        assert!(err.to_string().contains("ResizeEverything"));
    }

    #[test]
    fn action_file_and_type_conflict() {
        let result = Cli::try_parse_from([
            "vmimpact",
            "evaluate",
            "--machine",
            "vm.json",
            "--action",
            "a.json",
            "--action-type",
            "StopVM",
        ]);

        assert!(result.is_err());
    }
}
