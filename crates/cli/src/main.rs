use anyhow::{anyhow, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use regen_merge::{
    parse_directives, Directive, DiffAlgorithm, GenerationContext, InsertionPoint, MergeConfig,
    MergeResult, Merger, Pipeline, PlanEditHandler,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "regen")]
#[command(about = "Merge regenerated code blocks into hand-edited documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file with merge settings (markers, keywords, directive tag)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the line-alignment algorithm from the config file
    #[arg(long, global = true, value_enum)]
    algorithm: Option<AlgorithmArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a regenerated block into its previous version and print the result
    Merge(MergeArgs),

    /// Merge or insert a generated block into a host document
    Apply(ApplyArgs),

    /// List generation directives found in a document as JSON
    Directives(DirectivesArgs),
}

#[derive(Args)]
struct MergeArgs {
    /// Previous (possibly hand-edited) block
    old: PathBuf,

    /// Freshly generated block
    new: PathBuf,
}

#[derive(Args)]
struct ApplyArgs {
    /// Host document
    document: PathBuf,

    /// File holding the freshly generated block
    #[arg(long)]
    generated: PathBuf,

    /// Block name; defaults to the `@namespace` of the first directive
    #[arg(long)]
    name: Option<String>,

    /// 0-based line to insert at when the block does not exist yet
    #[arg(long)]
    line: Option<usize>,

    /// Write the result back to the document instead of printing it
    #[arg(long)]
    write: bool,
}

#[derive(Args)]
struct DirectivesArgs {
    /// Document to scan
    document: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Myers,
    Patience,
    Lcs,
}

impl From<AlgorithmArg> for DiffAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Myers => DiffAlgorithm::Myers,
            AlgorithmArg::Patience => DiffAlgorithm::Patience,
            AlgorithmArg::Lcs => DiffAlgorithm::Lcs,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let merger = build_merger(cli.config.as_deref(), cli.algorithm)?;

    match cli.command {
        Commands::Merge(args) => run_merge(&merger, args)?,
        Commands::Apply(args) => run_apply(merger, args)?,
        Commands::Directives(args) => run_directives(&merger, args)?,
    }

    Ok(())
}

fn build_merger(path: Option<&Path>, algorithm: Option<AlgorithmArg>) -> Result<Merger> {
    let mut config = match path {
        Some(path) => {
            let raw = read_file(path)?;
            MergeConfig::from_toml_str(&raw)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => MergeConfig::default(),
    };
    if let Some(algorithm) = algorithm {
        config.algorithm = algorithm.into();
    }
    log::debug!("diff algorithm: {}", config.algorithm.as_str());

    Merger::new(config).context("Invalid merge configuration")
}

fn run_merge(merger: &Merger, args: MergeArgs) -> Result<()> {
    let old = read_file(&args.old)?;
    let new = read_file(&args.new)?;

    let merged = merger
        .merge(&old, &new)
        .with_context(|| format!("Failed to merge {}", args.new.display()))?;

    match merged {
        MergeResult::NoChange => {
            log::info!("{} is up to date", args.old.display());
            print!("{old}");
        }
        MergeResult::Text(text) => {
            report_conflicts(merger.config().markers.count_in(&text), &args.old);
            println!("{text}");
        }
    }

    Ok(())
}

fn run_apply(merger: Merger, args: ApplyArgs) -> Result<()> {
    let document = read_file(&args.document)?;
    let generated = read_file(&args.generated)?;

    let (name, mut insertion) = match args.name {
        Some(name) => (name, InsertionPoint::End),
        None => {
            let directive = first_directive(&document, merger.config())
                .with_context(|| format!("No usable directive in {}", args.document.display()))?;
            let name = directive
                .namespace()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("directive has no namespace"))?;
            (name, directive.insertion_point())
        }
    };
    if let Some(line) = args.line {
        insertion = InsertionPoint::Line(line);
    }

    let mut ctx = GenerationContext::new(name, document, insertion).with_generated(generated);
    Pipeline::new()
        .with(PlanEditHandler::new(merger))
        .run(&mut ctx)
        .with_context(|| format!("Failed to merge `{}` into {}", ctx.name, args.document.display()))?;

    let output = match &ctx.edit {
        Some(edit) => {
            report_conflicts(edit.conflicts(), &args.document);
            edit.apply(&ctx.document)
        }
        None => {
            log::info!("`{}` is up to date in {}", ctx.name, args.document.display());
            ctx.document.clone()
        }
    };

    if args.write {
        if ctx.edit.is_some() {
            fs::write(&args.document, &output)
                .with_context(|| format!("Failed to write {}", args.document.display()))?;
            log::info!("Updated {}", args.document.display());
        }
    } else {
        print!("{output}");
    }

    Ok(())
}

#[derive(Serialize)]
struct DirectiveReport {
    #[serde(flatten)]
    directive: Directive,
    error: Option<String>,
}

fn run_directives(merger: &Merger, args: DirectivesArgs) -> Result<()> {
    let document = read_file(&args.document)?;
    let reports: Vec<DirectiveReport> = parse_directives(&document, merger.config())
        .into_iter()
        .map(|directive| DirectiveReport {
            error: directive.validate().err().map(|err| err.to_string()),
            directive,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn first_directive(document: &str, config: &MergeConfig) -> Result<Directive> {
    let directive = parse_directives(document, config)
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no `{}` directive found", config.directive_tag))?;
    directive.validate()?;
    Ok(directive)
}

fn report_conflicts(conflicts: usize, path: &Path) {
    if conflicts > 0 {
        eprintln!(
            "{conflicts} conflict block(s) in {}; resolve the markers by hand",
            path.display()
        );
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
