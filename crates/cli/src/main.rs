//! Kure API specification CLI
//!
//! Command-line interface for checking, resolving and inspecting Kure API
//! descriptor documents.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use kure_spec_common::{ApiGroupIdentifier, Document, LintConfig, Type, TypeReference};
use kure_spec_parser::{encode, DescriptorLoader};
use kure_spec_resolver::{
    Catalogue, DirectoryPackageLoader, GroupVersionId, Merger, Severity, Validator,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "kure-spec")]
#[command(version, about = "Check and inspect Kure API specifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where descriptors and their dependency packages are read from
#[derive(clap::Args)]
struct Inputs {
    /// Descriptor files (.json, .yaml, .yml)
    files: Vec<PathBuf>,

    /// Directory scanned for descriptor files (alternative to listing files)
    #[arg(long, conflicts_with = "files")]
    spec_dir: Option<PathBuf>,

    /// Comma-separated list of dependency package roots
    /// (laid out as <root>/<package>/<version>/)
    #[arg(short, long, value_delimiter = ',')]
    packages: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load descriptors, resolve every reference and report problems
    #[command(after_help = "EXAMPLES:\n  \
        # Check one API against its dependency packages\n  \
        kure-spec check apps-v1.yaml core-v1.yaml --packages ./packages\n\n  \
        # Check a directory with custom lint levels\n  \
        kure-spec check --spec-dir ./kubernetes --lints lints.yaml")]
    Check {
        #[command(flatten)]
        inputs: Inputs,

        /// Lint configuration file
        #[arg(short, long)]
        lints: Option<PathBuf>,
    },

    /// Resolve a type reference and print its target definition
    #[command(after_help = "EXAMPLES:\n  \
        # Resolve a local reference\n  \
        kure-spec resolve apps-v1.yaml --from apps/v1 --name DeploymentSpec\n\n  \
        # Resolve a reference into a dependency package\n  \
        kure-spec resolve apps-v1.yaml --packages ./packages --from apps/v1 \\\n    \
        --package kubernetes-meta --group meta --target-version v1 --name ObjectMeta")]
    Resolve {
        #[command(flatten)]
        inputs: Inputs,

        /// Group version the reference is written in, like apps/v1 or core/v1
        #[arg(long)]
        from: String,

        /// Name of the referenced definition
        #[arg(long)]
        name: String,

        /// Group of the referenced definition (defaults to the referencing one)
        #[arg(long, requires = "target_version")]
        group: Option<String>,

        /// Version of the referenced definition
        #[arg(long = "target-version", requires = "group")]
        target_version: Option<String>,

        /// Dependency package declaring the referenced definition
        #[arg(long, requires = "group")]
        package: Option<String>,

        /// Follow alias definitions to the type they name
        #[arg(long)]
        shape: bool,
    },

    /// Print the effective properties of an object or resource definition
    #[command(after_help = "EXAMPLES:\n  \
        kure-spec properties apps-v1.yaml --packages ./packages --definition apps/v1/DeploymentSpec")]
    Properties {
        #[command(flatten)]
        inputs: Inputs,

        /// Definition as group/version/Name, like core/v1/PodSpec
        #[arg(short, long)]
        definition: String,
    },

    /// Re-encode a descriptor file
    Show {
        /// Descriptor file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "yaml")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { inputs, lints } => check_command(&inputs, lints.as_deref(), cli.verbose),
        Commands::Resolve {
            inputs,
            from,
            name,
            group,
            target_version,
            package,
            shape,
        } => resolve_command(
            &inputs,
            &ReferenceArgs {
                from: &from,
                name: &name,
                group: group.as_deref(),
                version: target_version.as_deref(),
                package: package.as_deref(),
                shape,
            },
        ),
        Commands::Properties { inputs, definition } => properties_command(&inputs, &definition),
        Commands::Show { file, format } => show_command(&file, format),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env = std::env::var("KURE_SPEC_LOG").unwrap_or_else(|_| default.to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn check_command(inputs: &Inputs, lints: Option<&Path>, verbose: bool) -> Result<()> {
    let config = match lints {
        Some(path) => LintConfig::load(path)
            .with_context(|| format!("Failed to load lint config {}", path.display()))?,
        None => LintConfig::default(),
    };

    let catalogue = load_catalogue(inputs)?;
    println!(
        "{} Checking {} group version(s)",
        "→".cyan(),
        catalogue.local_group_versions().count()
    );
    if verbose {
        for (id, group_version) in catalogue.group_versions() {
            println!("  {} ({} definitions)", id, group_version.definitions.len());
        }
    }

    let report = Validator::new(&catalogue, config).validate();
    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            Severity::Error => eprintln!("{} {}", "✗".red(), diagnostic.error),
            Severity::Warning => eprintln!("{} {}", "⚠".yellow(), diagnostic.error),
        }
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    if report.has_errors() {
        bail!("{} error(s), {} warning(s)", errors, warnings);
    }

    println!(
        "\n{} {}",
        "✓ Check passed".green().bold(),
        format!("({} warning(s))", warnings).dimmed()
    );
    Ok(())
}

struct ReferenceArgs<'a> {
    from: &'a str,
    name: &'a str,
    group: Option<&'a str>,
    version: Option<&'a str>,
    package: Option<&'a str>,
    shape: bool,
}

fn resolve_command(inputs: &Inputs, args: &ReferenceArgs) -> Result<()> {
    let catalogue = load_catalogue(inputs)?;
    let from = find_group_version(&catalogue, args.from)?;

    let reference = match (args.package, args.group, args.version) {
        (Some(package), Some(group), Some(version)) => TypeReference::external(
            package,
            group_identifier(&catalogue, group)?,
            version,
            args.name,
        ),
        (None, Some(group), Some(version)) => {
            TypeReference::in_group(group_identifier(&catalogue, group)?, version, args.name)
        }
        (_, None, None) => TypeReference::local(args.name),
        _ => bail!("--group and --target-version must be given together"),
    };

    println!("{} Resolving {} from {}", "→".cyan(), reference, from);
    let resolved = if args.shape {
        catalogue.resolve_shape(&reference, from, &from.path())
    } else {
        catalogue.resolve(&reference, from)
    };
    let resolved = resolved.context("Failed to resolve reference")?;

    let definition = resolved.definition;
    println!("\n{}", "✓ Resolved".green().bold());
    println!("  Definition: {}", resolved.id().to_string().yellow());
    println!("  Type: {}", definition.value.kind());
    if let Some(description) = &definition.meta.description {
        println!("  Description: {}", description);
    }
    if definition.is_deprecated() {
        println!("  {}", "Deprecated".yellow());
    }
    if let Type::Resource(resource) = &definition.value {
        let meta = &resource.metadata;
        println!("  Kind: {} ({}, {})", meta.kind, meta.name, meta.scope);
    }
    Ok(())
}

fn properties_command(inputs: &Inputs, definition: &str) -> Result<()> {
    let catalogue = load_catalogue(inputs)?;
    let (group_version, name) = definition
        .rsplit_once('/')
        .with_context(|| format!("Expected group/version/Name, got `{}`", definition))?;
    let id = find_group_version(&catalogue, group_version)?.definition(name);

    let merger = Merger::new(&catalogue);
    let properties = merger
        .effective_properties_of(&id)
        .with_context(|| format!("Failed to merge {}", id))?;

    println!("{} {}", "Effective properties of".bold(), id.to_string().yellow());
    for property in properties.iter() {
        let marker = if property.is_required() { "*" } else { " " };
        println!(
            "  {}{} {}",
            marker.red(),
            property.name().cyan(),
            property.value.kind().to_string().dimmed()
        );
    }
    println!("\n{} {} properties", "✓".green(), properties.len());
    Ok(())
}

fn show_command(file: &Path, format: OutputFormat) -> Result<()> {
    let loader = DescriptorLoader::from_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let documents: &[Document] = loader.documents();

    let output = match format {
        OutputFormat::Json => documents
            .iter()
            .map(encode::to_json)
            .collect::<kure_spec_common::Result<Vec<_>>>()?
            .join("\n"),
        OutputFormat::Yaml => encode::to_yaml(documents)?,
    };
    println!("{}", output);
    Ok(())
}

/// Load every input descriptor and its dependency packages
fn load_catalogue(inputs: &Inputs) -> Result<Catalogue> {
    let files = match &inputs.spec_dir {
        Some(dir) => discover_descriptors(dir)?,
        None => inputs.files.clone(),
    };
    if files.is_empty() {
        bail!("No descriptor files given");
    }

    let mut builder = Catalogue::builder();
    for file in &files {
        let documents = kure_spec_parser::load_file(file)
            .with_context(|| format!("Failed to load {}", file.display()))?;
        builder
            .add_documents(documents)
            .with_context(|| format!("Failed to register {}", file.display()))?;
    }
    builder
        .load_dependencies(&DirectoryPackageLoader::new(&inputs.packages))
        .context("Failed to load dependency packages")?;
    Ok(builder.build())
}

/// Descriptor files directly inside `dir`, sorted by path
fn discover_descriptors(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry?.path();
        let is_descriptor = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json" | "yaml" | "yml")
        );
        if path.is_file() && is_descriptor {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Split `group/version`; a bare version means the core group
fn parse_group_version(s: &str) -> Result<(&str, &str)> {
    match s.split_once('/') {
        Some((group, version)) if !version.is_empty() && !version.contains('/') => {
            Ok((group, version))
        }
        None if !s.is_empty() => Ok(("", s)),
        _ => bail!("Expected group/version, got `{}`", s),
    }
}

fn find_group_version<'c>(catalogue: &'c Catalogue, s: &str) -> Result<&'c GroupVersionId> {
    let (group, version) = parse_group_version(s)?;
    catalogue
        .find(group, version)?
        .with_context(|| format!("No local group version `{}`", s))
}

/// The identifier of a group known to the catalogue by wire name, or the
/// default group of that name when the catalogue has none
fn group_identifier(catalogue: &Catalogue, name: &str) -> Result<ApiGroupIdentifier> {
    let identifier = match catalogue.group(name)? {
        Some(group) => group.clone(),
        None if name == "core" => ApiGroupIdentifier::core(),
        None => ApiGroupIdentifier::default_group(name),
    };
    Ok(identifier)
}
