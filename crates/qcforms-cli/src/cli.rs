use clap::{Parser, Subcommand, ValueEnum};
use qcforms_core::FormKind;
use qcforms_cli::StorageBackend;

#[derive(Parser)]
#[command(name = "qcforms")]
#[command(about = "QC forms: look up, validate and submit quality-control records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (overrides QCFORMS_CONFIG and ./qcforms.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Storage backend (overrides config)
    #[arg(long, global = true)]
    pub backend: Option<StorageBackend>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a blank record with the form's defaults
    Template(FormArgs),
    /// Load a record by its business key
    Search(SearchArgs),
    /// List stored business keys
    Keys(KeysArgs),
    /// Check a record file without storing it
    Validate(FileArgs),
    /// Submit a new record
    Submit(FileArgs),
    /// Load a record by key and replace it with the file's contents
    Update(UpdateArgs),
    /// Print the release form's tolerance scale
    Tolerance(ToleranceArgs),
    /// Apply database migrations (postgres backend)
    Migrate,
}

fn parse_form(s: &str) -> Result<FormKind, String> {
    s.parse::<FormKind>().map_err(|e| e.to_string())
}

#[derive(clap::Args)]
pub struct FormArgs {
    /// Form: release, sheet or volume
    #[arg(value_parser = parse_form)]
    pub form: FormKind,
}

#[derive(clap::Args)]
pub struct SearchArgs {
    /// Form: release, sheet or volume
    #[arg(value_parser = parse_form)]
    pub form: FormKind,
    /// Business key (release order number)
    pub key: String,
}

#[derive(clap::Args)]
pub struct KeysArgs {
    /// Form: release, sheet or volume
    #[arg(value_parser = parse_form)]
    pub form: FormKind,
    /// Only keys containing this text
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(clap::Args)]
pub struct FileArgs {
    /// Form: release, sheet or volume
    #[arg(value_parser = parse_form)]
    pub form: FormKind,
    /// Path to JSON record (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    /// Form: release, sheet or volume
    #[arg(value_parser = parse_form)]
    pub form: FormKind,
    /// Business key of the record to replace
    pub key: String,
    /// Path to JSON record (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct ToleranceArgs {
    /// Only this category row (1-based)
    #[arg(long)]
    pub category: Option<u32>,
}
