mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use qcforms_cli::config::resolve_config_path;
use qcforms_cli::{load_config, observability, open_store};
use qcforms_core::{FormKind, ReleaseForm, SheetForm, VolumeForm};

use cli::{Cli, Commands};
use commands::form::{self, FormContext};
use output::print_error;

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    observability::init_tracing();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let (config_path, source) = resolve_config_path(cli.config.as_deref());
    let mut config = load_config(Some(config_path.as_str()))
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    observability::apply_logging_level(&config.logging.level);
    tracing::debug!(path = %config_path, source = %source, "Configuration loaded");

    match &cli.command {
        Commands::Tolerance(args) => return output::print_tolerance(args.category, format),
        Commands::Migrate => return commands::migrate::run(&config).await,
        _ => {}
    }

    let ctx = FormContext {
        store: open_store(&config.storage).await?,
        options: config.reconciler_options(),
        format,
    };

    match &cli.command {
        Commands::Template(args) => match args.form {
            FormKind::Release => form::template::<ReleaseForm>(&ctx),
            FormKind::Sheet => form::template::<SheetForm>(&ctx),
            FormKind::Volume => form::template::<VolumeForm>(&ctx),
        },
        Commands::Search(args) => match args.form {
            FormKind::Release => form::search_release(&ctx, &args.key).await,
            FormKind::Sheet => form::search::<SheetForm>(&ctx, &args.key).await,
            FormKind::Volume => form::search::<VolumeForm>(&ctx, &args.key).await,
        },
        Commands::Keys(args) => {
            let filter = args.filter.as_deref();
            match args.form {
                FormKind::Release => form::keys::<ReleaseForm>(&ctx, filter).await,
                FormKind::Sheet => form::keys::<SheetForm>(&ctx, filter).await,
                FormKind::Volume => form::keys::<VolumeForm>(&ctx, filter).await,
            }
        }
        Commands::Validate(args) => match args.form {
            FormKind::Release => form::validate::<ReleaseForm>(&ctx, &args.file),
            FormKind::Sheet => form::validate::<SheetForm>(&ctx, &args.file),
            FormKind::Volume => form::validate::<VolumeForm>(&ctx, &args.file),
        },
        Commands::Submit(args) => match args.form {
            FormKind::Release => form::submit::<ReleaseForm>(&ctx, &args.file).await,
            FormKind::Sheet => form::submit::<SheetForm>(&ctx, &args.file).await,
            FormKind::Volume => form::submit::<VolumeForm>(&ctx, &args.file).await,
        },
        Commands::Update(args) => match args.form {
            FormKind::Release => form::update::<ReleaseForm>(&ctx, &args.key, &args.file).await,
            FormKind::Sheet => form::update::<SheetForm>(&ctx, &args.key, &args.file).await,
            FormKind::Volume => form::update::<VolumeForm>(&ctx, &args.key, &args.file).await,
        },
        Commands::Tolerance(_) | Commands::Migrate => Ok(()),
    }
}
