//! Commands that drive a reconciler for one form.

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use colored::Colorize;
use qcforms_core::{FormSchema, Presentation, ReleaseForm, ReleaseRecord, SampleSlot, TOLERANCE_TABLE};
use qcforms_reconciler::{ReconcileError, Reconciler, ReconcilerOptions};
use qcforms_storage::DynRecordStore;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::output::{print_failures, print_keys, print_success, print_value, print_warning};

/// What every form command needs.
pub struct FormContext {
    pub store: DynRecordStore,
    pub options: ReconcilerOptions,
    pub format: OutputFormat,
}

impl FormContext {
    fn reconciler<F: FormSchema>(&self) -> Reconciler<F> {
        Reconciler::with_options(self.store.clone(), self.options)
    }
}

fn read_body(file: &Option<String>) -> Result<Value> {
    let content = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid JSON")
}

fn read_record<F: FormSchema>(file: &Option<String>) -> Result<F::Record> {
    let body = read_body(file)?;
    F::from_row(body).with_context(|| format!("Not a valid {} record", F::KIND.title()))
}

fn print_record<F: FormSchema>(record: &F::Record, format: OutputFormat) -> Result<()> {
    print_value(&F::to_row(record)?, format)
}

/// Explains a rejected submit; validation failures are listed in full.
fn report(err: ReconcileError, format: OutputFormat) -> Result<()> {
    if let ReconcileError::Invalid(failures) = &err {
        print_failures(failures, format)?;
        anyhow::bail!(
            "Validation failed with {} problem(s); nothing was stored",
            failures.len()
        );
    }
    Err(err.into())
}

pub fn template<F: FormSchema>(ctx: &FormContext) -> Result<()> {
    print_record::<F>(&ctx.reconciler::<F>().record().clone(), ctx.format)
}

pub async fn search<F: FormSchema>(ctx: &FormContext, key: &str) -> Result<()> {
    let mut reconciler = ctx.reconciler::<F>();
    let record = reconciler.search(key).await?.clone();
    print_record::<F>(&record, ctx.format)
}

pub async fn keys<F: FormSchema>(ctx: &FormContext, filter: Option<&str>) -> Result<()> {
    let keys = ctx.reconciler::<F>().list_keys(filter).await?;
    print_keys(&keys, ctx.format)
}

pub fn validate<F: FormSchema>(ctx: &FormContext, file: &Option<String>) -> Result<()> {
    let mut reconciler = ctx.reconciler::<F>();
    reconciler.replace_record(read_record::<F>(file)?);

    let failures = reconciler.validate();
    if failures.is_empty() {
        print_success(&format!("{} record is valid", F::KIND.title()));
        return Ok(());
    }
    print_failures(&failures, ctx.format)?;
    anyhow::bail!("{} problem(s) found", failures.len())
}

pub async fn submit<F: FormSchema>(ctx: &FormContext, file: &Option<String>) -> Result<()> {
    let mut reconciler = ctx.reconciler::<F>();
    reconciler.replace_record(read_record::<F>(file)?);

    match reconciler.submit().await {
        Ok(outcome) => {
            print_success(&format!(
                "{} ({})",
                outcome.message(F::KIND.title()),
                outcome.id().to_string().cyan()
            ));
            Ok(())
        }
        Err(err) => report(err, ctx.format),
    }
}

pub async fn update<F: FormSchema>(
    ctx: &FormContext,
    key: &str,
    file: &Option<String>,
) -> Result<()> {
    let record = read_record::<F>(file)?;
    let mut reconciler = ctx.reconciler::<F>();
    reconciler.search(key).await?;

    if F::business_key(&record) != reconciler.search_key() {
        print_warning(&format!(
            "{} changes from {} to {}",
            F::KEY_LABEL,
            reconciler.search_key(),
            F::business_key(&record)
        ));
    }
    reconciler.replace_record(record);

    match reconciler.submit().await {
        Ok(outcome) => {
            print_success(&outcome.message(F::KIND.title()));
            Ok(())
        }
        Err(err) => report(err, ctx.format),
    }
}

/// Release records in table form also show each sample's tolerance rating.
pub async fn search_release(ctx: &FormContext, key: &str) -> Result<()> {
    let mut reconciler = ctx.reconciler::<ReleaseForm>();
    let record = reconciler.search(key).await?.clone();
    match ctx.format {
        OutputFormat::Json => print_record::<ReleaseForm>(&record, ctx.format),
        OutputFormat::Table => {
            print_record::<ReleaseForm>(&record, ctx.format)?;
            print_samples(&record);
            Ok(())
        }
    }
}

fn rating(presentation: Presentation, raw: &str) -> String {
    match presentation.short_label() {
        Some(label) => format!("{raw} {label}"),
        None if raw.is_empty() => "-".to_string(),
        None => raw.to_string(),
    }
}

fn print_samples(record: &ReleaseRecord) {
    let mut builder = Builder::default();
    builder.push_record(["Category", "Sample 1", "Sample 2", "Sample 3", "Sample 4", "Average"]);
    for (row, (category, sample)) in TOLERANCE_TABLE.iter().zip(&record.samples).enumerate() {
        let mut cells = vec![category.name.to_string()];
        for slot in SampleSlot::ALL {
            cells.push(rating(record.presentation(row, slot), slot.get(sample)));
        }
        cells.push(if sample.average.is_empty() {
            "-".to_string()
        } else {
            sample.average.clone()
        });
        builder.push_record(cells);
    }
    println!("{}", builder.build().with(Style::rounded()));
}
