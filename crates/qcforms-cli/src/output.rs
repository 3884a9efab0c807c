use crate::cli::OutputFormat;
use colored::Colorize;
use qcforms_core::{TOLERANCE_TABLE, ValidationFailure};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_value(value: &Value, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print_as_table(value)?,
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_failures(failures: &[ValidationFailure], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(failures)?),
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Problem"]);
            for failure in failures {
                builder.push_record([failure.field.as_str(), failure.message.as_str()]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
    Ok(())
}

pub fn print_keys(keys: &[String], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(keys)?),
        OutputFormat::Table => {
            if keys.is_empty() {
                println!("No records found.");
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["Key"]);
            for key in keys {
                builder.push_record([key.as_str()]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            println!("Total: {}", keys.len());
        }
    }
    Ok(())
}

pub fn print_tolerance(category: Option<u32>, format: OutputFormat) -> anyhow::Result<()> {
    let categories: Vec<_> = TOLERANCE_TABLE
        .iter()
        .filter(|c| category.is_none_or(|id| c.id == id))
        .collect();
    if categories.is_empty() {
        anyhow::bail!(
            "Unknown tolerance category. Valid categories: 1-{}",
            TOLERANCE_TABLE.len()
        );
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&categories)?),
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["#", "Category", "Score", "Rating", "Detail", "Color"]);
            for c in categories {
                for option in c.options {
                    builder.push_record([
                        c.id.to_string(),
                        c.name.to_string(),
                        option.value.to_string(),
                        option.short_label().to_string(),
                        option.detail().unwrap_or("-").to_string(),
                        option.color.to_string(),
                    ]);
                }
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
    Ok(())
}

/// Top-level columns as rows; nested groups stay compact JSON.
fn print_as_table(value: &Value) -> anyhow::Result<()> {
    let Some(object) = value.as_object() else {
        println!("{}", serde_json::to_string_pretty(value)?);
        return Ok(());
    };
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, v) in object {
        let text = match v {
            Value::String(s) if s.is_empty() => "-".to_string(),
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        builder.push_record([key.as_str(), text.as_str()]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    Ok(())
}
