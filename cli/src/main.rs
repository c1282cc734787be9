//! pagedom CLI - schema model inspection tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagedom::schema::DiagnosticKind;
use pagedom::{load_schema_file, parse_description, FormatModels, ModelOptions};

#[derive(Parser)]
#[command(name = "pagedom")]
#[command(version)]
#[command(about = "Inspect attribute templates derived from page-content schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List content types and their attribute counts
    Types {
        /// Schema description (JSON)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,
    },

    /// Print the attribute template of a content type as JSON
    Template {
        /// Schema description (JSON)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Content type name, e.g. TextRegionType
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Report schema diagnostics
    Check {
        /// Schema description (JSON)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Fail when any attribute type is unresolved
        #[arg(long)]
        strict: bool,

        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build models for several schema versions
    Models {
        /// Schema descriptions (JSON)
        #[arg(value_name = "SCHEMA", required = true)]
        schemas: Vec<PathBuf>,

        /// Build one model after another
        #[arg(long)]
        sequential: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Types { schema } => cmd_types(&schema),
        Commands::Template {
            schema,
            type_name,
            compact,
            output,
        } => cmd_template(&schema, &type_name, compact, output.as_deref()),
        Commands::Check {
            schema,
            strict,
            json,
        } => cmd_check(&schema, strict, json),
        Commands::Models {
            schemas,
            sequential,
        } => cmd_models(&schemas, sequential),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_types(schema: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_schema_file(schema)?;

    println!(
        "{} {}",
        "Schema version".cyan().bold(),
        model.version().to_string().bold()
    );
    println!("{}", "─".repeat(40).dimmed());

    for name in model.type_names() {
        let count = model.template_for(name).map_or(0, |t| t.len());
        println!("{:<32} {:>3} {}", name, count, "attributes".dimmed());
    }

    if !model.diagnostics().is_empty() {
        println!();
        println!(
            "{} {} (run `pagedom check` for details)",
            model.diagnostics().len().to_string().yellow(),
            "diagnostics".yellow()
        );
    }

    Ok(())
}

fn cmd_template(
    schema: &Path,
    type_name: &str,
    compact: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_schema_file(schema)?;
    let template = model
        .template_for(type_name)
        .ok_or_else(|| format!("Unknown content type: {}", type_name))?;

    let json = if compact {
        serde_json::to_string(template)?
    } else {
        serde_json::to_string_pretty(template)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_check(schema: &Path, strict: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_schema_file(schema)?;
    let diagnostics = model.diagnostics();
    log::debug!("{} diagnostics for {}", diagnostics.len(), schema.display());

    if json {
        println!("{}", serde_json::to_string_pretty(diagnostics)?);
    } else if diagnostics.is_empty() {
        println!("{} {}", "OK".green().bold(), schema.display());
    } else {
        println!("{}", "Schema Diagnostics".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for diagnostic in diagnostics {
            let label = match diagnostic.kind {
                DiagnosticKind::UnresolvedReference | DiagnosticKind::InheritanceCycle => {
                    "error".red().bold()
                }
                _ => "warning".yellow().bold(),
            };
            println!("{}: {}", label, diagnostic);
        }
    }

    let unresolved = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::UnresolvedReference)
        .count();
    if strict && unresolved > 0 {
        return Err(format!("{} unresolved attribute type(s)", unresolved).into());
    }

    Ok(())
}

fn cmd_models(schemas: &[PathBuf], sequential: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(schemas.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut descriptions = Vec::with_capacity(schemas.len());
    for path in schemas {
        pb.set_message(format!("Reading {}...", path.display()));
        let json = fs::read_to_string(path)?;
        descriptions.push(parse_description(&json)?);
        pb.inc(1);
    }

    pb.set_message("Building models...");
    let mut options = ModelOptions::new();
    if sequential {
        options = options.sequential();
    }
    let models = FormatModels::build(&descriptions, &options)?;
    log::debug!("Built {} format models (parallel: {})", models.len(), !sequential);
    pb.inc(1);
    pb.finish_with_message("Done!");

    println!("\n{}", "Models:".green().bold());
    let latest = models.latest().map(|m| m.version().version.clone());
    let count = models.len();
    for (i, version) in models.versions().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        let model = models.get(version)?;
        let marker = if latest.as_deref() == Some(version) {
            " (latest)".cyan().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {} - {} types{}",
            branch.dimmed(),
            version,
            model.len(),
            marker
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("pagedom {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCHEMA: &str = r#"{
        "version": "2019-07-15",
        "types": [
            {"name": "TextRegionType", "attributes": [
                {"name": "id", "type": "ID"},
                {"name": "type", "type": "MissingSimpleType"}
            ]}
        ]
    }"#;

    fn schema_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_strict_fails_on_unresolved() {
        let file = schema_file();
        assert!(cmd_check(file.path(), false, true).is_ok());
        assert!(cmd_check(file.path(), true, true).is_err());
    }

    #[test]
    fn test_template_to_file() {
        let file = schema_file();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("template.json");
        cmd_template(file.path(), "TextRegionType", true, Some(&out)).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["type"], "TextRegionType");
        assert!(cmd_template(file.path(), "NoSuchType", true, None).is_err());
    }

    #[test]
    fn test_models() {
        let file = schema_file();
        assert!(cmd_models(&[file.path().to_path_buf()], true).is_ok());
    }
}
