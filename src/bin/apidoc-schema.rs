//! API Documentation Schema CLI
//!
//! Command-line interface for validating payloads against schema
//! fragments and synthesizing example payloads from them.

use std::path::PathBuf;
use std::process::ExitCode;

use apidoc_schema::{
    compile, format_report, generate, validate_node, GenerateOptions, SchemaNode,
    DEFAULT_MAX_DEPTH,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apidoc-schema")]
#[command(about = "Validate payloads and generate examples from schema fragments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload file against a schema fragment
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Schema fragment to validate against
        #[arg(long)]
        schema: PathBuf,

        /// Output the structured report as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Generate an example payload from a schema fragment
    Generate {
        /// Schema fragment to generate from
        schema: PathBuf,

        /// Generate only properties listed in required
        #[arg(long)]
        required_only: bool,

        /// Recursion depth bound for nested objects
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check that a schema fragment compiles
    Check {
        /// Schema fragment to check
        schema: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            payload,
            schema,
            json,
        } => run_validate(&payload, &schema, json),

        Commands::Generate {
            schema,
            required_only,
            max_depth,
            pretty,
            output,
        } => run_generate(&schema, required_only, max_depth, pretty, output),

        Commands::Check { schema } => run_check(&schema),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_validate(payload_path: &PathBuf, schema_path: &PathBuf, json: bool) -> Result<(), u8> {
    let schema = apidoc_schema::load_json(schema_path).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;
    let payload = apidoc_schema::load_json(payload_path).map_err(|e| {
        eprintln!("Error loading payload: {}", e);
        e.exit_code() as u8
    })?;

    let report = apidoc_schema::validate(&payload, &schema);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                return Err(2);
            }
        }
    } else {
        println!("{}", format_report(&report));
    }

    if report.valid {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_generate(
    schema_path: &PathBuf,
    required_only: bool,
    max_depth: usize,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let schema = apidoc_schema::load_json(schema_path).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;

    let node = SchemaNode::from_value(&schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let options = GenerateOptions::new()
        .required_only(required_only)
        .max_depth(max_depth);
    let example = generate(&node, &options);

    let rendered = if pretty {
        serde_json::to_string_pretty(&example)
    } else {
        serde_json::to_string(&example)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn run_check(schema_path: &PathBuf) -> Result<(), u8> {
    let schema = apidoc_schema::load_json(schema_path).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;

    let node = SchemaNode::from_value(&schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    compile(&node).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    // Exercise a smoke validation so an always-false schema is visible
    // to the operator without failing the check.
    let example = generate(&node, &GenerateOptions::default());
    let report = validate_node(&example, &node);
    if report.valid {
        println!("Schema compiles; generated example validates");
    } else {
        println!("Schema compiles; generated example does not validate");
    }

    Ok(())
}
