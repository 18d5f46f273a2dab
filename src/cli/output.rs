//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::args::{OutputFormat, StandoffArgs};
use crate::error::Result;

/// One parent of a dry-run match.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatchedParent {
    pub parent: usize,
    pub metadata: String,
    pub fragments: Vec<String>,
}

/// Result structure for the match command.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatchReport {
    pub metadata_files: usize,
    pub parents: Vec<MatchedParent>,
    pub unmatched: Vec<String>,
}

/// Result structure for the status command.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusReport {
    pub checkpoint: String,
    pub fresh: bool,
    pub source: Option<String>,
    pub parent: Option<usize>,
    pub child: Option<usize>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &StandoffArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &StandoffArgs) -> Result<()> {
    if args.verbosity() == 0 {
        return Ok(());
    }
    println!("{message}");

    let value = serde_json::to_value(result)?;
    if let Value::Object(map) = value {
        for (key, value) in map {
            print_field(&key, &value, 1);
        }
    }
    Ok(())
}

fn print_field(key: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Null => {}
        Value::Array(items) if items.is_empty() => println!("{indent}{key}: none"),
        Value::Array(items) => {
            println!("{indent}{key}:");
            for item in items {
                match item {
                    Value::Object(map) => {
                        println!("{indent}  -");
                        for (k, v) in map {
                            print_field(k, v, depth + 2);
                        }
                    }
                    other => println!("{indent}  - {}", scalar(other)),
                }
            }
        }
        Value::Object(map) => {
            println!("{indent}{key}:");
            for (k, v) in map {
                print_field(k, v, depth + 1);
            }
        }
        other => println!("{indent}{key}: {}", scalar(other)),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &StandoffArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
