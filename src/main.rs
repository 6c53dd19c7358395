use std::path::Path;
use std::process;

use clap::{Parser, ValueEnum};

use cll::diagnostic::render_diagnostics;
use cll::{token, Tables};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "cllc",
    version,
    about = "CLL compiler: contract source in, VM opcodes out"
)]
struct Cli {
    /// Input file, or literal source if no such file exists
    input: String,
    /// Print the token stream before label resolution
    #[arg(long)]
    lower_only: bool,
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

fn main() {
    let cli = Cli::parse();
    let (source, filename) = resolve_input(&cli.input);

    let node = match cll::parse_source(&source) {
        Ok(node) => node,
        Err(diagnostics) => {
            render_diagnostics(&diagnostics, &filename, &source);
            process::exit(1);
        }
    };

    let tables = Tables::default();
    let result = if cli.lower_only {
        cll::lower(&node, &tables)
    } else {
        cll::compile_ast(&node, &tables)
    };

    let tokens = match result {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    };

    match cli.format {
        Format::Text => println!("{}", token::render(&tokens)),
        Format::Json => match serde_json::to_string(&tokens) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("error: cannot serialize output: {}", err);
                process::exit(1);
            }
        },
    }
}

/// A path that names an existing file is compiled from disk; anything else
/// is treated as literal source.
fn resolve_input(input: &str) -> (String, String) {
    let path = Path::new(input);
    if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(contents) => (contents, input.to_string()),
            Err(err) => {
                eprintln!("error: cannot read '{}': {}", input, err);
                process::exit(1);
            }
        }
    } else {
        (input.to_string(), "<argument>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_input_literal() {
        let (source, filename) = resolve_input("set(x, 7)");
        assert_eq!(source, "set(x, 7)");
        assert_eq!(filename, "<argument>");
    }

    #[test]
    fn test_resolve_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "set(x, 7)").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let (source, filename) = resolve_input(&path);
        assert_eq!(source, "set(x, 7)");
        assert_eq!(filename, path);
    }
}
