use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Jack to VM translator
#[derive(Parser)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate Jack source to VM code", long_about = "Jack to VM translator\n\nTranslates Jack classes into stack-machine VM code:\n  - a .jack file produces a sibling .vm file\n  - a directory translates every .jack file inside it")]
struct Cli {
    /// A .jack file or a directory of .jack files
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let sources = collect_sources(&cli.path);
    if sources.is_empty() {
        eprintln!("Error: no .jack files found at '{}'", cli.path.display());
        std::process::exit(1);
    }

    for source in sources {
        translate_file(&source);
    }
}

/// The .jack files behind `path`: the file itself, or the directory's
/// contents in sorted order so repeated runs behave identically.
fn collect_sources(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().is_some_and(|ext| ext == "jack") {
            return vec![path.to_path_buf()];
        }
        return Vec::new();
    }

    if path.is_dir() {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                eprintln!("Error reading directory '{}': {}", path.display(), err);
                std::process::exit(1);
            }
        };
        let mut sources: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        sources.sort();
        return sources;
    }

    eprintln!("Error: '{}' is not a file or directory", path.display());
    std::process::exit(1);
}

/// Translate one .jack file into its sibling .vm file.
fn translate_file(source: &Path) {
    let contents = match fs::read_to_string(source) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Error reading file '{}': {}", source.display(), err);
            std::process::exit(1);
        }
    };

    let code = match jackc_compiler::translate_to_string(&contents) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error compiling '{}': {}", source.display(), err);
            std::process::exit(1);
        }
    };

    let output = source.with_extension("vm");
    if let Err(err) = fs::write(&output, code) {
        eprintln!("Error writing '{}': {}", output.display(), err);
        std::process::exit(1);
    }
    println!("{} -> {}", source.display(), output.display());
}
