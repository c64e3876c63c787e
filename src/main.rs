//! Linkcase CLI - rewrites casing commands in wiki links.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use linkcase::config::Config;
use linkcase::{Buffer, Host, MemoryStore, Options, Outcome, Rewriter, Settings, rewrite};
use tracing_subscriber::EnvFilter;

/// Rewrite `[[Link\l]]`-style casing commands into aliased wiki links.
#[derive(Parser, Debug)]
#[command(name = "linkcase")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file(s) to rewrite. Use - for stdin.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Write rewritten output back to the input file(s).
    #[arg(short, long)]
    write: bool,

    /// Check if files contain casing commands (exit 1 if so).
    #[arg(short, long)]
    check: bool,

    /// Read input from stdin.
    #[arg(long)]
    stdin: bool,

    /// Make \l lowercase only the first word.
    #[arg(long)]
    lowercase_first_word_only: bool,

    /// Caret offset in the stdin text; the relocated caret is printed to
    /// stderr.
    #[arg(long, value_name = "OFFSET")]
    caret: Option<usize>,

    /// Path to a configuration file instead of discovering .linkcase.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log what gets rewritten.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "linkcase=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("LINKCASE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<(Config, PathBuf), String> {
    let cwd = std::env::current_dir().map_err(|e| format!("cannot read current directory: {}", e))?;
    if let Some(path) = &args.config {
        let config = Config::from_file(path).map_err(|e| e.to_string())?;
        let base = path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.clone());
        return Ok((config, base));
    }
    match Config::discover(&cwd).map_err(|e| e.to_string())? {
        Some((path, config)) => {
            let base = path.parent().map(PathBuf::from).unwrap_or(cwd);
            Ok((config, base))
        }
        None => Ok((Config::default(), cwd)),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let (config, base_dir) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = Options {
        lowercase_first_word_only: args.lowercase_first_word_only
            || config.lowercase_first_word_only,
    };

    let mut files = args.files.clone();
    if files.is_empty() && !args.stdin {
        files = match config.collect_files(&base_dir) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error collecting files: {}", e);
                return ExitCode::FAILURE;
            }
        };
    }

    let read_stdin =
        args.stdin || files.is_empty() || (files.len() == 1 && files[0].as_os_str() == "-");
    if read_stdin {
        return rewrite_stdin(&args, options);
    }

    if args.caret.is_some() {
        eprintln!("--caret only applies to stdin input");
        return ExitCode::FAILURE;
    }

    let mut all_clean = true;
    for file in &files {
        let input = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", file.display(), e);
                return ExitCode::FAILURE;
            }
        };

        let output = rewrite(&input, &options);
        if args.check {
            if input != output {
                eprintln!("{}: has casing commands", file.display());
                all_clean = false;
            }
        } else if args.write {
            if input != output {
                tracing::info!(file = %file.display(), "rewriting");
                if let Err(e) = fs::write(file, &output) {
                    eprintln!("Error writing {}: {}", file.display(), e);
                    return ExitCode::FAILURE;
                }
            }
        } else {
            print!("{}", output);
        }
    }

    if args.check && !all_clean {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn rewrite_stdin(args: &Args, options: Options) -> ExitCode {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Error reading stdin: {}", e);
        return ExitCode::FAILURE;
    }

    let store = MemoryStore::new(Some(Settings {
        lowercase_first_word_only: options.lowercase_first_word_only,
    }));
    let rewriter = Rewriter::new(store);
    let mut buffer = Buffer::new(input, args.caret.unwrap_or(0));
    let outcome = rewriter.handle_content_changed(&mut buffer);

    if args.check {
        return match outcome {
            Outcome::Rewritten { .. } => {
                eprintln!("<stdin>: has casing commands");
                ExitCode::FAILURE
            }
            Outcome::Unchanged | Outcome::Skipped => ExitCode::SUCCESS,
        };
    }

    if args.caret.is_some() {
        eprintln!("caret: {}", buffer.caret());
    }
    print!("{}", buffer.as_str());
    ExitCode::SUCCESS
}
