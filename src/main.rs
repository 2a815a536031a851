//! mjsema - MiniJava semantic analyzer

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};

use mjsema::feedback::{AnalysisReport, ErrorReport};
use mjsema::frontend::parse_source;
use mjsema::semantic::{analyze, layouts, SymbolTable};
use mjsema::utils::Error;

/// MiniJava semantic analyzer
#[derive(Parser, Debug)]
#[command(name = "mjsema")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "MiniJava semantic analyzer - symbol tables, type checking and object layout")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source files
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Emit JSON reports instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check source files for errors
    Check {
        /// Input source files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print field and method offsets of every class
    Layout {
        /// Input source file
        input: PathBuf,
    },
    /// Print the symbol table
    Table {
        /// Input source file
        input: PathBuf,
    },
}

/// What to print after a successful analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Verdict,
    Layout,
    Table,
    /// Layouts followed by the verdict
    Report,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let passed = match &cli.command {
        Some(Commands::Check { inputs }) => run(inputs, Output::Verdict, cli.json),
        Some(Commands::Layout { input }) => run(std::slice::from_ref(input), Output::Layout, cli.json),
        Some(Commands::Table { input }) => run(std::slice::from_ref(input), Output::Table, cli.json),
        None if cli.inputs.is_empty() => {
            eprintln!("Error: No input file specified");
            eprintln!("Usage: mjsema <FILE>... or mjsema check <FILE>...");
            process::exit(1);
        }
        None => run(&cli.inputs, Output::Report, cli.json),
    };

    if !passed {
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Analyze every input independently; false if any of them failed
fn run(inputs: &[PathBuf], output: Output, json: bool) -> bool {
    let mut all_passed = true;
    for (file_id, input) in inputs.iter().enumerate() {
        let passed = match process_file(input, file_id, output, json) {
            Ok(passed) => passed,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                false
            }
        };
        all_passed &= passed;
    }
    all_passed
}

fn process_file(input: &Path, file_id: usize, output: Output, json: bool) -> Result<bool> {
    debug!("analyzing {}", input.display());
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let file_name = input.display().to_string();

    match analyze_source(&source, file_id, json) {
        Ok(table) => {
            if json {
                println!("{}", AnalysisReport::success(file_name, &table).to_json());
            } else {
                print_success(&table, output);
            }
            Ok(true)
        }
        Err(e) => {
            let report = ErrorReport::from_error(&e, &file_name, &source);
            if json {
                println!("{}", AnalysisReport::failure(file_name, vec![report]).to_json());
            } else {
                print_error(&e, &report);
            }
            Ok(false)
        }
    }
}

fn analyze_source(source: &str, file_id: usize, quiet: bool) -> std::result::Result<SymbolTable, Error> {
    let program = parse_source(source, file_id)?;
    if !quiet {
        eprintln!("Program parsed successfully.");
    }
    Ok(analyze(&program)?)
}

fn print_success(table: &SymbolTable, output: Output) {
    match output {
        Output::Verdict => println!("Semantic analysis passed"),
        Output::Layout => print_layouts(table),
        Output::Table => print!("{}", table),
        Output::Report => {
            print_layouts(table);
            println!("Semantic analysis passed");
        }
    }
}

fn print_layouts(table: &SymbolTable) {
    for layout in layouts(table) {
        println!("{}", layout);
    }
}

fn print_error(error: &Error, report: &ErrorReport) {
    let kind = match error {
        Error::Semantic(_) => "Semantic error",
        _ => "Parse error",
    };
    match &report.location {
        Some(loc) => eprintln!(
            "{}:{}:{}: {} [{}]: {}",
            loc.file, loc.line, loc.column, kind, report.code, report.message
        ),
        None => eprintln!("{} [{}]: {}", kind, report.code, report.message),
    }
}
