//! Script compiler CLI.
//!
//! Provides the `scriptc` binary, which drives a compilation session over a
//! script file: `check` prints diagnostics, `select` resolves a diagnostic to
//! an editor selection, `export` writes the statement graph as DOT and
//! `render` turns it into an image through an external renderer.
//!
//! Exit codes: 0 = success, 1 = the script has errors, 2 = usage or
//! selection error, 3 = I/O, export or render failure, 4 = the compiler
//! itself failed to run.

mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use scriptc_core::{CompilationResult, DiagnosticMessage, DiagnosticSet, SourceId, Status};
use scriptc_graph::{ExportError, GraphExporter, RenderError, Renderer};
use scriptc_lang::{Program, ScriptGraph, ScriptPipeline};
use scriptc_session::{CompilationSession, CompileOptions, SelectionCommand, TextBuffer};

use config::Config;

const EXIT_OK: i32 = 0;
const EXIT_FAILED: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_IO: i32 = 3;
const EXIT_INTERNAL: i32 = 4;

/// Script compiler diagnostics and graph export.
#[derive(Parser)]
#[command(name = "scriptc", about = "Script compiler diagnostics and graph export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand that compiles a file.
#[derive(Args)]
struct CompileArgs {
    /// Script file to compile.
    file: PathBuf,

    /// Tab stop width for diagnostic columns (default: $SCRIPTC_TAB_WIDTH or 4).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    tab_width: Option<u32>,

    /// Treat warnings as errors.
    #[arg(long)]
    deny_warnings: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compile a script and print its diagnostics.
    Check {
        #[command(flatten)]
        compile: CompileArgs,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compile a script and select one of its diagnostics.
    Select {
        #[command(flatten)]
        compile: CompileArgs,

        /// 0-based diagnostic index.
        index: usize,
    },

    /// Compile a script and export its statement graph as DOT.
    Export {
        #[command(flatten)]
        compile: CompileArgs,

        /// Output DOT file.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compile, export and render the statement graph to an image.
    Render {
        #[command(flatten)]
        compile: CompileArgs,

        /// Image format: png, svg, pdf, jpg, jpeg, gif, bmp.
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Intermediate DOT file (default: <tmpdir>/<file stem>.dot).
        #[arg(long)]
        temp: Option<PathBuf>,

        /// Renderer program (default: $SCRIPTC_RENDERER or dot).
        #[arg(long)]
        renderer: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.log_level)
        .init();
    tracing::debug!(?config, "loaded configuration");

    let exit_code = match cli.command {
        Commands::Check { compile, json } => run_check(&compile, &config, json),
        Commands::Select { compile, index } => run_select(&compile, &config, index),
        Commands::Export { compile, output } => run_export(&compile, &config, &output),
        Commands::Render {
            compile,
            format,
            temp,
            renderer,
        } => run_render(&compile, &config, &format, temp, renderer),
    };
    process::exit(exit_code);
}

/// A session holding the single compiled file.
struct Compiled {
    session: CompilationSession<ScriptPipeline>,
    id: SourceId,
    text: String,
    result: CompilationResult<Program>,
}

/// Read and compile the file. On failure returns the exit code to use.
fn compile_file(args: &CompileArgs, config: &Config) -> Result<Compiled, i32> {
    let text = std::fs::read_to_string(&args.file).map_err(|e| {
        eprintln!("Error: failed to read '{}': {}", args.file.display(), e);
        EXIT_IO
    })?;

    let options = CompileOptions {
        tab_width: args.tab_width.unwrap_or(config.tab_width),
        deny_warnings: args.deny_warnings,
    };

    let session = CompilationSession::new(ScriptPipeline::new());
    let id = SourceId::new(args.file.display().to_string());
    let result = session.compile(&id, &text, &options).map_err(|e| {
        eprintln!("Error: {}", describe(&e));
        EXIT_INTERNAL
    })?;

    Ok(Compiled {
        session,
        id,
        text,
        result,
    })
}

fn print_diagnostics(file: &Path, set: &DiagnosticSet, to_stderr: bool) {
    for message in set {
        if to_stderr {
            eprintln!("{}:{}", file.display(), message);
        } else {
            println!("{}:{}", file.display(), message);
        }
    }
}

fn summary(file: &Path, set: &DiagnosticSet, status: Status) -> String {
    let (errors, warnings) = set.counts();
    format!(
        "{}: {} ({} error(s), {} warning(s))",
        file.display(),
        status,
        errors,
        warnings
    )
}

/// Machine-readable `check` output.
#[derive(Serialize)]
struct CheckReport<'a> {
    source: &'a str,
    #[serde(flatten)]
    result: &'a CompilationResult<Program>,
}

/// Execute the check subcommand.
fn run_check(args: &CompileArgs, config: &Config, json: bool) -> i32 {
    let compiled = match compile_file(args, config) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let result = &compiled.result;

    if json {
        let report = CheckReport {
            source: compiled.id.as_str(),
            result,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: failed to serialize result: {}", e);
                return EXIT_IO;
            }
        }
    } else {
        print_diagnostics(&args.file, result.diagnostics(), false);
        println!(
            "{}",
            summary(&args.file, result.diagnostics(), result.status())
        );
    }

    match result.status() {
        Status::Failed => EXIT_FAILED,
        _ => EXIT_OK,
    }
}

/// Machine-readable `select` output.
#[derive(Serialize)]
struct SelectReport<'a> {
    index: usize,
    message: &'a DiagnosticMessage,
    selection: SelectionCommand,
    selected_text: Option<&'a str>,
}

/// Execute the select subcommand.
fn run_select(args: &CompileArgs, config: &Config, index: usize) -> i32 {
    let compiled = match compile_file(args, config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut buffer = TextBuffer::new(compiled.text.as_str());
    let selection = match compiled
        .session
        .select_diagnostic(&compiled.id, index, &mut buffer)
    {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE;
        }
    };

    let diagnostics = compiled.result.diagnostics();
    let Some(message) = diagnostics.get(index) else {
        eprintln!("Error: diagnostic {} disappeared after selection", index);
        return EXIT_USAGE;
    };

    let report = SelectReport {
        index,
        message,
        selection,
        selected_text: buffer.selected_text(),
    };
    match serde_json::to_string_pretty(&report) {
        Ok(text) => {
            println!("{}", text);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: failed to serialize selection: {}", e);
            EXIT_IO
        }
    }
}

/// Compile and make sure an artifact exists, reporting errors on stderr.
fn compile_for_export(args: &CompileArgs, config: &Config) -> Result<Compiled, i32> {
    let compiled = compile_file(args, config)?;
    if compiled.result.status() == Status::Failed {
        print_diagnostics(&args.file, compiled.result.diagnostics(), true);
        eprintln!(
            "{}",
            summary(
                &args.file,
                compiled.result.diagnostics(),
                compiled.result.status()
            )
        );
        return Err(EXIT_FAILED);
    }
    Ok(compiled)
}

fn graph_producer(file: &Path) -> ScriptGraph {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    ScriptGraph::named(name)
}

/// Execute the export subcommand.
fn run_export(args: &CompileArgs, config: &Config, output: &Path) -> i32 {
    let compiled = match compile_for_export(args, config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let exporter = GraphExporter::new(graph_producer(&args.file));
    match exporter.export_graph(&compiled.session, &compiled.id, output) {
        Ok(()) => {
            println!("{}", output.display());
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            export_exit_code(&e)
        }
    }
}

/// Execute the render subcommand.
fn run_render(
    args: &CompileArgs,
    config: &Config,
    format: &str,
    temp: Option<PathBuf>,
    renderer: Option<PathBuf>,
) -> i32 {
    if !Renderer::is_supported_format(format) {
        eprintln!("Error: {}", RenderError::UnsupportedFormat(format.to_string()));
        return EXIT_USAGE;
    }

    let compiled = match compile_for_export(args, config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let temp_path = temp.unwrap_or_else(|| {
        let stem = args
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "graph".to_string());
        std::env::temp_dir().join(format!("{}.dot", stem))
    });
    let program = renderer.unwrap_or_else(|| config.renderer.clone());
    let exporter = GraphExporter::with_renderer(graph_producer(&args.file), Renderer::new(program));

    match exporter.export_and_render(&compiled.session, &compiled.id, &temp_path, format) {
        Ok(image) => {
            println!("{}", image.display());
            EXIT_OK
        }
        Err(RenderError::ExporterFailed(e)) => {
            eprintln!("Error: {}", describe(&e));
            export_exit_code(&e)
        }
        Err(e @ (RenderError::UnsupportedFormat(_) | RenderError::OutputOverwritesInput(_))) => {
            eprintln!("Error: {}", e);
            EXIT_USAGE
        }
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            EXIT_IO
        }
    }
}

fn export_exit_code(err: &ExportError) -> i32 {
    match err {
        ExportError::NoArtifact(_) => EXIT_FAILED,
        _ => EXIT_IO,
    }
}

/// An error followed by its chain of sources.
fn describe(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
