use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use derw_compiler::{
    format_source, CompileOptions, Compiler, Diagnostic, DiagnosticLevel, SourceFile, SourceId,
    Target,
};
use path_clean::PathClean;
use pathdiff::diff_paths;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const SOURCE_EXTENSION: &str = "derw";

#[derive(Parser)]
#[command(
    name = "derw",
    version,
    about = "Compile Derw source files to TypeScript, JavaScript or Elm."
)]
struct Cli {
    /// Log compiler stages to stderr (`-vv` for everything).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile sources and write the generated files.
    Compile(CompileCli),
    /// Parse and type-check sources without generating code.
    Check(CheckCli),
    /// Format sources in place.
    Fmt(FmtCli),
}

#[derive(Args)]
struct CompileCli {
    /// Files or directories to compile (defaults to current directory).
    #[arg(value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// Language to generate: `ts`, `js`, `elm` or `derw`.
    #[arg(long, default_value = "ts", value_parser = parse_target)]
    target: Target,

    /// Write generated files under this directory, mirroring the inputs.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print each parsed module as JSON.
    #[arg(long)]
    emit_ast: bool,

    /// Dump the token stream produced by the lexer.
    #[arg(long)]
    dump_tokens: bool,
}

#[derive(Args)]
struct CheckCli {
    /// Files or directories to check (defaults to current directory).
    #[arg(value_name = "PATH")]
    inputs: Vec<PathBuf>,
}

#[derive(Args)]
struct FmtCli {
    /// Files or directories to format (defaults to current directory).
    #[arg(value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// Do not write files; exit with an error if changes are needed.
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compile(compile) => run_compile(&compile),
        Command::Check(check) => run_check(&check),
        Command::Fmt(fmt) => run_fmt(&fmt),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_target(value: &str) -> Result<Target, String> {
    value
        .parse()
        .map_err(|error: anyhow::Error| error.to_string())
}

fn run_compile(cli: &CompileCli) -> Result<()> {
    let sources = collect_derw_files(&cli.inputs)?;
    let mut failed = 0usize;

    for (path, base) in &sources {
        let source = read_source(path)?;
        let mut compiler = Compiler::new(CompileOptions {
            target: cli.target,
            dump_tokens: cli.dump_tokens,
        });

        let result = compiler.compile(&source);
        print_diagnostics(&source, compiler.diagnostics().entries());
        let compilation = match result {
            Ok(compilation) => compilation,
            Err(err) => {
                failed += 1;
                eprintln!("error: {}: {err}", path.display());
                continue;
            }
        };

        if cli.emit_ast {
            let ast = serde_json::to_string_pretty(&compilation.module)
                .with_context(|| format!("Failed to serialise AST of {}", path.display()))?;
            println!("{ast}");
        }

        let destination = output_path(path, base.as_deref(), cli.output.as_deref(), cli.target);
        if destination == *path {
            bail!(
                "refusing to overwrite {}; pass --output to choose another directory",
                path.display()
            );
        }
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let mut output = compilation.output;
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        fs::write(&destination, output)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        info!(source = %path.display(), output = %destination.display(), "wrote output");
        println!("Compiled {} -> {}", path.display(), destination.display());
    }

    if failed > 0 {
        bail!("{failed} file(s) failed to compile");
    }
    Ok(())
}

fn run_check(cli: &CheckCli) -> Result<()> {
    let sources = collect_derw_files(&cli.inputs)?;
    if sources.is_empty() {
        println!("no .derw files found");
        return Ok(());
    }

    let mut failed = 0usize;
    for path in sources.keys() {
        let source = read_source(path)?;
        let mut compiler = Compiler::new(CompileOptions::default());

        let result = compiler.check(&source);
        print_diagnostics(&source, compiler.diagnostics().entries());
        match result {
            Ok(_) => println!("  ok {}", path.display()),
            Err(err) => {
                failed += 1;
                eprintln!("error: {}: {err}", path.display());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} file(s) failed to check");
    }
    println!("Checked {} file(s)", sources.len());
    Ok(())
}

fn run_fmt(cli: &FmtCli) -> Result<()> {
    let sources = collect_derw_files(&cli.inputs)?;
    let mut had_changes = false;

    for path in sources.keys() {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let formatted = format_source(&contents)
            .with_context(|| format!("Failed to format {}", path.display()))?;

        if contents == formatted {
            debug!(path = %path.display(), "already formatted");
            continue;
        }

        if cli.check {
            had_changes = true;
            eprintln!("needs formatting: {}", path.display());
        } else {
            fs::write(path, formatted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Formatted {}", path.display());
        }
    }

    if cli.check && had_changes {
        bail!("one or more files require formatting");
    }
    Ok(())
}

/// Every `.derw` file under `inputs`, mapped to the directory argument it
/// was found under. Files named directly have no base.
fn collect_derw_files(inputs: &[PathBuf]) -> Result<BTreeMap<PathBuf, Option<PathBuf>>> {
    let inputs = if inputs.is_empty() {
        vec![env::current_dir().context("failed to determine current directory")?]
    } else {
        inputs.to_vec()
    };

    let mut sources = BTreeMap::new();
    for input in &inputs {
        let metadata =
            fs::metadata(input).with_context(|| format!("Failed to access {}", input.display()))?;

        if metadata.is_file() {
            sources.entry(input.clean()).or_insert(None);
            continue;
        }

        let base = input.clean();
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("Failed to read directory {}", input.display()))?;
            if entry.file_type().is_file() && is_derw_file(entry.path()) {
                sources
                    .entry(entry.path().clean())
                    .or_insert_with(|| Some(base.clone()));
            }
        }
    }

    debug!(files = sources.len(), "collected sources");
    Ok(sources)
}

fn is_derw_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
}

fn read_source(path: &Path) -> Result<SourceFile> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(SourceFile::new(SourceId(0), path.to_path_buf(), contents))
}

/// `<stem>.<ext>` beside the source, or under `output_dir` at the source's
/// position relative to its base directory.
fn output_path(
    source: &Path,
    base: Option<&Path>,
    output_dir: Option<&Path>,
    target: Target,
) -> PathBuf {
    let destination = match output_dir {
        None => source.to_path_buf(),
        Some(dir) => {
            let relative = base
                .and_then(|base| diff_paths(source, base))
                .or_else(|| source.file_name().map(PathBuf::from))
                .unwrap_or_else(|| source.to_path_buf());
            dir.join(relative)
        }
    };
    destination.with_extension(target.extension()).clean()
}

fn print_diagnostics(source: &SourceFile, diagnostics: &[Diagnostic]) {
    let lines: Vec<&str> = source.contents.lines().collect();
    for diagnostic in diagnostics {
        print_diagnostic(source, &lines, diagnostic);
    }
}

fn print_diagnostic(source: &SourceFile, lines: &[&str], diagnostic: &Diagnostic) {
    let label = match diagnostic.level {
        DiagnosticLevel::Error => "error",
        DiagnosticLevel::Warning => "warning",
    };
    eprintln!("{label}: {}", diagnostic.message);

    if let Some(line) = diagnostic.line {
        eprintln!("  --> {}:{line}", source.path.display());
        if let Some(text) = lines.get(line.saturating_sub(1)) {
            eprintln!("   | {}", text.replace('\t', "    "));
        }
    }
}
