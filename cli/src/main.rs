mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use codegen::validate::visible_names_at;
use codegen::{ScopeResolver, Settings, persist, run_pass_with};
use vispi::Loader;

const SUBCOMMANDS: &[&str] = &["generate", "test", "help"];

/// Global options that consume the following argument.
const VALUED_OPTIONS: &[&str] = &["--config"];

#[derive(Parser)]
#[command(name = "vispi", version, about = "Pi-calculus text generator for block workspaces")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log generation passes (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML settings; debounce_ms only affects sessions
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate process-calculus text from a saved workspace
    Generate(GenerateArgs),

    /// Run .test.vispi fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Editor save (bare or combined with scope state)
    file: String,

    /// Keep traversal order instead of putting definitions first
    #[arg(long)]
    raw: bool,

    /// Print the committed scope snapshot as JSON
    #[arg(long)]
    snapshot: bool,

    /// Write a combined save with the new scope state
    #[arg(long)]
    save: Option<PathBuf>,

    /// List defined processes with their parameters
    #[arg(long)]
    list_processes: bool,

    /// Print the names a reference at this block id could select
    #[arg(long, value_name = "BLOCK_ID")]
    names: Option<String>,

    /// Exit non-zero when the pass reports warnings
    #[arg(long)]
    check: bool,

    /// Suppress the generated text
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.vispi file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `vispi file.json` works like `vispi generate file.json`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = first_positional(&args) {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "generate".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);
    let settings = load_settings(cli.config.as_deref());

    match cli.command {
        Command::Generate(generate_args) => do_generate(generate_args, &settings, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn first_positional(args: &[String]) -> Option<usize> {
    let mut index = 1;
    while index < args.len() {
        let arg = &args[index];
        if VALUED_OPTIONS.contains(&arg.as_str()) {
            index += 2;
            continue;
        }
        if !arg.starts_with('-') {
            return Some(index);
        }
        index += 1;
    }
    None
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> Settings {
    let Some(path) = path else {
        return Settings::default();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    };
    match toml::from_str(&text) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: invalid config '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn do_generate(args: GenerateArgs, settings: &Settings, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let tree = match Loader::new(source.clone(), file_id).load() {
        Ok(tree) => tree,
        Err(errors) => {
            let diagnostics: Vec<Diagnostic<usize>> = errors.iter().map(|e| e.to_diagnostic()).collect();
            emit(&writer, &config, &files, &diagnostics);
            process::exit(1);
        }
    };

    let mut scopes = ScopeResolver::new();
    match persist::restore(&source, &mut scopes) {
        Ok(true) => tracing::debug!(file = %args.file, "using saved scope state"),
        Ok(false) => {}
        Err(e) => eprintln!("warning: ignoring saved scope state: {}", e),
    }

    let canonicalize = settings.canonicalize && !args.raw;
    let generation = run_pass_with(&tree, &mut scopes, canonicalize);

    if args.list_processes {
        for name in scopes.process_names() {
            println!("{}({})", name, scopes.parameter_names(name).join(", "));
        }
        return;
    }

    if let Some(id) = &args.names {
        let Some(node) = tree.find(id) else {
            eprintln!("error: no block with id '{}'", id);
            process::exit(1);
        };
        for name in visible_names_at(&tree, &scopes, node) {
            println!("{}", name);
        }
        return;
    }

    if args.snapshot {
        match serde_json::to_string_pretty(scopes.committed()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: cannot serialize snapshot: {}", e);
                process::exit(1);
            }
        }
    } else if !args.quiet && !generation.text.is_empty() {
        println!("{}", generation.text);
    }

    let diagnostics: Vec<Diagnostic<usize>> = generation
        .warnings
        .iter()
        .map(|w| w.to_diagnostic(&tree))
        .collect();
    emit(&writer, &config, &files, &diagnostics);

    if let Some(path) = &args.save {
        if let Err(e) = persist::write_to(path, &tree, &scopes) {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }

    if args.check && !generation.warnings.is_empty() {
        process::exit(1);
    }
}

fn emit(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    diagnostics: &[Diagnostic<usize>],
) {
    for diagnostic in diagnostics {
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, diagnostic);
    }
}
