use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use doxypub::{
    BuildStatus, DirectoryLocator, DoxyfileLoader, Environment, Error, ErrorKind, GenerateStep,
    Installation, Installations, NoteStyle, PublishMode, PublishSettings,
};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_UNSTABLE: i32 = 2;
const EXIT_HTML_DISABLED: i32 = 3;

#[derive(Debug, Parser)]
#[command(name = "doxypub", version, about = "Run Doxygen and locate the HTML it generated")]
struct Cli {
    /// Print resolution details to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors to stderr.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the resolved `KEY = value` pairs of a Doxyfile.
    Parse(ParseArgs),
    /// Print the directory Doxygen wrote HTML to.
    Resolve(ResolveArgs),
    /// Run Doxygen, tagging errors and warnings in its output.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Doxyfile to read.
    #[arg(default_value = "Doxyfile")]
    doxyfile: PathBuf,

    /// Do not expand `$(NAME)` from the process environment.
    #[arg(long)]
    no_expand: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Doxyfile,
    HtmlDirectory,
}

impl From<ModeArg> for PublishMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Doxyfile => PublishMode::Doxyfile,
            ModeArg::HtmlDirectory => PublishMode::HtmlDirectory,
        }
    }
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Where the HTML directory comes from.
    #[arg(long, value_enum, default_value_t = ModeArg::Doxyfile)]
    mode: ModeArg,

    /// Doxyfile path, relative to the base directory.
    #[arg(long, default_value = "Doxyfile")]
    doxyfile: String,

    /// HTML directory, relative to the base directory (html-directory mode).
    #[arg(long = "html-dir")]
    html_dir: Option<String>,

    /// Folder Doxygen was run from, relative to the base directory.
    #[arg(long)]
    subfolder: Option<String>,

    /// Base directory; defaults to the current directory.
    #[arg(long, default_value = ".")]
    base: PathBuf,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Doxygen executable.
    #[arg(long)]
    doxygen: PathBuf,

    /// Doxyfile path, relative to the base directory.
    #[arg(long, default_value = "Doxyfile")]
    doxyfile: String,

    /// Directory to run Doxygen from.
    #[arg(long, default_value = ".")]
    base: PathBuf,

    /// Do not fail when Doxygen exits non-zero.
    #[arg(long)]
    continue_on_failure: bool,

    /// Exit with the unstable status when Doxygen printed warnings.
    #[arg(long)]
    unstable_if_warnings: bool,

    /// Forward output without hidden error/warning markers.
    #[arg(long)]
    no_notes: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("doxypub: {err}");
            match err.kind() {
                ErrorKind::HtmlDisabled => EXIT_HTML_DISABLED,
                _ => EXIT_FAILURE,
            }
        }
    };
    process::exit(code);
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<i32, Error> {
    match command {
        Command::Parse(args) => execute_parse(args),
        Command::Resolve(args) => execute_resolve(args),
        Command::Run(args) => execute_run(args),
    }
}

fn execute_parse(args: ParseArgs) -> Result<i32, Error> {
    let environment = if args.no_expand {
        Environment::memory()
    } else {
        Environment::process()
    };
    let config = DoxyfileLoader::new()
        .path(&args.doxyfile)
        .environment(environment)
        .load()?;

    for entry in config.iter() {
        println!("{} = {}", entry.key, entry.value);
    }
    Ok(0)
}

fn execute_resolve(args: ResolveArgs) -> Result<i32, Error> {
    let settings = PublishSettings {
        mode: args.mode.into(),
        doxyfile_path: args.doxyfile,
        html_directory: args.html_dir,
        run_subfolder: args.subfolder,
    };
    let resolved = DirectoryLocator::new(settings)
        .environment(Environment::process())
        .locate(&args.base)?;

    println!("{}", resolved.path.display());
    Ok(0)
}

fn execute_run(args: RunArgs) -> Result<i32, Error> {
    let installations = Installations::new().with(Installation::new("cli", &args.doxygen));
    let notes = if args.no_notes {
        NoteStyle::Off
    } else {
        NoteStyle::Concealed
    };
    let step = GenerateStep::new("cli", args.doxyfile)
        .continue_on_failure(args.continue_on_failure)
        .unstable_if_warnings(args.unstable_if_warnings)
        .notes(notes);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = step.run(&installations, &args.base, &mut out)?;

    Ok(match report.status {
        BuildStatus::Success => 0,
        BuildStatus::Unstable => EXIT_UNSTABLE,
        BuildStatus::Failure => EXIT_FAILURE,
    })
}
