use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use assembly_editor::{BackgroundLoader, Console, Outcome, ProjectSession, log_capture, project};
use clap::Parser;

/// Assembly editor command console.
#[derive(Parser, Debug)]
#[command(name = "assembly-editor", about = "Restructure an assembly tree with undo/redo", version)]
struct Args {
    /// Project file to open.
    #[arg(long, default_value = "project.toml")]
    project: PathBuf,

    /// Override the project's history length.
    #[arg(long)]
    max_undo: Option<usize>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let log = match log_capture::install(10_000) {
        Ok(buffer) => Some(buffer),
        Err(e) => {
            eprintln!("logging unavailable: {e}");
            None
        }
    };
    assembly_core::init();

    let mut config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Cannot start background loader: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(max_undo) = args.max_undo {
        config.history.max_undo = max_undo;
    }

    let session = match ProjectSession::open(&config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Cannot open project '{}': {e}", config.project.name);
            return ExitCode::FAILURE;
        }
    };

    let mut console = Console::new(session, log);
    println!("{}", console.render_tree());
    run(&mut console);
    ExitCode::SUCCESS
}

/// Longest time startup waits for the project file.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads the project on the background runtime, showing progress until it
/// arrives.
fn load(args: &Args) -> std::io::Result<project::ProjectConfig> {
    let mut loader = BackgroundLoader::new()?;
    let request = loader.load(&args.project);
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "Loading {}", args.project.display());
    let result = loader.wait_for(
        request,
        &args.project,
        LOAD_TIMEOUT,
        Duration::from_millis(100),
        || {
            let _ = write!(stderr, ".");
            let _ = stderr.flush();
        },
    );
    let _ = writeln!(stderr);
    Ok(project::or_default(result))
}

fn run(console: &mut Console) {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "> ");
    let _ = stdout.flush();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match console.execute(&line) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Print(text)) if text.is_empty() => {}
            Ok(Outcome::Print(text)) => println!("{}", text.trim_end()),
            Err(e) => println!("error: {e}"),
        }
        let _ = write!(stdout, "> ");
        let _ = stdout.flush();
    }
}
