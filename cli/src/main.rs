mod config;
mod error;
mod output;
mod test_runner;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use screenplay::parser::{Notice, Parser as ScreenplayParser};
use screenplay::record::ScriptRecord;
use screenplay::render::{RenderOptions, document_html};

use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};

const SUBCOMMANDS: &[&str] = &[
    "preview",
    "panels",
    "characters",
    "check",
    "render",
    "test",
    "help",
];

/// Options that take a value, so the value is not mistaken for a subcommand.
const VALUE_OPTIONS: &[&str] = &["--config"];

#[derive(Parser)]
#[command(name = "screenplay", version, about = "Fountain screenplay and storyboard tool")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to ./screenplay.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the formatted preview block stream
    Preview(ViewArgs),

    /// Print the storyboard panels
    Panels(ViewArgs),

    /// Print speaking characters with their dialogue line counts
    Characters(ViewArgs),

    /// Report notices (orphaned metadata, unclosed notes, ...)
    Check(CheckArgs),

    /// Write a standalone HTML preview
    Render(RenderArgs),

    /// Run .test.fountain fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Screenplay source file, or `-` for stdin
    file: PathBuf,

    /// Read the file as a script record JSON payload instead of plain text
    #[arg(long)]
    record: bool,
}

#[derive(clap::Args)]
struct ViewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Exit with status 1 when any notice is reported
    #[arg(long)]
    deny_notices: bool,
}

#[derive(clap::Args)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page title
    #[arg(long)]
    title: Option<String>,

    /// Stylesheet URL to link instead of the built-in style
    #[arg(long)]
    stylesheet: Option<String>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.fountain file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

/// A loaded source with its codespan file id.
struct Input {
    name: String,
    source: String,
    files: SimpleFiles<String, String>,
    file_id: usize,
}

fn main() {
    init_tracing();

    // `screenplay file.fountain` works like `screenplay preview file.fountain`.
    let mut args: Vec<String> = std::env::args().collect();
    inject_default_subcommand(&mut args);

    let cli = Cli::parse_from(&args);
    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let result = Config::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Preview(args) => do_preview(args, &config),
        Command::Panels(args) => do_panels(args, &config),
        Command::Characters(args) => do_characters(args, &config),
        Command::Check(args) => do_check(args, &config, color_choice),
        Command::Render(args) => do_render(args, &config),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                return Ok(0);
            }
            Ok(test_runner::run_tests(path, color_choice, &args.category)?)
        }
    });

    match result {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("error: {}", error);
            process::exit(2);
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn inject_default_subcommand(args: &mut Vec<String>) {
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if VALUE_OPTIONS.contains(&arg) {
            i += 2;
            continue;
        }
        if arg.starts_with('-') && arg != "-" {
            i += 1;
            continue;
        }
        if !SUBCOMMANDS.contains(&arg) {
            args.insert(i, "preview".to_string());
        }
        return;
    }
}

fn read_input(args: &InputArgs) -> Result<Input> {
    let path = &args.file;
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?;
        text
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?
    };

    let (name, source) = if args.record {
        let record = ScriptRecord::from_json(&text).map_err(|source| CliError::Record {
            path: path.clone(),
            source,
        })?;
        info!(id = %record.id, title = %record.title, "loaded script record");
        (format!("{} ({})", record.title, record.id), record.source)
    } else {
        (path.display().to_string(), text)
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(name.clone(), source.clone());
    Ok(Input {
        name,
        source,
        files,
        file_id,
    })
}

fn wants_json(flag: bool, config: &Config) -> bool {
    flag || config.output.format == OutputFormat::Json
}

fn write_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn do_preview(args: ViewArgs, config: &Config) -> Result<i32> {
    let input = read_input(&args.input)?;
    let screenplay = ScreenplayParser::new(&input.source, input.file_id).parse();
    if wants_json(args.json, config) {
        write_json(&screenplay)?;
    } else {
        output::write_preview(&mut io::stdout().lock(), &screenplay)?;
    }
    Ok(0)
}

fn do_panels(args: ViewArgs, config: &Config) -> Result<i32> {
    let input = read_input(&args.input)?;
    let storyboard = ScreenplayParser::new(&input.source, input.file_id).storyboard();
    if wants_json(args.json, config) {
        write_json(&storyboard)?;
    } else {
        output::write_panels(&mut io::stdout().lock(), &storyboard)?;
    }
    Ok(0)
}

fn do_characters(args: ViewArgs, config: &Config) -> Result<i32> {
    let input = read_input(&args.input)?;
    let screenplay = ScreenplayParser::new(&input.source, input.file_id).parse();
    if wants_json(args.json, config) {
        write_json(&screenplay.characters)?;
    } else {
        output::write_characters(&mut io::stdout().lock(), &screenplay)?;
    }
    Ok(0)
}

fn do_check(args: CheckArgs, config: &Config, color_choice: ColorChoice) -> Result<i32> {
    let input = read_input(&args.input)?;
    let mut parser = ScreenplayParser::new(&input.source, input.file_id);
    let screenplay = parser.parse();
    let storyboard = parser.storyboard();

    let mut notices: Vec<&Notice> = screenplay
        .notices
        .iter()
        .chain(storyboard.notices.iter())
        .collect();
    notices.sort_by_key(|n| n.line);

    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    for notice in &notices {
        let diagnostic = notice.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &term_config, &input.files, &diagnostic);
    }

    eprintln!(
        "{}: {} block(s), {} panel(s), {} notice(s)",
        input.name,
        screenplay.blocks.len(),
        storyboard.len(),
        notices.len()
    );

    let deny = args.deny_notices || config.check.deny_notices;
    Ok(if deny && !notices.is_empty() { 1 } else { 0 })
}

fn do_render(args: RenderArgs, config: &Config) -> Result<i32> {
    let input = read_input(&args.input)?;
    let screenplay = ScreenplayParser::new(&input.source, input.file_id).parse();
    let options = RenderOptions {
        title: args.title.or_else(|| config.render.title.clone()),
        stylesheet: args.stylesheet.or_else(|| config.render.stylesheet.clone()),
    };
    let html = document_html(&screenplay, &options);

    match &args.output {
        Some(path) => {
            std::fs::write(path, html).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "wrote HTML preview");
        }
        None => io::stdout().lock().write_all(html.as_bytes())?,
    }
    Ok(0)
}
