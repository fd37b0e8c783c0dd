use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

use crate::error::{EXIT_USAGE, GenError};
use crate::header::HeaderMapping;
use crate::output::create_output_folder;
use crate::session::{Options, RowOutcome, Session, Summary, TemplateSource};
use crate::template::{Renderer, Template};
use crate::workbook::Sheet;

pub const USAGE: &str = "Usage: schemagen <SPREADSHEET> <TEMPLATE>";

/// Generate one text file per spreadsheet row from a placeholder template.
///
/// Row 0 of the first sheet names the placeholders, column 0 of every other
/// row names the file written for it.
#[derive(Debug, Parser)]
#[command(name = "schemagen", version)]
pub struct Cli {
    /// Workbook whose first sheet supplies headers and rows
    pub spreadsheet: PathBuf,

    /// Text file containing the placeholders
    pub template: PathBuf,

    // extra positionals are accepted and ignored
    #[arg(hide = true)]
    pub extra: Vec<OsString>,

    /// Directory under which the timestamped output folder is created
    /// [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Skip rows whose output file already exists instead of overwriting it
    #[arg(long)]
    pub no_clobber: bool,

    /// Read the template again for every row
    #[arg(long)]
    pub reload_template: bool,
}

/// Parses `args` (program name first), runs the generation and returns the
/// process exit status.
pub fn run(args: impl IntoIterator<Item = OsString>) -> u8 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => return parse_failure(&err),
    };

    match generate(&cli) {
        Ok(summary) => {
            println!(
                "{} file(s) written, {} row(s) skipped.",
                summary.written, summary.skipped
            );
            0
        }
        Err(err) => {
            let code = err.exit_code();
            eprintln!("Error: {:#}", anyhow::Error::from(err));
            code
        }
    }
}

fn parse_failure(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            0
        }
        ErrorKind::MissingRequiredArgument => {
            println!("{USAGE}");
            EXIT_USAGE
        }
        _ => {
            let _ = err.print();
            EXIT_USAGE
        }
    }
}

pub fn generate(cli: &Cli) -> Result<Summary, GenError> {
    if !cli.extra.is_empty() {
        tracing::debug!(extra = ?cli.extra, "ignoring extra arguments");
    }

    let root = match &cli.output_root {
        Some(root) => root.clone(),
        None => env::current_dir().map_err(GenError::WorkingDir)?,
    };

    let sheet = Sheet::open_first(&cli.spreadsheet)?;
    let renderer = Renderer::new(HeaderMapping::from_sheet(&sheet))?;
    tracing::debug!(
        sheet = sheet.name(),
        placeholders = renderer.mapping().len(),
        "placeholders collected"
    );

    let template = if cli.reload_template {
        TemplateSource::Reload(cli.template.clone())
    } else {
        TemplateSource::Cached(Template::load(&cli.template)?)
    };

    let output_dir = create_output_folder(&root, &cli.spreadsheet)?;
    let options = Options {
        no_clobber: cli.no_clobber,
    };

    let mut session = Session::new(&sheet, renderer, template, output_dir, options);
    let (stdout, stderr) = (io::stdout(), io::stderr());
    let summary = session.run(|outcome| {
        let _ = report(outcome, &mut stdout.lock(), &mut stderr.lock());
    });
    tracing::debug!(dir = %session.output_dir().display(), ?summary, "run finished");
    Ok(summary)
}

fn report(outcome: &RowOutcome, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    match outcome {
        RowOutcome::Written {
            row,
            file_name,
            path,
        } => {
            tracing::debug!(row, path = %path.display(), "written");
            writeln!(out, "{file_name} completed successfully.")
        }
        RowOutcome::Degraded {
            row,
            file_name,
            path,
            error,
        } => {
            tracing::debug!(row, path = %path.display(), "written from empty template");
            writeln!(err, "Error: row {}: {error}", row + 1)?;
            writeln!(out, "{file_name} completed successfully.")
        }
        RowOutcome::Skipped { row, error } => writeln!(err, "Error: row {}: {error}", row + 1),
    }
}
