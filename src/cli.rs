//! Command-line front end: `init`, `plot`, `show` and `version`.

use std::{
    error::Error,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    budget::{Breakdown, Budget, SAMPLE_BUDGET_YAML},
    config::{ConfigManager, ReportConfig},
    errors::BudgetError,
    report::{render_svg, render_table, to_csv_string, FormulaSheet},
    utils::{build_info::BUILD_INFO, paths::sibling_output, persistence::write_atomic},
};

pub type CliResult<T> = std::result::Result<T, Box<dyn Error>>;

const CSV_SUFFIX: &str = ".csv";
const SHEET_SUFFIX: &str = ".sheet.csv";
const SVG_SUFFIX: &str = ".svg";

#[derive(Debug, Parser)]
#[command(
    name = "budget_plot",
    version,
    about = "Turn recurring budget events into a daily breakdown"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a sample budget definition.
    Init(InitArgs),
    /// Compute the breakdown and write report files next to the definition.
    Plot(PlotArgs),
    /// Print the breakdown as a table.
    Show(ShowArgs),
    /// Print build metadata.
    Version,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Destination file; stdout when omitted.
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Budget definition (YAML, or JSON by extension).
    pub definition: PathBuf,
    /// Write `<stem>.csv`.
    #[arg(short = 'c', long)]
    pub csv: bool,
    /// Write `<stem>.sheet.csv` with total formulas.
    #[arg(short = 'x', long)]
    pub sheet: bool,
    /// Write `<stem>.svg`.
    #[arg(short = 's', long)]
    pub svg: bool,
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub definition: PathBuf,
    #[arg(long)]
    pub max_rows: Option<usize>,
    #[arg(long)]
    pub no_color: bool,
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Report configuration JSON; defaults to the saved user configuration.
    #[arg(long = "config", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> CliResult<ReportConfig> {
        let config = match &self.path {
            Some(path) => ReportConfig::from_file(path)?,
            None => ConfigManager::new().load()?,
        };
        Ok(config)
    }
}

/// Parses process arguments and runs the selected command against stdout.
pub fn run_cli() -> CliResult<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> CliResult<()> {
    match cli.command {
        Command::Init(args) => init(&args, out),
        Command::Plot(args) => plot(&args, out),
        Command::Show(args) => show(&args, out),
        Command::Version => {
            writeln!(out, "{}", BUILD_INFO)?;
            Ok(())
        }
    }
}

fn init(args: &InitArgs, out: &mut dyn Write) -> CliResult<()> {
    let Some(path) = &args.file else {
        out.write_all(SAMPLE_BUDGET_YAML.as_bytes())?;
        return Ok(());
    };
    if path.exists() && !args.force {
        return Err(BudgetError::validation(
            "file",
            path.display().to_string(),
            "already exists; pass --force to overwrite",
        )
        .into());
    }
    write_atomic(path, SAMPLE_BUDGET_YAML)?;
    info!(path = %path.display(), "wrote sample budget definition");
    writeln!(out, "Created {}", path.display())?;
    Ok(())
}

fn plot(args: &PlotArgs, out: &mut dyn Write) -> CliResult<()> {
    let config = args.config.load()?;
    let breakdown = compute(&args.definition)?;

    if !(args.csv || args.sheet || args.svg) {
        writeln!(out, "{}", render_table(&breakdown, &config))?;
        return Ok(());
    }
    if args.csv {
        let path = sibling_output(&args.definition, CSV_SUFFIX);
        write_atomic(&path, &to_csv_string(&breakdown, &config)?)?;
        report_written(out, &path)?;
    }
    if args.sheet {
        let path = sibling_output(&args.definition, SHEET_SUFFIX);
        let sheet = FormulaSheet::from_breakdown(&breakdown, &config);
        let mut buffer = Vec::new();
        sheet.write_csv(&config, &mut buffer)?;
        write_atomic(&path, &String::from_utf8(buffer)?)?;
        info!(sheet = sheet.name(), "wrote formula sheet");
        report_written(out, &path)?;
    }
    if args.svg {
        let path = sibling_output(&args.definition, SVG_SUFFIX);
        write_atomic(&path, &render_svg(&breakdown, &config))?;
        report_written(out, &path)?;
    }
    Ok(())
}

fn show(args: &ShowArgs, out: &mut dyn Write) -> CliResult<()> {
    let mut config = args.config.load()?;
    if args.max_rows.is_some() {
        config.max_rows = args.max_rows;
    }
    if args.no_color {
        config.color = false;
    }
    let breakdown = compute(&args.definition)?;
    writeln!(out, "{}", render_table(&breakdown, &config))?;
    Ok(())
}

fn compute(definition: &Path) -> CliResult<Breakdown> {
    let budget = Budget::load(definition)?;
    Ok(budget.breakdown()?)
}

fn report_written(out: &mut dyn Write, path: &Path) -> io::Result<()> {
    info!(path = %path.display(), "wrote report");
    writeln!(out, "Wrote {}", path.display())
}
