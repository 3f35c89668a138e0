//! Edit Sheets CLI - read and update an online worksheet

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edit_sheets::{MetadataUpdate, SendOptions, SheetOptions, Spreadsheet};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "edit-sheets")]
#[command(
    author,
    version,
    about = "Read and update online worksheets",
    long_about = "Read and update online worksheets.\n\n\
        Results are printed as JSON on stdout and progress notes on stderr. \
        Warnings raised inside the client library (unknown {{name}} \
        placeholders, overwritten cells, formulas that could not be \
        translated) are emitted as tracing events; no subscriber is \
        installed, so they are not printed."
)]
struct Cli {
    /// Connection options (JSON)
    #[arg(short, long, global = true, default_value = "edit-sheets.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every cell of the worksheet as JSON
    Read,

    /// Send cells from a JSON file in one batch
    Write {
        /// Cells, as an object of rows or an array of row arrays
        cells: PathBuf,

        /// Grow the worksheet first if the cells reach past it
        #[arg(long)]
        auto_size: bool,
    },

    /// Show worksheet title, size and last update
    Info,

    /// Set the worksheet's row and column counts
    Resize {
        #[arg(long)]
        rows: u32,

        #[arg(long)]
        cols: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let sheet = open(&cli.config).await?;

    match cli.command {
        Commands::Read => read(&sheet).await,
        Commands::Write { cells, auto_size } => write(sheet, &cells, auto_size).await,
        Commands::Info => info(&sheet).await,
        Commands::Resize { rows, cols } => resize(&sheet, rows, cols).await,
    }
}

async fn open(config: &Path) -> Result<Spreadsheet> {
    let options = SheetOptions::from_path(config)
        .with_context(|| format!("Failed to load options from '{}'", config.display()))?;
    edit_sheets::create(options)
        .await
        .context("Failed to open worksheet")
}

async fn read(sheet: &Spreadsheet) -> Result<()> {
    let (rows, info) = sheet.receive().await.context("Failed to read worksheet")?;

    eprintln!(
        "Read {} cells in {} rows (next free row: {})",
        info.total_cells, info.total_rows, info.next_row
    );
    print_json(&json!({ "rows": rows, "info": info }))
}

async fn write(mut sheet: Spreadsheet, cells: &Path, auto_size: bool) -> Result<()> {
    let text = std::fs::read_to_string(cells)
        .with_context(|| format!("Failed to read '{}'", cells.display()))?;
    let cells: Value = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not valid JSON", cells.display()))?;

    sheet.add(&cells).context("Invalid cells")?;
    let outcome = sheet
        .send(SendOptions { auto_size })
        .await
        .context("Failed to update worksheet")?;

    if let Some(meta) = &outcome.resized {
        eprintln!("Resized worksheet to {} x {}", meta.row_count, meta.col_count);
    }
    eprintln!("Sent {} cells", outcome.cells_sent);
    print_json(&json!({ "cellsSent": outcome.cells_sent, "resized": outcome.resized }))
}

async fn info(sheet: &Spreadsheet) -> Result<()> {
    let meta = sheet.metadata().await.context("Failed to read worksheet metadata")?;
    print_json(&json!({
        "spreadsheetId": sheet.spreadsheet_id(),
        "worksheetId": sheet.worksheet_id(),
        "metadata": meta,
    }))
}

async fn resize(sheet: &Spreadsheet, rows: u32, cols: u32) -> Result<()> {
    let meta = sheet
        .set_metadata(MetadataUpdate::resize(rows, cols))
        .await
        .context("Failed to resize worksheet")?;

    eprintln!("Resized worksheet to {} x {}", meta.row_count, meta.col_count);
    print_json(&serde_json::to_value(&meta)?)
}

fn print_json(value: &Value) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write to stdout")?;
    writeln!(stdout).context("Failed to write to stdout")?;
    Ok(())
}
