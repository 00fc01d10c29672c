use std::io::{self, Write};
use std::path::PathBuf;
use std::{env, process};

use anyhow::Context;
use clap::Parser;
use console::style;

use codelab_nb::config::Config;
use codelab_nb::output::{write_json, write_notebook, WriteRequest};
use codelab_nb::report::{print_err, step};
use codelab_nb::source::{read_source, Locator};
use codelab_notebook::convert;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Markdown file, http(s) url or @stage path
    source: String,
    /// Output file or @stage directory [default: <title>.ipynb in the current directory]
    output: Option<String>,
    /// Configuration file [default: ./codelab.yml when present]
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Notebook file name, overriding the one derived from the title
    #[arg(short, long)]
    main_file: Option<String>,
    /// Warehouse used when registering a notebook on a stage
    #[arg(short, long)]
    warehouse: Option<String>,
    /// Print the notebook JSON instead of writing it
    #[arg(long)]
    stdout: bool,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::load(cli.config.as_deref(), &cwd)
        .context("Error loading configuration:")?;
    let quiet = cli.stdout;

    let locator = Locator::parse(&cli.source);
    if !quiet {
        step(1, 3, "Reading", &locator.to_string());
    }
    let raw = read_source(&locator, None).context(format!("Error reading {}", locator))?;

    if !quiet {
        step(2, 3, "Converting", &format!("{} bytes", raw.len()));
    }
    let conversion = convert(&raw, &config.convert).context("Conversion error:")?;

    if quiet {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        write_json(&conversion.notebook, &mut lock)?;
        writeln!(lock)?;
        return Ok(());
    }

    let warehouse = cli.warehouse.or(config.query_warehouse);
    let request = WriteRequest {
        title: &conversion.title,
        destination: cli.output.as_deref(),
        main_file: cli.main_file.as_deref(),
        warehouse: warehouse.as_deref(),
    };
    step(3, 3, "Writing", &format!("{} cells", conversion.notebook.cells.len()));
    let written = write_notebook(&conversion.notebook, &request, None)
        .context("Error writing notebook:")?;

    println!("{} {}", style("Done.").green().bold(), written.location());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if print_err(run(cli)).is_none() {
        process::exit(1);
    }
}
