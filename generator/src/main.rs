//! Rosetta CSV CLI - Generate a Rosetta ingest CSV
//!
//! # Usage
//!
//! ```bash
//! rosetta-csv --csv droid.csv --exp list_control.csv --ros schema.json --cfg config.json
//! rosetta-csv --csv droid.csv --exp lc.csv --ros schema.json --cfg config.json --prov prov.notes
//! rosetta-csv --args args.json -o load.csv --validate
//! ```
//!
//! The generated CSV goes to stdout unless `--output` is given; logs go
//! to stderr.

use clap::{CommandFactory, Parser};
use rosetta_csv::logs::{log_error, log_info, LOGGER};
use rosetta_csv::{
    generate, ArgumentsFile, GenerateOptions, GeneratorError, GeneratorInputs, GeneratorResult,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rosetta-csv")]
#[command(
    about = "Generate a Rosetta ingest CSV from a collections list control and a DROID CSV report",
    long_about = None
)]
struct Cli {
    /// Single DROID CSV to read
    #[arg(long = "csv", env = "ROSETTA_CSV_DROID")]
    droid_export: Option<PathBuf>,

    /// List control sheet to map to the Rosetta ingest CSV
    #[arg(long = "exp", env = "ROSETTA_CSV_LIST_CONTROL")]
    list_control: Option<PathBuf>,

    /// Rosetta CSV validation schema
    #[arg(long = "ros", env = "ROSETTA_CSV_SCHEMA")]
    schema_file: Option<PathBuf>,

    /// Config file for field mapping
    #[arg(long = "cfg", env = "ROSETTA_CSV_CONFIG")]
    config_file: Option<PathBuf>,

    /// Flag to enable provenance notes from a file
    #[arg(long = "pro", visible_alias = "prov", env = "ROSETTA_CSV_PROVENANCE")]
    provenance: Option<PathBuf>,

    /// Arguments file with input paths; the paths it names override the flags above
    #[arg(long = "args", visible_alias = "arg", env = "ROSETTA_CSV_ARGS")]
    args_file: Option<PathBuf>,

    /// Write the CSV to a file instead of stdout
    #[arg(short, long, env = "ROSETTA_CSV_OUTPUT")]
    output: Option<PathBuf>,

    /// Check generated rows against the schema constraints
    #[arg(long, env = "ROSETTA_CSV_VALIDATE")]
    validate: bool,

    /// Use DEBUG mode for more logging
    #[arg(long, env = "ROSETTA_CSV_DEBUG")]
    debug: bool,
}

impl Cli {
    /// Inputs for the run, or `None` if a required path is missing.
    ///
    /// Paths named in the arguments file win over the discrete flags.
    fn inputs(&self) -> GeneratorResult<Option<GeneratorInputs>> {
        let flags = ArgumentsFile {
            title: None,
            droid_export: self.droid_export.clone(),
            list_control: self.list_control.clone(),
            schema_file: self.schema_file.clone(),
            config_file: self.config_file.clone(),
            provenance: self.provenance.clone(),
        };

        let args = match &self.args_file {
            Some(path) => {
                let args = ArgumentsFile::from_file(path)?;
                if let Some(title) = &args.title {
                    log_info(format!("arguments file: {}", title));
                }
                args.merged_over(flags)
            }
            None => flags,
        };

        Ok(GeneratorInputs::from_arguments(&args))
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    if std::env::args_os().len() <= 1 {
        print_help();
        return;
    }

    let cli = Cli::parse();
    LOGGER.set_debug(cli.debug);

    if let Err(e) = run(&cli) {
        log_error(e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> GeneratorResult<()> {
    let Some(inputs) = cli.inputs()? else {
        print_help();
        return Ok(());
    };

    let options = GenerateOptions {
        validate: cli.validate,
    };
    let result = generate(&inputs, &options)?;

    write_output(&result.text, cli.output.as_deref())
}

fn write_output(content: &str, path: Option<&Path>) -> GeneratorResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(|source| GeneratorError::Output {
                path: p.to_path_buf(),
                source,
            })?;
            log_info(format!("output written to '{}'", p.display()));
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

fn print_help() {
    // Nothing useful can be done if stdout is gone.
    let _ = Cli::command().print_help();
}
