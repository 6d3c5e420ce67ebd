use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use ics2fits::image_pipeline::{
    ConversionConfig, ConversionError, ConversionPipeline, IcsReader, OutputFormat,
    PipelineTimings, StandardTiffWriter,
};
use ics2fits::logger::{self, LoggerConfig, Verbosity};

use tracing::{error, info};

/// Convert ICS images to FITS, moving the channel axis last.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source ICS file (.ics, or the .ids half of a version 1 pair)
    input: PathBuf,

    /// Destination file [default: <INPUT> with .fits or .tiff appended]
    output: Option<PathBuf>,

    /// Increase verbosity (repeatable)
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short = 'q', action = ArgAction::Count)]
    quiet: u8,

    /// Set verbosity level (1 = errors only, 6 = everything)
    #[arg(long = "verb", value_name = "LEVEL")]
    verb: Option<i64>,

    /// Also append log records to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Destination format
    #[arg(long, value_enum, default_value_t = Format::Fits)]
    format: Format,

    /// Fail instead of replacing an existing destination
    #[arg(long)]
    no_clobber: bool,

    /// Print how long each conversion step took
    #[arg(long)]
    timings: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Fits,
    Tiff,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Fits => OutputFormat::Fits,
            Format::Tiff => OutputFormat::Tiff,
        }
    }
}

impl Cli {
    /// `--verb` sets the starting level, then each `-v` / `-q` moves it by one.
    fn verbosity(&self) -> Verbosity {
        let base = self.verb.map(Verbosity::new).unwrap_or_default();
        Verbosity::new(base.level() as i64 + self.verbose as i64 - self.quiet as i64)
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| OutputFormat::from(self.format).default_output_path(&self.input))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger_config = LoggerConfig {
        verbosity: cli.verbosity(),
        log_file: cli.log_file.clone(),
    };
    let dispatch = match logger::dispatch(&logger_config) {
        Ok(dispatch) => dispatch,
        Err(e) => {
            eprintln!("Could not open log file: {}", e);
            return ExitCode::from(255);
        }
    };

    tracing::dispatcher::with_default(&dispatch.clone(), || match run(&cli, dispatch) {
        Ok(timings) => {
            if cli.timings {
                println!("{}", timings);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<ConversionError>()
                .map_or(255, ConversionError::exit_code);
            ExitCode::from(code)
        }
    })
}

fn run(cli: &Cli, dispatch: tracing::Dispatch) -> anyhow::Result<PipelineTimings> {
    let output = cli.output_path();
    let config = ConversionConfig::builder()
        .overwrite(!cli.no_clobber)
        .build();

    info!(
        input = %cli.input.display(),
        output = %output.display(),
        format = ?cli.format,
        "Starting conversion"
    );

    let timings = match cli.format {
        Format::Fits => ConversionPipeline::new(config)
            .with_diagnostics(dispatch)
            .convert_with_timings(&cli.input, &output)?,
        Format::Tiff => ConversionPipeline::with_custom(IcsReader, StandardTiffWriter, config)
            .with_diagnostics(dispatch)
            .convert_with_timings(&cli.input, &output)?,
    };

    Ok(timings)
}
