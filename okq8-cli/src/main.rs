use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use okq8_ingest::{Okq8Parser, Statement};
use simple_logger::SimpleLogger;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

mod config;
mod output;

use output::Format;

#[derive(Parser, Debug)]
#[command(name = "okq8", version, about = "Convert OKQ8 Bank xlsx exports into normalized statements")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an export and write the statement as JSON or CSV
    Convert {
        /// Path to the xlsx export
        file: PathBuf,

        /// Output format (default: from config, else json)
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Month-name locale of the date column (default: from config, else sv_SE)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Parse an export and print a short summary
    Check {
        file: PathBuf,

        #[arg(long)]
        locale: Option<String>,
    },

    /// Manage ~/.okq8/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    SimpleLogger::new().with_level(level).env().init()?;

    match cli.command {
        Command::Convert {
            file,
            format,
            output,
            locale,
        } => {
            let cfg = config::load_config()?;
            let statement = parse(&file, locale.as_deref().unwrap_or(&cfg.parser.locale))?;
            let format = format.unwrap_or(cfg.output.format);

            match output {
                Some(path) => {
                    let f = File::create(&path)
                        .with_context(|| format!("create {}", path.display()))?;
                    output::write_statement(&statement, format, BufWriter::new(f))?;
                    eprintln!("Wrote {} lines to {}", statement.lines.len(), path.display());
                }
                None => output::write_statement(&statement, format, io::stdout().lock())?,
            }
        }

        Command::Check { file, locale } => {
            let cfg = config::load_config()?;
            let statement = parse(&file, locale.as_deref().unwrap_or(&cfg.parser.locale))?;
            println!("{}: {}", file.display(), output::summary(&statement));
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn parse(file: &Path, locale: &str) -> Result<Statement> {
    if !file.exists() {
        bail!("export not found: {}", file.display());
    }

    let parser = Okq8Parser::new(locale).with_context(|| format!("locale {locale}"))?;
    parser
        .parse_file(file)
        .with_context(|| format!("parsing {}", file.display()))
}
