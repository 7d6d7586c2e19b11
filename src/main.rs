use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use mdembed::app::{Notice, Session};
use mdembed::clipboard;
use mdembed::logging;
use mdembed::storage::{self, Config, ConfigStorage};

#[derive(Parser)]
#[command(name = "mdembed", version)]
#[command(about = "Copy Markdown notes with their images embedded inline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a note and copy it to the clipboard
    Copy {
        /// Path to the Markdown note
        file: PathBuf,

        /// Vault root for resolving image links (default: the note's folder)
        #[arg(long)]
        vault: Option<PathBuf>,
    },

    /// Convert a note and write it to stdout or a file
    Convert {
        /// Path to the Markdown note
        file: PathBuf,

        /// Vault root for resolving image links (default: the note's folder)
        #[arg(long)]
        vault: Option<PathBuf>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List skipped images and why on stderr
        #[arg(long, default_value_t = false)]
        report: bool,
    },

    /// Copy a note now and again whenever it changes
    Watch {
        /// Path to the Markdown note
        file: PathBuf,

        /// Vault root for resolving image links (default: the note's folder)
        #[arg(long)]
        vault: Option<PathBuf>,
    },

    /// Show the configuration file location and effective settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (data_dir, config_dir) = storage::ensure_directories()?;
    let (config, config_storage) = storage::load_config(&config_dir)?;
    init_logging(&config, &data_dir)?;

    match cli.command {
        Commands::Copy { file, vault } => cmd_copy(config, &file, vault),
        Commands::Convert {
            file,
            vault,
            output,
            report,
        } => cmd_convert(config, &file, vault, output.as_deref(), report),
        Commands::Watch { file, vault } => cmd_watch(config, &file, vault),
        Commands::Config => cmd_config(&config, config_storage.path()),
    }
}

fn init_logging(config: &Config, data_dir: &Path) -> Result<()> {
    if config.logging.file_logging {
        logging::init_logger(
            &data_dir.join("mdembed.log"),
            &config.logging.file_level,
            &config.logging.stderr_level,
        )
    } else {
        env_logger::init();
        Ok(())
    }
}

/// Convert a note and put it on the clipboard
fn cmd_copy(config: Config, file: &Path, vault: Option<PathBuf>) -> Result<()> {
    let backend = clipboard::create_backend()?;
    let mut session = Session::new(config, vault);

    let notice = session.copy(file, backend.as_ref());
    if notice == Notice::Failed {
        bail!("{}", notice);
    }
    eprintln!("{}", notice);
    Ok(())
}

/// Convert a note and write the result out
fn cmd_convert(
    config: Config,
    file: &Path,
    vault: Option<PathBuf>,
    output: Option<&Path>,
    report: bool,
) -> Result<()> {
    let session = Session::new(config, vault);
    let result = session.render(file)?;

    match output {
        Some(path) => fs::write(path, &result.text)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => print!("{}", result.text),
    }

    if report {
        for (reference, reason) in result.skipped() {
            eprintln!("skipped {} ({}): {}", reference.raw, reference.kind, reason);
        }
    }

    eprintln!(
        "Embedded {} image(s), skipped {}",
        result.embedded_count(),
        result.skipped_count()
    );
    Ok(())
}

/// Keep the clipboard in sync with a note
fn cmd_watch(config: Config, file: &Path, vault: Option<PathBuf>) -> Result<()> {
    let backend = clipboard::create_backend()?;
    let mut session = Session::new(config, vault);

    eprintln!("Watching {} (Ctrl-C to stop)", file.display());
    session.watch(file, backend.as_ref())
}

/// Show configuration
fn cmd_config(config: &Config, path: &Path) -> Result<()> {
    let extensions: Vec<String> = config
        .general
        .allowed_extensions
        .iter()
        .map(|f| f.to_string())
        .collect();

    println!("Configuration file: {}", path.display());
    println!("{}", "=".repeat(60));
    println!("Max file size: {} bytes", config.general.max_file_size_bytes);
    println!("Allowed extensions: {}", extensions.join(", "));
    println!("Min interval: {} ms", config.general.min_interval_ms);
    match &config.general.vault_root {
        Some(root) => println!("Vault root: {}", root.display()),
        None => println!("Vault root: (note folder)"),
    }
    println!(
        "Logging: file={} ({}), stderr={}",
        config.logging.file_logging, config.logging.file_level, config.logging.stderr_level
    );

    Ok(())
}
