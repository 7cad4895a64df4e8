// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! richsig-gen CLI
//!
//! # Usage
//!
//! ```bash
//! # Adapters for every exported function, to stdout
//! richsig-gen generate --crate ./wire-fmt
//!
//! # Only parsers, placed inside the crate, receivers built by constructors
//! richsig-gen generate --func '^parse' --local --ctors -o src/fuzz_adapters.rs
//!
//! # What would be generated, and why not
//! richsig-gen list --json
//!
//! # How a corpus entry decodes for one function
//! richsig-gen decode --func '^decode_frame$' --input corpus/crash-1
//!
//! # A ready-to-run cargo-fuzz package
//! richsig-gen stage --func '^parse' --out fuzz
//! ```

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use richsig_gen::config::GenConfig;
use richsig_gen::Generator;

/// Fuzz adapters for rich Rust signatures
#[derive(Parser, Debug)]
#[command(name = "richsig-gen")]
#[command(about = "Generate fn(&[u8]) -> i32 fuzz adapters for functions with rich signatures")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct Selection {
    /// Crate directory (holding Cargo.toml)
    #[arg(long = "crate", default_value = ".")]
    crate_dir: PathBuf,

    /// Configuration file (defaults to richsig.toml in the crate, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only functions whose name matches this regex
    #[arg(long)]
    func: Option<String>,

    /// Skip functions whose name matches this regex ("" disables)
    #[arg(long)]
    exclude: Option<String>,

    /// Include functions that are not reachable from outside the crate
    #[arg(long)]
    unexported: bool,

    /// Build method receivers through constructors
    #[arg(long)]
    ctors: bool,

    /// Regex selecting constructor names
    #[arg(long)]
    ctor_pattern: Option<String>,

    /// Call unsafe functions
    #[arg(long)]
    allow_unsafe: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write adapters for the selected functions
    Generate {
        #[command(flatten)]
        selection: Selection,

        /// Qualify crate types with the crate name (default)
        #[arg(long, conflicts_with = "local")]
        qualify_all: bool,

        /// Unqualified paths, for a file placed inside the crate
        #[arg(long)]
        local: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List candidates with their classification
    List {
        #[command(flatten)]
        selection: Selection,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show how a buffer decodes for exactly one function
    Decode {
        #[command(flatten)]
        selection: Selection,

        /// Input file (a corpus entry or crash)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Stage a cargo-fuzz package for the selected functions
    Stage {
        #[command(flatten)]
        selection: Selection,

        /// Destination directory
        #[arg(long)]
        out: PathBuf,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "richsig.toml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate {
            selection,
            qualify_all,
            local,
            output,
        } => cmd_generate(&selection, qualify_all, local, output.as_deref()),
        Commands::List { selection, json } => cmd_list(&selection, json),
        Commands::Decode { selection, input } => cmd_decode(&selection, &input),
        Commands::Stage { selection, out } => cmd_stage(&selection, &out),
        Commands::GenConfig { output } => cmd_gen_config(&output),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }
}

/// Load the configuration and apply command-line overrides.
fn load_config(selection: &Selection) -> Result<GenConfig> {
    let path = match &selection.config {
        Some(path) => Some(path.clone()),
        None => Some(selection.crate_dir.join("richsig.toml")).filter(|p| p.is_file()),
    };
    let mut config = match path {
        Some(path) => GenConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GenConfig::default(),
    };

    let g = &mut config.generator;
    if let Some(func) = &selection.func {
        g.func_pattern = func.clone();
    }
    if let Some(exclude) = &selection.exclude {
        g.exclude_pattern = exclude.clone();
    }
    if let Some(pattern) = &selection.ctor_pattern {
        g.constructor_pattern = pattern.clone();
    }
    g.include_unexported |= selection.unexported;
    g.constructors |= selection.ctors;
    g.allow_unsafe |= selection.allow_unsafe;
    config.validate().context("invalid options")?;
    Ok(config)
}

fn open(selection: &Selection, config: GenConfig) -> Result<Generator> {
    Generator::open(&selection.crate_dir, config)
        .with_context(|| format!("scanning {}", selection.crate_dir.display()))
}

fn cmd_generate(
    selection: &Selection,
    qualify_all: bool,
    local: bool,
    output: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(selection)?;
    if qualify_all {
        config.generator.qualify_all = true;
    }
    if local {
        config.generator.qualify_all = false;
    }
    let generator = open(selection, config)?;
    let batch = generator.generate()?;

    match output {
        Some(path) => {
            std::fs::write(path, &batch.source)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "[OK] {} adapters written to {} ({} skipped)",
                batch.harness_names().count(),
                path.display(),
                batch.skipped().count()
            );
        }
        None => {
            std::io::stdout()
                .write_all(batch.source.as_bytes())
                .context("writing to stdout")?;
        }
    }
    Ok(())
}

fn cmd_list(selection: &Selection, json: bool) -> Result<()> {
    let generator = open(selection, load_config(selection)?)?;
    let listings = generator.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }
    for listing in &listings {
        match &listing.reason {
            Some(reason) => println!(
                "{:14} {}  ({})",
                listing.classification, listing.function, reason
            ),
            None => println!("{:14} {}", listing.classification, listing.function),
        }
    }
    Ok(())
}

fn cmd_decode(selection: &Selection, input: &Path) -> Result<()> {
    let config = load_config(selection)?;
    let func = selection
        .func
        .clone()
        .context("decode needs --func selecting exactly one function")?;
    let generator = open(selection, config)?;
    let plan = generator.decode_plan(&func)?;
    let data = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    let report = plan.decode(&data);
    println!("{}", plan.function);
    for (name, value) in &report.values {
        match value {
            Some(value) => println!("  {} = {}", name, value),
            None => println!("  {} = (stand-in, no input)", name),
        }
    }
    println!(
        "consumed {} of {} bytes ({} unused)",
        report.consumed,
        report.total,
        report.total - report.consumed
    );
    Ok(())
}

fn cmd_stage(selection: &Selection, out: &Path) -> Result<()> {
    let generator = open(selection, load_config(selection)?)?;
    let package = generator
        .stage(out)
        .with_context(|| format!("staging into {}", out.display()))?;
    println!("[OK] Staged {}", package.display());
    println!("  cd {} && cargo fuzz list", package.display());
    Ok(())
}

fn cmd_gen_config(output: &Path) -> Result<()> {
    std::fs::write(output, GenConfig::example())
        .with_context(|| format!("writing {}", output.display()))?;
    println!("[OK] Generated example configuration: {}", output.display());
    Ok(())
}
