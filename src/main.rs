use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eflint_perf::fixture::{self, Family, GeneratorConfig};
use eflint_perf::{render_all, setup_logging, ChartConfig, ResultsTable, UnitFamily};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eflint-perf")]
#[command(about = "Scaling fixtures and comparison charts for eFLINT interpreter benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write scaling fixtures for the selected families
    Generate {
        /// Root directory; each family gets its own sub-directory
        #[arg(short, long, default_value = "tests/performance")]
        output: PathBuf,

        /// Families to generate (default: all)
        #[arg(short, long, value_enum)]
        family: Vec<Family>,

        /// Scale factors to use instead of each family's defaults
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        scales: Vec<i64>,

        /// Generate families concurrently
        #[arg(short, long, default_value = "false")]
        parallel: bool,
    },

    /// Render comparison charts from a results table
    Plot {
        /// JSON results table
        #[arg(short, long, default_value = "data/results.json")]
        results: PathBuf,

        /// Output directory for charts
        #[arg(short, long, default_value = "figures")]
        output: PathBuf,

        /// Only render these charts, by `<family>_<metric>` name
        #[arg(short, long)]
        chart: Vec<String>,

        #[arg(long, default_value = "1000")]
        width: u32,

        #[arg(long, default_value = "500")]
        height: u32,
    },

    /// Print values in human-readable units
    Format {
        #[arg(short, long, value_enum)]
        unit: UnitFamily,

        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },
}

fn main() -> Result<()> {
    setup_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            output,
            family,
            scales,
            parallel,
        } => {
            generate(output, family, scales, parallel)?;
        }
        Commands::Plot {
            results,
            output,
            chart,
            width,
            height,
        } => {
            plot(results, output, &chart, width, height)?;
        }
        Commands::Format { unit, values } => {
            for value in values {
                println!("{}", unit.format(value));
            }
        }
    }

    Ok(())
}

fn generate(
    output: PathBuf,
    families: Vec<Family>,
    scales: Vec<i64>,
    parallel: bool,
) -> Result<()> {
    let families = if families.is_empty() {
        Family::all().to_vec()
    } else {
        families
    };

    // Explicit scales apply to every selected family
    let scales_override: HashMap<Family, Vec<i64>> = if scales.is_empty() {
        HashMap::new()
    } else {
        families.iter().map(|&f| (f, scales.clone())).collect()
    };

    let config = GeneratorConfig {
        output_root: output,
        families,
        scales_override,
    };

    let written = if parallel {
        fixture::generate_all_parallel(&config)
    } else {
        fixture::generate_all(&config)
    }
    .context("Fixture generation failed")?;

    println!(
        "Generated {} fixtures under {}",
        written.len(),
        config.output_root.display()
    );
    Ok(())
}

fn plot(
    results: PathBuf,
    output: PathBuf,
    only: &[String],
    width: u32,
    height: u32,
) -> Result<()> {
    let table = ResultsTable::load(&results)
        .with_context(|| format!("Failed to load results from {}", results.display()))?;

    let config = ChartConfig {
        output_dir: output,
        width,
        height,
    };

    let written = render_all(&table, &config, only).context("Chart rendering failed")?;
    for path in &written {
        println!("Generated: {}", path.display());
    }
    Ok(())
}
