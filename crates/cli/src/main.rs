//! Out-of-order scheduling core simulator CLI.
//!
//! This binary runs a JSON program on the scheduling core. It performs:
//! 1. **Setup:** Loads an optional JSON configuration and the program description.
//! 2. **Run:** Ticks the simulator until the machine drains or the cycle budget runs out.
//! 3. **Report:** Prints the committed architectural registers and the requested statistics sections.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (for example
//! `RUST_LOG=rvsched_core=debug` to see rename, commit and recovery events).

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rvsched_core::Simulator;
use rvsched_core::isa::abi;
use rvsched_core::sim::loader;
use rvsched_core::stats::STATS_SECTIONS;

#[derive(Parser, Debug)]
#[command(
    name = "sched",
    author,
    version,
    about = "Cycle-accurate out-of-order scheduling core simulator",
    long_about = "Run a JSON program on a two-wide out-of-order core with register renaming, a reorder buffer, a reservation station and flush recovery.\n\nExamples:\n  sched run --program demos/sum.json\n  sched run --program demos/loop.json --config demos/small.json --stats summary,hazards"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program until it drains.
    Run {
        /// JSON program description.
        #[arg(short, long)]
        program: PathBuf,

        /// JSON configuration; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cycle budget; overrides `general.max_cycles`.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Statistics sections to print (comma separated); all when omitted.
        #[arg(long, value_delimiter = ',', value_parser = clap::builder::PossibleValuesParser::new(STATS_SECTIONS.iter().copied()))]
        stats: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            program,
            config,
            max_cycles,
            stats,
        } => cmd_run(&program, config.as_deref(), max_cycles, &stats),
    }
}

/// Loads inputs, runs the simulation and prints the final state.
///
/// Exits with code 1 on any load error or if the cycle budget is exhausted.
fn cmd_run(
    program_path: &std::path::Path,
    config_path: Option<&std::path::Path>,
    max_cycles: Option<u64>,
    sections: &[String],
) {
    let config = loader::load_config(config_path).unwrap_or_else(|e| fatal(&e));
    let program = loader::load_program(program_path, &config).unwrap_or_else(|e| fatal(&e));
    let budget = max_cycles.unwrap_or(config.general.max_cycles);

    println!(
        "[*] {} instructions at {:#x}  rob={} rs={} phys={} predictor={:?}",
        program.len(),
        program.base(),
        config.core.rob_size,
        config.core.rs_size,
        config.core.phys_regs,
        config.predictor.kind
    );

    let mut sim = Simulator::new(&config, program).unwrap_or_else(|e| fatal(&e));
    let result = sim.run(budget);

    print_registers(&sim.registers());
    sim.stats().print_sections(sections);

    match result {
        Ok(summary) => {
            if let Some(trap) = summary.trap {
                println!("\n[*] Last trap: {trap} (cause {})", trap.code());
            }
        }
        Err(e) => fatal(&e),
    }
}

/// Prints the architectural registers four to a line.
fn print_registers(regs: &[u64]) {
    println!("\nARCHITECTURAL REGISTERS");
    for (row, chunk) in regs.chunks(4).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:>4} = {:#018x}", abi::name(row * 4 + i), v))
            .collect();
        println!("  {}", line.join("  "));
    }
}

fn fatal(err: &dyn std::error::Error) -> ! {
    eprintln!("\n[!] FATAL: {err}");
    process::exit(1);
}
