use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use freight_sim::simulation::{
    scenario, AsciiRenderer, EventSink, FrameRecorder, LogSink, NoopSink, Simulation,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    /// One truck, one field, one warehouse
    Basic,
    /// Two haulers and a sweeper that waits for them
    Relay,
    /// Not enough storage for the harvest
    Congested,
    /// Randomly generated world, see --seed
    Random,
}

#[derive(Parser)]
#[command(name = "freight_sim")]
#[command(about = "Turn-based freight logistics simulation")]
struct Cli {
    /// World to simulate
    #[arg(long, value_enum, default_value = "basic")]
    scenario: ScenarioArg,

    /// Stop after this many turns even if transporters are still busy.
    /// Without a cap a stuck transporter keeps the run going forever
    #[arg(long)]
    max_turns: Option<u64>,

    /// Seed for the random scenario
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Record one frame per turn and export the animation under this directory
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Print the world map before and after the run
    #[arg(long)]
    map: bool,

    /// Do not log per-turn transporter events
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,freight_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    let sink: Arc<dyn EventSink> = if cli.quiet {
        Arc::new(NoopSink)
    } else {
        Arc::new(LogSink)
    };

    let mut sim = match cli.scenario {
        ScenarioArg::Basic => scenario::basic(sink)?,
        ScenarioArg::Relay => scenario::relay(sink)?,
        ScenarioArg::Congested => scenario::congested(sink)?,
        ScenarioArg::Random => scenario::random(cli.seed, sink)?,
    };

    match cli.max_turns {
        Some(cap) => info!("Running {:?} scenario with a cap of {} turns", cli.scenario, cap),
        None => info!("Running {:?} scenario without a turn cap", cli.scenario),
    }

    println!("Initial state:");
    print_state(&sim, cli.map);

    let report = match &cli.frames_dir {
        Some(dir) => {
            let mut recorder = FrameRecorder::new(AsciiRenderer::default()).exporting_to(dir);
            let report = sim.run_observed(cli.max_turns, &mut recorder)?;
            if let Some(run_dir) = recorder.exported_to() {
                println!("Animation created at {}", run_dir.join("animation.txt").display());
            }
            report
        }
        None => sim.run(cli.max_turns)?,
    };

    println!("=== Final State ===");
    print_state(&sim, cli.map);
    println!("{report}");
    Ok(())
}

fn print_state(sim: &Simulation, map: bool) {
    print!("{}", sim.summary());
    if map {
        print!("{}", AsciiRenderer::default().render(&sim.snapshot()));
    }
    println!();
}
