//! Headless симуляция FLOCKWATCH
//!
//! Запускает Bevy App без рендера: демо-сцена (citizens, hostiles, boids),
//! периодический readback режимов в stdout.

use std::process::ExitCode;

use clap::Parser;
use flockwatch_simulation::spawn::{populate_demo_world, PopulationCounts};
use flockwatch_simulation::{
    collect_agent_reports, create_headless_app_with_rate, log_error, log_info, run_ticks, set_log_level, LogLevel,
    ModeCounts, SimulationConfig, SimulationPlugin,
};

#[derive(Parser, Debug)]
#[command(name = "flockwatch_simulation")]
#[command(about = "Headless NPC behavior simulation (perception FSM + flocking)")]
struct Args {
    /// JSON config с архетипами (по умолчанию — встроенные defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Сколько fixed step'ов прогнать
    #[arg(short, long, default_value = "1000")]
    ticks: u64,

    /// Seed (перекрывает seed из конфига)
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long, default_value = "24")]
    citizens: usize,

    #[arg(long, default_value = "2")]
    enemies: usize,

    #[arg(long, default_value = "30")]
    boids: usize,

    /// Печатать readback каждые N тиков (0 = только в конце)
    #[arg(long, default_value = "100")]
    report_every: u64,

    /// Минимальный уровень логов: debug, info, warning, error
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(level) = LogLevel::parse(&args.log_level) else {
        eprintln!("Unknown log level: {}", args.log_level);
        return ExitCode::FAILURE;
    };
    set_log_level(level);

    let mut config = match &args.config {
        Some(path) => match SimulationConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                flockwatch_simulation::init_logger();
                log_error(&format!("Config error: {}", err));
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut app = create_headless_app_with_rate(config.seed, config.tick_hz);
    app.add_plugins(SimulationPlugin);

    let counts = PopulationCounts {
        citizens: args.citizens,
        enemies: args.enemies,
        boids: args.boids,
    };
    populate_demo_world(app.world_mut(), &config, counts);

    log_info(&format!(
        "Starting FLOCKWATCH headless simulation (seed: {}, {} Hz, {} ticks)",
        config.seed, config.tick_hz, args.ticks
    ));

    let chunk = if args.report_every == 0 { args.ticks } else { args.report_every };
    let mut done = 0;
    while done < args.ticks {
        let step = chunk.min(args.ticks - done);
        let ran = run_ticks(&mut app, step);
        done += ran;

        let reports = collect_agent_reports(app.world_mut());
        log_info(&format!("Tick {}: {}", done, ModeCounts::from_reports(&reports)));

        if ran < step {
            log_error("Simulation clock stalled");
            return ExitCode::FAILURE;
        }
    }

    log_info("Simulation complete!");
    ExitCode::SUCCESS
}
