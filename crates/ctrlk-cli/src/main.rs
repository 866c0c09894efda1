//! `ctrlk-cli` – Control Kernel Runner
//!
//! Assembles a control kernel around a simulated first-order plant and runs
//! it at a fixed period:
//!
//! 1. Loads `~/.ctrlk/config.toml` (or the path given as first argument),
//!    with `CTRLK_*` environment overrides.
//! 2. Loads one member per pipeline stage plus every configured controller
//!    candidate, and selects the configured controller.
//! 3. Runs the loop in a [`PeriodicActivity`], printing a trace line every
//!    few cycles.
//! 4. Intercepts **Ctrl-C** to stop the activity after the current cycle and
//!    unload every component.

mod config;

use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use ctrlk_components::{
    BangBangController, CycleCounter, PassThroughEstimator, PidController, PlantEffector,
    PlantSensor, SetPointGenerator, SimPlant, StockController,
};
use ctrlk_kernel::{ControlKernel, Kernel};
use ctrlk_runtime::{ControlLoop, PeriodicActivity, Stage, init_tracing};
use ctrlk_types::{Category, KernelError};

use config::AppConfig;

type PlantLoop = ControlLoop<
    PlantSensor,
    PassThroughEstimator,
    SetPointGenerator,
    StockController,
    PlantEffector,
>;

fn main() -> ExitCode {
    let _otel = init_tracing("ctrlk");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after this cycle …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the run can only end by cycle count");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let cfg = match config::load(explicit.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}", e.to_string().red());
            return ExitCode::FAILURE;
        }
    };
    match &explicit {
        Some(p) => println!("  Config loaded from {}", p.display().to_string().bold()),
        None => println!(
            "  Config: {} (defaults where absent)",
            config::config_path().display().to_string().bold()
        ),
    }

    match run(&cfg, &shutdown) {
        Ok(summary) => {
            println!();
            println!(
                "  {} {} cycles with {} – final position {:.4} (target {:.4})",
                "✓".green().bold(),
                summary.cycles,
                summary.controller.bold(),
                summary.position,
                summary.target
            );
            if summary.overruns > 0 {
                println!("  {} {} period overrun(s)", "!".yellow().bold(), summary.overruns);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Run failed".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assembly
// ─────────────────────────────────────────────────────────────────────────────

/// The activity body: one pipeline cycle, then the supports.
struct Rig {
    control: PlantLoop,
    counter: CycleCounter,
    plant: SimPlant,
    trace_every: u64,
}

impl Stage for Rig {
    fn update(&mut self) -> Result<(), KernelError> {
        self.control.step()?;
        self.counter.update()?;
        let cycle = self.control.cycles();
        if self.trace_every > 0 && cycle % self.trace_every == 0 {
            let set_point = self.control.generators.active().map_or(0.0, |g| g.current());
            println!(
                "  {:>6}  sp {:>8.4}  x {:>8.4}  u {:>8.4}",
                cycle.to_string().dimmed(),
                set_point,
                self.plant.position(),
                self.plant.last_command()
            );
        }
        Ok(())
    }
}

struct Summary {
    cycles: u64,
    overruns: u64,
    controller: String,
    position: f64,
    target: f64,
}

fn assemble(
    cfg: &AppConfig,
    kernel: &mut ControlKernel,
    plant: &SimPlant,
) -> Result<Rig, KernelError> {
    let dt = cfg.period().as_secs_f64();
    let mut control = PlantLoop::new();

    let mut controllers: Vec<StockController> = cfg
        .pid
        .iter()
        .map(|c| PidController::new(&c.name, c.gains, dt).into())
        .collect();
    controllers.push(
        BangBangController::new(&cfg.bang_bang.name, cfg.bang_bang.amplitude, cfg.bang_bang.band)
            .into(),
    );

    control
        .sensors
        .load(kernel, PlantSensor::new("plant_sensor", plant.clone()))?;
    control
        .estimators
        .load(kernel, PassThroughEstimator::new("estimator"))?;
    let mut generator = SetPointGenerator::new("set_point", cfg.target, dt);
    if let Some(rate) = cfg.rate {
        generator = generator.with_rate(rate);
    }
    control.generators.load(kernel, generator)?;
    for c in controllers {
        control.controllers.load(kernel, c)?;
    }
    control
        .effectors
        .load(kernel, PlantEffector::new("plant_effector", plant.clone(), dt))?;

    // Selection binds the estimator's `Outputs` port, created by the controllers.
    control.sensors.select(kernel, "plant_sensor")?;
    control.estimators.select(kernel, "estimator")?;
    control.generators.select(kernel, "set_point")?;
    control.controllers.select(kernel, &cfg.controller)?;
    control.effectors.select(kernel, "plant_effector")?;
    control.sync(kernel);

    let mut counter = CycleCounter::new("cycle_counter", cfg.trace_every.saturating_mul(4));
    kernel.load(&mut counter)?;
    kernel.activate(&mut counter)?;

    Ok(Rig {
        control,
        counter,
        plant: plant.clone(),
        trace_every: cfg.trace_every,
    })
}

fn run(cfg: &AppConfig, shutdown: &AtomicBool) -> Result<Summary, KernelError> {
    let mut kernel = ControlKernel::from_config(&cfg.kernel);
    let plant = SimPlant::new(cfg.plant);
    let commands = kernel.command_port::<f64>();

    let rig = match assemble(cfg, &mut kernel, &plant) {
        Ok(rig) => rig,
        Err(e) => {
            warn!(error = %e, "kernel assembly failed");
            return Err(e);
        }
    };
    let controller = kernel
        .active_name(Category::Controller)
        .unwrap_or("<none>")
        .to_string();
    info!(
        kernel = kernel.kernel_name(),
        controller = %controller,
        candidates = ?kernel.registered(Category::Controller),
        "kernel assembled"
    );
    commands.write(&cfg.target)?;

    let mut activity = PeriodicActivity::new(kernel.kernel_name().to_string(), cfg.period(), rig);
    kernel.start();
    activity.start();
    let result = activity.run_cycles(cfg.cycles, shutdown);
    activity.stop();
    kernel.stop();

    let rig = activity.body_mut();
    rig.control.unload_all(&mut kernel);
    kernel.unload(&mut rig.counter);

    let cycles = result?;
    Ok(Summary {
        cycles,
        overruns: activity.overruns(),
        controller,
        position: plant.position(),
        target: cfg.target,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"        __       ____   "#.bold().cyan());
    println!("{}", r#"  _____/ /______/ / /__ "#.bold().cyan());
    println!("{}", r#" / ___/ __/ ___/ / //_/ "#.bold().cyan());
    println!("{}", r#"/ /__/ /_/ /  / / ,<    "#.bold().cyan());
    println!("{}", r#"\___/\__/_/  /_/_/|_|   "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "ctrlk".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Component-based control kernel");
    println!();
}
