use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::PopulationCounts;
use sim::{SimConfig, Simulator, StdRandom};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Settings for one headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum number of generations
    pub steps: u32,

    /// Random seed; a fresh one is drawn (and logged) when absent
    pub seed: Option<u64>,

    /// Log population counts every this many steps
    pub report_interval: u32,

    /// Write every snapshot to the output as a JSON line
    pub emit_snapshots: bool,

    pub sim: SimConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 500,
            seed: None,
            report_interval: 50,
            emit_snapshots: false,
            sim: SimConfig::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OverrideError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    NotANumber { var: &'static str, value: String },
}

fn parse_override<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, OverrideError> {
    value.trim().parse().map_err(|_| OverrideError::NotANumber {
        var,
        value: value.to_string(),
    })
}

impl RunConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Build the configuration from `FOXES_CONFIG`, then apply the
    /// `FOXES_STEPS`, `FOXES_SEED` and `FOXES_EMIT_SNAPSHOTS` overrides.
    pub fn from_env() -> Result<Self> {
        let config = match std::env::var("FOXES_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        let config = config.with_overrides(
            std::env::var("FOXES_STEPS").ok().as_deref(),
            std::env::var("FOXES_SEED").ok().as_deref(),
        )?;
        Ok(Self {
            emit_snapshots: config.emit_snapshots || std::env::var("FOXES_EMIT_SNAPSHOTS").is_ok(),
            ..config
        })
    }

    pub fn with_overrides(mut self, steps: Option<&str>, seed: Option<&str>) -> Result<Self, OverrideError> {
        if let Some(steps) = steps {
            self.steps = parse_override("FOXES_STEPS", steps)?;
        }
        if let Some(seed) = seed {
            self.seed = Some(parse_override("FOXES_SEED", seed)?);
        }
        Ok(self)
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub seed: u64,
    pub steps_completed: u32,
    pub final_counts: PopulationCounts,
    /// Fewer than two species were left before the step limit
    pub collapsed: bool,
}

pub struct Runner {
    config: RunConfig,
    seed: u64,
    simulator: Simulator,
}

impl Runner {
    pub fn new(config: RunConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let simulator = Simulator::seed(config.sim.clone(), StdRandom::seeded(seed))
            .context("Failed to seed simulation")?;

        Ok(Self {
            config,
            seed,
            simulator,
        })
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Step the simulation until the step limit or until the population
    /// collapses, streaming snapshots to `out` when enabled
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        tracing::info!(
            "Running {} steps on a {}x{} field (seed {})",
            self.config.steps,
            self.config.sim.depth,
            self.config.sim.width,
            self.seed
        );

        if self.config.emit_snapshots {
            self.emit(out, &self.simulator.snapshot())?;
        }

        let mut collapsed = false;
        while self.simulator.step_count() < self.config.steps {
            if !self.simulator.counts().is_viable() {
                collapsed = true;
                break;
            }

            let snapshot = self.simulator.step().context("Simulation step failed")?;
            if self.config.emit_snapshots {
                self.emit(out, &snapshot)?;
            }

            let interval = self.config.report_interval;
            if interval > 0 && snapshot.step % interval == 0 {
                report(snapshot.step, &snapshot.counts);
            }
        }

        let summary = RunSummary {
            seed: self.seed,
            steps_completed: self.simulator.step_count(),
            final_counts: self.simulator.counts(),
            collapsed,
        };

        if collapsed {
            tracing::warn!("Population collapsed after {} steps", summary.steps_completed);
        }
        report(summary.steps_completed, &summary.final_counts);

        Ok(summary)
    }

    fn emit<W: Write>(&self, out: &mut W, snapshot: &shared::PopulationSnapshot) -> Result<()> {
        serde_json::to_writer(&mut *out, snapshot).context("Failed to serialize snapshot")?;
        writeln!(out).context("Failed to write snapshot")?;
        Ok(())
    }
}

fn report(step: u32, counts: &PopulationCounts) {
    tracing::info!(
        "Step {}: {} rabbits, {} foxes, {} zombie rabbits",
        step,
        counts.rabbits,
        counts.foxes,
        counts.zombie_rabbits
    );
}

/// Run with the configuration from the environment, snapshots to stdout
pub fn run(config: RunConfig) -> Result<()> {
    let mut runner = Runner::new(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = runner.run(&mut out)?;
    out.flush().context("Failed to flush output")?;

    tracing::info!(
        "Finished after {} steps (seed {}): {} animals alive",
        summary.steps_completed,
        summary.seed,
        summary.final_counts.total()
    );
    Ok(())
}
