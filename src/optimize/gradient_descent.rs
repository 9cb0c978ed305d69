//! The gradient descent driver.

use std::time::Instant;

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::gradient::{CostFn, GradFn};
use super::optimizer::{Interface, Optimizer};
use super::settings::Settings;
use crate::error::Result;

/// Options for [`gradient_descent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientDescentConfig {
    pub num_steps: usize,
    pub step_size: f64,
    /// Record the score every `sample_width` steps.
    pub sample_width: usize,
    /// Log sampled progress at info level rather than debug.
    pub verbose: bool,
    pub interface: Interface,
}

impl Default for GradientDescentConfig {
    fn default() -> Self {
        GradientDescentConfig {
            num_steps: 150,
            step_size: 0.1,
            sample_width: 25,
            verbose: true,
            interface: Interface::Autograd,
        }
    }
}

impl GradientDescentConfig {
    pub fn with_num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_sample_width(mut self, sample_width: usize) -> Self {
        self.sample_width = sample_width;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Select the optimizer by name; fails for anything but `"autograd"` or `"tf"`.
    pub fn with_interface(mut self, interface: &str) -> Result<Self> {
        self.interface = interface.parse()?;
        Ok(self)
    }
}

/// The record of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTrace {
    /// UTC start time, `%Y-%m-%dT%H:%M:%SZ`.
    pub datetime: String,
    pub opt_score: f64,
    pub opt_settings: Vec<f64>,
    pub scores: Vec<f64>,
    pub samples: Vec<usize>,
    pub settings_history: Vec<Vec<f64>>,
    pub step_times: Vec<f64>,
    pub step_size: f64,
}

/// Minimize `cost` from `init_settings` with the optimizer named by `config.interface`.
///
/// Scores are reported as `-cost`. On every step where `i % sample_width == 0` the score
/// before the step and the duration of the step are recorded; a final sample is always
/// taken at `num_steps`.
pub fn gradient_descent(
    cost: &CostFn,
    init_settings: impl Into<Settings>,
    config: &GradientDescentConfig,
    grad_fn: Option<&GradFn>,
) -> Result<OptimizationTrace> {
    let mut optimizer = config.interface.optimizer(config.step_size);
    gradient_descent_with(cost, init_settings, config, grad_fn, optimizer.as_mut())
}

/// [`gradient_descent`] with a caller-supplied optimizer strategy.
///
/// The optimizer is reset before the first step, so one strategy may drive several runs.
pub fn gradient_descent_with(
    cost: &CostFn,
    init_settings: impl Into<Settings>,
    config: &GradientDescentConfig,
    grad_fn: Option<&GradFn>,
    optimizer: &mut dyn Optimizer,
) -> Result<OptimizationTrace> {
    optimizer.reset();
    let sample_width = config.sample_width.max(1);
    let mut settings: Settings = init_settings.into();
    let mut scores = Vec::new();
    let mut samples = Vec::new();
    let mut step_times = Vec::new();
    let mut settings_history = Vec::with_capacity(config.num_steps + 1);
    settings_history.push(settings.values().to_vec());

    let start_datetime = Utc::now();
    let mut elapsed = 0.0;

    for i in 0..config.num_steps {
        let sampled = i % sample_width == 0;
        if sampled {
            let score = -cost(settings.values())?;
            scores.push(score);
            samples.push(i);
            log_progress(config.verbose, format_args!("iteration : {}, score : {}", i, score));
        }

        let start = Instant::now();
        settings = optimizer.step(cost, settings, grad_fn)?;
        elapsed = start.elapsed().as_secs_f64();

        if sampled {
            step_times.push(elapsed);
            log_progress(config.verbose, format_args!("elapsed time : {}", elapsed));
        }

        settings_history.push(settings.values().to_vec());
    }

    let opt_score = -cost(settings.values())?;
    step_times.push(elapsed);
    scores.push(opt_score);
    samples.push(config.num_steps);
    log_progress(
        config.verbose,
        format_args!("iteration : {}, score : {}", config.num_steps, opt_score),
    );

    Ok(OptimizationTrace {
        datetime: start_datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        opt_score,
        opt_settings: settings.into_values(),
        scores,
        samples,
        settings_history,
        step_times,
        step_size: optimizer.step_size(),
    })
}

fn log_progress(verbose: bool, message: std::fmt::Arguments<'_>) {
    if verbose {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}
