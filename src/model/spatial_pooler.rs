use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::HarnessError;
use crate::model::Recognizer;

/// Construction parameters of a [`SpatialPooler`].
///
/// Dimensions are row-major. Every axis but the last is topological; the last
/// axis (input channels, columns per location) is not. Defaults describe a
/// two-channel 28×28 input feeding a 10×10 grid of 100 columns each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialPoolerParams {
    pub input_dimensions: Vec<usize>,
    pub column_dimensions: Vec<usize>,
    /// Euclidean radius, in input units, of a column's receptive field.
    pub potential_radius: f64,
    /// Fraction of the receptive field sampled into the potential pool.
    pub potential_pct: f64,
    /// Fraction of columns active after inhibition.
    pub local_area_density: f64,
    /// Minimum connected overlap for a column to become active.
    pub stimulus_threshold: u32,
    pub syn_perm_inactive_dec: f64,
    pub syn_perm_active_inc: f64,
    pub syn_perm_connected: f64,
    pub duty_cycle_period: u32,
    /// 0 disables boosting.
    pub boost_strength: f64,
    pub seed: u64,
    pub verbosity: u32,
    pub wrap_around: bool,
}

impl Default for SpatialPoolerParams {
    fn default() -> Self {
        SpatialPoolerParams {
            input_dimensions: vec![28, 28, 2],
            column_dimensions: vec![10, 10, 100],
            potential_radius: 3.6,
            potential_pct: 0.95,
            local_area_density: 0.016,
            stimulus_threshold: 28,
            syn_perm_inactive_dec: 0.00928,
            syn_perm_active_inc: 0.032,
            syn_perm_connected: 0.422,
            duty_cycle_period: 1400,
            boost_strength: 0.0,
            seed: 93,
            verbosity: 1,
            wrap_around: true,
        }
    }
}

/// Buffer length errors raised by [`SpatialPooler::compute`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolerError {
    #[error("input has {actual} bits, pooler expects {expected}")]
    InputSize { expected: usize, actual: usize },
    #[error("output buffer has {actual} slots, pooler has {expected} columns")]
    OutputSize { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy)]
struct Synapse {
    input: usize,
    permanence: f64,
}

/// Competitive column layer with global inhibition and Hebbian permanence
/// learning.
#[derive(Debug, Clone)]
pub struct SpatialPooler {
    params: SpatialPoolerParams,
    num_inputs: usize,
    num_columns: usize,
    num_active: usize,
    potential_pools: Vec<Vec<Synapse>>,
    active_duty_cycles: Vec<f64>,
    boost_factors: Vec<f64>,
    iteration_learn_num: u64,
}

impl SpatialPooler {
    pub fn new(params: SpatialPoolerParams) -> Result<SpatialPooler, HarnessError> {
        validate(&params)?;

        let num_inputs: usize = params.input_dimensions.iter().product();
        let num_columns: usize = params.column_dimensions.iter().product();
        let num_active = ((num_columns as f64 * params.local_area_density).round() as usize)
            .clamp(1, num_columns);

        // ── Potential pools with random initial permanences ───────────────
        let mut rng = StdRng::seed_from_u64(params.seed);
        let potential_pools: Vec<Vec<Synapse>> = (0..num_columns)
            .map(|column| {
                let field = receptive_field(&params, column);
                let n = ((field.len() as f64 * params.potential_pct).round() as usize).max(1);
                let mut pool: Vec<usize> = field.choose_multiple(&mut rng, n).copied().collect();
                pool.sort_unstable();
                pool.into_iter()
                    .map(|input| Synapse {
                        input,
                        permanence: initial_permanence(&params, &mut rng),
                    })
                    .collect()
            })
            .collect();

        if params.verbosity > 0 {
            debug!(
                inputs = num_inputs,
                columns = num_columns,
                active_per_step = num_active,
                radius = params.potential_radius,
                "spatial pooler initialised"
            );
        }

        Ok(SpatialPooler {
            params,
            num_inputs,
            num_columns,
            num_active,
            potential_pools,
            active_duty_cycles: vec![0.0; num_columns],
            boost_factors: vec![1.0; num_columns],
            iteration_learn_num: 0,
        })
    }

    pub fn params(&self) -> &SpatialPoolerParams {
        &self.params
    }

    /// Maximum number of columns active after one step.
    pub fn num_active(&self) -> usize {
        self.num_active
    }

    pub fn iteration_learn_num(&self) -> u64 {
        self.iteration_learn_num
    }

    /// Number of connected synapses per column.
    pub fn connected_counts(&self) -> Vec<usize> {
        let connected = self.params.syn_perm_connected;
        self.potential_pools
            .iter()
            .map(|pool| pool.iter().filter(|s| s.permanence >= connected).count())
            .collect()
    }

    fn overlaps(&self, input: &[u8]) -> Vec<u32> {
        let connected = self.params.syn_perm_connected;
        self.potential_pools
            .iter()
            .map(|pool| {
                pool.iter()
                    .filter(|s| s.permanence >= connected && input[s.input] != 0)
                    .count() as u32
            })
            .collect()
    }

    /// Top `num_active` columns by boosted overlap, lowest index first on
    /// ties, dropping any below the stimulus threshold.
    fn inhibit(&self, overlaps: &[u32]) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = overlaps
            .iter()
            .zip(&self.boost_factors)
            .map(|(&o, &b)| o as f64 * b)
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let threshold = self.params.stimulus_threshold;
        let mut winners: Vec<usize> = ranked
            .into_iter()
            .take(self.num_active)
            .filter(|&(column, _)| overlaps[column] >= threshold)
            .map(|(column, _)| column)
            .collect();
        winners.sort_unstable();
        winners
    }

    fn adapt_synapses(&mut self, input: &[u8], winners: &[usize]) {
        let inc = self.params.syn_perm_active_inc;
        let dec = self.params.syn_perm_inactive_dec;
        for &column in winners {
            for synapse in &mut self.potential_pools[column] {
                let delta = if input[synapse.input] != 0 { inc } else { -dec };
                synapse.permanence = (synapse.permanence + delta).clamp(0.0, 1.0);
            }
        }
    }

    fn update_duty_cycles(&mut self, winners: &[usize]) {
        let period = (self.params.duty_cycle_period as f64)
            .min(self.iteration_learn_num as f64)
            .max(1.0);
        let mut active = vec![false; self.num_columns];
        for &column in winners {
            active[column] = true;
        }
        for (duty, is_active) in self.active_duty_cycles.iter_mut().zip(active) {
            *duty = ((period - 1.0) * *duty + f64::from(u8::from(is_active))) / period;
        }
    }

    fn update_boost_factors(&mut self) {
        let strength = self.params.boost_strength;
        if strength == 0.0 {
            return;
        }
        let target = self.params.local_area_density;
        for (boost, &duty) in self.boost_factors.iter_mut().zip(&self.active_duty_cycles) {
            *boost = (-strength * (duty - target)).exp();
        }
    }
}

impl Recognizer for SpatialPooler {
    type Error = PoolerError;

    fn input_size(&self) -> usize {
        self.num_inputs
    }

    fn output_size(&self) -> usize {
        self.num_columns
    }

    fn compute(&mut self, input: &[u8], learn: bool, active: &mut [u8]) -> Result<(), PoolerError> {
        if input.len() != self.num_inputs {
            return Err(PoolerError::InputSize {
                expected: self.num_inputs,
                actual: input.len(),
            });
        }
        if active.len() != self.num_columns {
            return Err(PoolerError::OutputSize {
                expected: self.num_columns,
                actual: active.len(),
            });
        }

        let overlaps = self.overlaps(input);
        let winners = self.inhibit(&overlaps);

        active.fill(0);
        for &column in &winners {
            active[column] = 1;
        }

        if learn {
            self.iteration_learn_num += 1;
            self.adapt_synapses(input, &winners);
            self.update_duty_cycles(&winners);
            self.update_boost_factors();
        }
        Ok(())
    }
}

fn validate(params: &SpatialPoolerParams) -> Result<(), HarnessError> {
    let invalid = |name, message: &str| {
        Err(HarnessError::InvalidParameter {
            name,
            message: message.to_owned(),
        })
    };

    if params.input_dimensions.is_empty() || params.input_dimensions.contains(&0) {
        return invalid("input_dimensions", "must be non-empty with no zero axis");
    }
    if params.column_dimensions.is_empty() || params.column_dimensions.contains(&0) {
        return invalid("column_dimensions", "must be non-empty with no zero axis");
    }
    if params.input_dimensions.len() != params.column_dimensions.len() {
        return invalid("column_dimensions", "must have as many axes as input_dimensions");
    }
    if !(params.potential_pct > 0.0 && params.potential_pct <= 1.0) {
        return invalid("potential_pct", "must be in (0, 1]");
    }
    if !(params.local_area_density > 0.0 && params.local_area_density <= 0.5) {
        return invalid("local_area_density", "must be in (0, 0.5]");
    }
    if !(0.0..=1.0).contains(&params.syn_perm_connected) {
        return invalid("syn_perm_connected", "must be in [0, 1]");
    }
    if params.potential_radius < 0.0 {
        return invalid("potential_radius", "must not be negative");
    }
    if params.duty_cycle_period == 0 {
        return invalid("duty_cycle_period", "must be at least 1");
    }
    Ok(())
}

fn initial_permanence(params: &SpatialPoolerParams, rng: &mut impl Rng) -> f64 {
    let connected = params.syn_perm_connected;
    if rng.gen_bool(0.5) {
        (connected + rng.gen::<f64>() * params.syn_perm_active_inc / 4.0).min(1.0)
    } else {
        connected * rng.gen::<f64>()
    }
}

/// Inputs within `potential_radius` of the column's centre on the
/// topological axes, across every index of the last axis.
fn receptive_field(params: &SpatialPoolerParams, column: usize) -> Vec<usize> {
    let in_dims = &params.input_dimensions;
    let col_dims = &params.column_dimensions;
    let spatial = in_dims.len() - 1;

    let column_coords = unravel(column, col_dims);
    let centre: Vec<f64> = (0..spatial)
        .map(|axis| {
            (column_coords[axis] as f64 + 0.5) * in_dims[axis] as f64 / col_dims[axis] as f64 - 0.5
        })
        .collect();

    let radius_sq = params.potential_radius * params.potential_radius;
    (0..in_dims.iter().product::<usize>())
        .filter(|&input| {
            let coords = unravel(input, in_dims);
            let dist_sq: f64 = (0..spatial)
                .map(|axis| {
                    let mut d = (coords[axis] as f64 - centre[axis]).abs();
                    if params.wrap_around {
                        d = d.min(in_dims[axis] as f64 - d);
                    }
                    d * d
                })
                .sum();
            dist_sq <= radius_sq
        })
        .collect()
}

fn unravel(mut index: usize, dims: &[usize]) -> Vec<usize> {
    let mut coords = vec![0; dims.len()];
    for (coord, &dim) in coords.iter_mut().zip(dims).rev() {
        *coord = index % dim;
        index /= dim;
    }
    coords
}
