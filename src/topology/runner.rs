//! Topology GA evolutionary loop.

use super::config::TopologyGaConfig;
use super::types::{TopologyIndividual, TopologyRecord};
use crate::error::Result;
use crate::graph::FeederGraph;
use crate::oracle::LoadFlowOracle;
use crate::ssga::{SsgaConfig, SsgaOutcome, SsgaRunner, SwitchingContext};
use rand::Rng;
use tracing::{debug, info, instrument, trace, warn};

/// Result of a topology GA run.
#[derive(Debug, Clone)]
pub struct TopologyResult {
    /// Best topology over all generations; `None` when no topology could
    /// be reached.
    pub best: Option<TopologyRecord>,

    /// Generations executed after the initial evaluation.
    pub generations: usize,

    /// Whether the run stopped after the initial evaluation because every
    /// topology needed at most one operation.
    pub early_exit: bool,

    /// Best fitness after the initial evaluation and after each generation.
    pub fitness_history: Vec<f64>,
}

/// Executes the outer GA.
///
/// Each generation mutates every topology, adds one child per pair of
/// topologies, evaluates everything with a full SSGA and keeps the best
/// `population_size`.
pub struct TopologyGaRunner;

impl TopologyGaRunner {
    /// Runs the topology GA.
    ///
    /// # Errors
    /// Oracle failures raised by the inner SSGA runs.
    #[instrument(
        name = "topology.run",
        err,
        skip_all,
        fields(
            candidates = ctx.candidates.len(),
            population = config.population_size,
        ),
    )]
    pub fn run<O, R>(
        ctx: &SwitchingContext<'_>,
        oracle: &mut O,
        config: &TopologyGaConfig,
        switching: &SsgaConfig,
        rng: &mut R,
    ) -> Result<TopologyResult>
    where
        O: LoadFlowOracle + ?Sized,
        R: Rng,
    {
        let num_vertices = ctx.evaluator.network().num_vertices();

        let mut population: Vec<TopologyIndividual> = (0..config.initial_population())
            .map(|_| {
                let mut graph = FeederGraph::new(num_vertices, ctx.candidates.iter().copied());
                graph.biased_spanning_tree(ctx.initial, config.bias_probability, rng);
                TopologyIndividual::new(graph)
            })
            .collect();

        evaluate_population(ctx, oracle, &mut population, switching, rng)?;
        if population.is_empty() {
            warn!("no initial topology is reachable from the faulted state");
            return Ok(TopologyResult {
                best: None,
                generations: 0,
                early_exit: false,
                fitness_history: Vec::new(),
            });
        }
        sort_by_fitness(&mut population);

        let mut best = population[0].record();
        let mut fitness_history = vec![population[0].fitness];

        let single_operation = population.iter().all(|ind| {
            ind.switching
                .as_ref()
                .is_some_and(|s| s.num_operations() <= 1)
        });
        if single_operation {
            info!(
                fitness = population[0].fitness,
                "every topology needs at most one operation"
            );
            return Ok(TopologyResult {
                best,
                generations: 0,
                early_exit: true,
                fitness_history,
            });
        }

        let mut generations = 0;
        for gen in 0..config.max_generations {
            for ind in population.iter_mut() {
                if !ind.graph.mutate(rng) {
                    trace!("topology kept: no radial replacement edge");
                }
            }

            let parents = population.len();
            let mut children = Vec::new();
            for i in 0..parents {
                for j in (i + 1)..parents {
                    let child = population[i]
                        .graph
                        .crossover(population[j].graph.spanning(), rng);
                    children.push(TopologyIndividual::new(child));
                }
            }
            population.extend(children);

            evaluate_population(ctx, oracle, &mut population, switching, rng)?;
            generations = gen + 1;
            if population.is_empty() {
                warn!(generation = generations, "topology population is empty");
                break;
            }

            sort_by_fitness(&mut population);
            population.truncate(config.population_size);

            let gen_best = population[0].fitness;
            if best.as_ref().map_or(true, |b| gen_best < b.fitness) {
                best = population[0].record();
            }
            let best_fitness = best.as_ref().map_or(gen_best, |b| b.fitness);
            fitness_history.push(best_fitness);

            let mean = mean_fitness(&population);
            debug!(
                generation = generations,
                population = population.len(),
                best = best_fitness,
                mean,
                "topology generation"
            );

            if converged(mean, gen_best, config.convergence_threshold) {
                break;
            }
        }

        if let Some(b) = &best {
            info!(
                generations,
                fitness = b.fitness,
                operations = b.switching.num_operations(),
                "topology search completed"
            );
        }

        Ok(TopologyResult {
            best,
            generations,
            early_exit: false,
            fitness_history,
        })
    }
}

/// Runs one SSGA per individual and drops the topologies without a
/// switching sequence.
fn evaluate_population<O, R>(
    ctx: &SwitchingContext<'_>,
    oracle: &mut O,
    population: &mut Vec<TopologyIndividual>,
    switching: &SsgaConfig,
    rng: &mut R,
) -> Result<()>
where
    O: LoadFlowOracle + ?Sized,
    R: Rng,
{
    for ind in population.iter_mut() {
        match SsgaRunner::run(ctx, oracle, ind.graph.spanning(), switching, rng)? {
            SsgaOutcome::Found(result) => {
                ind.fitness = result.best.fitness();
                ind.switching = Some(result.best);
            }
            SsgaOutcome::NoChanges | SsgaOutcome::Infeasible => {
                ind.fitness = f64::INFINITY;
                ind.switching = None;
            }
        }
    }
    population.retain(|ind| ind.switching.is_some());
    Ok(())
}

fn sort_by_fitness(population: &mut [TopologyIndividual]) {
    population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
}

fn mean_fitness(population: &[TopologyIndividual]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    population.iter().map(|ind| ind.fitness).sum::<f64>() / population.len() as f64
}

/// `|mean - min| / |mean| <= threshold`; a zero mean converges only when
/// the gap is zero too.
fn converged(mean: f64, min: f64, threshold: f64) -> bool {
    let gap = (mean - min).abs();
    if mean == 0.0 {
        return gap == 0.0;
    }
    gap / mean.abs() <= threshold
}
