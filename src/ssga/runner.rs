//! SSGA evolutionary loop.

use super::config::SsgaConfig;
use super::decode::{decode, switching_sequence};
use super::types::{SwitchingDiff, SwitchingIndividual, SwitchingRecord};
use crate::error::Result;
use crate::graph::{EdgeKey, FeederGraph};
use crate::merit::{AuxiliaryOperations, MeritIndex, MeritIndexEvaluator, MeritWeights};
use crate::oracle::{LoadFlowOracle, SwitchStates};
use rand::Rng;
use tracing::{debug, instrument, trace, warn};

/// Inputs shared by every SSGA run of one restoration.
#[derive(Clone, Copy)]
pub struct SwitchingContext<'a> {
    pub evaluator: MeritIndexEvaluator<'a>,
    pub auxiliary: &'a dyn AuxiliaryOperations,
    pub weights: MeritWeights,
    /// Switch where the crew starts.
    pub start_switch: &'a str,
    /// Every operable switch after fault isolation.
    pub candidates: &'a [EdgeKey],
    /// Switches closed right after fault isolation.
    pub initial: &'a [EdgeKey],
}

/// Result of an SSGA run that found a sequence.
#[derive(Debug, Clone)]
pub struct SsgaResult {
    pub best: SwitchingRecord,
    /// Generations executed after the initial evaluation.
    pub generations: usize,
    /// Best fitness after the initial evaluation and after each generation.
    pub fitness_history: Vec<f64>,
}

/// How an SSGA run ended.
#[derive(Debug, Clone)]
pub enum SsgaOutcome {
    Found(SsgaResult),
    /// The target topology equals the initial one.
    NoChanges,
    /// No individual could be decoded into a valid sequence.
    Infeasible,
}

impl SsgaOutcome {
    pub fn found(self) -> Option<SsgaResult> {
        match self {
            SsgaOutcome::Found(result) => Some(result),
            SsgaOutcome::NoChanges | SsgaOutcome::Infeasible => None,
        }
    }
}

/// Searches the switching order that moves the network to a target
/// topology.
pub struct SsgaRunner;

impl SsgaRunner {
    /// Runs the SSGA for `target`.
    ///
    /// A target that needs one reconnection and nothing else has a single
    /// possible sequence; it is scored without running the GA.
    ///
    /// # Errors
    /// Oracle failures, and switches of `target` unknown to the network.
    #[instrument(
        name = "ssga.run",
        level = "debug",
        err,
        skip_all,
        fields(target_edges = target.len()),
    )]
    pub fn run<O, R>(
        ctx: &SwitchingContext<'_>,
        oracle: &mut O,
        target: &[EdgeKey],
        config: &SsgaConfig,
        rng: &mut R,
    ) -> Result<SsgaOutcome>
    where
        O: LoadFlowOracle + ?Sized,
        R: Rng,
    {
        let diff = SwitchingDiff::between(ctx.initial, target);
        if diff.is_empty() {
            return Ok(SsgaOutcome::NoChanges);
        }
        if diff.to_close.is_empty() {
            trace!(to_open = diff.to_open.len(), "target only opens switches");
            return Ok(SsgaOutcome::Infeasible);
        }

        let network = ctx.evaluator.network();
        let eval = Evaluation {
            ctx,
            diff: &diff,
            simulation: FeederGraph::with_spanning(
                network.num_vertices(),
                ctx.candidates.iter().copied(),
                ctx.initial.to_vec(),
            ),
            initial_states: network.switch_states(ctx.initial),
            parallel: config.parallel,
        };

        let trivial = diff.to_close.len() == 1 && diff.to_open.is_empty();
        let size = if trivial { 1 } else { config.num_individuals };
        let mut population: Vec<SwitchingIndividual> = (0..size)
            .map(|_| SwitchingIndividual::new(random_keys(diff.to_close.len(), rng)))
            .collect();

        eval.evaluate_population(oracle, &mut population, rng)?;
        if population.is_empty() {
            warn!(to_close = diff.to_close.len(), "no switching sequence could be decoded");
            return Ok(SsgaOutcome::Infeasible);
        }
        sort_by_fitness(&mut population);

        let Some(mut best) = population[0].record() else {
            return Ok(SsgaOutcome::Infeasible);
        };
        let mut fitness_history = vec![best.fitness()];
        let mut generations = 0;

        if !trivial {
            for gen in 0..config.max_generations {
                mutate_population(&mut population, config.mutation_rate, rng);
                crossover_population(&mut population, config.crossover_rate, rng);

                eval.evaluate_population(oracle, &mut population, rng)?;
                generations = gen + 1;
                if population.is_empty() {
                    warn!(generation = generations, "whole generation failed to decode");
                    break;
                }

                sort_by_fitness(&mut population);
                population.truncate(config.num_individuals);

                if population[0].fitness() < best.fitness() {
                    if let Some(record) = population[0].record() {
                        best = record;
                    }
                }
                fitness_history.push(best.fitness());

                debug!(
                    generation = generations,
                    population = population.len(),
                    best = best.fitness(),
                    mean = mean_fitness(&population),
                    "ssga generation"
                );

                if converged(&population, config.min_fitness_delta_pct) {
                    break;
                }
            }
        }

        Ok(SsgaOutcome::Found(SsgaResult {
            best,
            generations,
            fitness_history,
        }))
    }
}

/// Per-run state for decoding and scoring individuals.
struct Evaluation<'r, 'a> {
    ctx: &'r SwitchingContext<'a>,
    diff: &'r SwitchingDiff,
    simulation: FeederGraph,
    initial_states: SwitchStates,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel: bool,
}

impl Evaluation<'_, '_> {
    /// Decodes every individual, drops the failures and scores the rest.
    ///
    /// `LF` and `NS` only depend on the initial and final states, so they
    /// are computed once from the first survivor.
    fn evaluate_population<O, R>(
        &self,
        oracle: &mut O,
        population: &mut Vec<SwitchingIndividual>,
        rng: &mut R,
    ) -> Result<()>
    where
        O: LoadFlowOracle + ?Sized,
        R: Rng,
    {
        let network = self.ctx.evaluator.network();
        for ind in population.iter_mut() {
            ind.sequence = match decode(&self.simulation, self.diff, &ind.keys, rng) {
                Some(pairs) => Some(switching_sequence(pairs, network)?),
                None => {
                    trace!("individual failed to decode");
                    None
                }
            };
        }
        population.retain(|ind| ind.sequence.is_some());

        let Some(first) = population.first().and_then(|ind| ind.sequence.as_ref()) else {
            return Ok(());
        };
        let lf = self
            .ctx
            .evaluator
            .load_flow_merit_index(oracle, &self.initial_states, &first.natural)?;
        let ns = self.ctx.evaluator.switching_count_merit_index(&first.natural);

        let score = |ind: &mut SwitchingIndividual| self.score(ind, lf, ns);

        #[cfg(feature = "parallel")]
        if self.parallel {
            use rayon::prelude::*;
            population.par_iter_mut().for_each(&score);
            return Ok(());
        }

        population.iter_mut().for_each(&score);
        Ok(())
    }

    fn score(&self, ind: &mut SwitchingIndividual, lf: f64, ns: f64) {
        let Some(seq) = ind.sequence.as_ref() else {
            return;
        };
        let ctx = self.ctx;
        let evaluator = &ctx.evaluator;

        let (cd, legs) = evaluator.crew_displacement_merit_index(ctx.start_switch, &seq.inverted);
        let effective = ctx
            .auxiliary
            .effective_changes(&seq.inverted, evaluator.network(), ctx.initial);
        let od = evaluator.outage_duration_merit_index(&seq.inverted, &legs, ctx.initial);

        ind.merit = MeritIndex::weighted(lf, cd, od, ns, &ctx.weights);
        ind.effective = effective;
    }
}

fn random_keys<R: Rng>(n: usize, rng: &mut R) -> Vec<f64> {
    (0..n).map(|_| rng.random_range(0.0..1.0)).collect()
}

/// Redraws each gene with probability `rate`.
fn mutate_population<R: Rng>(population: &mut [SwitchingIndividual], rate: f64, rng: &mut R) {
    for ind in population.iter_mut() {
        for key in ind.keys.iter_mut() {
            if rng.random_bool(rate) {
                *key = rng.random_range(0.0..1.0);
            }
        }
    }
}

/// Single-cut crossover over every unordered pair, each with probability
/// `rate`. Children are appended; single-gene parents swap genes instead.
fn crossover_population<R: Rng>(population: &mut Vec<SwitchingIndividual>, rate: f64, rng: &mut R) {
    let parents = population.len();
    let mut children = Vec::new();

    for i in 0..parents {
        for j in (i + 1)..parents {
            if !rng.random_bool(rate) {
                continue;
            }
            let n = population[i].keys.len();
            match n {
                0 => {}
                1 => {
                    let a = population[i].keys[0];
                    population[i].keys[0] = population[j].keys[0];
                    population[j].keys[0] = a;
                }
                _ => {
                    let cut = rng.random_range(1..=n);
                    let keys: Vec<f64> = population[i].keys[..cut]
                        .iter()
                        .chain(&population[j].keys[cut..])
                        .copied()
                        .collect();
                    children.push(SwitchingIndividual::new(keys));
                }
            }
        }
    }

    population.extend(children);
}

fn sort_by_fitness(population: &mut [SwitchingIndividual]) {
    population.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
}

fn mean_fitness(population: &[SwitchingIndividual]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    population.iter().map(SwitchingIndividual::fitness).sum::<f64>() / population.len() as f64
}

/// `100 * |mean - min| / min <= threshold_pct`; never true for a
/// non-positive minimum.
fn converged(population: &[SwitchingIndividual], threshold_pct: f64) -> bool {
    let min = population
        .iter()
        .map(SwitchingIndividual::fitness)
        .fold(f64::INFINITY, f64::min);
    if min <= 0.0 || !min.is_finite() {
        return false;
    }
    let mean = mean_fitness(population);
    100.0 * (mean - min).abs() / min <= threshold_pct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::CrewDisplacementIndex;
    use crate::merit::PassThrough;
    use crate::network::tests::two_feeder_network;
    use crate::network::{NetworkData, OperableEdge, SwitchKind, SwitchRecord};
    use crate::oracle::{RadialLoadOracle, SwitchChange};
    use crate::random::create_rng;
    use crate::ssga::SwitchPair;

    fn e(a: usize, b: usize) -> EdgeKey {
        EdgeKey::new(a, b)
    }

    fn line_network() -> NetworkData {
        let edges = vec![
            OperableEdge::new(0, 1, "A", true),
            OperableEdge::new(1, 2, "B", true),
            OperableEdge::new(0, 2, "T", false),
        ];
        let switches = vec![
            SwitchRecord::new(0, "A", SwitchKind::Manual),
            SwitchRecord::new(1, "B", SwitchKind::Manual),
            SwitchRecord::new(2, "T", SwitchKind::Manual),
        ];
        NetworkData::new(3, edges, switches)
            .and_then(|n| n.with_vertex_customers(vec![0, 5, 7]))
            .and_then(|n| n.with_travel_times(vec![vec![0.0, 4.0, 6.0], vec![4.0, 0.0, 3.0], vec![6.0, 3.0, 0.0]]))
            .expect("valid network")
    }

    fn loads(n: usize) -> Vec<[f64; 3]> {
        (0..n).map(|v| [v as f64; 3]).collect()
    }

    struct Fixture {
        net: NetworkData,
        crew: CrewDisplacementIndex,
        candidates: Vec<EdgeKey>,
        initial: Vec<EdgeKey>,
    }

    impl Fixture {
        fn new(net: NetworkData, initial: Vec<EdgeKey>) -> Self {
            let crew = CrewDisplacementIndex::new(&net);
            let candidates = net.edge_keys();
            Self {
                net,
                crew,
                candidates,
                initial,
            }
        }

        fn context<'a>(&'a self, start: &'a str) -> SwitchingContext<'a> {
            SwitchingContext {
                evaluator: MeritIndexEvaluator::new(&self.net, &self.crew),
                auxiliary: &PassThrough,
                weights: MeritWeights::default(),
                start_switch: start,
                candidates: &self.candidates,
                initial: &self.initial,
            }
        }
    }

    #[test]
    fn test_line_feeder_transfer() {
        let fx = Fixture::new(line_network(), vec![e(0, 1), e(1, 2)]);
        let ctx = fx.context("A");
        let mut oracle = RadialLoadOracle::new(&fx.net, loads(3)).expect("loads");
        let mut rng = create_rng(42);

        let outcome = SsgaRunner::run(&ctx, &mut oracle, &[e(0, 1), e(0, 2)], &SsgaConfig::default(), &mut rng)
            .expect("oracle ok");
        let result = outcome.found().expect("sequence found");

        assert_eq!(result.best.pairs, vec![SwitchPair::compensated(e(0, 2), e(1, 2))]);
        assert_eq!(result.best.inverted, vec![SwitchChange::open("B"), SwitchChange::close("T")]);
        assert_eq!(result.best.natural, vec![SwitchChange::close("T"), SwitchChange::open("B")]);
        assert_eq!(result.best.effective, result.best.inverted);
        let m = result.best.merit;
        assert!((m.ff - (m.lf + m.cd + m.od + m.ns)).abs() < 1e-12);
    }

    #[test]
    fn test_identical_target_needs_no_changes() {
        let fx = Fixture::new(line_network(), vec![e(0, 1), e(1, 2)]);
        let ctx = fx.context("A");
        let mut oracle = RadialLoadOracle::new(&fx.net, loads(3)).expect("loads");
        let mut rng = create_rng(1);
        let outcome = SsgaRunner::run(&ctx, &mut oracle, &[e(2, 1), e(1, 0)], &SsgaConfig::default(), &mut rng)
            .expect("oracle ok");
        assert!(matches!(outcome, SsgaOutcome::NoChanges));
    }

    #[test]
    fn test_single_reconnection_skips_ga() {
        let fx = Fixture::new(two_feeder_network(), vec![e(0, 1), e(1, 2), e(4, 5), e(0, 5)]);
        let ctx = fx.context("S1");
        let mut oracle = RadialLoadOracle::new(&fx.net, loads(6)).expect("loads");
        let mut rng = create_rng(3);

        let target = [e(0, 1), e(1, 2), e(4, 5), e(0, 5), e(3, 4)];
        let result = SsgaRunner::run(&ctx, &mut oracle, &target, &SsgaConfig::default(), &mut rng)
            .expect("oracle ok")
            .found()
            .expect("sequence found");

        assert_eq!(result.generations, 0);
        assert_eq!(result.fitness_history.len(), 1);
        assert_eq!(result.best.inverted, vec![SwitchChange::close("T1")]);
        assert_eq!(result.best.num_operations(), 1);
    }

    #[test]
    fn test_only_opening_is_infeasible() {
        let fx = Fixture::new(line_network(), vec![e(0, 1), e(1, 2)]);
        let ctx = fx.context("A");
        let mut oracle = RadialLoadOracle::new(&fx.net, loads(3)).expect("loads");
        let mut rng = create_rng(1);
        let outcome = SsgaRunner::run(&ctx, &mut oracle, &[e(0, 1)], &SsgaConfig::default(), &mut rng)
            .expect("oracle ok");
        assert!(matches!(outcome, SsgaOutcome::Infeasible));
    }

    #[test]
    fn test_tie_transfer_history_is_monotone() {
        let fx = Fixture::new(two_feeder_network(), vec![e(0, 1), e(1, 2), e(2, 3), e(4, 5), e(0, 5)]);
        let ctx = fx.context("S1");
        let mut oracle = RadialLoadOracle::new(&fx.net, loads(6)).expect("loads");
        let mut rng = create_rng(11);

        // Move the tie point from T1 to S1; vertices 2 and 3 move to feeder 2.
        let target = [e(0, 1), e(2, 3), e(3, 4), e(4, 5), e(0, 5)];
        let config = SsgaConfig::default().with_max_generations(5);
        let result = SsgaRunner::run(&ctx, &mut oracle, &target, &config, &mut rng)
            .expect("oracle ok")
            .found()
            .expect("sequence found");

        assert_eq!(result.best.pairs, vec![SwitchPair::compensated(e(3, 4), e(1, 2))]);
        assert_eq!(result.fitness_history.len(), result.generations + 1);
        for w in result.fitness_history.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let fx = Fixture::new(line_network(), vec![e(0, 1), e(1, 2)]);
        let ctx = fx.context("A");
        let run = |seed| {
            let mut oracle = RadialLoadOracle::new(&fx.net, loads(3)).expect("loads");
            let mut rng = create_rng(seed);
            SsgaRunner::run(&ctx, &mut oracle, &[e(0, 1), e(0, 2)], &SsgaConfig::default(), &mut rng)
                .expect("oracle ok")
                .found()
                .expect("sequence found")
        };
        let (a, b) = (run(5), run(5));
        assert_eq!(a.best, b.best);
        assert_eq!(a.fitness_history, b.fitness_history);
    }

    #[test]
    fn test_crossover_appends_children() {
        let mut rng = create_rng(0);
        let mut population: Vec<SwitchingIndividual> = (0..4)
            .map(|i| SwitchingIndividual::new(vec![i as f64 / 10.0; 3]))
            .collect();
        crossover_population(&mut population, 1.0, &mut rng);
        assert_eq!(population.len(), 4 + 6);
        for child in &population[4..] {
            assert_eq!(child.keys.len(), 3);
        }
    }

    #[test]
    fn test_crossover_swaps_single_genes() {
        let mut rng = create_rng(0);
        let mut population = vec![SwitchingIndividual::new(vec![0.1]), SwitchingIndividual::new(vec![0.9])];
        crossover_population(&mut population, 1.0, &mut rng);
        assert_eq!(population.len(), 2);
        assert_eq!(population[0].keys, vec![0.9]);
        assert_eq!(population[1].keys, vec![0.1]);
    }

    #[test]
    fn test_mutation_rate_bounds() {
        let mut rng = create_rng(0);
        let mut population = vec![SwitchingIndividual::new(vec![2.0; 8])];
        mutate_population(&mut population, 0.0, &mut rng);
        assert!(population[0].keys.iter().all(|&k| k == 2.0));
        mutate_population(&mut population, 1.0, &mut rng);
        assert!(population[0].keys.iter().all(|&k| (0.0..1.0).contains(&k)));
    }

    #[test]
    fn test_convergence_rule() {
        let with = |values: &[f64]| -> Vec<SwitchingIndividual> {
            values
                .iter()
                .map(|&ff| {
                    let mut ind = SwitchingIndividual::new(Vec::new());
                    ind.merit.ff = ff;
                    ind
                })
                .collect()
        };
        assert!(converged(&with(&[1.0, 1.02, 1.04]), 3.0));
        assert!(!converged(&with(&[1.0, 1.5]), 3.0));
        assert!(!converged(&with(&[0.0, 0.0]), 3.0));
        assert!(!converged(&with(&[-1.0, -1.0]), 3.0));
    }
}
