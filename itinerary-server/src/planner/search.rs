//! Route search: the order in which to visit a set of airports.
//!
//! Finding the cheapest order is a shortest Hamiltonian path problem
//! anchored at the start airport. Small target sets are enumerated
//! exhaustively with branch-and-bound; larger ones use randomized local
//! search (swap and segment-reversal moves with simulated-annealing
//! acceptance). Both are anytime: when the iteration or time budget runs
//! out, the best feasible order found so far is returned.

use std::fmt;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::AirportCode;
use crate::network::FlightNetwork;

use super::config::SearchConfig;
use super::cost::{CostMatrix, Objective, PathCost};

/// Error from route search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// No order of the targets is connected by direct flights, or none was
    /// found within the budget.
    #[error("no feasible route visits every target ({termination} after {iterations} iterations)")]
    NoFeasibleRoute {
        termination: Termination,
        iterations: u64,
    },
}

/// A validated request for route search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    /// Where the itinerary begins.
    pub start: AirportCode,

    /// Airports to visit, distinct and excluding `start`.
    pub targets: Vec<AirportCode>,

    /// What to minimize.
    pub objective: Objective,

    /// Maximum number of search iterations.
    pub max_iterations: u64,

    /// Wall-clock budget.
    pub time_limit: Duration,

    /// Seed for the local-search random number generator.
    pub seed: u64,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The iteration counter reached `max_iterations`.
    IterationLimit,
    /// Elapsed time reached `time_limit`.
    TimeLimit,
    /// The whole search space was examined.
    Exhausted,
    /// The network structure rules out every order.
    ProvedInfeasible,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Termination::IterationLimit => "iteration limit reached",
            Termination::TimeLimit => "time limit reached",
            Termination::Exhausted => "search space exhausted",
            Termination::ProvedInfeasible => "proved infeasible",
        })
    }
}

/// Which strategy the search used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Exhaustive,
    LocalSearch,
}

/// A feasible visiting order and its cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Targets in visiting order (the start is implied).
    pub order: Vec<AirportCode>,
    pub cost: f64,
}

/// Result of a search that found at least one feasible order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub best: Candidate,
    pub iterations: u64,
    pub elapsed: Duration,
    pub termination: Termination,
    pub mode: SearchMode,
}

/// A local-search perturbation of a target order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Exchange the targets at two positions.
    Swap(usize, usize),
    /// Reverse the segment between two positions, inclusive.
    Reverse(usize, usize),
}

impl Move {
    /// Draw a random move for an order of length `len` (at least 2).
    pub fn random<R: Rng>(len: usize, rng: &mut R) -> Self {
        let i = rng.gen_range(0..len);
        let mut j = rng.gen_range(0..len - 1);
        if j >= i {
            j += 1;
        }
        let (lo, hi) = (i.min(j), i.max(j));
        if rng.gen_bool(0.5) {
            Move::Swap(lo, hi)
        } else {
            Move::Reverse(lo, hi)
        }
    }

    /// Apply the move in place.
    pub fn apply<T>(self, order: &mut [T]) {
        match self {
            Move::Swap(i, j) => order.swap(i, j),
            Move::Reverse(i, j) => order[i..=j].reverse(),
        }
    }
}

/// Iteration and time limits for one search.
#[derive(Debug, Clone, Copy)]
struct Budget {
    max_iterations: u64,
    time_limit: Duration,
    check_interval: u64,
}

/// Mutable state of one search invocation.
///
/// Orders are indices into the cost matrix (1..=n for targets).
#[derive(Debug)]
struct SearchState {
    best: Option<(Vec<usize>, f64)>,
    iterations: u64,
    started: Instant,
}

impl SearchState {
    fn new() -> Self {
        Self {
            best: None,
            iterations: 0,
            started: Instant::now(),
        }
    }

    /// Account for one unit of work, or stop if the budget is spent.
    fn tick(&mut self, budget: &Budget) -> ControlFlow<Termination> {
        if self.iterations >= budget.max_iterations {
            return ControlFlow::Break(Termination::IterationLimit);
        }
        if self.iterations % budget.check_interval == 0
            && self.started.elapsed() >= budget.time_limit
        {
            return ControlFlow::Break(Termination::TimeLimit);
        }
        self.iterations += 1;
        ControlFlow::Continue(())
    }

    fn best_cost(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, cost)| *cost)
    }

    /// Record `order` if it is strictly cheaper than the incumbent.
    fn offer(&mut self, order: &[usize], cost: f64) -> bool {
        match self.best_cost() {
            Some(best) if cost >= best => false,
            _ => {
                trace!(cost, iteration = self.iterations, "new best order");
                self.best = Some((order.to_vec(), cost));
                true
            }
        }
    }
}

/// The route search engine.
pub struct RouteSearch<'a> {
    network: &'a FlightNetwork,
    config: &'a SearchConfig,
}

impl<'a> RouteSearch<'a> {
    /// Create a new search engine.
    pub fn new(network: &'a FlightNetwork, config: &'a SearchConfig) -> Self {
        Self { network, config }
    }

    /// The strategy used for `target_count` targets.
    ///
    /// Depends only on the target count, never on the budget.
    pub fn mode_for(&self, target_count: usize) -> SearchMode {
        if target_count <= self.config.exact_threshold {
            SearchMode::Exhaustive
        } else {
            SearchMode::LocalSearch
        }
    }

    /// Find the cheapest order of `request.targets` within budget.
    pub fn run(&self, request: &SearchRequest) -> Result<SearchReport, SearchError> {
        let mut state = SearchState::new();
        let budget = Budget {
            max_iterations: request.max_iterations,
            time_limit: request.time_limit,
            check_interval: self.config.time_check_interval.max(1),
        };
        let matrix = CostMatrix::build(
            self.network,
            &request.start,
            &request.targets,
            request.objective,
        );
        let mode = self.mode_for(request.targets.len());

        debug!(
            start = %request.start,
            targets = request.targets.len(),
            objective = %request.objective,
            ?mode,
            "starting route search"
        );

        let termination = if request.targets.is_empty() {
            state.offer(&[], 0.0);
            Termination::Exhausted
        } else if proves_infeasible(&matrix) {
            Termination::ProvedInfeasible
        } else {
            match mode {
                SearchMode::Exhaustive => exhaustive(&matrix, &mut state, &budget),
                SearchMode::LocalSearch => {
                    self.local_search(&matrix, &mut state, &budget, request.seed)
                }
            }
        };

        let elapsed = state.started.elapsed();
        debug!(
            ?termination,
            iterations = state.iterations,
            elapsed_ms = elapsed.as_millis() as u64,
            best = ?state.best_cost(),
            "route search finished"
        );

        let Some((order, cost)) = state.best else {
            return Err(SearchError::NoFeasibleRoute {
                termination,
                iterations: state.iterations,
            });
        };

        Ok(SearchReport {
            best: Candidate {
                order: order.iter().map(|&i| request.targets[i - 1]).collect(),
                cost,
            },
            iterations: state.iterations,
            elapsed,
            termination,
            mode,
        })
    }

    /// Greedy construction followed by annealed swap/reversal moves.
    fn local_search(
        &self,
        matrix: &CostMatrix,
        state: &mut SearchState,
        budget: &Budget,
        seed: u64,
    ) -> Termination {
        let n = matrix.size() - 1;
        let mut current = Vec::with_capacity(n);
        let mut used = vec![false; n + 1];
        let initial_cost = match greedy(matrix, &mut current, &mut used, 0.0, state, budget) {
            ControlFlow::Break(Found::Order(cost)) => cost,
            ControlFlow::Break(Found::Stopped(termination)) => return termination,
            ControlFlow::Continue(()) => return Termination::Exhausted,
        };
        state.offer(&current, initial_cost);

        if n < 2 {
            return Termination::Exhausted;
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut current_cost = initial_cost;
        let mut step: u64 = 0;

        loop {
            if let ControlFlow::Break(termination) = state.tick(budget) {
                return termination;
            }

            let mut candidate = current.clone();
            Move::random(n, &mut rng).apply(&mut candidate);
            let temperature = self.config.temperature(initial_cost, step);
            step += 1;

            let PathCost::Feasible(cost) = matrix.order_cost(&candidate) else {
                continue;
            };

            let delta = cost - current_cost;
            let accept = delta < 0.0
                || (temperature > 0.0 && rng.gen_range(0.0..1.0) < (-delta / temperature).exp());

            if accept {
                current = candidate;
                current_cost = cost;
                state.offer(&current, current_cost);
            }
        }
    }
}

/// Cheap structural checks that rule out every order.
///
/// The start must reach some target and every target needs a way in. At
/// most one target (the last) may have no way on to another target, and at
/// most one (the first) may have no way in from another target.
fn proves_infeasible(matrix: &CostMatrix) -> bool {
    let size = matrix.size();
    let targets = 1..size;

    if !targets.clone().any(|j| matrix.leg(0, j).is_some()) {
        return true;
    }

    if targets
        .clone()
        .any(|j| !(0..size).any(|i| i != j && matrix.leg(i, j).is_some()))
    {
        return true;
    }

    let dead_ends = targets
        .clone()
        .filter(|&i| !targets.clone().any(|j| i != j && matrix.leg(i, j).is_some()))
        .count();
    if dead_ends > 1 {
        return true;
    }

    let forced_first = targets
        .clone()
        .filter(|&j| !targets.clone().any(|i| i != j && matrix.leg(i, j).is_some()))
        .count();
    forced_first > 1
}

/// Depth-first enumeration of every order, pruning infeasible prefixes and
/// prefixes already no cheaper than the best complete order.
fn exhaustive(matrix: &CostMatrix, state: &mut SearchState, budget: &Budget) -> Termination {
    let n = matrix.size() - 1;
    let mut order = Vec::with_capacity(n);
    let mut used = vec![false; n + 1];
    match descend(matrix, &mut order, &mut used, 0.0, state, budget) {
        ControlFlow::Break(termination) => termination,
        ControlFlow::Continue(()) => Termination::Exhausted,
    }
}

fn descend(
    matrix: &CostMatrix,
    order: &mut Vec<usize>,
    used: &mut [bool],
    cost_so_far: f64,
    state: &mut SearchState,
    budget: &Budget,
) -> ControlFlow<Termination> {
    let n = used.len() - 1;
    let prev = order.last().copied().unwrap_or(0);

    for next in 1..=n {
        if used[next] {
            continue;
        }
        let Some(leg) = matrix.leg(prev, next) else {
            continue;
        };
        let cost = cost_so_far + leg;
        if state.best_cost().is_some_and(|best| cost >= best) {
            continue;
        }
        state.tick(budget)?;

        order.push(next);
        used[next] = true;
        if order.len() == n {
            state.offer(order, cost);
        } else {
            descend(matrix, order, used, cost, state, budget)?;
        }
        order.pop();
        used[next] = false;
    }

    ControlFlow::Continue(())
}

/// How the greedy construction ended early.
enum Found {
    /// A complete feasible order, left in the order buffer.
    Order(f64),
    /// The budget ran out first.
    Stopped(Termination),
}

/// Nearest-neighbour construction with backtracking.
///
/// Tries the cheapest next leg first and backs up on dead ends, so it
/// finds a feasible order whenever one exists and the budget allows.
fn greedy(
    matrix: &CostMatrix,
    order: &mut Vec<usize>,
    used: &mut [bool],
    cost_so_far: f64,
    state: &mut SearchState,
    budget: &Budget,
) -> ControlFlow<Found> {
    let n = used.len() - 1;
    if order.len() == n {
        return ControlFlow::Break(Found::Order(cost_so_far));
    }
    let prev = order.last().copied().unwrap_or(0);

    let mut options: Vec<(usize, f64)> = (1..=n)
        .filter(|&next| !used[next])
        .filter_map(|next| matrix.leg(prev, next).map(|leg| (next, leg)))
        .collect();
    options.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    for (next, leg) in options {
        if let ControlFlow::Break(termination) = state.tick(budget) {
            return ControlFlow::Break(Found::Stopped(termination));
        }
        order.push(next);
        used[next] = true;
        greedy(matrix, order, used, cost_so_far + leg, state, budget)?;
        order.pop();
        used[next] = false;
    }

    ControlFlow::Continue(())
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
