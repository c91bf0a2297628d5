//! Multi-objective survivor selection: non-dominated sorting plus crowding
//! distance, with both objectives maximized at equal weight.
use crate::genome::Genome;
use fixedbitset::FixedBitSet;

/// Select `amount` survivors. Whole fronts are taken in rank order, the
/// last partial front is thinned by descending crowding distance.
pub fn select_nsga2<G: Genome>(population: &[G], amount: usize) -> Vec<G> {
    let objective_values: Vec<[f64; 2]> = population.iter().map(objectives).collect();
    let fronts = non_dominated_fronts(&objective_values);

    let mut selected: Vec<usize> = Vec::with_capacity(amount);
    for front in fronts {
        if selected.len() >= amount {
            break;
        }
        let remaining = amount - selected.len();
        if front.len() <= remaining {
            selected.extend(front);
        } else {
            let distances = crowding_distances(&front, &objective_values);
            let mut ranked: Vec<(usize, f64)> = front.into_iter().zip(distances).collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            selected.extend(ranked.into_iter().take(remaining).map(|(index, _)| index));
        }
    }
    selected
        .into_iter()
        .map(|index| population[index].clone())
        .collect()
}

/// Individuals without a fitness rank behind every evaluated one.
fn objectives<G: Genome>(genome: &G) -> [f64; 2] {
    genome
        .fitness()
        .map(|f| f.objectives)
        .unwrap_or([f64::NEG_INFINITY; 2])
}

fn dominates(a: &[f64; 2], b: &[f64; 2]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x >= y) && a.iter().zip(b.iter()).any(|(x, y)| x > y)
}

/// Fast non-dominated sort. Returns index fronts in rank order, every index
/// appearing exactly once.
pub fn non_dominated_fronts(objective_values: &[[f64; 2]]) -> Vec<Vec<usize>> {
    let size = objective_values.len();
    let mut dominated: Vec<FixedBitSet> = vec![FixedBitSet::with_capacity(size); size];
    let mut domination_count = vec![0usize; size];

    for i in 0..size {
        for j in (i + 1)..size {
            if dominates(&objective_values[i], &objective_values[j]) {
                dominated[i].insert(j);
                domination_count[j] += 1;
            } else if dominates(&objective_values[j], &objective_values[i]) {
                dominated[j].insert(i);
                domination_count[i] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = (0..size).filter(|&i| domination_count[i] == 0).collect();
    while !current.is_empty() {
        let mut next: Vec<usize> = Vec::new();
        for &i in &current {
            for j in dominated[i].ones() {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        fronts.push(std::mem::replace(&mut current, next));
    }
    fronts
}

/// Crowding distance per front member, position-aligned with `front`.
/// Boundary points on each objective get infinite distance.
pub fn crowding_distances(front: &[usize], objective_values: &[[f64; 2]]) -> Vec<f64> {
    if front.len() <= 2 {
        return vec![f64::INFINITY; front.len()];
    }

    let mut distances = vec![0.0f64; front.len()];
    for objective in 0..2 {
        let mut order: Vec<usize> = (0..front.len()).collect();
        order.sort_by(|&a, &b| {
            objective_values[front[a]][objective].total_cmp(&objective_values[front[b]][objective])
        });

        let first = order[0];
        let last = order[order.len() - 1];
        distances[first] = f64::INFINITY;
        distances[last] = f64::INFINITY;

        let minimum = objective_values[front[first]][objective];
        let maximum = objective_values[front[last]][objective];
        if maximum > minimum {
            let range = maximum - minimum;
            for window in 1..order.len() - 1 {
                let previous = objective_values[front[order[window - 1]]][objective];
                let next = objective_values[front[order[window + 1]]][objective];
                distances[order[window]] += (next - previous) / range;
            }
        }
    }
    distances
}
