use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::SetMinMax;
use crate::traverse::traverse_len;
use crate::world::World;

/// Runs `iterations` traversal passes and returns the lowest move count
/// seen, or `None` for zero iterations.
///
/// `on_progress(percent, lowest_so_far)` fires every
/// `iterations * progress_step / 100` completed trials (integer
/// arithmetic); a block size of zero disables reporting, and a final
/// partial block is never announced. At each report the results container
/// is compacted down to its running minimum so memory stays bounded over
/// large iteration counts.
pub fn lowest_steps<R, F>(
    world: &World,
    iterations: usize,
    progress_step: u8,
    rng: &mut R,
    mut on_progress: F,
) -> Option<usize>
where
    R: Rng + ?Sized,
    F: FnMut(u8, usize),
{
    let block = iterations * progress_step as usize / 100;
    let mut container: Vec<usize> = Vec::new();
    let mut percent_complete: u8 = 0;
    for i in 0..iterations {
        if i != 0 && block != 0 && i % block == 0 {
            percent_complete = percent_complete.saturating_add(progress_step);
            let lowest = *container.iter().min().expect("at least one trial recorded");
            container.clear();
            container.push(lowest);
            on_progress(percent_complete, lowest);
        }
        container.push(traverse_len(world, rng));
    }
    container.into_iter().min()
}

/// Fans [`lowest_steps`] out across independent worker threads and returns
/// the global minimum.
///
/// The iteration count is split evenly across `workers` (default:
/// available parallelism minus one, at least one), remainder to the
/// earliest workers. Workers share only the read-only topology; every
/// pass owns its exit bookkeeping, so there is nothing to race on. Each
/// worker writes its minimum into its own result slot; the scope join is
/// the barrier before aggregation.
pub fn lowest_steps_parallel(
    world: &World,
    iterations: usize,
    progress_step: u8,
    workers: Option<usize>,
    seed: Option<u64>,
) -> Option<usize> {
    let workers = workers.unwrap_or_else(default_workers).max(1);
    let shares = split_iterations(iterations, workers);
    let mut results: Vec<Option<usize>> = vec![None; workers];
    std::thread::scope(|s| {
        for (k, (&share, slot)) in shares.iter().zip(results.iter_mut()).enumerate() {
            s.spawn(move || {
                let mut rng = worker_rng(seed, k);
                *slot = lowest_steps(world, share, progress_step, &mut rng, |pct, low| {
                    eprintln!("worker {}: {}% lowest so far: {}", k, pct, low);
                });
            });
        }
    });
    let mut best = usize::MAX;
    let mut found = false;
    for (k, result) in results.iter().enumerate() {
        if let Some(m) = result {
            eprintln!("worker {}: lowest {} over {} trials", k, m, shares[k]);
            best.setmin(*m);
            found = true;
        }
    }
    found.then_some(best)
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

fn split_iterations(iterations: usize, workers: usize) -> Vec<usize> {
    let base = iterations / workers;
    let rem = iterations % workers;
    (0..workers).map(|k| base + usize::from(k < rem)).collect()
}

/// Independent, reproducible stream per worker when a seed is given.
fn worker_rng(seed: Option<u64>, k: usize) -> ChaCha12Rng {
    match seed {
        Some(s) => ChaCha12Rng::seed_from_u64(
            s.wrapping_add(0x9E37_79B9_7F4A_7C15u64.wrapping_mul(k as u64)),
        ),
        None => ChaCha12Rng::from_os_rng(),
    }
}
