use anyhow::{Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mazewalk::world::World;
use mazewalk::{traverse, trials};
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    /// Path to the serialized room map.
    map: String,
    /// Number of minimization trials to run (0: verification only).
    #[clap(long, short = 'i', default_value_t = 10000)]
    iterations: usize,
    /// Progress report interval in percent (1-100).
    #[clap(long, short = 'p', default_value_t = 10)]
    progress: u8,
    /// Fan trials out across worker threads.
    #[clap(long, default_value_t = false)]
    parallel: bool,
    /// Worker count for --parallel (default: available cores minus one).
    #[clap(long, short = 'j')]
    workers: Option<usize>,
    /// Seed for reproducible runs.
    #[clap(long, short = 's')]
    seed: Option<u64>,
    /// Print the verified move sequence.
    #[clap(long, default_value_t = false)]
    print_path: bool,
    /// Print the ASCII map before solving.
    #[clap(long, default_value_t = false)]
    show_map: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let world = World::load(&args.map)?;
    if args.show_map {
        println!("{}", world.render_ascii());
    }

    let mut rng = match args.seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_os_rng(),
    };

    // One full pass, replayed from the start room as a coverage check.
    let path = traverse::traverse_path(&world, &mut rng);
    match traverse::verify_path(&world, &path) {
        Ok(rooms) => eprintln!("verified: {} moves, {} rooms visited", path.len(), rooms),
        Err(e) => bail!("traversal check failed: {}", e),
    }
    if args.print_path {
        println!("{}", traverse::path_tokens(&path));
    }

    if args.iterations == 0 {
        return Ok(());
    }
    eprintln!("Starting run...");
    let lowest = if args.parallel {
        trials::lowest_steps_parallel(
            &world,
            args.iterations,
            args.progress,
            args.workers,
            args.seed,
        )
    } else {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::with_template("[{bar:40}] {pos:>3}% {msg}")
                .expect("valid template")
                .progress_chars("=> "),
        );
        let lowest = trials::lowest_steps(
            &world,
            args.iterations,
            args.progress,
            &mut rng,
            |pct, low| {
                pb.set_position(pct as u64);
                pb.set_message(format!("lowest so far: {}", low));
            },
        );
        pb.finish_and_clear();
        lowest
    };
    match lowest {
        Some(n) => println!("lowest steps over {} trials: {}", args.iterations, n),
        None => bail!("no trials completed"),
    }
    Ok(())
}
