use anyhow::bail;
use clap::Parser;
use clap::ValueEnum;
use mazewalk::mapgen;
use std::fs;
use std::io::Write;

#[derive(Parser)]
struct Cli {
    /// Maze width in rooms.
    #[clap(long, default_value_t = 5)]
    width: usize,
    /// Maze height in rooms.
    #[clap(long, default_value_t = 5)]
    height: usize,
    /// Extra walls to open after carving, introducing cycles.
    #[clap(long, short = 'e', default_value_t = 0)]
    extra_exits: usize,
    /// Path to output file. If not provided, outputs to stdout.
    #[clap(long, short = 'o', default_value = "")]
    output: String,
    /// File format: json or ascii. If not provided, infers from output file extension.
    #[clap(long, short = 'f', default_value = "unspecified")]
    format: Format,
    #[clap(long, short = 'c', default_value_t = false)]
    compact: bool,
    #[clap(long, short = 's')]
    seed: Option<u64>,
}

#[derive(Default, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    #[default]
    Unspecified,
    Json,
    Ascii,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let world = mapgen::random::generate(args.width, args.height, args.extra_exits, args.seed)?;
    // Infer format from output file extension if not specified.
    let format = if args.format == Format::Unspecified {
        if args.output.ends_with(".json") {
            Format::Json
        } else if args.output.ends_with(".txt") {
            Format::Ascii
        } else if args.output.is_empty() {
            Format::Json
        } else {
            bail!("Cannot infer format from output file extension. Specify format with -f option.")
        }
    } else {
        args.format.clone()
    };

    let mut w: Box<dyn Write> = if args.output.is_empty() {
        Box::new(std::io::stdout())
    } else {
        Box::new(fs::File::create(&args.output)?)
    };

    match format {
        Format::Json => {
            let records = world.to_records();
            if args.compact {
                serde_json::to_writer(&mut w, &records)?;
            } else {
                serde_json::to_writer_pretty(&mut w, &records)?;
            }
            writeln!(w)?;
        }
        Format::Ascii => {
            writeln!(w, "{}", world.render_ascii())?;
        }
        Format::Unspecified => {
            unreachable!()
        }
    }
    Ok(())
}
