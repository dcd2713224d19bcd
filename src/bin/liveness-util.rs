//! Command-line tool: parse textual IR and report liveness.

use anyhow::Result;
use log::debug;
use ssa_liveness::analysis::{block_max_live, max_live};
use ssa_liveness::frontend::parse_function;
use ssa_liveness::{BitSetOptions, Liveness, LivenessOptions};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "liveness-util", about = "SSA liveness utility.")]
struct Options {
    #[structopt(short, long)]
    debug: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(name = "print-ir", about = "Parse IR and print it back")]
    PrintIR {
        #[structopt(help = "IR file to parse")]
        ir: PathBuf,
    },
    #[structopt(
        name = "liveness",
        about = "Print IR annotated with live-in/live-out sets and killing uses"
    )]
    Liveness {
        #[structopt(help = "IR file to parse")]
        ir: PathBuf,
        #[structopt(
            long,
            default_value = "0",
            help = "Use flat bitsets for sets with fewer values than this"
        )]
        small_set_threshold: u32,
    },
    #[structopt(name = "pressure", about = "Print the maximum number of live values")]
    Pressure {
        #[structopt(help = "IR file to parse")]
        ir: PathBuf,
    },
}

fn main() -> Result<()> {
    let opts = Options::from_args();

    let mut logger = env_logger::Builder::from_default_env();
    if opts.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    let _ = logger.try_init();

    match opts.command {
        Command::PrintIR { ir } => {
            let text = std::fs::read_to_string(ir)?;
            debug!("Loaded {} bytes of IR", text.len());
            let body = parse_function(&text)?;
            print!("{}", body.display(""));
        }
        Command::Liveness {
            ir,
            small_set_threshold,
        } => {
            let text = std::fs::read_to_string(ir)?;
            let mut body = parse_function(&text)?;
            let options = LivenessOptions {
                bitset: BitSetOptions {
                    small_set_threshold,
                },
            };
            let liveness = Liveness::compute_with_options(&mut body, &options);
            debug!("Converged after {} block visits", liveness.iterations());
            print!("{}", body.display("").with_liveness(&liveness));
        }
        Command::Pressure { ir } => {
            let text = std::fs::read_to_string(ir)?;
            let mut body = parse_function(&text)?;
            let liveness = Liveness::compute(&mut body);
            for block in body.blocks.iter() {
                println!("{}: {}", block, block_max_live(&liveness, &body, block));
            }
            println!("max: {}", max_live(&liveness, &body));
        }
    }

    Ok(())
}
