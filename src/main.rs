use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use log::{debug, error, info, LevelFilter};
use samline::cli::{get_args, Arguments};
use samline::containers::{GenerationConfig, GenerationContext, Mode};
use samline::errors::Result;
use samline::pair_flags::explain_flags;
use samline::reference::FastaReference;
use samline::sam_writer::{create_rng, write_results, QualityGenerator};
use samline::{details, errors::SamlineError};

fn set_up() -> Arguments {
    let args = get_args();
    let filter_level: LevelFilter = match args.verbose {
        false => LevelFilter::Info,
        true => LevelFilter::Debug,
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let version = env!("CARGO_PKG_VERSION");
    debug!("Running samline v{version}");

    let cmd: Vec<String> = env::args().collect();
    let cmd_str = cmd.join(" ");
    debug!("Run command: {cmd_str}");
    args
}

fn fasta_path(args: &Arguments) -> Result<&PathBuf> {
    args.fasta.as_ref().ok_or_else(|| {
        SamlineError::Config("`--fasta` is required to fetch reference bases".to_string())
    })
}

fn run(args: &Arguments, config: &GenerationConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Mode::ExplainFlags(flags) = config.mode {
        for line in explain_flags(flags) {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        return Ok(());
    }

    let reference = FastaReference::from_path(fasta_path(args)?)?;
    let mut quality_generator = QualityGenerator::new(create_rng(config.seed));
    let context = GenerationContext::build(config, &reference, &mut quality_generator)?;

    match config.mode {
        Mode::ShowDetails if args.json => {
            writeln!(out, "{}", details::details_json(&context)?)?;
        }
        Mode::ShowDetails => {
            for line in details::show_details(&context) {
                writeln!(out, "{}", line)?;
            }
        }
        Mode::RefOnly => {
            writeln!(out, "{}", details::ref_bases(&context)?)?;
        }
        Mode::Generate | Mode::ExplainFlags(_) => {
            write_results(&context, config.header, &mut out)?;
            info!(
                "Wrote {} SAM record(s) for template {}",
                context.alignments().count(),
                context.qname
            );
        }
    }
    out.flush()?;
    Ok(())
}

fn main() {
    let args = set_up();
    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(e.exit_code());
        }
    };
    if let Err(e) = run(&args, &config) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
