use clap::Parser;
use std::path::PathBuf;

use crate::containers::{GenerationConfig, MateParams, Mode};
use crate::errors::{Result, SamlineError};
use crate::read_synthesizer::InsertPolicy;
use crate::utils;

/// Per-mate options may be given once for mate 1 and a second time for mate 2
/// (e.g. `-p 1000 -p 1200`). A mate 2 is generated only when its position is
/// non-zero.
#[derive(Clone, Parser)]
#[clap(author, version, about)]
pub struct Arguments {
    /// Indexed (or indexable) FASTA the reference bases are read from.
    /// Not needed with `--flags`.
    #[clap(long = "fasta")]
    #[clap(value_name = "FASTA")]
    pub fasta: Option<PathBuf>,

    /// Reference sequence name, per mate [default: NC_011752.1, mate 2 inherits mate 1]
    #[clap(short = 'r', long = "refname")]
    #[clap(value_name = "NAME")]
    pub refname: Vec<String>,

    /// 0-based position on the reference, per mate. 0 means unmapped [default: 10000, mate 2: 0]
    #[clap(short = 'p', long = "refpos")]
    #[clap(value_name = "INT")]
    #[clap(value_parser = clap::value_parser!(u64).range(..=i64::MAX as u64))]
    pub refpos: Vec<u64>,

    /// CIGAR string, per mate [default: 50M]
    #[clap(short = 'c', long = "cigar")]
    #[clap(value_name = "CIGAR")]
    pub cigar: Vec<String>,

    /// Bases used for insertions
    #[clap(short = 'i', long = "insbases")]
    #[clap(value_name = "BASES")]
    #[clap(default_value = utils::DEFAULT_INSBASES)]
    pub insbases: String,

    /// Fail instead of cycling when the insert bases run out
    #[clap(long = "no-wrap-insbases")]
    pub no_wrap_insbases: bool,

    /// Mapping quality, per mate [default: 20]
    #[clap(short = 'm', long = "mapq")]
    #[clap(value_name = "INT")]
    pub mapq: Vec<u8>,

    /// Alignment is reversed (0/1), per mate
    #[clap(short = 'e', long = "reverse")]
    #[clap(value_name = "0|1")]
    #[clap(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub reverse: Vec<u8>,

    /// Query template name
    #[clap(short = 'q', long = "qname")]
    #[clap(value_name = "STRING")]
    #[clap(default_value = utils::DEFAULT_QNAME)]
    pub qname: String,

    /// Secondary alignment (0/1), per mate
    #[clap(short = '2', long = "secondary")]
    #[clap(value_name = "0|1")]
    #[clap(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub secondary: Vec<u8>,

    /// Did not pass quality control (0/1), per mate
    #[clap(short = 'a', long = "bad")]
    #[clap(value_name = "0|1")]
    #[clap(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub bad: Vec<u8>,

    /// PCR or optical duplicate (0/1), per mate
    #[clap(short = 'u', long = "duplicate")]
    #[clap(value_name = "0|1")]
    #[clap(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub duplicate: Vec<u8>,

    /// Each fragment is properly aligned (0/1), per mate
    #[clap(short = 'o', long = "proper")]
    #[clap(value_name = "0|1")]
    #[clap(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub proper: Vec<u8>,

    /// Show details of the calculations instead of SAM output
    #[clap(short = 's', long = "show")]
    pub show: bool,

    /// Print the details as JSON (with `--show`)
    #[clap(long = "json", requires = "show")]
    pub json: bool,

    /// Print only the reference bases of mate 1 (use a 100M CIGAR for 100 bases)
    #[clap(short = 'f', long = "ref")]
    pub ref_only: bool,

    /// Decode a flags value (decimal, or hex with 0x prefix)
    #[clap(short = 'l', long = "flags")]
    #[clap(value_name = "FLAGS")]
    #[clap(value_parser = parse_flags)]
    pub flags: Option<u16>,

    /// Produce a SAM header
    #[clap(short = 'd', long = "header")]
    pub header: bool,

    /// Write a reference-name config file to this path
    #[clap(short = 'n', long = "config")]
    #[clap(value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for the random quality strings
    #[clap(long = "seed")]
    #[clap(value_name = "INT")]
    pub seed: Option<u64>,

    /// Optional flag to print verbose output for debugging purposes.
    #[clap(long = "verbose")]
    pub verbose: bool,
}

pub fn get_args() -> Arguments {
    Arguments::parse()
}

fn parse_flags(value: &str) -> std::result::Result<u16, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid flags value '{value}': {e}"))
}

/// Value given for mate `idx`, if any
fn per_mate<T: Clone>(name: &str, values: &[T], idx: usize) -> Result<Option<T>> {
    if values.len() > 2 {
        return Err(SamlineError::Config(format!(
            "--{} given {} times, at most 2 (one per mate) allowed",
            name,
            values.len()
        )));
    }
    Ok(values.get(idx).cloned())
}

impl Arguments {
    fn mate_params(&self, idx: usize, default_refname: &str, default_refpos: u64) -> Result<MateParams> {
        let is_set = |name: &str, values: &[u8]| -> Result<bool> {
            Ok(per_mate(name, values, idx)?.unwrap_or(0) == 1)
        };
        Ok(MateParams {
            refname: per_mate("refname", &self.refname, idx)?
                .unwrap_or_else(|| default_refname.to_string()),
            refpos: per_mate("refpos", &self.refpos, idx)?.unwrap_or(default_refpos),
            cigar: per_mate("cigar", &self.cigar, idx)?
                .unwrap_or_else(|| utils::DEFAULT_CIGAR.to_string()),
            mapq: per_mate("mapq", &self.mapq, idx)?.unwrap_or(utils::DEFAULT_MAPQ),
            reverse: is_set("reverse", &self.reverse)?,
            secondary: is_set("secondary", &self.secondary)?,
            duplicate: is_set("duplicate", &self.duplicate)?,
            failed_qc: is_set("bad", &self.bad)?,
            properly_paired: is_set("proper", &self.proper)?,
        })
    }

    /// Build the immutable run configuration. Mode precedence is show, then
    /// ref-only, then flag decoding, then SAM generation.
    pub fn to_config(&self) -> Result<GenerationConfig> {
        let first = self.mate_params(0, utils::DEFAULT_REFNAME, utils::DEFAULT_REFPOS)?;
        let second = self.mate_params(1, &first.refname, 0)?;
        let second = if second.refpos > 0 { Some(second) } else { None };

        let mode = if self.show {
            Mode::ShowDetails
        } else if self.ref_only {
            Mode::RefOnly
        } else if let Some(flags) = self.flags.filter(|flags| *flags > 0) {
            Mode::ExplainFlags(flags)
        } else {
            Mode::Generate
        };

        let insert_policy = if self.no_wrap_insbases {
            InsertPolicy::Exhaust
        } else {
            InsertPolicy::Wrap
        };

        Ok(GenerationConfig {
            qname: self.qname.clone(),
            insbases: self.insbases.clone(),
            insert_policy,
            config_path: self.config.clone(),
            header: self.header,
            seed: self.seed,
            mode,
            first,
            second,
        })
    }
}
