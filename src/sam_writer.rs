use log::{debug, info};
use rand::rngs::StdRng;
use rust_htslib::bam::header::{Header, HeaderRecord};
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::containers::{AlignmentDescriptor, GenerationContext};
use crate::errors::{Result, SamlineError};
use crate::pair_flags;
use crate::utils;

/// Create the random source for quality strings. A seed makes the output
/// reproducible; without one the generator is seeded from OS entropy.
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Draws quality strings uniformly from the printable phred+33 characters
pub struct QualityGenerator {
    rng: StdRng,
}

impl QualityGenerator {
    pub fn new(rng: StdRng) -> Self {
        QualityGenerator { rng }
    }

    pub fn quality(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| {
                self.rng
                    .gen_range(utils::MIN_QUALITY_CHAR..=utils::MAX_QUALITY_CHAR) as char
            })
            .collect()
    }
}

/// Render the 11 mandatory SAM fields of `alignment` as one tab-separated
/// line (no trailing newline). The CIGAR is written in its merged form.
pub fn render_record(
    qname: &str,
    alignment: &AlignmentDescriptor,
    partner: Option<&AlignmentDescriptor>,
    tlen: i64,
    quality_generator: &mut QualityGenerator,
) -> Result<String> {
    let read = alignment.read.as_ref().ok_or(SamlineError::Incomplete {
        mate: alignment.mate_index + 1,
        stage: "read sequence",
    })?;
    let flags = pair_flags::compute_flags(alignment, partner);
    let (rnext, pnext) = pair_flags::mate_fields(partner);
    let quality = quality_generator.quality(read.len());
    debug!("Mate {} flags: {:#05x}", alignment.mate_index + 1, flags);

    Ok(format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        qname,
        flags,
        alignment.refname,
        alignment.refpos,
        alignment.mapq,
        alignment.cigar.merged(),
        rnext,
        pnext,
        tlen,
        read,
        quality,
    ))
}

/// Distinct reference names with their total lengths, in mate order
fn distinct_references(context: &GenerationContext) -> Vec<(&str, u64)> {
    let mut references: Vec<(&str, u64)> = Vec::new();
    for alignment in context.alignments() {
        if !references.iter().any(|(name, _)| *name == alignment.refname) {
            references.push((alignment.refname.as_str(), alignment.bases_in_ref));
        }
    }
    references
}

/// SAM header: `@HD` record followed by one `@SQ` record per distinct reference
pub fn build_header(context: &GenerationContext) -> Header {
    let mut header = Header::new();
    let mut hd = HeaderRecord::new(b"HD");
    hd.push_tag(b"VN", utils::SAM_VERSION);
    header.push_record(&hd);
    for (name, len) in distinct_references(context) {
        let mut sq = HeaderRecord::new(b"SQ");
        sq.push_tag(b"SN", name);
        sq.push_tag(b"AS", name);
        sq.push_tag(b"LN", len);
        header.push_record(&sq);
    }
    header
}

/// Header text, one line per record
pub fn header_lines(context: &GenerationContext) -> Vec<String> {
    String::from_utf8_lossy(&build_header(context).to_bytes())
        .lines()
        .map(|line| line.to_string())
        .collect()
}

/// Write the reference-name config file: each distinct reference name mapped
/// to itself, one tab-separated pair per line. The file is created or truncated.
pub fn write_config_file(path: &Path, context: &GenerationContext) -> Result<()> {
    let file_handle = File::create(path)?;
    let mut writer = BufWriter::new(file_handle);
    for (name, _) in distinct_references(context) {
        writeln!(writer, "{}\t{}", name, name)?;
    }
    writer.flush()?;
    info!("Config written to {}", path.display());
    Ok(())
}

/// Emit the generated template: config file if requested, then the optional
/// header, then one SAM line per mate.
pub fn write_results<W: Write>(context: &GenerationContext, header: bool, out: &mut W) -> Result<()> {
    if let Some(config_path) = &context.config_path {
        write_config_file(config_path, context)?;
    }
    if header {
        out.write_all(&build_header(context).to_bytes())?;
        writeln!(out)?;
    }
    for alignment in context.alignments() {
        let sam = alignment.sam.as_ref().ok_or(SamlineError::Incomplete {
            mate: alignment.mate_index + 1,
            stage: "SAM record",
        })?;
        writeln!(out, "{}", sam)?;
    }
    out.flush()?;
    Ok(())
}
