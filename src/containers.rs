use log::debug;
use serde_derive::Serialize;
use std::path::PathBuf;

use crate::cigar::CigarSequence;
use crate::errors::{Result, SamlineError};
use crate::pair_flags;
use crate::read_synthesizer::{self, InsertPolicy};
use crate::reference::ReferenceSource;
use crate::sam_writer::{self, QualityGenerator};
use crate::utils;

/// Raw per-mate parameters as they come from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MateParams {
    pub refname: String,
    /// 0-based start, 0 means unmapped
    pub refpos: u64,
    pub cigar: String,
    pub mapq: u8,
    pub reverse: bool,
    pub secondary: bool,
    pub duplicate: bool,
    pub failed_qc: bool,
    pub properly_paired: bool,
}

impl Default for MateParams {
    fn default() -> Self {
        MateParams {
            refname: utils::DEFAULT_REFNAME.to_string(),
            refpos: utils::DEFAULT_REFPOS,
            cigar: utils::DEFAULT_CIGAR.to_string(),
            mapq: utils::DEFAULT_MAPQ,
            reverse: false,
            secondary: false,
            duplicate: false,
            failed_qc: false,
            properly_paired: false,
        }
    }
}

/// What the binary does with the generated context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Generate,
    ShowDetails,
    RefOnly,
    ExplainFlags(u16),
}

/// Immutable settings for one run, built once from the parsed arguments
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub qname: String,
    pub insbases: String,
    pub insert_policy: InsertPolicy,
    pub config_path: Option<PathBuf>,
    pub header: bool,
    pub seed: Option<u64>,
    pub mode: Mode,
    pub first: MateParams,
    /// Present only when a mate with a non-zero position was requested
    pub second: Option<MateParams>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            qname: utils::DEFAULT_QNAME.to_string(),
            insbases: utils::DEFAULT_INSBASES.to_string(),
            insert_policy: InsertPolicy::default(),
            config_path: None,
            header: false,
            seed: None,
            mode: Mode::Generate,
            first: MateParams::default(),
            second: None,
        }
    }
}

/// One mate: its parameters and everything derived from them
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentDescriptor {
    /// 0 for mate 1, 1 for mate 2
    pub mate_index: usize,
    pub refname: String,
    pub refpos: u64,
    pub cigar_str: String,
    #[serde(skip_serializing)]
    pub cigar: CigarSequence,
    pub mapq: u8,
    pub reverse: bool,
    pub secondary: bool,
    pub duplicate: bool,
    pub failed_qc: bool,
    pub properly_paired: bool,
    pub reflen: usize,

    /// Length of the whole reference sequence, known once bases are fetched
    pub bases_in_ref: u64,
    pub ref_bases: Option<String>,
    pub read: Option<String>,
    pub sam: Option<String>,
}

impl AlignmentDescriptor {
    pub fn new(mate_index: usize, params: MateParams) -> Result<Self> {
        if i64::try_from(params.refpos).is_err() {
            return Err(SamlineError::Config(format!(
                "mate {} position {} exceeds {}",
                mate_index + 1,
                params.refpos,
                i64::MAX
            )));
        }
        let cigar = CigarSequence::parse(&params.cigar)?;
        let reflen = cigar.reference_len();
        debug!(
            "Mate {}: CIGAR {} covers {} reference bases",
            mate_index + 1,
            cigar,
            reflen
        );
        Ok(AlignmentDescriptor {
            mate_index,
            refname: params.refname,
            refpos: params.refpos,
            cigar_str: params.cigar,
            cigar,
            mapq: params.mapq,
            reverse: params.reverse,
            secondary: params.secondary,
            duplicate: params.duplicate,
            failed_qc: params.failed_qc,
            properly_paired: params.properly_paired,
            reflen,
            bases_in_ref: 0,
            ref_bases: None,
            read: None,
            sam: None,
        })
    }

    pub fn is_unmapped(&self) -> bool {
        self.refpos == 0
    }

    pub fn start(&self) -> i64 {
        self.refpos as i64
    }

    /// Reference position just past the last covered base
    pub fn end(&self) -> i64 {
        self.start() + self.reflen as i64
    }

    pub fn fetch_ref_bases(&mut self, reference: &dyn ReferenceSource) -> Result<()> {
        let window = reference.fetch_bases(&self.refname, self.refpos, self.reflen)?;
        self.bases_in_ref = window.total_len;
        self.ref_bases = Some(String::from_utf8_lossy(&window.bases).into_owned());
        Ok(())
    }

    pub fn synthesize_read(&mut self, insbases: &str, policy: InsertPolicy) -> Result<()> {
        let ref_bases = self.ref_bases.as_ref().ok_or(SamlineError::Incomplete {
            mate: self.mate_index + 1,
            stage: "reference bases",
        })?;
        let read = read_synthesizer::synthesize(
            &self.cigar,
            ref_bases.as_bytes(),
            insbases.as_bytes(),
            policy,
        )?;
        self.read = Some(String::from_utf8_lossy(&read).into_owned());
        Ok(())
    }
}

/// A query template: one or two mates plus the values they share
#[derive(Debug, Clone, Serialize)]
pub struct GenerationContext {
    pub qname: String,
    pub insbases: String,
    pub config_path: Option<PathBuf>,
    pub first: AlignmentDescriptor,
    pub second: Option<AlignmentDescriptor>,
    /// Non-zero only for a pair where both mates are mapped
    pub tlen: i64,
}

impl GenerationContext {
    /// Run every stage for both mates: parse, fetch, synthesize, pair, render.
    /// Mate 2 inherits mate 1's reference name unless it has its own. Nothing
    /// is returned unless every stage succeeds for every mate.
    pub fn build(
        config: &GenerationConfig,
        reference: &dyn ReferenceSource,
        quality_generator: &mut QualityGenerator,
    ) -> Result<Self> {
        let mut first = AlignmentDescriptor::new(0, config.first.clone())?;
        let mut second = match &config.second {
            Some(params) => Some(AlignmentDescriptor::new(1, params.clone())?),
            None => None,
        };

        first.fetch_ref_bases(reference)?;
        first.synthesize_read(&config.insbases, config.insert_policy)?;
        if let Some(second) = second.as_mut() {
            second.fetch_ref_bases(reference)?;
            second.synthesize_read(&config.insbases, config.insert_policy)?;
        }

        let tlen = match &second {
            Some(second) => pair_flags::template_length(&first, second),
            None => 0,
        };
        debug!("Template length: {}", tlen);

        let mut context = GenerationContext {
            qname: config.qname.clone(),
            insbases: config.insbases.clone(),
            config_path: config.config_path.clone(),
            first,
            second,
            tlen,
        };
        context.render_records(quality_generator)?;
        Ok(context)
    }

    fn render_records(&mut self, quality_generator: &mut QualityGenerator) -> Result<()> {
        let first_sam = sam_writer::render_record(
            &self.qname,
            &self.first,
            self.second.as_ref(),
            self.tlen,
            quality_generator,
        )?;
        let second_sam = match self.second.as_ref() {
            Some(second) => Some(sam_writer::render_record(
                &self.qname,
                second,
                Some(&self.first),
                self.tlen,
                quality_generator,
            )?),
            None => None,
        };
        self.first.sam = Some(first_sam);
        if let (Some(second), Some(sam)) = (self.second.as_mut(), second_sam) {
            second.sam = Some(sam);
        }
        Ok(())
    }

    pub fn is_paired(&self) -> bool {
        self.second.is_some()
    }

    /// Mates in output order
    pub fn alignments(&self) -> impl Iterator<Item = &AlignmentDescriptor> {
        std::iter::once(&self.first).chain(self.second.iter())
    }
}
