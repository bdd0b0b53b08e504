use log::debug;
use rust_htslib::faidx;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::errors::{Result, SamlineError};

/// Bases covered by one alignment plus the full length of the sequence they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefWindow {
    pub bases: Vec<u8>,
    pub total_len: u64,
}

/// Lookup of reference bases by sequence name and 0-based start.
///
/// A missing sequence name is always `ReferenceNotFound`. A window that runs
/// off the end of the sequence is returned truncated; the read synthesizer
/// reports it as too short.
pub trait ReferenceSource {
    fn fetch_bases(&self, name: &str, start: u64, len: usize) -> Result<RefWindow>;
}

/// Indexed FASTA reference. A missing `.fai` index is built by htslib on open.
pub struct FastaReference {
    reader: faidx::Reader,
    path: String,
    seq_names: HashSet<String>,
}

impl FastaReference {
    pub fn from_path(path: &Path) -> Result<Self> {
        let path_str = path.display().to_string();
        let fasta_error = |reason: String| SamlineError::Fasta {
            path: path_str.clone(),
            reason,
        };
        if !path.is_file() {
            return Err(fasta_error("file does not exist".to_string()));
        }
        let reader = faidx::Reader::from_path(path).map_err(|e| fasta_error(e.to_string()))?;
        let seq_names: HashSet<String> = reader
            .seq_names()
            .map_err(|e| fasta_error(e.to_string()))?
            .into_iter()
            .collect();
        debug!("Loaded index for {} with {} sequences", path_str, seq_names.len());
        Ok(FastaReference {
            reader,
            path: path_str,
            seq_names,
        })
    }
}

impl ReferenceSource for FastaReference {
    fn fetch_bases(&self, name: &str, start: u64, len: usize) -> Result<RefWindow> {
        if !self.seq_names.contains(name) {
            return Err(SamlineError::ReferenceNotFound {
                name: name.to_string(),
            });
        }
        let total_len = self.reader.fetch_seq_len(name);
        if len == 0 || start >= total_len {
            return Ok(RefWindow {
                bases: Vec::new(),
                total_len,
            });
        }
        // faidx takes an inclusive end
        let begin = start as usize;
        let end = begin + len - 1;
        let bases = self
            .reader
            .fetch_seq_string(name, begin, end)
            .map_err(|e| SamlineError::Fasta {
                path: self.path.clone(),
                reason: e.to_string(),
            })?
            .into_bytes();
        debug!("Fetched {}:{}-{} ({} bases)", name, begin, end, bases.len());
        Ok(RefWindow { bases, total_len })
    }
}

/// Reference held entirely in memory, keyed by sequence name
#[derive(Debug, Default, Clone)]
pub struct InMemoryReference {
    seqs: HashMap<String, Vec<u8>>,
}

impl InMemoryReference {
    pub fn new() -> Self {
        InMemoryReference::default()
    }

    pub fn with_sequence(mut self, name: &str, bases: &[u8]) -> Self {
        self.seqs.insert(name.to_string(), bases.to_vec());
        self
    }
}

impl ReferenceSource for InMemoryReference {
    fn fetch_bases(&self, name: &str, start: u64, len: usize) -> Result<RefWindow> {
        let seq = self
            .seqs
            .get(name)
            .ok_or_else(|| SamlineError::ReferenceNotFound {
                name: name.to_string(),
            })?;
        let begin = std::cmp::min(start as usize, seq.len());
        let end = std::cmp::min(begin + len, seq.len());
        Ok(RefWindow {
            bases: seq[begin..end].to_vec(),
            total_len: seq.len() as u64,
        })
    }
}
