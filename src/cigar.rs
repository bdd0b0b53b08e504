use core::fmt;
use rust_htslib::bam::record::Cigar;

use crate::errors::{Result, SamlineError};

/// An ordered, non-empty list of CIGAR operations, read left to right along
/// both the reference and the read.
///
/// `=` is accepted and kept as `Cigar::Equal`; `X` is the mismatch operation
/// (`Cigar::Diff`). Both belong to the match class together with `M`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CigarSequence(Vec<Cigar>);

impl CigarSequence {
    /// Parse `<length><op>` tokens. Every length must be a positive integer and
    /// every token must end with a known operation code.
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = |reason: String| SamlineError::MalformedCigar {
            cigar: text.to_string(),
            reason,
        };
        if text.is_empty() {
            return Err(malformed("empty CIGAR".to_string()));
        }

        let mut ops = Vec::new();
        let mut digits = String::new();
        for c in text.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if digits.is_empty() {
                return Err(malformed(format!("operation '{c}' has no length")));
            }
            let len: u32 = digits
                .parse()
                .map_err(|_| malformed(format!("length {digits} out of range")))?;
            if len == 0 {
                return Err(malformed(format!("zero-length operation '{c}'")));
            }
            let op = cigar_from_code(c, len)
                .ok_or_else(|| malformed(format!("unknown operation code '{c}'")))?;
            ops.push(op);
            digits.clear();
        }
        if !digits.is_empty() {
            return Err(malformed(format!("trailing length {digits} without operation")));
        }
        Ok(CigarSequence(ops))
    }

    pub fn ops(&self) -> &[Cigar] {
        &self.0
    }

    /// Bases of reference covered by the alignment
    pub fn reference_len(&self) -> usize {
        self.0.iter().map(get_cigarseg_ref_offset).sum()
    }

    /// Bases of the read, soft clips included and hard clips excluded
    pub fn read_len(&self) -> usize {
        self.0.iter().map(get_cigarseg_read_offset).sum()
    }

    pub fn insert_len(&self) -> usize {
        self.0
            .iter()
            .map(|c| match c {
                Cigar::Ins(len) => *len as usize,
                _ => 0,
            })
            .sum()
    }

    /// Collapse every run of adjacent M/=/X operations into one M operation of
    /// the run's total length. Other operations pass through in order.
    pub fn merged(&self) -> Self {
        let mut merged: Vec<Cigar> = Vec::with_capacity(self.0.len());
        for op in self.0.iter() {
            if let Some(len) = match_class_len(op) {
                if let Some(Cigar::Match(prev_len)) = merged.last_mut() {
                    *prev_len += len;
                    continue;
                }
                merged.push(Cigar::Match(len));
            } else {
                merged.push(*op);
            }
        }
        CigarSequence(merged)
    }
}

impl fmt::Display for CigarSequence {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.0.iter() {
            write!(formatter, "{}", op)?;
        }
        Ok(())
    }
}

fn cigar_from_code(code: char, len: u32) -> Option<Cigar> {
    let op = match code {
        'M' => Cigar::Match(len),
        '=' => Cigar::Equal(len),
        'X' => Cigar::Diff(len),
        'I' => Cigar::Ins(len),
        'D' => Cigar::Del(len),
        'N' => Cigar::RefSkip(len),
        'S' => Cigar::SoftClip(len),
        'H' => Cigar::HardClip(len),
        'P' => Cigar::Pad(len),
        _ => return None,
    };
    Some(op)
}

fn match_class_len(c: &Cigar) -> Option<u32> {
    match c {
        Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => Some(*len),
        _ => None,
    }
}

pub(crate) fn get_cigarseg_ref_offset(c: &Cigar) -> usize {
    use Cigar::*;
    match c {
        Del(len) | RefSkip(len) | Diff(len) | Equal(len) | Match(len) => *len as usize,
        _ => 0,
    }
}

pub(crate) fn get_cigarseg_read_offset(c: &Cigar) -> usize {
    use Cigar::*;
    match c {
        Ins(len) | SoftClip(len) | Diff(len) | Equal(len) | Match(len) => *len as usize,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cigar() {
        let cigar = CigarSequence::parse("5S10M2I3X1D4=7N2H1P").unwrap();
        assert_eq!(
            cigar.ops(),
            &[
                Cigar::SoftClip(5),
                Cigar::Match(10),
                Cigar::Ins(2),
                Cigar::Diff(3),
                Cigar::Del(1),
                Cigar::Equal(4),
                Cigar::RefSkip(7),
                Cigar::HardClip(2),
                Cigar::Pad(1),
            ]
        );
    }

    #[test]
    fn test_parse_malformed_cigar() {
        for bad in ["", "50X9", "M", "10M5", "0M", "10Q", "10M-5I", "99999999999M"] {
            match CigarSequence::parse(bad) {
                Err(SamlineError::MalformedCigar { cigar, .. }) => assert_eq!(cigar, bad),
                other => panic!("expected MalformedCigar for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_lengths() {
        let cigar = CigarSequence::parse("5S10M2I3X1D4=7N2H").unwrap();
        // M + X + D + = + N
        assert_eq!(cigar.reference_len(), 10 + 3 + 1 + 4 + 7);
        // S + M + I + X + =
        assert_eq!(cigar.read_len(), 5 + 10 + 2 + 3 + 4);
        assert_eq!(cigar.insert_len(), 2);

        let simple = CigarSequence::parse("50M").unwrap();
        assert_eq!(simple.reference_len(), 50);
        assert_eq!(simple.read_len(), 50);
        assert_eq!(simple.insert_len(), 0);
    }

    #[test]
    fn test_merged_collapses_match_runs() {
        let cigar = CigarSequence::parse("10M2X3=4I5M1X").unwrap();
        let merged = cigar.merged();
        assert_eq!(merged.to_string(), "15M4I6M");
        // merging does not touch the source sequence
        assert_eq!(cigar.to_string(), "10M2X3=4I5M1X");
        assert_eq!(merged.read_len(), cigar.read_len());
        assert_eq!(merged.reference_len(), cigar.reference_len());
    }

    #[test]
    fn test_merged_is_idempotent() {
        for text in ["50M", "10M2X3=4I5M1X", "3S2X2X1D1=4H", "1I1X1I"] {
            let once = CigarSequence::parse(text).unwrap().merged();
            assert_eq!(once.merged(), once);
        }
    }

    #[test]
    fn test_render_round_trip() {
        for text in ["50M", "10M2I10M", "5S20M3D1N10M2S", "2H3X1=4I1P"] {
            let cigar = CigarSequence::parse(text).unwrap();
            assert_eq!(cigar.to_string(), text);
            assert_eq!(CigarSequence::parse(&cigar.to_string()).unwrap(), cigar);

            let merged = cigar.merged();
            assert_eq!(CigarSequence::parse(&merged.to_string()).unwrap(), merged);
        }
    }
}
