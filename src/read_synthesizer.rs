use log::debug;
use rust_htslib::bam::record::Cigar;

use crate::cigar::CigarSequence;
use crate::errors::{Result, SamlineError};
use crate::utils::SOFT_CLIP_FILLER;

/// How insertion bases are drawn from the insert pool once it runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPolicy {
    /// Keep cycling through the pool from where the last insertion stopped
    #[default]
    Wrap,
    /// Fail with `InsertPoolExhausted` once every pool base has been used
    Exhaust,
}

/// Build the read a sequencer would have produced for `cigar` aligned against
/// `ref_window`, which starts at the alignment's first reference base.
///
/// * M/=/X copy bases from the window and advance the reference cursor
/// * I copies bases from `insert_pool`; the pool cursor carries over between
///   insertion operations
/// * D/N only advance the reference cursor
/// * S emits `SOFT_CLIP_FILLER` bases, H and P emit nothing
///
/// The result is always exactly `cigar.read_len()` bases long.
pub fn synthesize(
    cigar: &CigarSequence,
    ref_window: &[u8],
    insert_pool: &[u8],
    policy: InsertPolicy,
) -> Result<Vec<u8>> {
    use Cigar::*;

    let mut read = Vec::with_capacity(cigar.read_len());
    let mut ref_pos = 0;
    let mut pool_pos = 0;

    for op in cigar.ops().iter() {
        match op {
            Match(len) | Equal(len) | Diff(len) => {
                let end = ref_pos + *len as usize;
                check_window(end, ref_window.len())?;
                read.extend_from_slice(&ref_window[ref_pos..end]);
                ref_pos = end;
            }
            Del(len) | RefSkip(len) => {
                let end = ref_pos + *len as usize;
                check_window(end, ref_window.len())?;
                ref_pos = end;
            }
            Ins(len) => {
                let len = *len as usize;
                if insert_pool.is_empty()
                    || (policy == InsertPolicy::Exhaust && pool_pos + len > insert_pool.len())
                {
                    return Err(SamlineError::InsertPoolExhausted {
                        needed: pool_pos + len,
                        available: insert_pool.len(),
                    });
                }
                for _ in 0..len {
                    read.push(insert_pool[pool_pos % insert_pool.len()]);
                    pool_pos += 1;
                }
            }
            SoftClip(len) => {
                read.extend(std::iter::repeat(SOFT_CLIP_FILLER).take(*len as usize));
            }
            HardClip(_) | Pad(_) => {}
        }
    }
    debug!(
        "Synthesized {} read bases from {} reference bases",
        read.len(),
        ref_pos
    );
    Ok(read)
}

fn check_window(needed: usize, available: usize) -> Result<()> {
    if needed > available {
        return Err(SamlineError::ReferenceWindowTooShort { needed, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth(cigar: &str, window: &str, pool: &str, policy: InsertPolicy) -> Result<String> {
        let cigar = CigarSequence::parse(cigar).unwrap();
        synthesize(&cigar, window.as_bytes(), pool.as_bytes(), policy)
            .map(|read| String::from_utf8(read).unwrap())
    }

    #[test]
    fn test_match_copies_reference() {
        let window = "A".repeat(50);
        let read = synth("50M", &window, "", InsertPolicy::Wrap).unwrap();
        assert_eq!(read, window);
    }

    #[test]
    fn test_insertion_between_matches() {
        let window = "ACGTACGTACTTGGCCAATT";
        let read = synth("10M2I10M", window, "GG", InsertPolicy::Wrap).unwrap();
        assert_eq!(read, "ACGTACGTAC".to_string() + "GG" + "TTGGCCAATT");
        assert_eq!(read.len(), 22);
    }

    #[test]
    fn test_deletion_and_skip_consume_reference_only() {
        let window = "AAAACCCGGGGTTTT";
        let read = synth("4M3D4M2N2M", window, "", InsertPolicy::Wrap).unwrap();
        assert_eq!(read, "AAAAGGGGTT");
    }

    #[test]
    fn test_clips_and_padding() {
        let window = "ACGTACGT";
        let read = synth("3H2S8M1P3S2H", window, "", InsertPolicy::Wrap).unwrap();
        assert_eq!(read, "NNACGTACGTNNN");
    }

    #[test]
    fn test_insert_pool_wraps() {
        let window = "CCCCCC";
        let read = synth("2M3I2M2I2M", window, "AGT", InsertPolicy::Wrap).unwrap();
        // pool cursor continues from the first insertion: AGT, then AG
        assert_eq!(read, "CCAGTCCAGCC");
    }

    #[test]
    fn test_insert_pool_exhausted() {
        let window = "CCCCCC";
        let result = synth("2M3I2M2I2M", window, "AGT", InsertPolicy::Exhaust);
        assert!(matches!(
            result,
            Err(SamlineError::InsertPoolExhausted { needed: 5, available: 3 })
        ));

        // an empty pool cannot wrap either
        let result = synth("2M1I2M", window, "", InsertPolicy::Wrap);
        assert!(matches!(result, Err(SamlineError::InsertPoolExhausted { .. })));

        // exact fit is allowed
        let read = synth("2M3I", window, "AGT", InsertPolicy::Exhaust).unwrap();
        assert_eq!(read, "CCAGT");
    }

    #[test]
    fn test_reference_window_too_short() {
        let result = synth("50M", "ACGT", "", InsertPolicy::Wrap);
        assert!(matches!(
            result,
            Err(SamlineError::ReferenceWindowTooShort { needed: 50, available: 4 })
        ));

        let result = synth("2M5D", "ACGT", "", InsertPolicy::Wrap);
        assert!(matches!(
            result,
            Err(SamlineError::ReferenceWindowTooShort { needed: 7, available: 4 })
        ));
    }

    #[test]
    fn test_read_length_matches_cigar() {
        let window = "ACGT".repeat(20);
        for text in ["50M", "10M2I10M", "5S20M3D1N10M2S", "2H3X1=4I1P", "7I", "1S1I1S"] {
            let cigar = CigarSequence::parse(text).unwrap();
            let read =
                synthesize(&cigar, window.as_bytes(), b"ACGTACGTACGT", InsertPolicy::Wrap).unwrap();
            assert_eq!(read.len(), cigar.read_len(), "{text}");
        }
    }
}
