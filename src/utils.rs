/// Reference used for mate 1 when none is given
pub const DEFAULT_REFNAME: &str = "NC_011752.1";

/// 0-based reference position for mate 1. Mate 2 defaults to 0, which means
/// no mate is generated.
pub const DEFAULT_REFPOS: u64 = 10_000;

pub const DEFAULT_CIGAR: &str = "50M";

/// Bases drawn for insertion operations
pub const DEFAULT_INSBASES: &str = "ACGTACGTACGT";

pub const DEFAULT_MAPQ: u8 = 20;

pub const DEFAULT_QNAME: &str = "1";

/// Base written for every soft-clipped read position
pub const SOFT_CLIP_FILLER: u8 = b'N';

/// Printable phred+33 quality characters, `!` through `~`
pub const MIN_QUALITY_CHAR: u8 = b'!';
pub const MAX_QUALITY_CHAR: u8 = b'~';

pub const SAM_VERSION: &str = "1.3";

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}
