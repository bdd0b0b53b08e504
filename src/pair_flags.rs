use crate::containers::AlignmentDescriptor;

/// template having multiple segments in sequencing
pub const FLAG_PAIRED: u16 = 0x001;
/// each segment properly aligned according to the aligner
pub const FLAG_PROPER_PAIR: u16 = 0x002;
pub const FLAG_UNMAPPED: u16 = 0x004;
pub const FLAG_MATE_UNMAPPED: u16 = 0x008;
pub const FLAG_REVERSE: u16 = 0x010;
pub const FLAG_MATE_REVERSE: u16 = 0x020;
pub const FLAG_FIRST_IN_TEMPLATE: u16 = 0x040;
pub const FLAG_LAST_IN_TEMPLATE: u16 = 0x080;
pub const FLAG_SECONDARY: u16 = 0x100;
pub const FLAG_QC_FAIL: u16 = 0x200;
pub const FLAG_DUPLICATE: u16 = 0x400;

/// Every flag bit this tool knows about with its human-readable meaning, in bit order
pub const FLAG_DESCRIPTIONS: [(u16, &str); 11] = [
    (FLAG_PAIRED, "multiple fragments"),
    (FLAG_PROPER_PAIR, "each fragment properly aligned"),
    (FLAG_UNMAPPED, "this fragment is unmapped"),
    (FLAG_MATE_UNMAPPED, "next fragment is unmapped"),
    (FLAG_REVERSE, "this fragment is reversed"),
    (FLAG_MATE_REVERSE, "next fragment is reversed"),
    (FLAG_FIRST_IN_TEMPLATE, "this is the first fragment"),
    (FLAG_LAST_IN_TEMPLATE, "this is the last fragment"),
    (FLAG_SECONDARY, "this is a secondary alignment"),
    (FLAG_QC_FAIL, "this fragment did not pass quality controls"),
    (FLAG_DUPLICATE, "this is PCR or optical duplicate"),
];

/// Position of a mate within its template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MateOrder {
    First,
    Last,
}

/// Decide whether `alignment` is first or last in its template. The mate with
/// the smaller reference position comes first; on a tie the mate with the
/// lower index (mate 1) wins.
pub fn mate_order(alignment: &AlignmentDescriptor, partner: &AlignmentDescriptor) -> MateOrder {
    let own_key = (alignment.refpos, alignment.mate_index);
    let partner_key = (partner.refpos, partner.mate_index);
    if own_key < partner_key {
        MateOrder::First
    } else {
        MateOrder::Last
    }
}

/// Compute the SAM FLAG word for `alignment`. `partner` is `None` when only a
/// single fragment is being generated, in which case no pairing bits are set.
pub fn compute_flags(
    alignment: &AlignmentDescriptor,
    partner: Option<&AlignmentDescriptor>,
) -> u16 {
    let mut flags = 0;
    if alignment.properly_paired {
        flags |= FLAG_PROPER_PAIR;
    }
    if alignment.is_unmapped() {
        flags |= FLAG_UNMAPPED;
    }
    if alignment.reverse {
        flags |= FLAG_REVERSE;
    }
    if alignment.secondary {
        flags |= FLAG_SECONDARY;
    }
    if alignment.failed_qc {
        flags |= FLAG_QC_FAIL;
    }
    if alignment.duplicate {
        flags |= FLAG_DUPLICATE;
    }
    if let Some(partner) = partner {
        flags |= FLAG_PAIRED;
        if partner.is_unmapped() {
            flags |= FLAG_MATE_UNMAPPED;
        }
        if partner.reverse {
            flags |= FLAG_MATE_REVERSE;
        }
        flags |= match mate_order(alignment, partner) {
            MateOrder::First => FLAG_FIRST_IN_TEMPLATE,
            MateOrder::Last => FLAG_LAST_IN_TEMPLATE,
        };
    }
    flags
}

/// Observed template length shared by both records of a pair: the distance
/// from the leftmost mate start to the rightmost mate end. Zero unless both
/// mates are mapped.
pub fn template_length(first: &AlignmentDescriptor, second: &AlignmentDescriptor) -> i64 {
    if first.is_unmapped() || second.is_unmapped() {
        return 0;
    }
    let start = std::cmp::min(first.start(), second.start());
    let end = std::cmp::max(first.end(), second.end());
    end - start
}

/// RNEXT and PNEXT for `partner`: its reference name and position when it is
/// present and mapped, `*` and 0 otherwise.
pub fn mate_fields(partner: Option<&AlignmentDescriptor>) -> (&str, u64) {
    match partner {
        Some(partner) if !partner.is_unmapped() => (partner.refname.as_str(), partner.refpos),
        _ => ("*", 0),
    }
}

/// One line per set bit, e.g. `0x010 ... this fragment is reversed`
pub fn explain_flags(flags: u16) -> Vec<String> {
    FLAG_DESCRIPTIONS
        .iter()
        .filter(|(bit, _)| flags & bit == *bit)
        .map(|(bit, description)| format!("0x{:03x} ... {}", bit, description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::MateParams;

    fn create_test_alignment(index: usize, refpos: u64, cigar: &str) -> AlignmentDescriptor {
        let params = MateParams {
            refname: "chr1".to_string(),
            refpos,
            cigar: cigar.to_string(),
            ..MateParams::default()
        };
        AlignmentDescriptor::new(index, params).unwrap()
    }

    #[test]
    fn test_single_mapped_fragment_has_no_flags() {
        let alignment = create_test_alignment(0, 10_000, "50M");
        assert_eq!(compute_flags(&alignment, None), 0);
    }

    #[test]
    fn test_unmapped_bit_follows_position() {
        let unmapped = create_test_alignment(0, 0, "50M");
        assert_eq!(compute_flags(&unmapped, None), FLAG_UNMAPPED);

        let mapped = create_test_alignment(0, 1, "50M");
        assert_eq!(compute_flags(&mapped, None) & FLAG_UNMAPPED, 0);
    }

    #[test]
    fn test_attribute_bits_are_independent() {
        let mut alignment = create_test_alignment(0, 100, "50M");
        alignment.reverse = true;
        assert_eq!(compute_flags(&alignment, None), FLAG_REVERSE);

        alignment.reverse = false;
        alignment.secondary = true;
        assert_eq!(compute_flags(&alignment, None), FLAG_SECONDARY);

        alignment.secondary = false;
        alignment.failed_qc = true;
        alignment.duplicate = true;
        alignment.properly_paired = true;
        assert_eq!(
            compute_flags(&alignment, None),
            FLAG_QC_FAIL | FLAG_DUPLICATE | FLAG_PROPER_PAIR
        );
    }

    #[test]
    fn test_pair_first_and_last() {
        let mate1 = create_test_alignment(0, 1000, "50M");
        let mate2 = create_test_alignment(1, 1200, "50M");
        assert_eq!(compute_flags(&mate1, Some(&mate2)), FLAG_PAIRED | FLAG_FIRST_IN_TEMPLATE);
        assert_eq!(compute_flags(&mate2, Some(&mate1)), FLAG_PAIRED | FLAG_LAST_IN_TEMPLATE);
        assert_eq!(template_length(&mate1, &mate2), 250);

        // mate 2 upstream of mate 1 swaps the order
        let mate1 = create_test_alignment(0, 1200, "50M");
        let mate2 = create_test_alignment(1, 1000, "50M");
        assert_eq!(mate_order(&mate1, &mate2), MateOrder::Last);
        assert_eq!(mate_order(&mate2, &mate1), MateOrder::First);
    }

    #[test]
    fn test_pair_tie_goes_to_mate_one() {
        let mate1 = create_test_alignment(0, 500, "50M");
        let mate2 = create_test_alignment(1, 500, "50M");
        assert_eq!(mate_order(&mate1, &mate2), MateOrder::First);
        assert_eq!(mate_order(&mate2, &mate1), MateOrder::Last);
    }

    #[test]
    fn test_mate_bits() {
        let mut mate1 = create_test_alignment(0, 0, "50M");
        let mut mate2 = create_test_alignment(1, 300, "50M");
        mate1.reverse = true;
        mate2.reverse = true;
        // the unmapped mate has position 0 and therefore sorts first
        assert_eq!(
            compute_flags(&mate2, Some(&mate1)),
            FLAG_PAIRED | FLAG_MATE_UNMAPPED | FLAG_REVERSE | FLAG_MATE_REVERSE | FLAG_LAST_IN_TEMPLATE
        );
        assert_eq!(
            compute_flags(&mate1, Some(&mate2)),
            FLAG_PAIRED | FLAG_UNMAPPED | FLAG_REVERSE | FLAG_MATE_REVERSE | FLAG_FIRST_IN_TEMPLATE
        );
        assert_eq!(template_length(&mate1, &mate2), 0);
    }

    #[test]
    fn test_template_length_spans_both_mates() {
        // first mate extends past the second one
        let mate1 = create_test_alignment(0, 1000, "500M");
        let mate2 = create_test_alignment(1, 1100, "50M");
        assert_eq!(template_length(&mate1, &mate2), 500);
        assert_eq!(template_length(&mate2, &mate1), 500);

        let mate1 = create_test_alignment(0, 2000, "10M5D10M");
        let mate2 = create_test_alignment(1, 1000, "20M");
        assert_eq!(template_length(&mate1, &mate2), 2025 - 1000);
    }

    #[test]
    fn test_template_length_without_reference_span() {
        // both mapped, but clip-only CIGARs cover no reference
        let first = create_test_alignment(0, 500, "5S");
        let second = create_test_alignment(1, 500, "5S");
        assert_eq!(template_length(&first, &second), 0);
    }

    #[test]
    fn test_mate_fields() {
        let mapped = create_test_alignment(1, 300, "50M");
        assert_eq!(mate_fields(Some(&mapped)), ("chr1", 300));

        let unmapped = create_test_alignment(1, 0, "50M");
        assert_eq!(mate_fields(Some(&unmapped)), ("*", 0));
        assert_eq!(mate_fields(None), ("*", 0));
    }

    #[test]
    fn test_explain_flags() {
        let lines = explain_flags(0x51);
        assert_eq!(
            lines,
            vec![
                "0x001 ... multiple fragments",
                "0x010 ... this fragment is reversed",
                "0x040 ... this is the first fragment",
            ]
        );
        assert!(explain_flags(0).is_empty());
        assert_eq!(explain_flags(0x7ff).len(), 11);
    }
}
