use crate::containers::{AlignmentDescriptor, GenerationContext};
use crate::errors::{Result, SamlineError};
use crate::utils::yes_no;

fn alignment_details(alignment: &AlignmentDescriptor) -> Vec<String> {
    let or_empty = |value: &Option<String>| value.clone().unwrap_or_default();
    vec![
        format!("REFNAME  : {}", alignment.refname),
        format!("REFPOS   : {}", alignment.refpos),
        format!("CIGAR    : {}", alignment.cigar_str),
        format!("MAPQ     : {}", alignment.mapq),
        format!("REVERSE  : {}", yes_no(alignment.reverse)),
        format!("SECONDARY: {}", yes_no(alignment.secondary)),
        format!("BAD      : {}", yes_no(alignment.failed_qc)),
        format!("DUPLICATE: {}", yes_no(alignment.duplicate)),
        format!("PROPERLY : {}", yes_no(alignment.properly_paired)),
        format!("REFLEN   : {}", alignment.reflen),
        format!("READLEN  : {}", alignment.cigar.read_len()),
        format!("INSLEN   : {}", alignment.cigar.insert_len()),
        format!("REFBASES : {}", or_empty(&alignment.ref_bases)),
        format!("READ     : {}", or_empty(&alignment.read)),
        format!("SAM      : {}", or_empty(&alignment.sam)),
    ]
}

/// Every computed field of the template, one `NAME : value` line each.
/// Pairs list both mates under an `ALIGNMENT #n` banner.
pub fn show_details(context: &GenerationContext) -> Vec<String> {
    let config = context
        .config_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    let mut lines = vec![
        format!("QNAME    : {}", context.qname),
        format!("INSBASES : {}", context.insbases),
        format!("TLEN     : {}", context.tlen),
        format!("CONFIG   : {}", config),
    ];
    if context.is_paired() {
        for alignment in context.alignments() {
            lines.push(format!("----- ALIGNMENT #{} -----", alignment.mate_index + 1));
            lines.extend(alignment_details(alignment));
        }
    } else {
        lines.extend(alignment_details(&context.first));
    }
    lines
}

/// Same content as `show_details` as pretty JSON
pub fn details_json(context: &GenerationContext) -> Result<String> {
    Ok(serde_json::to_string_pretty(context)?)
}

/// Reference window covered by mate 1
pub fn ref_bases(context: &GenerationContext) -> Result<&str> {
    context
        .first
        .ref_bases
        .as_deref()
        .ok_or(SamlineError::Incomplete {
            mate: 1,
            stage: "reference bases",
        })
}
