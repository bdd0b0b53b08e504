pub mod cigar;
pub mod cli;
pub mod containers;
pub mod details;
pub mod errors;
pub mod pair_flags;
pub mod read_synthesizer;
pub mod reference;
pub mod sam_writer;
pub mod utils;
