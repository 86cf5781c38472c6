mod fastq;
mod lines;

pub use fastq::FastqReader;
pub use lines::{normalize_file, strip_blank_lines, LineReader};
