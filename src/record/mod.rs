//! FASTQ records and read identifiers
//!
//! Records are never collected: readers hand out [`RefRecord`]s that borrow their
//! internal line buffers and are invalidated by the next call.

mod ref_record;

use memchr::memchr2;

pub use ref_record::RefRecord;

/// Strip a trailing `\n` or `\r\n` from a line
pub fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// A line is blank if it holds nothing but whitespace
pub fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// The first whitespace delimited token of a header line, without its `@`/`>` marker
fn name_token(header: &[u8]) -> &[u8] {
    let header = trim_newline(header);
    let header = match header.first() {
        Some(b'@' | b'>') => &header[1..],
        _ => header,
    };
    match memchr2(b' ', b'\t', header) {
        Some(pos) => &header[..pos],
        None => header,
    }
}

/// The read identifier with its mate suffix removed.
///
/// Both mates of a pair share this key. Handles the classic `/1` and `/2`
/// suffixes as well as Casava 1.8 style headers where the mate number lives in
/// the comment (`@name 1:N:0:ATCACG`).
pub fn pair_key(header: &[u8]) -> &[u8] {
    let name = name_token(header);
    match name {
        [rest @ .., b'/', b'1' | b'2'] => rest,
        _ => name,
    }
}

/// The mate number (1 or 2) encoded in a header line, if any
pub fn mate_number(header: &[u8]) -> Option<u8> {
    if let [.., b'/', mate @ (b'1' | b'2')] = name_token(header) {
        return Some(mate - b'0');
    }

    // Casava 1.8: the comment starts with `<mate>:<filtered>:...`
    let header = trim_newline(header);
    let pos = memchr2(b' ', b'\t', header)?;
    match &header[pos + 1..] {
        [mate @ (b'1' | b'2'), b':', ..] => Some(mate - b'0'),
        _ => None,
    }
}
