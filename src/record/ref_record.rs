use super::{pair_key, trim_newline};

/// A borrowed four-line FASTQ record.
///
/// Each field holds the raw line as read from the stream, including its line
/// terminator, so that writing the record back out reproduces the input bytes.
/// The accessors return the line contents with the terminator removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefRecord<'a> {
    /// The identifier line (`@...`)
    id: &'a [u8],

    /// The residue line
    sequence: &'a [u8],

    /// The separator line (`+...`)
    separator: &'a [u8],

    /// The quality line
    quality: &'a [u8],
}
impl<'a> RefRecord<'a> {
    pub fn new(id: &'a [u8], sequence: &'a [u8], separator: &'a [u8], quality: &'a [u8]) -> Self {
        Self {
            id,
            sequence,
            separator,
            quality,
        }
    }

    pub fn id(&self) -> &'a [u8] {
        trim_newline(self.id)
    }

    pub fn sequence(&self) -> &'a [u8] {
        trim_newline(self.sequence)
    }

    pub fn separator(&self) -> &'a [u8] {
        trim_newline(self.separator)
    }

    pub fn quality(&self) -> &'a [u8] {
        trim_newline(self.quality)
    }

    /// The base read identifier shared by both mates of a pair
    pub fn pair_key(&self) -> &'a [u8] {
        pair_key(self.id())
    }

    /// The raw lines in record order, terminators included
    pub fn lines(&self) -> [&'a [u8]; 4] {
        [self.id, self.sequence, self.separator, self.quality]
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_accessors_strip_terminators() {
        let record = RefRecord::new(b"@r1/1\n", b"ACGT\r\n", b"+\n", b"IIII");
        assert_eq!(record.id(), b"@r1/1");
        assert_eq!(record.sequence(), b"ACGT");
        assert_eq!(record.separator(), b"+");
        assert_eq!(record.quality(), b"IIII");
        assert_eq!(record.pair_key(), b"r1");
        assert_eq!(record.lines()[1], b"ACGT\r\n");
    }
}
