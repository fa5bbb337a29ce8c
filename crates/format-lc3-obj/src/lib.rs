//! LC-3 object image (.obj) parser.
//!
//! An object image is a flat sequence of big-endian 16-bit words grouped as
//! repeated segments: a two-word header `(origin, length)` followed by
//! `length` data words, concatenated until the input ends. There is no magic
//! number or checksum.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjError {
    /// Byte input does not split into whole 16-bit words.
    OddByteLength(usize),
    /// Input ended after a segment origin, before its length word.
    DanglingHeader { origin: u16 },
    /// A segment header promised more data words than remain.
    TruncatedSegment {
        origin: u16,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddByteLength(len) => {
                write!(f, "object image is {len} bytes, not a whole number of words")
            }
            Self::DanglingHeader { origin } => {
                write!(f, "segment at 0x{origin:04X} is missing its length word")
            }
            Self::TruncatedSegment {
                origin,
                expected,
                actual,
            } => write!(
                f,
                "segment at 0x{origin:04X} declares {expected} words but only {actual} remain",
            ),
        }
    }
}

impl std::error::Error for ObjError {}

/// One contiguous run of words with a load origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub origin: u16,
    pub words: Vec<u16>,
}

/// A parsed object image: the segment list in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjImage {
    segments: Vec<Segment>,
}

impl ObjImage {
    /// Parse an image from raw file bytes (big-endian word order).
    pub fn from_bytes(data: &[u8]) -> Result<Self, ObjError> {
        if data.len() % 2 != 0 {
            return Err(ObjError::OddByteLength(data.len()));
        }
        let words: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Self::from_words(&words)
    }

    /// Parse an image from an already-decoded word sequence.
    pub fn from_words(words: &[u16]) -> Result<Self, ObjError> {
        let mut segments = Vec::new();
        let mut i = 0;
        while i < words.len() {
            let origin = words[i];
            let Some(&length) = words.get(i + 1) else {
                return Err(ObjError::DanglingHeader { origin });
            };
            i += 2;
            let expected = usize::from(length);
            let actual = words.len() - i;
            if expected > actual {
                return Err(ObjError::TruncatedSegment {
                    origin,
                    expected,
                    actual,
                });
            }
            segments.push(Segment {
                origin,
                words: words[i..i + expected].to_vec(),
            });
            i += expected;
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total data words across all segments (headers excluded).
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }
}
