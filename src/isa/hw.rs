use derive_more::Display;
use static_assertions::const_assert_eq;
use std::str::FromStr;

pub type Byte = u8;
pub type Word = i64;

pub const WORD_BYTES: usize = std::mem::size_of::<Word>();
const_assert_eq!(WORD_BYTES, 8);

/// The byte order words are written in. Nothing in the binary records which
/// one was used, so producer and consumer have to agree on it out-of-band.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    #[display(fmt = "little")]
    Little,
    #[display(fmt = "big")]
    Big,
    #[display(fmt = "native")]
    Native,
}

impl Default for ByteOrder {
    fn default() -> ByteOrder {
        ByteOrder::Little
    }
}

impl ByteOrder {
    /// Replaces `Native` with the order of the host we were compiled for.
    pub fn resolve(self) -> ByteOrder {
        match self {
            ByteOrder::Native if cfg!(target_endian = "big") => ByteOrder::Big,
            ByteOrder::Native => ByteOrder::Little,
            order => order,
        }
    }

    pub fn word_to_bytes(self, w: Word) -> [Byte; WORD_BYTES] {
        match self {
            ByteOrder::Little => w.to_le_bytes(),
            ByteOrder::Big => w.to_be_bytes(),
            ByteOrder::Native => w.to_ne_bytes(),
        }
    }

    pub fn word_from_bytes(self, bs: [Byte; WORD_BYTES]) -> Word {
        match self {
            ByteOrder::Little => Word::from_le_bytes(bs),
            ByteOrder::Big => Word::from_be_bytes(bs),
            ByteOrder::Native => Word::from_ne_bytes(bs),
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display(
    fmt = "unknown byte order '{}', expected one of: little, big, native",
    _0
)]
pub struct ParseByteOrderError(String);

impl std::error::Error for ParseByteOrderError {}

impl FromStr for ByteOrder {
    type Err = ParseByteOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(ByteOrder::Little),
            "big" | "be" => Ok(ByteOrder::Big),
            "native" | "host" => Ok(ByteOrder::Native),
            _ => Err(ParseByteOrderError(s.to_owned())),
        }
    }
}

pub fn words_to_bytes(words: &[Word], order: ByteOrder) -> Vec<Byte> {
    words
        .iter()
        .flat_map(|w| order.word_to_bytes(*w).to_vec())
        .collect()
}

// Returns none if the data is not a whole number of words.
pub fn bytes_to_words(bytes: &[Byte], order: ByteOrder) -> Option<Vec<Word>> {
    if bytes.len() % WORD_BYTES != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(WORD_BYTES)
            .map(|chunk| {
                let mut buff = [0; WORD_BYTES];
                buff.copy_from_slice(chunk);
                order.word_from_bytes(buff)
            })
            .collect(),
    )
}
