use crate::isa::hw::{self, Byte, ByteOrder, Word, WORD_BYTES};
use derive_more::Constructor;
use log::debug;
use std::io::{self, Write};

/// Writes a word stream as a flat run of fixed-width words, with no header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct Serializer {
    order: ByteOrder,
}

impl Serializer {
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn to_bytes(&self, words: &[Word]) -> Vec<Byte> {
        hw::words_to_bytes(words, self.order)
    }

    pub fn write<W: Write>(&self, words: &[Word], sink: &mut W) -> io::Result<()> {
        debug!(
            "writing {} word(s), {} byte(s), {} endian",
            words.len(),
            words.len() * WORD_BYTES,
            self.order
        );

        for w in words {
            sink.write_all(&self.order.word_to_bytes(*w))?;
        }
        sink.flush()
    }
}
