pub mod disasm;
pub mod phases;
pub mod serialize;

pub use phases::types::{Error, Loc, Located};

use crate::isa::hw::{Byte, ByteOrder, Word};
use log::info;
use serialize::Serializer;

pub fn assemble(source: &str) -> Result<Vec<Word>, Error> {
    let pre = phases::preprocess(source);
    let encoded = phases::encode(&pre)?;
    let words = phases::validate(encoded)?;

    info!("assembled {} word(s)", words.len());
    Ok(words)
}

pub fn assemble_bytes(source: &str, order: ByteOrder) -> Result<Vec<Byte>, Error> {
    Ok(Serializer::new(order).to_bytes(&assemble(source)?))
}
