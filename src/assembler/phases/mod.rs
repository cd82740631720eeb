pub mod types;

pub mod encode;
pub mod preprocess;
pub mod tokenize;
pub mod validate;

pub use encode::encode;
pub use preprocess::preprocess;
pub use tokenize::tokenize;
pub use validate::validate;
