pub mod codec;
pub mod compression;
pub mod error;
pub mod file;
pub mod memory;
pub mod stream;

pub use codec::{CodecError, DecodeStep, Decoder, EncodeStep, Encoder};
pub use compression::CompressionStream;
pub use error::{Result, StreamError};
pub use file::FileStream;
pub use memory::MemoryStream;
pub use stream::Stream;
