pub mod decoder;
pub mod frame;

pub use decoder::{DeltaPath, StreamDecoder};
pub use frame::FrameBuffer;
