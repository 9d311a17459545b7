pub mod bridge;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod mezzo;
pub mod panel;
pub mod volume;
pub mod zones;


// Re-export the types most callers need
pub use bridge::{Bridge, BridgeConfig, FrameObserver};
pub use decoder::FrameDecoder;
pub use error::BridgeError;
pub use frame::{Command, Frame};
