//! Playlist transfer between platforms

mod direction;
mod engine;
mod request;
mod result;

pub use direction::TransferDirection;
pub use engine::{
    ProgressCallback, TransferEngine, TransferEngineBuilder, TransferPhase, TransferProgress,
};
pub use request::TransferRequest;
pub use result::{DryRunResult, TransferResult};
