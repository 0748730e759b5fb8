//! Speech-to-text seam: transcriber trait, backend selection, and the
//! per-session accumulation buffer.

pub mod backend;
pub mod buffer;
pub mod transcriber;

pub use backend::{
    MockTranscriberFactory, RuntimeMode, SttBackend, TranscriberFactory,
    UnavailableTranscriberFactory,
};
pub use buffer::{TranscriptionBuffer, TranscriptionBufferConfig};
pub use transcriber::{MockTranscriber, Transcriber};
