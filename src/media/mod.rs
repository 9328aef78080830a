//! External media collaborators: image search, speech synthesis and preview.
//!
//! Everything network- or display-facing lives here behind the traits in
//! [`backend`]. The rest of the crate is written against those traits and is
//! tested with the recording mocks in `backend::tests`.

pub mod backend;
pub mod preview;
pub mod tts;
pub mod web_search;

pub use backend::{ImageCandidate, ImageSearch, MediaError, Previewer, SpeechSynthesizer};
pub use preview::SystemPreviewer;
pub use tts::GoogleTts;
pub use web_search::{WebImageSearch, http_client};
