pub mod recording;

pub use recording::{RecordedCall, RecordingDriver};
