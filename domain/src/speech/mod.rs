//! Speech synthesis domain: voices, speech models and audio clips.

pub mod value_objects;

pub use value_objects::{AudioClip, SpeechModel, SpeechRequest, Voice};
