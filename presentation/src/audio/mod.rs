//! Audio export and playback for synthesized replies

mod player;

pub use player::{AudioError, play_clip, save_clip};
