pub mod export;
pub mod recording;
