pub mod classifier;
pub mod intent;

pub use classifier::classify;
pub use intent::{ChannelIntent, IntentCell, SharedIntents, TriState, VolumeIntent};
