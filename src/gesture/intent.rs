use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};

/// Volume decision for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VolumeIntent {
    Increase,
    Decrease,
    #[default]
    NoChange,
}

/// Channel decision for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelIntent {
    Up,
    Down,
    #[default]
    NoChange,
}

/// Tri-state value that fits in one byte, so it can live in an atomic cell.
pub trait TriState: Copy + Default {
    fn to_raw(self) -> u8;
    fn from_raw(raw: u8) -> Self;
}

impl TriState for VolumeIntent {
    fn to_raw(self) -> u8 {
        match self {
            Self::NoChange => 0,
            Self::Increase => 1,
            Self::Decrease => 2,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Increase,
            2 => Self::Decrease,
            _ => Self::NoChange,
        }
    }
}

impl TriState for ChannelIntent {
    fn to_raw(self) -> u8 {
        match self {
            Self::NoChange => 0,
            Self::Up => 1,
            Self::Down => 2,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Up,
            2 => Self::Down,
            _ => Self::NoChange,
        }
    }
}

/// Latest-value cell shared between one writer and one reader.
///
/// Only the most recent value is kept. Stores use `Release` and loads use
/// `Acquire`, so a value published on the frame thread is visible to the
/// actuator thread on its next tick.
pub struct IntentCell<T> {
    raw: AtomicU8,
    _marker: PhantomData<T>,
}

impl<T: TriState> IntentCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            raw: AtomicU8::new(initial.to_raw()),
            _marker: PhantomData,
        }
    }

    pub fn store(&self, value: T) {
        self.raw.store(value.to_raw(), Ordering::Release);
    }

    pub fn load(&self) -> T {
        T::from_raw(self.raw.load(Ordering::Acquire))
    }
}

impl<T: TriState> Default for IntentCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// The two intent cells of a gesture session
#[derive(Default)]
pub struct SharedIntents {
    pub volume: IntentCell<VolumeIntent>,
    pub channel: IntentCell<ChannelIntent>,
}

impl SharedIntents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fully evaluated frame. Each cell is read by exactly one loop,
    /// so the two stores never need to be observed together.
    pub fn publish(&self, volume: VolumeIntent, channel: ChannelIntent) {
        self.volume.store(volume);
        self.channel.store(channel);
    }

    /// Reset both cells to `NoChange`.
    pub fn clear(&self) {
        self.publish(VolumeIntent::NoChange, ChannelIntent::NoChange);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_cells_start_with_no_change() {
        let intents = SharedIntents::new();
        assert_eq!(intents.volume.load(), VolumeIntent::NoChange);
        assert_eq!(intents.channel.load(), ChannelIntent::NoChange);
    }

    #[test]
    fn test_last_write_wins() {
        let cell = IntentCell::new(VolumeIntent::NoChange);
        cell.store(VolumeIntent::Increase);
        cell.store(VolumeIntent::Decrease);
        assert_eq!(cell.load(), VolumeIntent::Decrease);
    }

    #[test]
    fn test_publish_and_clear() {
        let intents = SharedIntents::new();
        intents.publish(VolumeIntent::Increase, ChannelIntent::Down);
        assert_eq!(intents.volume.load(), VolumeIntent::Increase);
        assert_eq!(intents.channel.load(), ChannelIntent::Down);

        intents.clear();
        assert_eq!(intents.volume.load(), VolumeIntent::NoChange);
        assert_eq!(intents.channel.load(), ChannelIntent::NoChange);
    }

    #[test]
    fn test_unknown_raw_value_is_no_change() {
        assert_eq!(VolumeIntent::from_raw(200), VolumeIntent::NoChange);
        assert_eq!(ChannelIntent::from_raw(3), ChannelIntent::NoChange);
    }

    #[test]
    fn test_visible_across_threads() {
        let intents = Arc::new(SharedIntents::new());
        let writer = intents.clone();
        thread::spawn(move || writer.publish(VolumeIntent::Decrease, ChannelIntent::Up))
            .join()
            .unwrap();
        assert_eq!(intents.volume.load(), VolumeIntent::Decrease);
        assert_eq!(intents.channel.load(), ChannelIntent::Up);
    }
}
