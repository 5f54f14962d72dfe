use tracing::trace;

use super::intent::{ChannelIntent, VolumeIntent};
use crate::pose::{Landmark, LandmarkType, Pose};

/// Wrist above this line (shoulder.y + N) with the arm out → channel up
const CHANNEL_UP_BELOW_SHOULDER: f32 = 100.0;
/// Wrist above this line with the arm out → channel down
const CHANNEL_DOWN_BELOW_SHOULDER: f32 = 200.0;
/// Wrist at least this far above the shoulder with the arm in → volume up
const VOLUME_UP_ABOVE_SHOULDER: f32 = 50.0;
/// Lower volume band: (shoulder.y - 20, shoulder.y + 100)
const VOLUME_DOWN_BAND_TOP: f32 = 20.0;
const VOLUME_DOWN_BAND_BOTTOM: f32 = 100.0;

/// Map one frame's landmarks to volume and channel intents.
///
/// Decisions use the right wrist and right shoulder in image coordinates
/// (y grows downward). With the wrist out past the shoulder (`wrist.x > shoulder.x`)
/// only the channel can change; with the wrist at or inside the shoulder only the
/// volume can change. An empty pose, a missing landmark, or a NaN/infinite
/// coordinate yields `NoChange` for both.
pub fn classify(pose: &Pose) -> (VolumeIntent, ChannelIntent) {
    if pose.is_empty() {
        return (VolumeIntent::NoChange, ChannelIntent::NoChange);
    }

    let (wrist, shoulder) = match (
        pose.get(LandmarkType::RightWrist),
        pose.get(LandmarkType::RightShoulder),
    ) {
        (Some(w), Some(s)) if is_finite(w) && is_finite(s) => (w, s),
        _ => {
            trace!("right wrist or shoulder missing or not finite");
            return (VolumeIntent::NoChange, ChannelIntent::NoChange);
        }
    };

    let channel = classify_channel(wrist, shoulder);
    let volume = classify_volume(wrist, shoulder);
    trace!(
        wrist_x = wrist.x,
        wrist_y = wrist.y,
        shoulder_x = shoulder.x,
        shoulder_y = shoulder.y,
        ?volume,
        ?channel,
        "classified"
    );
    (volume, channel)
}

fn is_finite(landmark: &Landmark) -> bool {
    landmark.x.is_finite() && landmark.y.is_finite()
}

fn classify_channel(wrist: &Landmark, shoulder: &Landmark) -> ChannelIntent {
    if !(wrist.x > shoulder.x) {
        return ChannelIntent::NoChange;
    }
    if wrist.y < shoulder.y + CHANNEL_UP_BELOW_SHOULDER {
        ChannelIntent::Up
    } else if wrist.y < shoulder.y + CHANNEL_DOWN_BELOW_SHOULDER {
        ChannelIntent::Down
    } else {
        ChannelIntent::NoChange
    }
}

fn classify_volume(wrist: &Landmark, shoulder: &Landmark) -> VolumeIntent {
    if !(wrist.x <= shoulder.x) {
        return VolumeIntent::NoChange;
    }
    // Increase wins outright; nothing below is checked once the wrist is this high.
    if wrist.y < shoulder.y - VOLUME_UP_ABOVE_SHOULDER {
        return VolumeIntent::Increase;
    }
    if wrist.y > shoulder.y - VOLUME_DOWN_BAND_TOP && wrist.y < shoulder.y + VOLUME_DOWN_BAND_BOTTOM {
        VolumeIntent::Decrease
    } else {
        VolumeIntent::NoChange
    }
}
