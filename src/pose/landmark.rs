use serde::{Deserialize, Serialize};

/// 33-point body landmark topology produced by the pose detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkType {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    LeftMouth,
    RightMouth,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

/// Single detected landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub kind: LandmarkType,
    /// X in image pixels
    pub x: f32,
    /// Y in image pixels (grows downward)
    pub y: f32,
    #[serde(default)]
    pub z: Option<f32>,
    /// In-frame likelihood (0.0 to 1.0)
    #[serde(default)]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(kind: LandmarkType, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn with_depth(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// Landmarks detected in one frame. An empty pose means nobody was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl Pose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Look up a landmark by identity. `None` when the detector did not report it.
    pub fn get(&self, kind: LandmarkType) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.kind == kind)
    }
}
