//! Hand skeleton types.
//!
//! A [`HandPose`] is one hand's 21 landmarks for one frame, in the standard
//! hand-landmark order. Coordinates are normalized to `[0, 1]` with y growing
//! downward; `z` is carried when the estimator provides it but the classifier
//! only reads x/y.

pub mod geometry;
pub mod synth;

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::SignaError;

/// Number of landmarks in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Anatomical role of each landmark, discriminant = index in the skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Landmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

/// The four non-thumb fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn mcp(self) -> Landmark {
        self.joints()[0]
    }

    pub fn pip(self) -> Landmark {
        self.joints()[1]
    }

    pub fn dip(self) -> Landmark {
        self.joints()[2]
    }

    pub fn tip(self) -> Landmark {
        self.joints()[3]
    }

    /// MCP, PIP, DIP, TIP.
    pub fn joints(self) -> [Landmark; 4] {
        use Landmark::*;
        match self {
            Finger::Index => [IndexMcp, IndexPip, IndexDip, IndexTip],
            Finger::Middle => [MiddleMcp, MiddlePip, MiddleDip, MiddleTip],
            Finger::Ring => [RingMcp, RingPip, RingDip, RingTip],
            Finger::Pinky => [PinkyMcp, PinkyPip, PinkyDip, PinkyTip],
        }
    }
}

/// A landmark position in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z,
        }
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
            z: (self.z + other.z) / 2.0,
        }
    }
}

/// One hand's skeleton for one frame.
///
/// Deserializes from a JSON array of exactly 21 points; any other length is
/// rejected so downstream code can index every landmark without checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct HandPose {
    landmarks: [Point; LANDMARK_COUNT],
}

impl HandPose {
    pub fn new(landmarks: [Point; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Point; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn point(&self, landmark: Landmark) -> Point {
        self.landmarks[landmark as usize]
    }

    /// Whether this is a right hand, judged from the thumb tip's side of the
    /// wrist with the palm facing the camera.
    ///
    /// `mirrored` is true when the frame was flipped horizontally for a
    /// selfie-style preview before pose estimation; a right hand then shows
    /// its thumb left of the wrist.
    pub fn is_right_hand(&self, mirrored: bool) -> bool {
        let thumb_left_of_wrist = self[Landmark::ThumbTip].x < self[Landmark::Wrist].x;
        thumb_left_of_wrist == mirrored
    }
}

impl Index<Landmark> for HandPose {
    type Output = Point;

    fn index(&self, landmark: Landmark) -> &Point {
        &self.landmarks[landmark as usize]
    }
}

impl TryFrom<Vec<Point>> for HandPose {
    type Error = SignaError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        let count = points.len();
        let landmarks: [Point; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| SignaError::LandmarkCount(count))?;
        Ok(Self { landmarks })
    }
}

impl From<HandPose> for Vec<Point> {
    fn from(pose: HandPose) -> Self {
        pose.landmarks.to_vec()
    }
}

/// Everything the pose estimator reported for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Capture time in milliseconds since the start of the stream. When
    /// absent the pipeline stamps the frame with the time it was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// Detected hands, in estimator order.
    #[serde(default)]
    pub hands: Vec<HandPose>,
}

impl Frame {
    /// A frame with no detected hands.
    pub fn empty(timestamp_ms: Option<u64>) -> Self {
        Self {
            timestamp_ms,
            hands: Vec::new(),
        }
    }

    pub fn with_hands(timestamp_ms: Option<u64>, hands: Vec<HandPose>) -> Self {
        Self {
            timestamp_ms,
            hands,
        }
    }
}
