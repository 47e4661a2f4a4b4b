//! Synthetic hand skeletons.
//!
//! Builds geometrically consistent right-hand poses as seen in a mirrored
//! preview (palm facing the camera, wrist at the bottom of the frame) for
//! every symbol in the alphabet. Used by tests and by the scripted demo
//! source so the whole pipeline can run without a camera or pose estimator.
//!
//! Fingers are either a kinematic chain (tilt from vertical plus flexion at
//! each joint) or explicit joint positions. The thumb is placed last so it
//! can be anchored to any finger landmark.

use crate::classifier::Symbol;

use super::{Finger, HandPose, Landmark, Point, LANDMARK_COUNT};

const WRIST: (f64, f64) = (0.50, 0.85);
const THUMB_CMC: (f64, f64) = (0.44, 0.80);
/// Thumb MCP used when the thumb tip is anchored to a target landmark.
const THUMB_MCP_ANCHORED: (f64, f64) = (0.41, 0.755);
const THUMB_SEGMENTS: [f64; 3] = [0.06, 0.045, 0.035];

fn finger_mcp(finger: Finger) -> (f64, f64) {
    match finger {
        Finger::Index => (0.44, 0.62),
        Finger::Middle => (0.49, 0.60),
        Finger::Ring => (0.54, 0.61),
        Finger::Pinky => (0.59, 0.64),
    }
}

/// Proximal, middle and distal phalanx lengths.
fn finger_segments(finger: Finger) -> [f64; 3] {
    match finger {
        Finger::Index => [0.07, 0.04, 0.03],
        Finger::Middle => [0.075, 0.045, 0.032],
        Finger::Ring => [0.07, 0.04, 0.03],
        Finger::Pinky => [0.055, 0.032, 0.026],
    }
}

/// Shape of one non-thumb finger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FingerShape {
    /// Folded into the palm with the tip just below the knuckle.
    Fist,
    /// Kinematic chain from the MCP. `tilt` is radians from vertical
    /// (positive leans toward +x); each `flex` entry bends the next segment
    /// back toward -x.
    Chain { tilt: f64, flex: [f64; 3] },
    /// Explicit PIP and tip positions; the DIP sits halfway between them.
    Joints { pip: (f64, f64), tip: (f64, f64) },
}

impl FingerShape {
    pub const fn straight(tilt: f64) -> Self {
        FingerShape::Chain {
            tilt,
            flex: [0.0; 3],
        }
    }

    pub const fn bent(tilt: f64, flex: [f64; 3]) -> Self {
        FingerShape::Chain { tilt, flex }
    }
}

/// Where the thumb goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThumbShape {
    /// Kinematic chain from the CMC, same convention as [`FingerShape::Chain`].
    Chain { tilt: f64, flex: [f64; 3] },
    /// Tip placed at a landmark plus an offset.
    At { landmark: Landmark, dx: f64, dy: f64 },
    /// Tip placed halfway between two landmarks.
    Between(Landmark, Landmark),
}

impl ThumbShape {
    pub const fn extended(tilt: f64) -> Self {
        ThumbShape::Chain {
            tilt,
            flex: [0.0; 3],
        }
    }

    pub const fn at(landmark: Landmark, dx: f64, dy: f64) -> Self {
        ThumbShape::At { landmark, dx, dy }
    }
}

/// Builder for a synthetic right hand. Starts as a fist with the thumb
/// resting against the index knuckle.
#[derive(Debug, Clone)]
pub struct HandBuilder {
    fingers: [FingerShape; 4],
    thumb: ThumbShape,
}

impl Default for HandBuilder {
    fn default() -> Self {
        Self {
            fingers: [FingerShape::Fist; 4],
            thumb: ThumbShape::at(Landmark::IndexMcp, -0.02, 0.01),
        }
    }
}

impl HandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finger(mut self, finger: Finger, shape: FingerShape) -> Self {
        self.fingers[finger as usize] = shape;
        self
    }

    pub fn straight(self, finger: Finger, tilt: f64) -> Self {
        self.finger(finger, FingerShape::straight(tilt))
    }

    pub fn thumb(mut self, shape: ThumbShape) -> Self {
        self.thumb = shape;
        self
    }

    pub fn build(&self) -> HandPose {
        let mut pts = [(0.0_f64, 0.0_f64); LANDMARK_COUNT];
        pts[Landmark::Wrist as usize] = WRIST;
        pts[Landmark::ThumbCmc as usize] = THUMB_CMC;

        for finger in Finger::ALL {
            let mcp = finger_mcp(finger);
            let [pip, dip, tip] = match self.fingers[finger as usize] {
                FingerShape::Fist => [
                    (mcp.0, mcp.1 - 0.04),
                    (mcp.0 + 0.005, mcp.1 - 0.01),
                    (mcp.0 + 0.005, mcp.1 + 0.025),
                ],
                FingerShape::Chain { tilt, flex } => {
                    chain(mcp, tilt, flex, finger_segments(finger))
                }
                FingerShape::Joints { pip, tip } => [pip, midpoint(pip, tip), tip],
            };
            let [m, p, d, t] = finger.joints();
            pts[m as usize] = mcp;
            pts[p as usize] = pip;
            pts[d as usize] = dip;
            pts[t as usize] = tip;
        }

        let [thumb_mcp, thumb_ip, thumb_tip] = match self.thumb {
            ThumbShape::Chain { tilt, flex } => chain(THUMB_CMC, tilt, flex, THUMB_SEGMENTS),
            ThumbShape::At { landmark, dx, dy } => {
                let base = pts[landmark as usize];
                anchored_thumb((base.0 + dx, base.1 + dy))
            }
            ThumbShape::Between(a, b) => {
                anchored_thumb(midpoint(pts[a as usize], pts[b as usize]))
            }
        };
        pts[Landmark::ThumbMcp as usize] = thumb_mcp;
        pts[Landmark::ThumbIp as usize] = thumb_ip;
        pts[Landmark::ThumbTip as usize] = thumb_tip;

        HandPose::new(pts.map(|(x, y)| Point::new(x as f32, y as f32)))
    }
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

fn chain(base: (f64, f64), tilt: f64, flex: [f64; 3], segments: [f64; 3]) -> [(f64, f64); 3] {
    let mut out = [(0.0, 0.0); 3];
    let mut cur = base;
    let mut heading = tilt;
    for (i, (bend, len)) in flex.into_iter().zip(segments).enumerate() {
        heading -= bend;
        cur = (cur.0 + heading.sin() * len, cur.1 - heading.cos() * len);
        out[i] = cur;
    }
    out
}

fn anchored_thumb(target: (f64, f64)) -> [(f64, f64); 3] {
    let mcp = THUMB_MCP_ANCHORED;
    let mid = midpoint(mcp, target);
    [mcp, (mid.0 - 0.01, mid.1), target]
}

/// Open hand with spread fingers: the word-boundary gesture.
pub fn space_pose() -> HandPose {
    HandBuilder::new()
        .straight(Finger::Index, -0.35)
        .straight(Finger::Middle, -0.1)
        .straight(Finger::Ring, 0.15)
        .straight(Finger::Pinky, 0.3)
        .thumb(ThumbShape::extended(-0.5))
        .build()
}

/// A hand that matches no rule: three fingers up, pinky half bent.
pub fn unmatched_pose() -> HandPose {
    HandBuilder::new()
        .straight(Finger::Index, 0.0)
        .straight(Finger::Middle, 0.0)
        .straight(Finger::Ring, 0.0)
        .finger(Finger::Pinky, FingerShape::bent(0.0, [1.0, 0.3, 0.0]))
        .thumb(ThumbShape::extended(-0.3))
        .build()
}

/// Pose for any symbol.
pub fn symbol_pose(symbol: Symbol) -> HandPose {
    match symbol {
        Symbol::Space => space_pose(),
        Symbol::Letter(c) => letter_pose(c).unwrap_or_else(unmatched_pose),
        Symbol::None => unmatched_pose(),
    }
}

/// Pose signing `letter` (case-insensitive). `None` outside `A..=Z`.
pub fn letter_pose(letter: char) -> Option<HandPose> {
    use Finger::{Index, Middle, Pinky, Ring};
    use Landmark::*;

    let hand = HandBuilder::new();
    let hand = match letter.to_ascii_uppercase() {
        'A' => hand,
        'B' => hand
            .straight(Index, 0.3)
            .straight(Middle, 0.1)
            .straight(Ring, -0.1)
            .straight(Pinky, -0.4)
            .thumb(ThumbShape::at(MiddleMcp, -0.01, 0.03)),
        'C' => hand
            .finger(Index, FingerShape::Joints { pip: (0.45, 0.53), tip: (0.40, 0.55) })
            .finger(Middle, FingerShape::Joints { pip: (0.49, 0.50), tip: (0.41, 0.535) })
            .finger(Ring, FingerShape::Joints { pip: (0.54, 0.51), tip: (0.42, 0.54) })
            .finger(Pinky, FingerShape::Joints { pip: (0.585, 0.56), tip: (0.44, 0.56) })
            .thumb(ThumbShape::at(IndexTip, -0.03, 0.11)),
        'D' => hand
            .straight(Index, 0.0)
            .finger(Middle, FingerShape::bent(0.0, [0.5, 1.4, 0.6]))
            .finger(Ring, FingerShape::bent(0.0, [0.5, 1.4, 0.6]))
            .finger(Pinky, FingerShape::bent(0.0, [0.5, 1.4, 0.6]))
            .thumb(ThumbShape::at(RingTip, -0.01, 0.0)),
        'E' => hand.thumb(ThumbShape::at(RingMcp, 0.02, 0.05)),
        'F' => hand
            .finger(Index, FingerShape::bent(-0.2, [0.6, 1.0, 0.5]))
            .straight(Middle, 0.0)
            .straight(Ring, 0.12)
            .straight(Pinky, 0.3)
            .thumb(ThumbShape::at(IndexTip, 0.01, 0.01)),
        'G' => hand
            .straight(Index, -1.45)
            .thumb(ThumbShape::extended(-1.2)),
        'H' => hand
            .straight(Index, -1.45)
            .straight(Middle, -1.4)
            .thumb(ThumbShape::at(RingMcp, -0.02, 0.04)),
        'I' => hand
            .straight(Pinky, 0.1)
            .thumb(ThumbShape::at(MiddlePip, 0.02, 0.03)),
        'J' => hand
            .straight(Pinky, 1.6)
            .thumb(ThumbShape::at(MiddlePip, 0.02, 0.03)),
        'K' => hand
            .straight(Index, -0.3)
            .straight(Middle, 0.1)
            .thumb(ThumbShape::at(MiddlePip, 0.0, -0.02)),
        'L' => hand
            .straight(Index, -0.05)
            .thumb(ThumbShape::extended(-1.5)),
        'M' => hand.thumb(ThumbShape::at(PinkyMcp, 0.02, -0.07)),
        'N' => hand.thumb(ThumbShape::at(MiddleMcp, 0.01, -0.075)),
        'O' => hand
            .finger(Index, FingerShape::bent(0.0, [0.6, 1.0, 0.5]))
            .finger(Middle, FingerShape::bent(0.0, [0.5, 1.1, 0.5]))
            .finger(Ring, FingerShape::bent(0.0, [0.5, 1.0, 0.5]))
            .finger(Pinky, FingerShape::bent(0.0, [0.5, 1.0, 0.5]))
            .thumb(ThumbShape::Between(IndexTip, MiddleTip)),
        'P' => hand
            .straight(Index, -2.5)
            .straight(Middle, -2.75)
            .thumb(ThumbShape::at(RingMcp, 0.03, 0.06)),
        'Q' => hand
            .straight(Index, -2.75)
            .thumb(ThumbShape::extended(-2.8)),
        'R' => hand
            .straight(Index, 0.25)
            .straight(Middle, -0.3)
            .thumb(ThumbShape::at(RingPip, 0.0, 0.0)),
        'S' => hand.thumb(ThumbShape::at(RingPip, 0.0, -0.01)),
        'T' => hand.thumb(ThumbShape::at(IndexMcp, 0.025, -0.105)),
        'U' => hand
            .straight(Index, 0.15)
            .straight(Middle, -0.15)
            .thumb(ThumbShape::at(RingPip, 0.0, 0.02)),
        'V' => hand
            .straight(Index, -0.35)
            .straight(Middle, 0.3)
            .thumb(ThumbShape::at(RingPip, 0.0, 0.02)),
        'W' => hand
            .straight(Index, -0.4)
            .straight(Middle, 0.0)
            .straight(Ring, 0.35)
            .thumb(ThumbShape::at(PinkyPip, 0.0, 0.02)),
        'X' => hand
            .finger(Index, FingerShape::bent(0.0, [0.0, 1.0, 0.6]))
            .thumb(ThumbShape::at(MiddlePip, 0.0, 0.02)),
        'Y' => hand
            .straight(Pinky, 0.9)
            .thumb(ThumbShape::extended(-1.3)),
        'Z' => hand
            .straight(Index, -0.6)
            .thumb(ThumbShape::at(MiddlePip, 0.0, 0.02)),
        _ => return None,
    };
    Some(hand.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_builder_is_fist_with_thumb_on_index_knuckle() {
        let pose = HandBuilder::new().build();
        let mcp = pose[Landmark::IndexMcp];
        let tip = pose[Landmark::ThumbTip];
        assert_relative_eq!(tip.x, mcp.x - 0.02, epsilon = 1e-6);
        assert_relative_eq!(tip.y, mcp.y + 0.01, epsilon = 1e-6);
    }

    #[test]
    fn straight_chain_preserves_segment_lengths() {
        let pose = HandBuilder::new().straight(Finger::Middle, 0.4).build();
        let total: f32 = [
            (Landmark::MiddleMcp, Landmark::MiddlePip),
            (Landmark::MiddlePip, Landmark::MiddleDip),
            (Landmark::MiddleDip, Landmark::MiddleTip),
        ]
        .iter()
        .map(|&(a, b)| crate::pose::geometry::dist(&pose, a, b))
        .sum();
        assert_relative_eq!(total, 0.152, epsilon = 1e-5);
    }

    #[test]
    fn every_letter_has_a_pose() {
        for c in 'A'..='Z' {
            assert!(letter_pose(c).is_some(), "missing fixture for {c}");
        }
        assert!(letter_pose('a').is_some());
        assert!(letter_pose('1').is_none());
    }
}
