//! Geometric primitives over a hand skeleton.
//!
//! All measurements are in normalized x/y frame units; `z` is ignored.
//! Angles are radians in `[0, π]`.

use super::{Finger, HandPose, Landmark, Point};

/// PIP angle above which a finger counts as straight (≈160°).
pub const STRAIGHT_PIP_ANGLE: f32 = 2.8;
/// PIP angle below which a finger counts as curled (≈86°).
pub const CURLED_PIP_ANGLE: f32 = 1.5;
/// Maximum spacing between consecutive finger tips for "fingers close".
pub const FINGERS_CLOSE_DISTANCE: f32 = 0.1;

/// Euclidean distance in the image plane.
pub fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Unsigned angle at `b` formed by the segments `b→a` and `b→c`.
///
/// Uses `atan2(cross, dot)`, which stays well-conditioned near 0 and π and
/// returns 0 for degenerate (zero-length) segments instead of NaN.
pub fn angle(a: Point, b: Point, c: Point) -> f32 {
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);
    let cross = v1x * v2y - v1y * v2x;
    let dot = v1x * v2x + v1y * v2y;
    cross.atan2(dot).abs()
}

pub fn dist(pose: &HandPose, a: Landmark, b: Landmark) -> f32 {
    distance(pose[a], pose[b])
}

/// Angle at the PIP joint between the MCP and the tip.
pub fn pip_angle(pose: &HandPose, finger: Finger) -> f32 {
    angle(pose[finger.mcp()], pose[finger.pip()], pose[finger.tip()])
}

/// Tip is nearer the wrist than the knuckle.
pub fn is_closed(pose: &HandPose, finger: Finger) -> bool {
    dist(pose, finger.tip(), Landmark::Wrist) < dist(pose, finger.mcp(), Landmark::Wrist)
}

pub fn is_straight(pose: &HandPose, finger: Finger) -> bool {
    pip_angle(pose, finger) > STRAIGHT_PIP_ANGLE
}

pub fn is_curled(pose: &HandPose, finger: Finger) -> bool {
    pip_angle(pose, finger) < CURLED_PIP_ANGLE
}

/// The MCP→tip direction is more horizontal than vertical.
pub fn is_horizontal(pose: &HandPose, finger: Finger) -> bool {
    let tip = pose[finger.tip()];
    let mcp = pose[finger.mcp()];
    (tip.x - mcp.x).abs() > (tip.y - mcp.y).abs()
}

/// Tip above the knuckle (y grows downward).
pub fn points_up(pose: &HandPose, finger: Finger) -> bool {
    pose[finger.tip()].y < pose[finger.mcp()].y
}

pub fn points_down(pose: &HandPose, finger: Finger) -> bool {
    pose[finger.tip()].y > pose[finger.mcp()].y
}

/// Thumb tip reaches further from the wrist than the thumb MCP.
pub fn thumb_extended(pose: &HandPose) -> bool {
    dist(pose, Landmark::ThumbTip, Landmark::Wrist) > dist(pose, Landmark::ThumbMcp, Landmark::Wrist)
}

/// Consecutive finger tips (index→middle→ring→pinky) all within
/// [`FINGERS_CLOSE_DISTANCE`] of each other.
pub fn fingers_close(pose: &HandPose) -> bool {
    Finger::ALL
        .windows(2)
        .all(|pair| dist(pose, pair[0].tip(), pair[1].tip()) < FINGERS_CLOSE_DISTANCE)
}

/// Vertical and horizontal extent of the four finger tips.
pub fn tip_spread(pose: &HandPose) -> (f32, f32) {
    let tips = Finger::ALL.map(|f| pose[f.tip()]);
    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for t in tips {
        min_x = min_x.min(t.x);
        max_x = max_x.max(t.x);
        min_y = min_y.min(t.y);
        max_y = max_y.max(t.y);
    }
    (max_x - min_x, max_y - min_y)
}
