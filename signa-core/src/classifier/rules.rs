//! The ordered posture rule table.
//!
//! Each rule is a conjunction of geometric tests over one hand skeleton. All
//! thresholds are in normalized frame units (distances) or radians (angles)
//! and were tuned against a front-facing webcam at arm's length.
//!
//! Rows are evaluated top to bottom and the first match wins. Known overlaps
//! resolved by order: `A` before `E` (closed fist, thumb low), `J` before `Y`
//! (horizontal pinky), `K` before `V` (index and middle apart).

use crate::pose::{
    geometry::{
        angle, dist, is_closed, is_curled, is_horizontal, is_straight, pip_angle,
        points_down, points_up, thumb_extended, tip_spread,
    },
    Finger, HandPose, Landmark,
};

use super::Symbol;

use Finger::{Index, Middle, Pinky, Ring};
use Landmark::*;

/// One row of the table.
pub struct Rule {
    pub symbol: Symbol,
    pub matches: fn(&HandPose) -> bool,
}

const fn rule(symbol: Symbol, matches: fn(&HandPose) -> bool) -> Rule {
    Rule { symbol, matches }
}

const fn letter(c: char, matches: fn(&HandPose) -> bool) -> Rule {
    Rule {
        symbol: Symbol::Letter(c),
        matches,
    }
}

pub static RULES: [Rule; 27] = [
    rule(Symbol::Space, open_hand),
    letter('A', sign_a),
    letter('B', sign_b),
    letter('C', sign_c),
    letter('D', sign_d),
    letter('E', sign_e),
    letter('F', sign_f),
    letter('G', sign_g),
    letter('H', sign_h),
    letter('I', sign_i),
    letter('J', sign_j),
    letter('K', sign_k),
    letter('L', sign_l),
    letter('M', sign_m),
    letter('N', sign_n),
    letter('O', sign_o),
    letter('P', sign_p),
    letter('Q', sign_q),
    letter('R', sign_r),
    letter('S', sign_s),
    letter('T', sign_t),
    letter('U', sign_u),
    letter('V', sign_v),
    letter('W', sign_w),
    letter('X', sign_x),
    letter('Y', sign_y),
    letter('Z', sign_z),
];

// ── Thresholds ───────────────────────────────────────────────────────────────

/// Open hand: each tip at least this far above its knuckle.
const OPEN_TIP_RISE: f32 = 0.1;
/// Open hand: minimum horizontal gap between adjacent tips.
const OPEN_TIP_SPREAD: f32 = 0.04;

const A_THUMB_TO_INDEX_MCP: f32 = 0.1;

const B_INDEX_TO_PINKY_TIP: f32 = 0.1;

const C_THUMB_INDEX_MIN: f32 = 0.08;
const C_THUMB_INDEX_MAX: f32 = 0.25;
const C_PIP_MIN: f32 = 0.2;
const C_PIP_MAX: f32 = 2.3;
const C_TIP_Y_SPREAD: f32 = 0.05;
const C_TIP_X_SPREAD: f32 = 0.1;

const D_THUMB_TO_TIPS: f32 = 0.1;

const F_THUMB_INDEX_TOUCH: f32 = 0.05;
const F_INDEX_MIDDLE_GAP: f32 = 0.1;

const IJ_THUMB_TO_MIDDLE_PIP: f32 = 0.1;

const K_THUMB_TO_MIDDLE_PIP: f32 = 0.06;
const K_INDEX_MIDDLE_GAP: f32 = 0.06;

/// L: thumb tip at least this far left of the thumb MCP.
const L_THUMB_REACH: f32 = 0.06;
/// L: angle at the index knuckle between thumb tip and index tip (≈70°).
const L_MIN_OPENING: f32 = 1.2;

const N_THUMB_TO_MIDDLE_PIP: f32 = 0.04;
const N_THUMB_ABOVE_MIDDLE_PIP: f32 = 0.02;

const O_THUMB_INDEX_TOUCH: f32 = 0.05;
const O_THUMB_MIDDLE_TOUCH: f32 = 0.07;

const S_THUMB_TO_RING_PIP: f32 = 0.05;

const T_THUMB_ABOVE_INDEX_PIP: f32 = 0.04;

const U_MAX_GAP: f32 = 0.04;
const V_MIN_GAP: f32 = 0.08;

const W_INDEX_RING_GAP: f32 = 0.1;

/// X: hooked index, PIP angle band (≈86°..143°).
const X_PIP_MIN: f32 = 1.5;
const X_PIP_MAX: f32 = 2.5;

const Y_THUMB_PINKY_GAP: f32 = 0.2;

/// Z: index leaning diagonally, horizontal run vs. vertical rise.
const Z_MIN_SLANT: f32 = 0.4;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn all_closed(pose: &HandPose, fingers: &[Finger]) -> bool {
    fingers.iter().all(|&f| is_closed(pose, f))
}

fn all_straight(pose: &HandPose, fingers: &[Finger]) -> bool {
    fingers.iter().all(|&f| is_straight(pose, f))
}

fn all_up(pose: &HandPose, fingers: &[Finger]) -> bool {
    fingers.iter().all(|&f| points_up(pose, f))
}

/// Index and middle both straight, ring and pinky folded.
fn two_finger_base(pose: &HandPose) -> bool {
    all_straight(pose, &[Index, Middle]) && all_closed(pose, &[Ring, Pinky])
}

// ── Predicates ───────────────────────────────────────────────────────────────

fn open_hand(pose: &HandPose) -> bool {
    let risen = Finger::ALL
        .iter()
        .all(|f| pose[f.tip()].y < pose[f.mcp()].y - OPEN_TIP_RISE);
    let spread = Finger::ALL
        .windows(2)
        .all(|pair| (pose[pair[0].tip()].x - pose[pair[1].tip()].x).abs() > OPEN_TIP_SPREAD);
    risen && spread && pose[ThumbTip].y < pose[ThumbMcp].y
}

fn sign_a(pose: &HandPose) -> bool {
    all_closed(pose, &Finger::ALL) && dist(pose, ThumbTip, IndexMcp) < A_THUMB_TO_INDEX_MCP
}

fn sign_b(pose: &HandPose) -> bool {
    all_straight(pose, &Finger::ALL)
        && dist(pose, IndexTip, PinkyTip) < B_INDEX_TO_PINKY_TIP
        && pose[ThumbTip].y > pose[IndexTip].y
        && Finger::ALL.iter().all(|f| pose[f.tip()].y < pose[Wrist].y)
        && thumb_extended(pose)
}

fn sign_c(pose: &HandPose) -> bool {
    let gap = dist(pose, ThumbTip, IndexTip);
    let curved = Finger::ALL.iter().all(|&f| {
        let a = pip_angle(pose, f);
        a > C_PIP_MIN && a < C_PIP_MAX
    });
    let (x_spread, y_spread) = tip_spread(pose);
    gap > C_THUMB_INDEX_MIN
        && gap < C_THUMB_INDEX_MAX
        && curved
        && pose[ThumbTip].x < pose[IndexMcp].x
        && y_spread < C_TIP_Y_SPREAD
        && x_spread < C_TIP_X_SPREAD
}

fn sign_d(pose: &HandPose) -> bool {
    is_straight(pose, Index)
        && [MiddleTip, RingTip, PinkyTip]
            .iter()
            .all(|&tip| dist(pose, ThumbTip, tip) < D_THUMB_TO_TIPS)
}

fn sign_e(pose: &HandPose) -> bool {
    Finger::ALL.iter().all(|&f| is_curled(pose, f)) && pose[ThumbTip].y > pose[IndexPip].y
}

fn sign_f(pose: &HandPose) -> bool {
    dist(pose, ThumbTip, IndexTip) < F_THUMB_INDEX_TOUCH
        && all_straight(pose, &[Middle, Ring, Pinky])
        && dist(pose, IndexTip, MiddleTip) > F_INDEX_MIDDLE_GAP
}

fn sign_g(pose: &HandPose) -> bool {
    is_straight(pose, Index)
        && is_horizontal(pose, Index)
        && all_closed(pose, &[Middle, Ring, Pinky])
        && thumb_extended(pose)
}

fn sign_h(pose: &HandPose) -> bool {
    two_finger_base(pose) && is_horizontal(pose, Index) && is_horizontal(pose, Middle)
}

fn sign_i(pose: &HandPose) -> bool {
    is_straight(pose, Pinky)
        && points_up(pose, Pinky)
        && all_closed(pose, &[Index, Middle, Ring])
        && dist(pose, ThumbTip, MiddlePip) < IJ_THUMB_TO_MIDDLE_PIP
}

fn sign_j(pose: &HandPose) -> bool {
    is_straight(pose, Pinky)
        && is_horizontal(pose, Pinky)
        && all_closed(pose, &[Index, Middle, Ring])
        && dist(pose, ThumbTip, MiddlePip) < IJ_THUMB_TO_MIDDLE_PIP
}

fn sign_k(pose: &HandPose) -> bool {
    two_finger_base(pose)
        && points_up(pose, Index)
        && dist(pose, ThumbTip, MiddlePip) < K_THUMB_TO_MIDDLE_PIP
        && dist(pose, IndexTip, MiddleTip) > K_INDEX_MIDDLE_GAP
}

fn sign_l(pose: &HandPose) -> bool {
    is_straight(pose, Index)
        && points_up(pose, Index)
        && all_closed(pose, &[Middle, Ring, Pinky])
        && pose[ThumbTip].x < pose[ThumbMcp].x - L_THUMB_REACH
        && angle(pose[ThumbTip], pose[IndexMcp], pose[IndexTip]) > L_MIN_OPENING
}

fn sign_m(pose: &HandPose) -> bool {
    all_closed(pose, &Finger::ALL)
        && pose[ThumbTip].x > pose[PinkyMcp].x
        && pose[ThumbTip].y < pose[IndexPip].y
}

fn sign_n(pose: &HandPose) -> bool {
    all_closed(pose, &Finger::ALL)
        && dist(pose, ThumbTip, MiddlePip) < N_THUMB_TO_MIDDLE_PIP
        && pose[ThumbTip].y < pose[MiddlePip].y - N_THUMB_ABOVE_MIDDLE_PIP
}

fn sign_o(pose: &HandPose) -> bool {
    dist(pose, ThumbTip, IndexTip) < O_THUMB_INDEX_TOUCH
        && dist(pose, ThumbTip, MiddleTip) < O_THUMB_MIDDLE_TOUCH
        && !is_straight(pose, Index)
        && !is_closed(pose, Index)
}

fn sign_p(pose: &HandPose) -> bool {
    two_finger_base(pose) && points_down(pose, Index) && points_down(pose, Middle)
}

fn sign_q(pose: &HandPose) -> bool {
    is_straight(pose, Index)
        && points_down(pose, Index)
        && pose[ThumbTip].y > pose[ThumbMcp].y
        && all_closed(pose, &[Middle, Ring, Pinky])
}

fn sign_r(pose: &HandPose) -> bool {
    // Tips ordered opposite to the knuckles: the fingers cross.
    let crossed =
        (pose[IndexTip].x - pose[MiddleTip].x) * (pose[IndexMcp].x - pose[MiddleMcp].x) < 0.0;
    two_finger_base(pose) && points_up(pose, Index) && crossed
}

fn sign_s(pose: &HandPose) -> bool {
    all_closed(pose, &Finger::ALL)
        && dist(pose, ThumbTip, RingPip) < S_THUMB_TO_RING_PIP
        && pose[ThumbTip].y < pose[IndexPip].y
}

fn sign_t(pose: &HandPose) -> bool {
    let thumb = pose[ThumbTip];
    all_closed(pose, &Finger::ALL)
        && pose[IndexMcp].x < thumb.x
        && thumb.x < pose[MiddleMcp].x
        && thumb.y < pose[IndexPip].y - T_THUMB_ABOVE_INDEX_PIP
}

fn sign_u(pose: &HandPose) -> bool {
    two_finger_base(pose)
        && all_up(pose, &[Index, Middle])
        && dist(pose, IndexTip, MiddleTip) < U_MAX_GAP
}

fn sign_v(pose: &HandPose) -> bool {
    two_finger_base(pose)
        && all_up(pose, &[Index, Middle])
        && dist(pose, IndexTip, MiddleTip) > V_MIN_GAP
}

fn sign_w(pose: &HandPose) -> bool {
    all_straight(pose, &[Index, Middle, Ring])
        && all_up(pose, &[Index, Middle, Ring])
        && is_closed(pose, Pinky)
        && dist(pose, IndexTip, RingTip) > W_INDEX_RING_GAP
}

fn sign_x(pose: &HandPose) -> bool {
    (X_PIP_MIN..=X_PIP_MAX).contains(&pip_angle(pose, Index))
        && points_up(pose, Index)
        && !is_closed(pose, Index)
        && all_closed(pose, &[Middle, Ring, Pinky])
}

fn sign_y(pose: &HandPose) -> bool {
    is_straight(pose, Pinky)
        && thumb_extended(pose)
        && all_closed(pose, &[Index, Middle, Ring])
        && dist(pose, ThumbTip, PinkyTip) > Y_THUMB_PINKY_GAP
}

fn sign_z(pose: &HandPose) -> bool {
    let run = (pose[IndexTip].x - pose[IndexMcp].x).abs();
    let rise = (pose[IndexTip].y - pose[IndexMcp].y).abs();
    is_straight(pose, Index)
        && points_up(pose, Index)
        && run > Z_MIN_SLANT * rise
        && run < rise
        && all_closed(pose, &[Middle, Ring, Pinky])
}
