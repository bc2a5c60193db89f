//! Quaternion/Euler conversions.
//!
//! The conventions here are the ones the animation tool shows on screen, not
//! the textbook ones. Results can be off from the tool's display in the last
//! digits; that drift is expected.

use cgmath::Quaternion;
use std::f64::consts::PI;

/// Euler angles in radians.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EulerAngles {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl EulerAngles {
    pub fn new(roll: f32, pitch: f32, yaw: f32) -> EulerAngles {
        EulerAngles { roll, pitch, yaw }
    }
}

/// The cross products are summed in f32 and only the result is widened; the
/// squares are taken in f64. This mix is what the tool's display drifts by.
pub fn quaternion_to_euler(q: Quaternion<f32>) -> EulerAngles {
    let (x, y, z, w) = (q.v.x, q.v.y, q.v.z, q.s);
    let xy_zw = (x * y + z * w) as f64;
    let xz_yw = (x * z - y * w) as f64;
    let yz_xw = (y * z + x * w) as f64;
    let (x2, y2, z2, w2) = (sq(x), sq(y), sq(z), sq(w));

    let roll = (2.0 * xy_zw).atan2(x2 - y2 - z2 + w2);
    let pitch = (2.0 * xz_yw).asin();
    let yaw = PI - (2.0 * yz_xw).atan2(x2 + y2 - z2 - w2);
    EulerAngles {
        roll: -(roll as f32),
        pitch: -(pitch as f32),
        yaw: -(yaw as f32),
    }
}

fn sq(v: f32) -> f64 {
    (v as f64).powi(2)
}

/// Half-angle product formula. The component order matches
/// `quaternion_to_euler`, so the two are not inverses of each other in the
/// textbook sense.
pub fn euler_to_quaternion(e: EulerAngles) -> Quaternion<f32> {
    let (sr, cr) = (e.roll as f64 / 2.0).sin_cos();
    let (sp, cp) = (e.pitch as f64 / 2.0).sin_cos();
    let (sy, cy) = (e.yaw as f64 / 2.0).sin_cos();

    let x = cr * cp * cy + sr * sp * sy;
    let y = sr * cp * cy - cr * sp * sy;
    let z = cr * sp * cy + sr * cp * sy;
    let w = cr * cp * sy - sr * sp * cy;
    Quaternion::new(w as f32, x as f32, y as f32, z as f32)
}

pub fn left_hand_quaternion(e: EulerAngles) -> Quaternion<f32> {
    euler_to_quaternion(EulerAngles::new(-e.roll, e.pitch, -e.yaw))
}

pub fn right_hand_quaternion(e: EulerAngles) -> Quaternion<f32> {
    euler_to_quaternion(EulerAngles::new(-e.roll, -e.pitch, e.yaw))
}

/// Normalizes an angle in degrees into (-180, 180].
pub fn wrap180(mut v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    while v > 180.0 {
        v -= 360.0;
    }
    while v <= -180.0 {
        v += 360.0;
    }
    v
}

pub fn to_degrees(rad: f32) -> f64 {
    wrap180((rad as f64).to_degrees())
}


#[test]
fn test_wrap180() {
    assert_eq!(wrap180(180.0), 180.0);
    assert_eq!(wrap180(-180.0), 180.0);
    assert_eq!(wrap180(270.0), -90.0);
    assert_eq!(wrap180(-190.0), 170.0);
    assert_eq!(wrap180(720.0 + 45.0), 45.0);
    assert_eq!(wrap180(0.0), 0.0);
    for i in -20..20 {
        let v = wrap180(i as f64 * 97.3);
        assert!(v > -180.0 && v <= 180.0, "{} out of range", v);
    }
}

#[test]
fn test_identity_quaternion() {
    let e = quaternion_to_euler(Quaternion::new(1.0, 0.0, 0.0, 0.0));
    assert_eq!(to_degrees(e.roll), 0.0);
    assert_eq!(to_degrees(e.pitch), 0.0);
    assert_eq!(to_degrees(e.yaw), 0.0);
}

#[test]
fn test_quarter_turn() {
    let h = (0.5f64).sqrt() as f32;
    let e = quaternion_to_euler(Quaternion::new(h, 0.0, 0.0, h));
    assert!((to_degrees(e.roll) + 90.0).abs() < 1e-3);
    assert!(to_degrees(e.pitch).abs() < 1e-3);
    assert!(to_degrees(e.yaw).abs() < 1e-3);
}

#[test]
fn test_hand_variants() {
    let zero = EulerAngles::default();
    let q = euler_to_quaternion(zero);
    // All angles zero puts the 1 in the first component.
    assert_eq!((q.v.x, q.v.y, q.v.z, q.s), (1.0, 0.0, 0.0, 0.0));

    let e = EulerAngles::new(0.3, -0.2, 0.1);
    let l = left_hand_quaternion(e);
    let expect = euler_to_quaternion(EulerAngles::new(-0.3, -0.2, -0.1));
    assert_eq!(l, expect);
    let r = right_hand_quaternion(e);
    let expect = euler_to_quaternion(EulerAngles::new(-0.3, 0.2, 0.1));
    assert_eq!(r, expect);
}

#[test]
fn test_products_in_single_precision() {
    // Only x and z are set, so pitch comes from the f32 product x * z.
    let q = Quaternion::new(0.0, 0.1, 0.0, 0.2);
    let e = quaternion_to_euler(q);
    let single = (2.0 * (0.1f32 * 0.2f32) as f64).asin();
    assert_eq!(e.pitch, -(single as f32));
}
