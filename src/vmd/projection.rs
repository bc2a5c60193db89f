//! Read-out projections: frame offset, unit scale and coordinate system.
//!
//! These are pure functions of the stored raw values and the document's
//! `Settings`; the document itself is never changed.
//!
//! | system    | location      | bone Euler           | camera rotation     | light location |
//! |-----------|---------------|----------------------|---------------------|----------------|
//! | MMDHand   | ( x, y, z)    | (pitch, yaw, roll)   | (pitch, yaw, roll)  | ( x,  y,  z)   |
//! | LeftHand  | ( x, y, z)    | (pitch, -yaw, -roll) | (-pitch, -yaw, roll)| (-x, -y, -z)   |
//! | RightHand | (-z, x, y)    | (-roll, -pitch, yaw) | (roll, pitch, yaw)  | ( z, -x, -y)   |

use cgmath::{Quaternion, Vector3};
use crate::vmd::document::{CoordinateSystem, MotionKeyframe, Settings};
use crate::vmd::rotation::{to_degrees, EulerAngles};

#[derive(Copy, Clone, Debug)]
pub struct Projection {
    pub settings: Settings,
}

impl Projection {
    pub fn new(settings: Settings) -> Projection {
        Projection { settings }
    }

    fn system(&self) -> CoordinateSystem {
        self.settings.coordinate_system
    }

    /// The frame number a raw file frame number is shown at. Both fit in an
    /// i64 with room to spare.
    pub fn frame(&self, raw: u32) -> i64 {
        raw as i64 + self.settings.start_frame as i64
    }

    pub fn length(&self, v: f32) -> f32 {
        v * self.settings.unit.scale()
    }

    /// Axis remap and unit scale for bone and camera positions.
    pub fn location(&self, v: Vector3<f32>) -> Vector3<f32> {
        let v = match self.system() {
            CoordinateSystem::MmdHand | CoordinateSystem::LeftHand => v,
            CoordinateSystem::RightHand => Vector3::new(-v.z, v.x, v.y),
        };
        v * self.settings.unit.scale()
    }

    /// Light direction. Not a length, so unscaled.
    pub fn light_location(&self, v: Vector3<f32>) -> Vector3<f32> {
        match self.system() {
            CoordinateSystem::MmdHand => v,
            CoordinateSystem::LeftHand => -v,
            CoordinateSystem::RightHand => Vector3::new(v.z, -v.x, -v.y),
        }
    }

    pub fn bone_quaternion(&self, key: &MotionKeyframe) -> Quaternion<f32> {
        match self.system() {
            CoordinateSystem::MmdHand => key.quaternion,
            CoordinateSystem::LeftHand => key.quaternion_left_hand,
            CoordinateSystem::RightHand => key.quaternion_right_hand,
        }
    }

    /// Bone rotation in degrees, wrapped into (-180, 180].
    pub fn bone_euler(&self, e: EulerAngles) -> Vector3<f64> {
        let (a, b, c) = match self.system() {
            CoordinateSystem::MmdHand => (e.pitch, e.yaw, e.roll),
            CoordinateSystem::LeftHand => (e.pitch, -e.yaw, -e.roll),
            CoordinateSystem::RightHand => (-e.roll, -e.pitch, e.yaw),
        };
        Vector3::new(to_degrees(a), to_degrees(b), to_degrees(c))
    }

    /// Camera rotation in degrees. Cameras are stored as Euler angles, so
    /// this is plain per-axis negation.
    pub fn camera_rotation(&self, e: EulerAngles) -> Vector3<f64> {
        let (a, b, c) = match self.system() {
            CoordinateSystem::MmdHand => (e.pitch, e.yaw, e.roll),
            CoordinateSystem::LeftHand => (-e.pitch, -e.yaw, e.roll),
            CoordinateSystem::RightHand => (e.roll, e.pitch, e.yaw),
        };
        Vector3::new(to_degrees(a), to_degrees(b), to_degrees(c))
    }
}


#[cfg(test)]
fn projection(coordinate_system: CoordinateSystem, unit: crate::vmd::document::Unit) -> Projection {
    Projection::new(Settings { coordinate_system, unit, ..Settings::default() })
}

#[test]
fn test_location_remap() {
    use crate::vmd::document::Unit;

    let v = Vector3::new(1.0, 2.0, 3.0);
    let p = projection(CoordinateSystem::RightHand, Unit::Default);
    assert_eq!(p.location(v), Vector3::new(-3.0, 1.0, 2.0));
    let p = projection(CoordinateSystem::LeftHand, Unit::Default);
    assert_eq!(p.location(v), Vector3::new(1.0, 2.0, 3.0));
    let p = projection(CoordinateSystem::MmdHand, Unit::Default);
    assert_eq!(p.location(v), v);

    assert_eq!(projection(CoordinateSystem::LeftHand, Unit::Default).light_location(v),
        Vector3::new(-1.0, -2.0, -3.0));
    assert_eq!(projection(CoordinateSystem::RightHand, Unit::Default).light_location(v),
        Vector3::new(3.0, -1.0, -2.0));
}

#[test]
fn test_unit_scale() {
    use crate::vmd::document::Unit;

    for &v in &[0.0f32, 1.0, -2.5, 1234.5] {
        assert_eq!(projection(CoordinateSystem::MmdHand, Unit::Default).length(v), v);
        assert_eq!(projection(CoordinateSystem::MmdHand, Unit::Centimeter).length(v), 8.0 * v);
        assert_eq!(projection(CoordinateSystem::MmdHand, Unit::Millimeter).length(v), 80.0 * v);
    }
    let p = projection(CoordinateSystem::RightHand, Unit::Centimeter);
    assert_eq!(p.location(Vector3::new(1.0, 2.0, 3.0)), Vector3::new(-24.0, 8.0, 16.0));
    // Light directions are never scaled.
    assert_eq!(p.light_location(Vector3::new(1.0, 2.0, 3.0)), Vector3::new(3.0, -1.0, -2.0));
}

#[test]
fn test_frame_offset() {
    let p = Projection::new(Settings::default());
    assert_eq!(p.frame(0), 0);
    assert_eq!(p.frame(1234), 1234);
    assert_eq!(p.frame(u32::max_value()), u32::max_value() as i64);

    let p = Projection::new(Settings { start_frame: -10, ..Settings::default() });
    assert_eq!(p.frame(4), -6);

    let p = Projection::new(Settings { start_frame: i32::max_value(), ..Settings::default() });
    assert_eq!(p.frame(u32::max_value()), 6442450942);
    let p = Projection::new(Settings { start_frame: i32::min_value(), ..Settings::default() });
    assert_eq!(p.frame(0), -2147483648);
}

#[test]
fn test_euler_projection() {
    use crate::vmd::document::Unit;
    use std::f32::consts::FRAC_PI_2;

    // roll 90, pitch 0, yaw -90 (degrees)
    let e = EulerAngles::new(FRAC_PI_2, 0.0, -FRAC_PI_2);
    let round = |v: Vector3<f64>| (v.x.round(), v.y.round(), v.z.round());

    let p = projection(CoordinateSystem::MmdHand, Unit::Default);
    assert_eq!(round(p.bone_euler(e)), (0.0, -90.0, 90.0));
    assert_eq!(round(p.camera_rotation(e)), (0.0, -90.0, 90.0));
    let p = projection(CoordinateSystem::LeftHand, Unit::Default);
    assert_eq!(round(p.bone_euler(e)), (0.0, 90.0, -90.0));
    assert_eq!(round(p.camera_rotation(e)), (0.0, 90.0, 90.0));
    let p = projection(CoordinateSystem::RightHand, Unit::Default);
    assert_eq!(round(p.bone_euler(e)), (-90.0, 0.0, -90.0));
    assert_eq!(round(p.camera_rotation(e)), (90.0, 0.0, -90.0));
}
