//! JSON rendering of a motion document.
//!
//! Every value goes through `Projection` first, so frame numbers, positions
//! and rotations are the ones for the document's settings. Positions and
//! Euler angles are rounded half away from zero to what the animation tool
//! shows; everything else is written as stored, in the shortest form that
//! reads back as the same f32.

use cgmath::Vector3;
use json::JsonValue;
use crate::vmd::channel::channels;
use crate::vmd::interpolation::Curve;
use crate::vmd::projection::Projection;
use crate::vmd::{CameraKeyframe, IkSwitch, LightKeyframe, MorphKeyframe};
use crate::vmd::{MotionDocument, MotionKeyframe, ShadowKeyframe};

static DECIMALS_LOCATION: i32 = 2;
static DECIMALS_LIGHT_LOCATION: i32 = 1;
static DECIMALS_ROTATION: i32 = 1;

pub fn to_json(doc: &MotionDocument, group_by_name: bool) -> JsonValue {
    let p = Projection::new(doc.expansion.settings);

    let motion_data = if group_by_name {
        grouped_motions(doc, &p)
    } else {
        list(&doc.motions, |m| motion(&p, m))
    };

    object!(
        "Header" => object!(
            "FileSignature" => doc.header.signature.as_str(),
            "ModelName" => doc.header.model_name.as_str(),
        ),
        "Motion" => object!(
            "Count" => doc.motions.len(),
            "Data" => motion_data,
        ),
        "Skin" => object!(
            "Count" => doc.morphs.len(),
            "Data" => list(&doc.morphs, |m| morph(&p, m)),
        ),
        "Camera" => object!(
            "Count" => doc.cameras.len(),
            "Data" => list(&doc.cameras, |c| camera(&p, c)),
        ),
        "Illumination" => object!(
            "Count" => doc.lights.len(),
            "Data" => list(&doc.lights, |l| light(&p, l)),
        ),
        "SelfShadow" => object!(
            "Count" => doc.shadows.len(),
            "Data" => list(&doc.shadows, |s| shadow(&p, s)),
        ),
        "IK" => object!(
            "Count" => doc.ik_switches.len(),
            "Data" => list(&doc.ik_switches, |ik| ik_switch(&p, ik)),
        ),
        "Expansion" => expansion(doc, group_by_name),
    )
}

fn list<T, F>(items: &[T], f: F) -> JsonValue
where F: Fn(&T) -> JsonValue {
    JsonValue::Array(items.iter().map(f).collect())
}

/// Motion keys as a map from bone name to that bone's keys, bones in the
/// order they first appear.
fn grouped_motions(doc: &MotionDocument, p: &Projection) -> JsonValue {
    let mut groups = JsonValue::new_object();
    for chain in channels(&doc.motions) {
        let name = doc.motions[chain[0]].bone_name.as_str();
        let keys = chain.iter().map(|&i| motion(p, &doc.motions[i])).collect();
        groups[name] = JsonValue::Array(keys);
    }
    groups
}

fn motion(p: &Projection, m: &MotionKeyframe) -> JsonValue {
    let q = p.bone_quaternion(m);
    object!(
        "FrameNo" => p.frame(m.frame_no),
        "Name" => m.bone_name.as_str(),
        "Location" => rounded(widen(p.location(m.location)), DECIMALS_LOCATION),
        "Rotation" => object!(
            "Quaternion" => vec![short(q.v.x), short(q.v.y), short(q.v.z), short(q.s)],
            "Euler" => rounded(p.bone_euler(m.euler), DECIMALS_ROTATION),
        ),
        "Interpolation" => object!(
            "X" => curve(&m.interpolation.x),
            "Y" => curve(&m.interpolation.y),
            "Z" => curve(&m.interpolation.z),
            "Rotation" => curve(&m.interpolation.rotation),
        ),
    )
}

fn morph(p: &Projection, m: &MorphKeyframe) -> JsonValue {
    object!(
        "FrameNo" => p.frame(m.frame_no),
        "Name" => m.name.as_str(),
        "Weight" => short(m.weight),
    )
}

fn camera(p: &Projection, c: &CameraKeyframe) -> JsonValue {
    object!(
        "FrameNo" => p.frame(c.frame_no),
        "Length" => short(p.length(c.distance)),
        "Location" => rounded(widen(p.location(c.location)), DECIMALS_LOCATION),
        "Rotation" => rounded(p.camera_rotation(c.rotation), DECIMALS_ROTATION),
        "Interpolation" => object!(
            "X" => curve(&c.interpolation.x),
            "Y" => curve(&c.interpolation.y),
            "Z" => curve(&c.interpolation.z),
            "Rotation" => curve(&c.interpolation.rotation),
            "Length" => curve(&c.interpolation.distance),
            "ViewingAngle" => curve(&c.interpolation.fov),
        ),
        "ViewingAngle" => c.fov,
        "Perspective" => c.perspective,
    )
}

fn light(p: &Projection, l: &LightKeyframe) -> JsonValue {
    object!(
        "FrameNo" => p.frame(l.frame_no),
        "RGB" => vec![short(l.color.x), short(l.color.y), short(l.color.z)],
        "Location" => rounded(widen(p.light_location(l.location)), DECIMALS_LIGHT_LOCATION),
    )
}

fn shadow(p: &Projection, s: &ShadowKeyframe) -> JsonValue {
    object!(
        "FrameNo" => p.frame(s.frame_no),
        "Mode" => s.mode.number(),
        "Distance_Value" => short(s.raw_distance),
        "Distance" => short(s.distance),
    )
}

fn ik_switch(p: &Projection, ik: &IkSwitch) -> JsonValue {
    object!(
        "FrameNo" => p.frame(ik.frame_no),
        "Visible" => ik.visible,
        "Count" => ik.entries.len(),
        "Data" => list(&ik.entries, |e| object!(
            "BoneName" => e.bone_name.as_str(),
            "Enabled" => e.enabled,
        )),
    )
}

fn expansion(doc: &MotionDocument, group_by_name: bool) -> JsonValue {
    let settings = &doc.expansion.settings;
    object!(
        "TargetID" => settings.target_id,
        "StartFrame" => settings.start_frame,
        "Version" => doc.expansion.version.number(),
        "FileType" => doc.expansion.file_type.name(),
        "CoordinateSystem" => settings.coordinate_system.name(),
        "GroupType" => if group_by_name { "NAME" } else { "NONE" },
    )
}

fn curve(c: &Curve) -> JsonValue {
    object!(
        "start" => vec![c.start.time, c.start.amount],
        "end" => vec![c.stop.time, c.stop.amount],
    )
}

/// Rounds half away from zero. Negative zero comes out as zero.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let m = 10f64.powi(decimals);
    (v * m).round() / m + 0.0
}

fn rounded(v: Vector3<f64>, decimals: i32) -> JsonValue {
    vec![
        round_to(v.x, decimals),
        round_to(v.y, decimals),
        round_to(v.z, decimals),
    ].into()
}

/// `0.1f32` as `0.1`, not `0.10000000149011612`.
fn short(v: f32) -> f64 {
    format!("{}", v).parse().unwrap_or(v as f64)
}

fn widen(v: Vector3<f32>) -> Vector3<f64> {
    Vector3::new(v.x as f64, v.y as f64, v.z as f64)
}


#[test]
fn test_round_to() {
    assert_eq!(round_to(1.005f32 as f64, 2), 1.0);
    assert_eq!(round_to(0.125, 2), 0.13);
    assert_eq!(round_to(-0.125, 2), -0.13);
    assert_eq!(round_to(2.25, 1), 2.3);
    assert_eq!(round_to(-2.25, 1), -2.3);
    assert!(round_to(-0.01, 1).is_sign_positive());
}

#[test]
fn test_short_floats() {
    assert_eq!(short(0.1), 0.1);
    assert_eq!(short(-45.0), -45.0);
    assert_eq!(short(0.5f32.sqrt()), 0.70710677);
    assert_eq!(short(1e-7), 1e-7);
    assert_eq!(json::stringify(short(0.1)), "0.1");
}
