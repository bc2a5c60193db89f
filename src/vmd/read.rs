//! Motion file reader.
//!
//! A motion file is a header followed by six sections, each a u32 count and
//! that many fixed-layout records:
//!
//! ```text
//! header   signature [u8; 30], model name [u8; 20]
//! motion   111 bytes  bone keyframes
//! morph     23 bytes  face morph weights
//! camera    61 bytes
//! light     28 bytes
//! shadow     9 bytes
//! ik         9 bytes + 21 bytes per entry
//! ```
//!
//! Older writers stop after any section, so running out of bytes at a section
//! boundary just means the remaining sections are empty. Running out inside a
//! record is an error.

use cgmath::{Quaternion, Vector3};
use crate::errors::Result;
use std::cmp::min;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use crate::util::cur::Cur;
use crate::vmd::channel::index_channels;
use crate::vmd::document::*;
use crate::vmd::interpolation::{decode_camera, decode_motion};
use crate::vmd::rotation::{self, EulerAngles};
use crate::vmd::text::{read_text_field, TextDecoder};

const SIGNATURE_LEN: usize = 30;

/// Reads a motion file from disk.
pub fn load(path: &Path, decoder: &dyn TextDecoder, settings: Settings) -> Result<MotionDocument> {
    let mut f = File::open(path)?;
    let mut buf = vec![];
    f.read_to_end(&mut buf)?;
    info!("reading {} ({} bytes)", path.display(), buf.len());
    read_vmd(&buf, decoder, settings)
}

pub fn read_vmd(buf: &[u8], decoder: &dyn TextDecoder, settings: Settings) -> Result<MotionDocument> {
    if buf.is_empty() {
        bail_format!("empty file");
    }

    let mut doc = MotionDocument::new(settings);
    let mut cur = Cur::new(buf);
    read_sections(&mut cur, decoder, &mut doc)?;
    index_channels(&mut doc.motions);

    if !cur.at_end() {
        debug!("{} trailing bytes after the IK section", cur.bytes_remaining());
    }
    Ok(doc)
}

fn read_sections(cur: &mut Cur, decoder: &dyn TextDecoder, doc: &mut MotionDocument) -> Result<()> {
    read_header(cur, decoder, doc)?;

    macro_rules! section {
        ($name:expr, $list:expr, $record_size:expr, |$c:ident| $read:expr) => {
            if cur.at_end() {
                debug!("file ends before the {} section", $name);
                return Ok(());
            }
            let count = cur.next::<u32>()?;
            info!("{} section: {} records", $name, count);
            $list.reserve(min(count as usize, cur.bytes_remaining() / $record_size));
            for _ in 0..count {
                let $c = &mut *cur;
                $list.push($read?);
            }
        };
    }

    section!("motion", doc.motions, 111, |c| read_motion(c, decoder));
    section!("morph", doc.morphs, 23, |c| read_morph(c, decoder));
    section!("camera", doc.cameras, 61, |c| read_camera(c));
    section!("light", doc.lights, 28, |c| read_light(c));
    section!("shadow", doc.shadows, 9, |c| read_shadow(c));
    section!("IK", doc.ik_switches, 9, |c| read_ik_switch(c, decoder));
    Ok(())
}

fn read_header(cur: &mut Cur, decoder: &dyn TextDecoder, doc: &mut MotionDocument) -> Result<()> {
    // Look at the signature before requiring a whole header, so a short file
    // of the wrong type is reported as such.
    let avail = min(SIGNATURE_LEN, cur.bytes_remaining());
    let peeked = read_text_field(decoder, cur.clone().next_n_u8s(avail)?);
    if SpecVersion::from_signature(&peeked) == SpecVersion::Unknown {
        bail_format!("not a recognized file: signature {:?}", peeked);
    }

    fields!(cur, header {
        signature: [u8; 30],
        model_name: [u8; 20],
    });

    doc.set_signature(read_text_field(decoder, signature));
    doc.header.model_name = read_text_field(decoder, model_name);
    info!("signature: {}", doc.header.signature);
    info!("model name: {}", doc.header.model_name);
    Ok(())
}

fn read_motion(cur: &mut Cur, decoder: &dyn TextDecoder) -> Result<MotionKeyframe> {
    fields!(cur, motion {
        name: [u8; 15],
        frame_no: u32,
        location: (f32, f32, f32),
        qy: f32,
        qx: f32,
        qz: f32,
        qw: f32,
        interpolation: [u8; 64],
    });

    let quaternion = Quaternion::new(qw, qx, qy, qz);
    let euler = rotation::quaternion_to_euler(quaternion);

    Ok(MotionKeyframe {
        bone_name: read_text_field(decoder, name),
        frame_no,
        location: Vector3::new(location.0, location.1, location.2),
        quaternion,
        euler,
        quaternion_left_hand: rotation::left_hand_quaternion(euler),
        quaternion_right_hand: rotation::right_hand_quaternion(euler),
        interpolation: decode_motion(interpolation)?,
        link: ChannelLink::default(),
    })
}

fn read_morph(cur: &mut Cur, decoder: &dyn TextDecoder) -> Result<MorphKeyframe> {
    fields!(cur, morph {
        name: [u8; 15],
        frame_no: u32,
        weight: f32,
    });

    Ok(MorphKeyframe {
        name: read_text_field(decoder, name),
        frame_no,
        weight,
    })
}

fn read_camera(cur: &mut Cur) -> Result<CameraKeyframe> {
    fields!(cur, camera {
        frame_no: u32,
        distance: f32,
        location: (f32, f32, f32),
        rotation: (f32, f32, f32),
        interpolation: [u8; 24],
        fov: u32,
        perspective: u8,
    });

    let (pitch, yaw, roll) = rotation;
    Ok(CameraKeyframe {
        frame_no,
        distance,
        location: Vector3::new(location.0, location.1, location.2),
        rotation: EulerAngles::new(roll, -pitch, yaw),
        interpolation: decode_camera(interpolation)?,
        fov,
        // 0 means on
        perspective: perspective == 0,
    })
}

fn read_light(cur: &mut Cur) -> Result<LightKeyframe> {
    fields!(cur, light {
        frame_no: u32,
        rgb: (f32, f32, f32),
        location: (f32, f32, f32),
    });

    Ok(LightKeyframe {
        frame_no,
        color: Vector3::new(rgb.0, rgb.1, rgb.2) * 256.0,
        location: Vector3::new(location.0, location.1, location.2),
    })
}

fn read_shadow(cur: &mut Cur) -> Result<ShadowKeyframe> {
    fields!(cur, shadow {
        frame_no: u32,
        mode: u8,
        distance: f32,
    });

    Ok(ShadowKeyframe::new(frame_no, ShadowMode::from_byte(mode), distance))
}

fn read_ik_switch(cur: &mut Cur, decoder: &dyn TextDecoder) -> Result<IkSwitch> {
    fields!(cur, ik {
        frame_no: u32,
        visible: bool,
        count: u32,
    });
    debug!("IK switch at frame {}: {} entries", frame_no, count);

    let mut entries = Vec::with_capacity(min(count as usize, cur.bytes_remaining() / 21));
    for _ in 0..count {
        fields!(cur, ik_entry {
            name: [u8; 20],
            enabled: bool,
        });
        entries.push(IkEntry {
            bone_name: read_text_field(decoder, name),
            enabled,
        });
    }

    Ok(IkSwitch { frame_no, visible, entries })
}


#[cfg(test)]
pub mod fixture {
    use cgmath::Quaternion;
    use crate::vmd::interpolation::{encode_motion, MotionInterpolation};

    /// Little-endian byte builder for test files.
    pub struct Bytes(pub Vec<u8>);

    impl Bytes {
        pub fn header(signature: &str, model: &str) -> Bytes {
            let mut b = Bytes(vec![]);
            b.text(signature, 30);
            b.text(model, 20);
            b
        }
        pub fn text(&mut self, s: &str, width: usize) -> &mut Bytes {
            let mut field = s.as_bytes().to_vec();
            field.resize(width, 0);
            self.0.extend_from_slice(&field);
            self
        }
        pub fn u8(&mut self, x: u8) -> &mut Bytes {
            self.0.push(x);
            self
        }
        pub fn u32(&mut self, x: u32) -> &mut Bytes {
            self.0.extend_from_slice(&x.to_le_bytes());
            self
        }
        pub fn f32(&mut self, x: f32) -> &mut Bytes {
            self.0.extend_from_slice(&x.to_bits().to_le_bytes());
            self
        }
        pub fn motion(&mut self, name: &str, frame: u32, loc: [f32; 3], q: Quaternion<f32>, interp: &MotionInterpolation) -> &mut Bytes {
            self.text(name, 15).u32(frame);
            for &x in &loc {
                self.f32(x);
            }
            self.f32(q.v.y).f32(q.v.x).f32(q.v.z).f32(q.s);
            self.0.extend_from_slice(&encode_motion(interp));
            self
        }
    }
}

#[cfg(test)]
fn read(buf: &[u8]) -> Result<MotionDocument> {
    use crate::vmd::text::EncodingDecoder;
    read_vmd(buf, &EncodingDecoder::shift_jis(), Settings::default())
}

#[test]
fn test_header_and_empty_motion_section() {
    use self::fixture::Bytes;

    let mut b = Bytes::header("Vocaloid Motion Data 0002", "miku");
    b.u32(0);
    let doc = read(&b.0).unwrap();
    assert_eq!(doc.header.signature, "Vocaloid Motion Data 0002");
    assert_eq!(doc.header.model_name, "miku");
    assert_eq!(doc.expansion.version, SpecVersion::V2);
    assert_eq!(doc.expansion.file_type, FileType::Vmd);
    assert!(doc.motions.is_empty());
    assert!(doc.morphs.is_empty());
    assert!(doc.cameras.is_empty());
    assert!(doc.lights.is_empty());
    assert!(doc.shadows.is_empty());
    assert!(doc.ik_switches.is_empty());

    // Header alone is fine too.
    let b = Bytes::header("Vocaloid Motion Data 0000", "");
    let doc = read(&b.0).unwrap();
    assert_eq!(doc.expansion.version, SpecVersion::V0);
    assert!(doc.motions.is_empty());
}

#[test]
fn test_bad_signature() {
    use crate::errors::ErrorKind;
    use self::fixture::Bytes;

    let mut b = Bytes::header("Polygon Model Data", "miku");
    b.u32(0);
    match read(&b.0).map_err(|e| e.0) {
        Err(ErrorKind::Format(_)) => (),
        Err(k) => panic!("wrong error {:?}", k),
        Ok(_) => panic!("accepted a bad signature"),
    }

    // Too short to hold a header, and the wrong type anyway.
    match read(b"PK\x03\x04").map_err(|e| e.0) {
        Err(ErrorKind::Format(_)) => (),
        Err(k) => panic!("wrong error {:?}", k),
        Ok(_) => panic!("accepted a bad signature"),
    }
}

#[test]
fn test_empty_file() {
    use crate::errors::ErrorKind;

    match read(&[]).map_err(|e| e.0) {
        Err(ErrorKind::Format(ref msg)) => assert_eq!(msg, "empty file"),
        Err(k) => panic!("wrong error {:?}", k),
        Ok(_) => panic!("accepted an empty file"),
    }
}

#[test]
fn test_truncated_record() {
    use crate::errors::ErrorKind;
    use std::io;
    use self::fixture::Bytes;

    let mut b = Bytes::header("Vocaloid Motion Data 0002", "miku");
    b.u32(1).text("center", 15).u32(0);
    match read(&b.0).map_err(|e| e.0) {
        Err(ErrorKind::Io(ref e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        Err(k) => panic!("wrong error {:?}", k),
        Ok(_) => panic!("accepted a truncated record"),
    }

    // A known signature with the header cut short.
    let b = Bytes::header("Vocaloid Motion Data 0002", "miku");
    match read(&b.0[..40]).map_err(|e| e.0) {
        Err(ErrorKind::Io(_)) => (),
        Err(k) => panic!("wrong error {:?}", k),
        Ok(_) => panic!("accepted a truncated header"),
    }
}

#[test]
fn test_motion_records() {
    use crate::vmd::interpolation::{Curve, MotionInterpolation};
    use self::fixture::Bytes;

    let h = (0.5f32).sqrt();
    let q = Quaternion::new(h, 0.0, 0.0, h);
    let interp = MotionInterpolation {
        x: Curve::new((20, 20), (107, 107)),
        y: Curve::new((1, 2), (3, 4)),
        z: Curve::new((0, 0), (127, 127)),
        rotation: Curve::new((64, 10), (64, 117)),
    };

    let mut b = Bytes::header("Vocaloid Motion Data 0002", "miku");
    b.u32(3);
    b.motion("center", 10, [1.0, 2.0, 3.0], q, &interp);
    b.motion("arm", 0, [0.0; 3], Quaternion::new(1.0, 0.0, 0.0, 0.0), &MotionInterpolation::default());
    b.motion("center", 5, [0.0; 3], Quaternion::new(1.0, 0.0, 0.0, 0.0), &MotionInterpolation::default());
    b.u32(0); // morph

    let doc = read(&b.0).unwrap();
    assert_eq!(doc.motions.len(), 3);

    let m = &doc.motions[0];
    assert_eq!(m.bone_name, "center");
    assert_eq!(m.frame_no, 10);
    assert_eq!(m.location, Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(m.quaternion, q);
    assert!((m.euler.roll + std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    assert_eq!(m.quaternion_left_hand, rotation::left_hand_quaternion(m.euler));
    assert_eq!(m.quaternion_right_hand, rotation::right_hand_quaternion(m.euler));
    assert_eq!(m.interpolation, interp);

    assert_eq!(m.link, ChannelLink { previous: None, next: Some(2) });
    assert_eq!(doc.motions[2].link.previous, Some(0));
    assert_eq!(doc.motions[1].link, ChannelLink::default());
    assert!(doc.cameras.is_empty());
}

#[test]
fn test_other_sections() {
    use crate::vmd::interpolation::Curve;
    use self::fixture::Bytes;

    let mut b = Bytes::header("Vocaloid Motion Data 0002", "");
    b.u32(0); // motion

    b.u32(1).text("smile", 15).u32(7).f32(0.5);

    b.u32(1);
    b.u32(3).f32(-45.0);
    b.f32(0.0).f32(10.0).f32(0.0);
    b.f32(0.25).f32(0.5).f32(-0.75);
    for i in 0..24 {
        b.u8(i);
    }
    b.u32(30).u8(0);

    b.u32(1).u32(0).f32(0.5).f32(1.0).f32(0.0).f32(-0.5).f32(-1.0).f32(0.5);

    b.u32(2);
    b.u32(0).u8(1).f32(0.0);
    b.u32(9).u8(5).f32(0.1);

    b.u32(1).u32(12).u8(1).u32(2);
    b.text("leg IK", 20).u8(0);
    b.text("toe IK", 20).u8(1);

    let doc = read(&b.0).unwrap();

    assert_eq!(doc.morphs.len(), 1);
    assert_eq!(doc.morphs[0].name, "smile");
    assert_eq!(doc.morphs[0].frame_no, 7);
    assert_eq!(doc.morphs[0].weight, 0.5);

    let c = &doc.cameras[0];
    assert_eq!((c.frame_no, c.distance), (3, -45.0));
    assert_eq!(c.location, Vector3::new(0.0, 10.0, 0.0));
    assert_eq!(c.rotation, EulerAngles::new(-0.75, -0.25, 0.5));
    assert_eq!(c.interpolation.x, Curve::new((0, 2), (1, 3)));
    assert_eq!(c.fov, 30);
    assert!(c.perspective);

    let l = &doc.lights[0];
    assert_eq!(l.color, Vector3::new(128.0, 256.0, 0.0));
    assert_eq!(l.location, Vector3::new(-0.5, -1.0, 0.5));

    assert_eq!(doc.shadows.len(), 2);
    assert_eq!(doc.shadows[0].mode, ShadowMode::First);
    assert!((doc.shadows[0].distance - 10000.0).abs() < 1e-2);
    assert_eq!(doc.shadows[1].mode, ShadowMode::None);
    assert!(doc.shadows[1].distance.abs() < 1e-2);

    let ik = &doc.ik_switches[0];
    assert_eq!((ik.frame_no, ik.visible), (12, true));
    assert_eq!(ik.entries.len(), 2);
    assert_eq!(ik.entries[0].bone_name, "leg IK");
    assert!(!ik.entries[0].enabled);
    assert!(ik.entries[1].enabled);
}
