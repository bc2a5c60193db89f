//! Interpolation curve blocks.
//!
//! Each keyframe carries one cubic Bezier easing curve per animated channel.
//! A curve is two control points, each a (time, amount) pair of bytes; the
//! end points (0,0) and (127,127) are implicit.
//!
//! Bone records store their 4 curves (X, Y, Z, Rotation) = 16 logical bytes in
//! a 64 byte block. The 16 values are written out four times, each pass
//! shifted one byte further left, with some leading slots zeroed and a 3 byte
//! zero footer:
//!
//! ```text
//!            X  Y  Z  R  X  Y  Z  R  X  Y  Z  R  X  Y  Z  R
//!            time------- amount----- time------- amount-----
//!            start------------------ stop-------------------
//!  pass 1    06 15 21 30 49 56 5F 69 0E 1A 27 39 51 5A 63 6F
//!  pass 2       15 21 30 49 56 5F 69 0E 1A 27 39 51 5A 63 6F
//!  pass 3       00 21 30 49 56 5F 69 0E 1A 27 39 51 5A 63 6F
//!  pass 4       00 00 30 49 56 5F 69 0E 1A 27 39 51 5A 63 6F 00 00 00
//! ```
//!
//! Files in the wild do not always keep the copies in agreement, so decoding
//! folds over every slot in file order and keeps, for each logical value, the
//! first non-zero byte seen (or zero if there is none). Encoding writes the
//! canonical value into every slot of the value and zeros the blank slots, so
//! `decode(encode(c)) == c` but noise in the copies is not preserved.
//!
//! Camera records have no redundancy: 6 curves (X, Y, Z, Rotation, Distance,
//! FieldOfView) of 4 bytes each, ordered start time, stop time, start amount,
//! stop amount.

use crate::errors::{ErrorKind, Result};

pub const MOTION_BLOCK_LEN: usize = 64;
pub const CAMERA_BLOCK_LEN: usize = 24;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlPoint {
    pub time: u8,
    pub amount: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Curve {
    pub start: ControlPoint,
    pub stop: ControlPoint,
}

impl Curve {
    pub fn new(start: (u8, u8), stop: (u8, u8)) -> Curve {
        Curve {
            start: ControlPoint { time: start.0, amount: start.1 },
            stop: ControlPoint { time: stop.0, amount: stop.1 },
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MotionInterpolation {
    pub x: Curve,
    pub y: Curve,
    pub z: Curve,
    pub rotation: Curve,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraInterpolation {
    pub x: Curve,
    pub y: Curve,
    pub z: Curve,
    pub rotation: Curve,
    pub distance: Curve,
    pub fov: Curve,
}

/// What a byte of the motion block holds. Logical values are numbered the way
/// pass 1 lays them out: `4 * component + curve`, where component is start
/// time, start amount, stop time, stop amount and curve is X, Y, Z, Rotation.
#[derive(Copy, Clone)]
enum Slot {
    /// A copy of logical value n.
    Value(u8),
    /// Read as a copy of logical value n, but always written as zero.
    Blank(u8),
    /// Always zero, ignored on read.
    Footer,
}

use self::Slot::{Blank, Footer, Value};

static MOTION_LAYOUT: [Slot; MOTION_BLOCK_LEN] = [
    // pass 1
    Value(0), Value(1), Value(2), Value(3),
    Value(4), Value(5), Value(6), Value(7),
    Value(8), Value(9), Value(10), Value(11),
    Value(12), Value(13), Value(14), Value(15),
    // pass 2
    Value(1), Value(2), Value(3),
    Value(4), Value(5), Value(6), Value(7),
    Value(8), Value(9), Value(10), Value(11),
    Value(12), Value(13), Value(14), Value(15),
    // pass 3
    Blank(1), Value(2), Value(3),
    Value(4), Value(5), Value(6), Value(7),
    Value(8), Value(9), Value(10), Value(11),
    Value(12), Value(13), Value(14), Value(15),
    // pass 4
    Blank(1), Blank(2), Value(3),
    Value(4), Value(5), Value(6), Value(7),
    Value(8), Value(9), Value(10), Value(11),
    Value(12), Value(13), Value(14), Value(15),
    Footer, Footer, Footer,
];

impl MotionInterpolation {
    fn curves(&self) -> [Curve; 4] {
        [self.x, self.y, self.z, self.rotation]
    }

    fn to_values(&self) -> [u8; 16] {
        let mut values = [0; 16];
        for (i, curve) in self.curves().iter().enumerate() {
            values[i] = curve.start.time;
            values[4 + i] = curve.start.amount;
            values[8 + i] = curve.stop.time;
            values[12 + i] = curve.stop.amount;
        }
        values
    }

    fn from_values(v: &[u8; 16]) -> MotionInterpolation {
        let curve = |i: usize| Curve::new((v[i], v[4 + i]), (v[8 + i], v[12 + i]));
        MotionInterpolation {
            x: curve(0),
            y: curve(1),
            z: curve(2),
            rotation: curve(3),
        }
    }
}

/// Decodes the 64 byte block of a bone keyframe.
pub fn decode_motion(block: &[u8]) -> Result<MotionInterpolation> {
    if block.len() != MOTION_BLOCK_LEN {
        return Err(ErrorKind::DecodeRange(MOTION_BLOCK_LEN, block.len()).into());
    }

    let mut seen: [Option<u8>; 16] = [None; 16];
    for (slot, &b) in MOTION_LAYOUT.iter().zip(block) {
        let n = match *slot {
            Value(n) | Blank(n) => n as usize,
            Footer => {
                if b != 0 {
                    trace!("non-zero interpolation footer byte {:#04x}", b);
                }
                continue;
            }
        };
        match seen[n] {
            Some(v) if v != 0 => (),
            _ => seen[n] = Some(b),
        }
    }

    let mut values = [0; 16];
    for (v, s) in values.iter_mut().zip(seen.iter()) {
        *v = s.unwrap_or(0);
    }
    Ok(MotionInterpolation::from_values(&values))
}

/// Encodes a bone keyframe's curves into the redundant 64 byte block.
pub fn encode_motion(interp: &MotionInterpolation) -> [u8; MOTION_BLOCK_LEN] {
    let values = interp.to_values();
    let mut block = [0; MOTION_BLOCK_LEN];
    for (b, slot) in block.iter_mut().zip(MOTION_LAYOUT.iter()) {
        *b = match *slot {
            Value(n) => values[n as usize],
            Blank(_) | Footer => 0,
        };
    }
    block
}

/// Decodes the 24 byte block of a camera keyframe.
pub fn decode_camera(block: &[u8]) -> Result<CameraInterpolation> {
    if block.len() != CAMERA_BLOCK_LEN {
        return Err(ErrorKind::DecodeRange(CAMERA_BLOCK_LEN, block.len()).into());
    }
    let curve = |i: usize| {
        let c = &block[4 * i .. 4 * i + 4];
        Curve::new((c[0], c[2]), (c[1], c[3]))
    };
    Ok(CameraInterpolation {
        x: curve(0),
        y: curve(1),
        z: curve(2),
        rotation: curve(3),
        distance: curve(4),
        fov: curve(5),
    })
}

pub fn encode_camera(interp: &CameraInterpolation) -> [u8; CAMERA_BLOCK_LEN] {
    let curves = [
        interp.x, interp.y, interp.z,
        interp.rotation, interp.distance, interp.fov,
    ];
    let mut block = [0; CAMERA_BLOCK_LEN];
    for (c, curve) in block.chunks_mut(4).zip(curves.iter()) {
        c[0] = curve.start.time;
        c[1] = curve.stop.time;
        c[2] = curve.start.amount;
        c[3] = curve.stop.amount;
    }
    block
}


#[test]
fn test_decode_sample_block() {
    let block: [u8; 64] = [
        0x06, 0x15, 0x00, 0x00, 0x49, 0x56, 0x5F, 0x69, 0x0E, 0x1A, 0x27, 0x39, 0x51, 0x5A, 0x63, 0x6F,
        0x15, 0x21, 0x30, 0x49, 0x56, 0x5F, 0x69, 0x0E, 0x1A, 0x27, 0x39, 0x51, 0x5A, 0x63, 0x6F,
        0x00, 0x21, 0x30, 0x49, 0x56, 0x5F, 0x69, 0x0E, 0x1A, 0x27, 0x39, 0x51, 0x5A, 0x63, 0x6F,
        0x00, 0x00, 0x30, 0x49, 0x56, 0x5F, 0x69, 0x0E, 0x1A, 0x27, 0x39, 0x51, 0x5A, 0x63, 0x6F,
        0x00, 0x00, 0x00,
    ];
    let interp = decode_motion(&block).unwrap();
    assert_eq!(interp.x, Curve::new((0x06, 0x49), (0x0E, 0x51)));
    assert_eq!(interp.y, Curve::new((0x15, 0x56), (0x1A, 0x5A)));
    // Z and Rotation start times are zero in pass 1 and filled from pass 2.
    assert_eq!(interp.z, Curve::new((0x21, 0x5F), (0x27, 0x63)));
    assert_eq!(interp.rotation, Curve::new((0x30, 0x69), (0x39, 0x6F)));
}

#[test]
fn test_first_nonzero_wins() {
    let mut block = [0u8; 64];
    // Y start time: 0 in pass 1, 7 in pass 2, 9 in pass 3 (a blank slot).
    block[16] = 7;
    block[31] = 9;
    // X stop amount: 20 in pass 1, a disagreeing 30 in pass 2.
    block[12] = 20;
    block[27] = 30;
    // R start time: only set in the last pass.
    block[48] = 100;
    // Footer noise is dropped.
    block[61] = 0xFF;

    let interp = decode_motion(&block).unwrap();
    assert_eq!(interp.y.start.time, 7);
    assert_eq!(interp.x.stop.amount, 20);
    assert_eq!(interp.rotation.start.time, 100);
    assert_eq!(interp.z, Curve::default());
}

#[test]
fn test_blank_slot_is_read() {
    let mut block = [0u8; 64];
    block[46] = 5; // pass 4's blank copy of Y start time
    block[47] = 6; // pass 4's blank copy of Z start time
    let interp = decode_motion(&block).unwrap();
    assert_eq!(interp.y.start.time, 5);
    assert_eq!(interp.z.start.time, 6);
}

#[test]
fn test_motion_round_trip() {
    let sets = [
        MotionInterpolation::default(),
        MotionInterpolation {
            x: Curve::new((20, 20), (107, 107)),
            y: Curve::new((20, 20), (107, 107)),
            z: Curve::new((20, 20), (107, 107)),
            rotation: Curve::new((20, 20), (107, 107)),
        },
        MotionInterpolation {
            x: Curve::new((0, 1), (2, 3)),
            y: Curve::new((0, 0), (127, 0)),
            z: Curve::new((64, 0), (0, 127)),
            rotation: Curve::new((255, 128), (1, 0)),
        },
    ];
    for interp in sets.iter() {
        let block = encode_motion(interp);
        assert_eq!(&decode_motion(&block).unwrap(), interp);
        assert_eq!(&block[61..], &[0, 0, 0]);
        assert_eq!((block[31], block[46], block[47]), (0, 0, 0));
    }
}

#[test]
fn test_encode_is_lossy() {
    let mut block = encode_motion(&MotionInterpolation {
        x: Curve::new((1, 2), (3, 4)),
        y: Curve::new((5, 6), (7, 8)),
        z: Curve::new((9, 10), (11, 12)),
        rotation: Curve::new((13, 14), (15, 16)),
    });
    let clean = block;
    block[20] = 99; // disagreeing copy
    block[63] = 1; // footer noise
    let decoded = decode_motion(&block).unwrap();
    assert_eq!(encode_motion(&decoded)[..], clean[..]);
    assert_ne!(encode_motion(&decoded)[..], block[..]);
}

#[test]
fn test_wrong_length() {
    match decode_motion(&[0; 63]) {
        Err(e) => match *e.kind() {
            ErrorKind::DecodeRange(64, 63) => (),
            ref k => panic!("wrong error {:?}", k),
        },
        Ok(_) => panic!("short block accepted"),
    }
    assert!(decode_camera(&[0; 64]).is_err());
}

#[test]
fn test_camera_layout() {
    let mut block = [0u8; 24];
    for (i, b) in block.iter_mut().enumerate() {
        *b = i as u8;
    }
    let interp = decode_camera(&block).unwrap();
    assert_eq!(interp.x, Curve::new((0, 2), (1, 3)));
    assert_eq!(interp.fov, Curve::new((20, 22), (21, 23)));
    assert_eq!(encode_camera(&interp), block);
}
