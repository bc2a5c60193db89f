//! The decoded motion file.
//!
//! Everything here holds raw values as they came out of the file (text fields
//! already transcoded and trimmed). Frame offsets, unit scale and coordinate
//! system changes are applied on read-out by `Projection`; nothing in this
//! module applies them.

use cgmath::{Quaternion, Vector3};
use crate::vmd::interpolation::{CameraInterpolation, MotionInterpolation};
use crate::vmd::rotation::EulerAngles;

#[derive(Clone, Debug, Default)]
pub struct Header {
    pub signature: String,
    pub model_name: String,
}

/// Links a keyframe to the neighboring keyframes of the same bone, in file
/// order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelLink {
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct MotionKeyframe {
    pub bone_name: String,
    pub frame_no: u32,
    pub location: Vector3<f32>,
    pub quaternion: Quaternion<f32>,
    // Derived from `quaternion` when the record is read.
    pub euler: EulerAngles,
    pub quaternion_left_hand: Quaternion<f32>,
    pub quaternion_right_hand: Quaternion<f32>,
    pub interpolation: MotionInterpolation,
    pub link: ChannelLink,
}

#[derive(Clone, Debug)]
pub struct MorphKeyframe {
    pub name: String,
    pub frame_no: u32,
    pub weight: f32,
}

#[derive(Clone, Debug)]
pub struct CameraKeyframe {
    pub frame_no: u32,
    /// Stored negated relative to what the tool displays.
    pub distance: f32,
    pub location: Vector3<f32>,
    /// Pitch is already negated.
    pub rotation: EulerAngles,
    pub interpolation: CameraInterpolation,
    /// Degrees.
    pub fov: u32,
    pub perspective: bool,
}

#[derive(Clone, Debug)]
pub struct LightKeyframe {
    pub frame_no: u32,
    /// Each channel is the file's 0..1 value times 256.
    pub color: Vector3<f32>,
    pub location: Vector3<f32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShadowMode {
    None,
    First,
    Second,
}

impl ShadowMode {
    pub fn from_byte(b: u8) -> ShadowMode {
        match b {
            1 => ShadowMode::First,
            2 => ShadowMode::Second,
            _ => ShadowMode::None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            ShadowMode::None => 0,
            ShadowMode::First => 1,
            ShadowMode::Second => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShadowKeyframe {
    pub frame_no: u32,
    pub mode: ShadowMode,
    pub raw_distance: f32,
    /// `(0.1 - raw_distance) * 100000`
    pub distance: f32,
}

impl ShadowKeyframe {
    pub fn new(frame_no: u32, mode: ShadowMode, raw_distance: f32) -> ShadowKeyframe {
        ShadowKeyframe {
            frame_no,
            mode,
            raw_distance,
            distance: (0.1 - raw_distance) * 100000.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IkEntry {
    pub bone_name: String,
    pub enabled: bool,
}

#[derive(Clone, Debug)]
pub struct IkSwitch {
    pub frame_no: u32,
    pub visible: bool,
    pub entries: Vec<IkEntry>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoordinateSystem {
    LeftHand,
    RightHand,
    MmdHand,
}

impl CoordinateSystem {
    pub fn name(self) -> &'static str {
        match self {
            CoordinateSystem::LeftHand => "LeftHand",
            CoordinateSystem::RightHand => "RightHand",
            CoordinateSystem::MmdHand => "MMDHand",
        }
    }
}

impl Default for CoordinateSystem {
    fn default() -> CoordinateSystem {
        CoordinateSystem::MmdHand
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    Default,
    Centimeter,
    Millimeter,
}

impl Unit {
    pub fn scale(self) -> f32 {
        match self {
            Unit::Default => 1.0,
            Unit::Centimeter => 8.0,
            Unit::Millimeter => 80.0,
        }
    }
}

impl Default for Unit {
    fn default() -> Unit {
        Unit::Default
    }
}

/// The format revision, from the header signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpecVersion {
    V0,
    V1,
    V2,
    Unknown,
}

/// Known signatures, newest first.
static SIGNATURES: [(&str, SpecVersion); 3] = [
    ("Vocaloid Motion Data 0002", SpecVersion::V2),
    ("Vocaloid Motion Data 0001", SpecVersion::V1),
    ("Vocaloid Motion Data 0000", SpecVersion::V0),
];

impl SpecVersion {
    pub fn from_signature(signature: &str) -> SpecVersion {
        SIGNATURES.iter()
            .find(|&&(magic, _)| signature.starts_with(magic))
            .map(|&(_, version)| version)
            .unwrap_or(SpecVersion::Unknown)
    }

    /// -1 when unknown.
    pub fn number(self) -> i32 {
        match self {
            SpecVersion::V0 => 0,
            SpecVersion::V1 => 1,
            SpecVersion::V2 => 2,
            SpecVersion::Unknown => -1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileType {
    Vmd,
    Unknown,
}

impl FileType {
    pub fn name(self) -> &'static str {
        match self {
            FileType::Vmd => "VMD",
            FileType::Unknown => "UNKNOWN",
        }
    }
}

/// How a document should be read out. Passed in explicitly; there is no
/// process-wide configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// -1 means no target.
    pub target_id: i32,
    /// Added to every frame number on read-out.
    pub start_frame: i32,
    pub coordinate_system: CoordinateSystem,
    pub unit: Unit,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            target_id: -1,
            start_frame: 0,
            coordinate_system: CoordinateSystem::MmdHand,
            unit: Unit::Default,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Expansion {
    pub settings: Settings,
    pub version: SpecVersion,
    pub file_type: FileType,
}

#[derive(Clone, Debug)]
pub struct MotionDocument {
    pub header: Header,
    pub motions: Vec<MotionKeyframe>,
    pub morphs: Vec<MorphKeyframe>,
    pub cameras: Vec<CameraKeyframe>,
    pub lights: Vec<LightKeyframe>,
    pub shadows: Vec<ShadowKeyframe>,
    pub ik_switches: Vec<IkSwitch>,
    pub expansion: Expansion,
}

impl MotionDocument {
    pub fn new(settings: Settings) -> MotionDocument {
        MotionDocument {
            header: Header::default(),
            motions: vec![],
            morphs: vec![],
            cameras: vec![],
            lights: vec![],
            shadows: vec![],
            ik_switches: vec![],
            expansion: Expansion {
                settings,
                version: SpecVersion::Unknown,
                file_type: FileType::Unknown,
            },
        }
    }

    /// Records the header signature and what it says about the file.
    pub fn set_signature(&mut self, signature: String) {
        let version = SpecVersion::from_signature(&signature);
        self.expansion.version = version;
        self.expansion.file_type = match version {
            SpecVersion::Unknown => FileType::Unknown,
            _ => FileType::Vmd,
        };
        self.header.signature = signature;
    }
}


#[test]
fn test_signature_versions() {
    let mut doc = MotionDocument::new(Settings::default());
    assert_eq!(doc.expansion.file_type, FileType::Unknown);

    doc.set_signature("Vocaloid Motion Data 0002".to_string());
    assert_eq!(doc.expansion.version, SpecVersion::V2);
    assert_eq!(doc.expansion.file_type, FileType::Vmd);

    assert_eq!(SpecVersion::from_signature("Vocaloid Motion Data 0000 junk"), SpecVersion::V0);
    assert_eq!(SpecVersion::from_signature("Vocaloid Motion Data file"), SpecVersion::Unknown);
    assert_eq!(SpecVersion::Unknown.number(), -1);

    doc.set_signature("Polygon Model Data".to_string());
    assert_eq!(doc.expansion.file_type, FileType::Unknown);
}

#[test]
fn test_shadow_distance() {
    let s = ShadowKeyframe::new(0, ShadowMode::from_byte(1), 0.0);
    assert_eq!(s.mode, ShadowMode::First);
    assert!((s.distance - 10000.0).abs() < 1e-2);
    assert_eq!(ShadowMode::from_byte(7), ShadowMode::None);
}
