//! Load VMD motion files.
//!
//! VMD is the keyframe animation format of MikuMikuDance. A file holds bone
//! keyframes, morph weights and the camera, light, self-shadow and IK
//! visibility tracks. These modules decode the binary format into a
//! `MotionDocument` and project its values into the coordinate conventions
//! other tools expect.
//!
//! There is no official documentation; the layouts here follow what the
//! tool itself writes.

pub mod text;
pub mod interpolation;
pub mod rotation;
pub mod document;
pub mod read;
pub mod channel;
pub mod projection;

pub use self::document::MotionDocument;
pub use self::document::{MotionKeyframe, MorphKeyframe, CameraKeyframe};
pub use self::document::{LightKeyframe, ShadowKeyframe, IkSwitch};
pub use self::document::{Settings, CoordinateSystem, Unit};
pub use self::read::{load, read_vmd};
pub use self::text::{TextDecoder, EncodingDecoder};
