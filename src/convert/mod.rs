mod json;

use crate::cli::Args;
use crate::errors::{Result, ResultExt};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use crate::vmd::{self, EncodingDecoder, MotionDocument, Settings, TextDecoder};

pub use self::json::to_json;

pub fn main(args: &Args) -> Result<()> {
    let converter = Converter {
        settings: args.settings,
        minify: args.minify,
        group_by_name: args.group_by_name,
        ..Converter::new()
    };

    converter.convert(&args.input)?;

    match args.output {
        Some(ref path) => converter.write_output(path)?,
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(converter.output().as_bytes())?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Converts motion files to JSON text.
///
/// The last result is kept in an output buffer. All work on one converter is
/// serialized by the buffer's lock, so a converter can be shared between
/// threads without output from two calls interleaving.
pub struct Converter {
    pub settings: Settings,
    pub minify: bool,
    pub group_by_name: bool,
    pub decoder: Box<dyn TextDecoder + Send + Sync>,
    output: Mutex<String>,
}

impl Converter {
    pub fn new() -> Converter {
        Converter {
            settings: Settings::default(),
            minify: false,
            group_by_name: false,
            decoder: Box::new(EncodingDecoder::shift_jis()),
            output: Mutex::new(String::new()),
        }
    }

    fn lock(&self) -> MutexGuard<String> {
        // A panic elsewhere can't leave the String itself invalid.
        self.output.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Decodes the file at `path` and replaces the output buffer with its
    /// JSON. On error the buffer is left empty.
    pub fn convert(&self, path: &Path) -> Result<()> {
        let mut out = self.lock();
        out.clear();
        let doc = vmd::load(path, &*self.decoder, self.settings)
            .chain_err(|| format!("couldn't convert {}", path.display()))?;
        *out = self.render(&doc);
        Ok(())
    }

    /// Like `convert`, for a file already in memory.
    pub fn convert_bytes(&self, buf: &[u8]) -> Result<()> {
        let mut out = self.lock();
        out.clear();
        let doc = vmd::read_vmd(buf, &*self.decoder, self.settings)?;
        *out = self.render(&doc);
        Ok(())
    }

    fn render(&self, doc: &MotionDocument) -> String {
        let value = to_json(doc, self.group_by_name);
        if self.minify {
            value.dump()
        } else {
            value.pretty(2)
        }
    }

    /// A copy of the output buffer.
    pub fn output(&self) -> String {
        self.lock().clone()
    }

    /// Writes the output buffer to `path` as UTF-8.
    pub fn write_output(&self, path: &Path) -> Result<()> {
        let out = self.lock();
        let mut f = File::create(path)
            .chain_err(|| format!("couldn't create {}", path.display()))?;
        f.write_all(out.as_bytes())?;
        info!("wrote {} at {}", path.display(), time::now().rfc822());
        Ok(())
    }
}


#[cfg(test)]
fn sample_file() -> Vec<u8> {
    use cgmath::Quaternion;
    use crate::vmd::interpolation::{Curve, MotionInterpolation};
    use crate::vmd::read::fixture::Bytes;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    let h = (0.5f32).sqrt();
    let interp = MotionInterpolation {
        x: Curve::new((20, 20), (107, 107)),
        ..MotionInterpolation::default()
    };
    let identity = Quaternion::new(1.0, 0.0, 0.0, 0.0);

    let mut b = Bytes::header("Vocaloid Motion Data 0002", "miku");
    b.u32(3);
    b.motion("center", 10, [1.234, -5.0, 0.5], Quaternion::new(h, 0.0, 0.0, h), &interp);
    b.motion("arm", 0, [0.0; 3], identity, &MotionInterpolation::default());
    b.motion("center", 20, [0.0; 3], identity, &MotionInterpolation::default());

    b.u32(1).text("smile", 15).u32(3).f32(0.1);

    // camera: distance, location, (pitch, yaw, roll), curves, fov, perspective
    b.u32(1).u32(5).f32(-45.0);
    b.f32(0.0).f32(10.0).f32(0.0);
    b.f32(FRAC_PI_2).f32(FRAC_PI_4).f32(0.0);
    for i in 0..24 {
        b.u8(i);
    }
    b.u32(30).u8(0);

    // light: rgb, location
    b.u32(1).u32(0).f32(0.5).f32(1.0).f32(0.0).f32(-0.44).f32(-1.0).f32(0.5);

    // self shadow: mode, raw distance
    b.u32(1).u32(9).u8(1).f32(0.05);

    b.u32(1).u32(12).u8(1).u32(2);
    b.text("leg IK", 20).u8(0);
    b.text("toe IK", 20).u8(1);
    b.0
}

#[test]
fn test_mmd_hand_output() {
    let converter = Converter::new();
    converter.convert_bytes(&sample_file()).unwrap();
    let v = ::json::parse(&converter.output()).unwrap();

    assert_eq!(v["Header"]["FileSignature"], "Vocaloid Motion Data 0002");
    assert_eq!(v["Header"]["ModelName"], "miku");

    assert_eq!(v["Motion"]["Count"], 3);
    let m = &v["Motion"]["Data"][0];
    assert_eq!(m["FrameNo"], 10);
    assert_eq!(m["Name"], "center");
    // Stored location, rounded to 2 places.
    assert_eq!(m["Location"][0].as_f64(), Some(1.23));
    assert_eq!(m["Location"][1].as_f64(), Some(-5.0));
    assert_eq!(m["Location"][2].as_f64(), Some(0.5));
    // (pitch, yaw, roll) of a -90 degree roll
    assert_eq!(m["Rotation"]["Euler"][0].as_f64(), Some(0.0));
    assert_eq!(m["Rotation"]["Euler"][1].as_f64(), Some(0.0));
    assert_eq!(m["Rotation"]["Euler"][2].as_f64(), Some(-90.0));
    assert_eq!(m["Rotation"]["Quaternion"][3].as_f64(), Some(0.70710677));
    assert_eq!(m["Interpolation"]["X"]["start"][0], 20);
    assert_eq!(m["Interpolation"]["X"]["end"][1], 107);

    assert_eq!(v["Skin"]["Count"], 1);
    let s = &v["Skin"]["Data"][0];
    assert_eq!(s["Name"], "smile");
    assert_eq!(s["FrameNo"], 3);
    assert_eq!(s["Weight"].as_f64(), Some(0.1));

    assert_eq!(v["Camera"]["Count"], 1);
    let c = &v["Camera"]["Data"][0];
    assert_eq!(c["FrameNo"], 5);
    assert_eq!(c["Length"].as_f64(), Some(-45.0));
    assert_eq!(c["Location"][1].as_f64(), Some(10.0));
    // Pitch is negated when read.
    assert_eq!(c["Rotation"][0].as_f64(), Some(-90.0));
    assert_eq!(c["Rotation"][1].as_f64(), Some(45.0));
    assert_eq!(c["Rotation"][2].as_f64(), Some(0.0));
    assert_eq!(c["Interpolation"]["X"]["start"][1], 2);
    assert_eq!(c["Interpolation"]["ViewingAngle"]["end"][0], 21);
    assert_eq!(c["ViewingAngle"], 30);
    assert_eq!(c["Perspective"], true);

    assert_eq!(v["Illumination"]["Count"], 1);
    let l = &v["Illumination"]["Data"][0];
    assert_eq!(l["FrameNo"], 0);
    assert_eq!(l["RGB"][0].as_f64(), Some(128.0));
    assert_eq!(l["RGB"][1].as_f64(), Some(256.0));
    assert_eq!(l["RGB"][2].as_f64(), Some(0.0));
    // One decimal place.
    assert_eq!(l["Location"][0].as_f64(), Some(-0.4));
    assert_eq!(l["Location"][1].as_f64(), Some(-1.0));
    assert_eq!(l["Location"][2].as_f64(), Some(0.5));

    assert_eq!(v["SelfShadow"]["Count"], 1);
    let sh = &v["SelfShadow"]["Data"][0];
    assert_eq!(sh["FrameNo"], 9);
    assert_eq!(sh["Mode"], 1);
    assert_eq!(sh["Distance_Value"].as_f64(), Some(0.05));
    assert_eq!(sh["Distance"].as_f64(), Some(5000.0));

    assert_eq!(v["IK"]["Count"], 1);
    let ik = &v["IK"]["Data"][0];
    assert_eq!(ik["FrameNo"], 12);
    assert_eq!(ik["Visible"], true);
    assert_eq!(ik["Count"], 2);
    assert_eq!(ik["Data"][0]["BoneName"], "leg IK");
    assert_eq!(ik["Data"][0]["Enabled"], false);
    assert_eq!(ik["Data"][1]["BoneName"], "toe IK");
    assert_eq!(ik["Data"][1]["Enabled"], true);

    let e = &v["Expansion"];
    assert_eq!(e["TargetID"], -1);
    assert_eq!(e["StartFrame"], 0);
    assert_eq!(e["Version"], 2);
    assert_eq!(e["FileType"], "VMD");
    assert_eq!(e["CoordinateSystem"], "MMDHand");
    assert_eq!(e["GroupType"], "NONE");
}

#[test]
fn test_output_options() {
    use crate::vmd::{CoordinateSystem, Unit};

    let converter = Converter {
        settings: Settings {
            start_frame: 100,
            coordinate_system: CoordinateSystem::RightHand,
            unit: Unit::Centimeter,
            target_id: 3,
        },
        minify: true,
        group_by_name: true,
        ..Converter::new()
    };
    converter.convert_bytes(&sample_file()).unwrap();
    let s = converter.output();
    assert!(!s.contains('\n'));
    assert!(s.contains(r#""Weight":0.1}"#));

    let v = ::json::parse(&s).unwrap();
    let center = &v["Motion"]["Data"]["center"];
    assert_eq!(center.len(), 2);
    assert_eq!(center[0]["FrameNo"], 110);
    assert_eq!(center[1]["FrameNo"], 120);
    // (-z, x, y) * 8
    assert_eq!(center[0]["Location"][0].as_f64(), Some(-4.0));
    assert_eq!(center[0]["Location"][1].as_f64(), Some(9.87));
    assert_eq!(center[0]["Location"][2].as_f64(), Some(-40.0));
    assert_eq!(v["Motion"]["Data"]["arm"].len(), 1);
    assert_eq!(v["Motion"]["Count"], 3);
    assert_eq!(v["Skin"]["Data"][0]["FrameNo"], 103);

    let c = &v["Camera"]["Data"][0];
    assert_eq!(c["FrameNo"], 105);
    assert_eq!(c["Length"].as_f64(), Some(-360.0));
    assert_eq!(c["Location"][2].as_f64(), Some(80.0));
    // (roll, pitch, yaw)
    assert_eq!(c["Rotation"][0].as_f64(), Some(0.0));
    assert_eq!(c["Rotation"][1].as_f64(), Some(-90.0));
    assert_eq!(c["Rotation"][2].as_f64(), Some(45.0));

    // (z, -x, -y), never scaled
    let l = &v["Illumination"]["Data"][0];
    assert_eq!(l["FrameNo"], 100);
    assert_eq!(l["Location"][0].as_f64(), Some(0.5));
    assert_eq!(l["Location"][1].as_f64(), Some(0.4));
    assert_eq!(l["Location"][2].as_f64(), Some(1.0));

    assert_eq!(v["SelfShadow"]["Data"][0]["FrameNo"], 109);
    assert_eq!(v["IK"]["Data"][0]["FrameNo"], 112);

    let e = &v["Expansion"];
    assert_eq!(e["TargetID"], 3);
    assert_eq!(e["StartFrame"], 100);
    assert_eq!(e["CoordinateSystem"], "RightHand");
    assert_eq!(e["GroupType"], "NAME");
}

#[test]
fn test_left_hand_camera() {
    use crate::vmd::CoordinateSystem;

    let converter = Converter {
        settings: Settings {
            coordinate_system: CoordinateSystem::LeftHand,
            ..Settings::default()
        },
        ..Converter::new()
    };
    converter.convert_bytes(&sample_file()).unwrap();
    let v = ::json::parse(&converter.output()).unwrap();

    // (-pitch, -yaw, roll)
    let c = &v["Camera"]["Data"][0];
    assert_eq!(c["Rotation"][0].as_f64(), Some(90.0));
    assert_eq!(c["Rotation"][1].as_f64(), Some(-45.0));
    assert_eq!(c["Rotation"][2].as_f64(), Some(0.0));
    assert_eq!(c["Length"].as_f64(), Some(-45.0));

    let l = &v["Illumination"]["Data"][0];
    assert_eq!(l["Location"][0].as_f64(), Some(0.4));
    assert_eq!(l["Location"][1].as_f64(), Some(1.0));
    assert_eq!(l["Location"][2].as_f64(), Some(-0.5));
}

#[test]
fn test_extreme_start_frame() {
    let converter = Converter {
        settings: Settings { start_frame: i32::max_value(), ..Settings::default() },
        ..Converter::new()
    };
    converter.convert_bytes(&sample_file()).unwrap();
    let v = ::json::parse(&converter.output()).unwrap();
    assert_eq!(v["Motion"]["Data"][0]["FrameNo"].as_i64(), Some(2147483657));

    let converter = Converter {
        settings: Settings { start_frame: i32::min_value(), ..Settings::default() },
        ..Converter::new()
    };
    converter.convert_bytes(&sample_file()).unwrap();
    let v = ::json::parse(&converter.output()).unwrap();
    assert_eq!(v["Motion"]["Data"][0]["FrameNo"].as_i64(), Some(-2147483638));
}

#[test]
fn test_shared_converter() {
    use std::sync::Arc;
    use std::thread;

    let converter = Arc::new(Converter::new());
    let expected = {
        converter.convert_bytes(&sample_file()).unwrap();
        converter.output()
    };

    // The buffer is cleared and refilled under one lock, so a reader only
    // ever sees a whole document.
    let threads: Vec<_> = (0..4).map(|_| {
        let converter = converter.clone();
        let expected = expected.clone();
        thread::spawn(move || {
            for _ in 0..10 {
                converter.convert_bytes(&sample_file()).unwrap();
                assert_eq!(converter.output(), expected);
            }
        })
    }).collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(converter.output(), expected);
}

#[test]
fn test_files() {
    use crate::errors::ErrorKind;
    use std::env::temp_dir;
    use std::fs;
    use std::io;

    let dir = temp_dir();
    let input = dir.join(format!("vmd2json-test-{}.vmd", std::process::id()));
    let output = dir.join(format!("vmd2json-test-{}.json", std::process::id()));
    fs::write(&input, sample_file()).unwrap();

    let converter = Converter::new();
    converter.convert(&input).unwrap();
    converter.write_output(&output).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), converter.output());

    let _ = fs::remove_file(&input);
    let _ = fs::remove_file(&output);

    // Missing input is an I/O error and leaves nothing behind.
    let err = converter.convert(&input).unwrap_err();
    assert!(err.to_string().starts_with("couldn't convert"));
    let root = err.iter().last().map(|e| e.to_string());
    match vmd::load(&input, &EncodingDecoder::shift_jis(), Settings::default()).map_err(|e| e.0) {
        Err(ErrorKind::Io(ref e)) => {
            assert_eq!(e.kind(), io::ErrorKind::NotFound);
            assert_eq!(root, Some(e.to_string()));
        }
        Err(k) => panic!("wrong error {:?}", k),
        Ok(_) => panic!("read a missing file"),
    }
    assert_eq!(converter.output(), "");
}
