use clap::ArgMatches;
use log::Level;
use std::path::PathBuf;
use crate::version::version_string;
use crate::vmd::{CoordinateSystem, Settings, Unit};

pub struct Args {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub settings: Settings,
    pub minify: bool,
    pub group_by_name: bool,
    pub log_level: Level,
}

pub fn parse_cli_args() -> Args {
    let version = version_string();
    let app = clap_app!(vmd2json =>
        (version: version.as_str())
        (about: "Converts MikuMikuDance motion files (.vmd) to JSON")
        (@arg FILE: -F --file +takes_value +required "input .vmd file")
        (@arg OUTPUT: -O --output +takes_value "write JSON here (default: stdout)")
        (@arg START_FRAME: -S --("start-frame") +takes_value +allow_hyphen_values
            "add this to every frame number (default: 0)")
        (@arg TARGET_ID: -T --("target-id") +takes_value +allow_hyphen_values
            "target id to record in the output (default: -1)")
        (@arg MINIFY: -M --minify "no line breaks or indentation")
        (@arg GROUP_BY_NAME: -G --("group-by-name") "nest motion keys under their bone name")
        (@arg UNIT: -U --unit +takes_value possible_value[cm mm]
            "scale lengths to centimeters or millimeters")
        (@arg LEFTHAND: --lefthand "left-handed coordinates")
        (@arg RIGHTHAND: --righthand "right-handed coordinates")
        (@arg MMDHAND: --mmdhand "MikuMikuDance's own coordinates (default)")
        (@arg QUIET: -q --quiet "only print errors")
        (@arg DEBUG: -D --debug "trace every field read")
    );
    let matches = app.get_matches();
    args_from_matches(&matches)
}

fn args_from_matches(matches: &ArgMatches) -> Args {
    let mut settings = Settings::default();
    if matches.is_present("START_FRAME") {
        settings.start_frame = value_t!(matches, "START_FRAME", i32)
            .unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("TARGET_ID") {
        settings.target_id = value_t!(matches, "TARGET_ID", i32)
            .unwrap_or_else(|e| e.exit());
    }
    settings.unit = match matches.value_of("UNIT") {
        Some("cm") => Unit::Centimeter,
        Some("mm") => Unit::Millimeter,
        _ => Unit::Default,
    };
    // When several are given, left beats right beats MMD.
    settings.coordinate_system =
        if matches.is_present("LEFTHAND") {
            CoordinateSystem::LeftHand
        } else if matches.is_present("RIGHTHAND") {
            CoordinateSystem::RightHand
        } else {
            CoordinateSystem::MmdHand
        };

    let log_level =
        if matches.is_present("DEBUG") {
            Level::Trace
        } else if matches.is_present("QUIET") {
            Level::Error
        } else {
            Level::Info
        };

    Args {
        // FILE is required, clap exits before we get here without it
        input: PathBuf::from(matches.value_of_os("FILE").unwrap_or_default()),
        output: matches.value_of_os("OUTPUT").map(PathBuf::from),
        settings,
        minify: matches.is_present("MINIFY"),
        group_by_name: matches.is_present("GROUP_BY_NAME"),
        log_level,
    }
}
