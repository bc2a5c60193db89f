#![recursion_limit = "1024"] // for error_chain

#[macro_use]
extern crate log;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate clap;
#[macro_use]
extern crate json;
extern crate atty;
extern crate cgmath;
extern crate encoding_rs;
extern crate termcolor;
extern crate time;

#[macro_use]
mod errors;
#[macro_use]
mod util;
mod cli;
mod convert;
mod logger;
mod version;
mod vmd;

use std::process::exit;

fn main() {
    let args = cli::parse_cli_args();
    logger::init(args.log_level);

    if let Err(e) = convert::main(&args) {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        exit(1);
    }
}
