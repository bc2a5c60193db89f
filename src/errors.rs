error_chain! {
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        // The input is not a motion file we know how to read.
        Format(msg: String) {
            description("unrecognized motion file")
            display("format error: {}", msg)
        }
        // An interpolation block had the wrong number of bytes.
        DecodeRange(expected: usize, got: usize) {
            description("interpolation block has the wrong length")
            display("interpolation block should be {} bytes, got {}", expected, got)
        }
    }
}

macro_rules! bail_format {
    ($($arg:tt)*) => {
        return Err(crate::errors::ErrorKind::Format(format!($($arg)*)).into())
    };
}
