use crate::errors::Result;
use std::fmt;
use std::io;
use crate::util::view::Viewable;

/// A pointer into a buffer of bytes. Used for binary file parsing.
#[derive(Copy, Clone)]
pub struct Cur<'a> {
    buf_: &'a [u8],
    pos_: usize,
}

impl<'a> Cur<'a> {
    pub fn new(buf: &[u8]) -> Cur {
        Cur { buf_: buf, pos_: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos_
    }

    pub fn len(&self) -> usize {
        self.buf_.len()
    }

    pub fn bytes_remaining(&self) -> usize {
        self.buf_.len().saturating_sub(self.pos_)
    }

    pub fn at_end(&self) -> bool {
        self.bytes_remaining() == 0
    }

    pub fn next<T: Viewable>(&mut self) -> Result<T> {
        let size = <T as Viewable>::size();
        let buf = self.next_n_u8s(size)?;
        Ok(<T as Viewable>::view(buf))
    }

    /// Reads `n` raw bytes. Running off the end of the buffer is an I/O error
    /// (the file was truncated in the middle of a record).
    pub fn next_n_u8s(&mut self, n: usize) -> Result<&'a [u8]> {
        let end_pos = self.pos_ + n;
        if end_pos > self.buf_.len() {
            let msg = format!(
                "unexpected end of file: wanted {} bytes at {:#x}, only {} left",
                n, self.pos_, self.bytes_remaining(),
            );
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, msg).into());
        }
        let res = &self.buf_[self.pos_ .. end_pos];
        self.pos_ = end_pos;
        Ok(res)
    }
}

impl<'a> fmt::Debug for Cur<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Cur {{ pos: {}, len: {} }}", self.pos(), self.len())
    }
}

#[test]
fn test_short_read_is_io_error() {
    use crate::errors::ErrorKind;

    let buf = [1, 0, 0, 0, 7];
    let mut cur = Cur::new(&buf);
    assert_eq!(cur.next::<u32>().unwrap(), 1);
    assert_eq!(cur.bytes_remaining(), 1);
    match cur.next::<u32>() {
        Err(e) => match *e.kind() {
            ErrorKind::Io(ref io_err) => assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof),
            ref k => panic!("expected io error, got {:?}", k),
        },
        Ok(_) => panic!("read past the end"),
    }
    // A failed read doesn't move the cursor.
    assert_eq!(cur.pos(), 4);
    assert_eq!(cur.next::<u8>().unwrap(), 7);
    assert!(cur.at_end());
}
