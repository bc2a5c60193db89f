//! Fixed-size little-endian values that can be read straight out of a byte
//! buffer.

/// Types that can be viewed as a fixed-length byte sequence.
pub trait Viewable: Sized {
    fn size() -> usize;
    fn view(buf: &[u8]) -> Self;
}

impl Viewable for u8 {
    fn size() -> usize { 1 }
    fn view(buf: &[u8]) -> u8 { buf[0] }
}

/// Any non-zero byte is true.
impl Viewable for bool {
    fn size() -> usize { 1 }
    fn view(buf: &[u8]) -> bool { buf[0] != 0 }
}

impl Viewable for u32 {
    fn size() -> usize { 4 }
    fn view(buf: &[u8]) -> u32 {
        buf[0] as u32 | (buf[1] as u32) << 8 | (buf[2] as u32) << 16 | (buf[3] as u32) << 24
    }
}

impl Viewable for f32 {
    fn size() -> usize { 4 }
    fn view(buf: &[u8]) -> f32 {
        f32::from_bits(<u32 as Viewable>::view(buf))
    }
}

impl<T,S> Viewable for (T,S) where
    T: Viewable,
    S: Viewable
{
    fn size() -> usize { <T as Viewable>::size() + <S as Viewable>::size() }
    fn view(buf: &[u8]) -> (T,S) {
        let split = <T as Viewable>::size();
        let t = <T as Viewable>::view(&buf[..split]);
        let s = <S as Viewable>::view(&buf[split..]);
        (t,s)
    }
}

impl<T,S,P> Viewable for (T,S,P) where
    T: Viewable,
    S: Viewable,
    P: Viewable,
{
    fn size() -> usize { <(T,(S,P)) as Viewable>::size() }
    fn view(buf: &[u8]) -> (T,S,P) {
        let (t,(s,p)) = <(T,(S,P)) as Viewable>::view(buf);
        (t,s,p)
    }
}

#[test]
fn test_little_endian() {
    assert_eq!(<u32 as Viewable>::view(&[0x78, 0x56, 0x34, 0x12]), 0x12345678);
    assert_eq!(<f32 as Viewable>::view(&1.5f32.to_bits().to_le_bytes()), 1.5);
    assert_eq!(<bool as Viewable>::view(&[2]), true);
    assert_eq!(<bool as Viewable>::view(&[0]), false);

    let mut buf = vec![];
    for &x in &[1.0f32, -2.0, 3.25] {
        buf.extend_from_slice(&x.to_bits().to_le_bytes());
    }
    assert_eq!(<(f32, f32, f32) as Viewable>::size(), 12);
    assert_eq!(<(f32, f32, f32) as Viewable>::view(&buf), (1.0, -2.0, 3.25));
}
