//! The `fields!` macro reads a record's fields off a `Cur` in order, binding
//! each one to a local variable and tracing its offset and value.
//!
//! ```ignore
//! fields!(cur, morph {
//!     name: [u8; 15],
//!     frame_no: u32,
//!     weight: f32,
//! });
//! ```
//!
//! `cur` must be a mutable `Cur`; it is left just past the last field.

macro_rules! field_helper2 {
    ($cur:ident, [u8; $n:expr]) => { $cur.next_n_u8s($n as usize)? };
    ($cur:ident, $t:ty) => { $cur.next::<$t>()? };
}

macro_rules! field_helper {
    ($c:ident, $name:ident, $field:ident, $ty:tt) => {
        let pos = $c.pos();
        let $field = field_helper2!($c, $ty);
        trace!("{}.{}@{:#x}: {:?}",
            stringify!($name),
            stringify!($field),
            pos,
            $field,
        );
    }
}

macro_rules! fields {
    ($cur:ident, $name:ident { $($field:ident : $ty:tt,)* }) => {
        $(field_helper!($cur, $name, $field, $ty);)*
    };
    ($cur:ident, $name:ident { $($field:ident : $ty:tt),* }) => {
        fields!($cur, $name { $($field : $ty,)* });
    };
}
