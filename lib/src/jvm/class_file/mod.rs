//! Structural view of the binary `.class` format
//!
//! Everything here mirrors the layout in the [JVM specification][0] closely: names, types and
//! values are still indices into the [`ConstantPool`]. Reading goes through [`Deserialize`] and
//! [`ClassFile::parse`], writing through [`Serialize`] and [`ClassFile::to_bytes`].
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html

mod attribute;
mod binary_format;
mod class;
mod constants;
mod field;
mod method;
mod version;

pub use attribute::*;
pub use binary_format::*;
pub use class::*;
pub use constants::*;
pub use field::*;
pub use method::*;
pub use version::*;
