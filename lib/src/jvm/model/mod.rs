//! Resolved, read-only representations of classes
//!
//! These are what gets handed to the printer: names, descriptors and constant values have been
//! looked up in the constant pool and validated, and method bodies have been decoded into
//! instructions. Members keep their class file order.
//!
//!   - __Class__ is represented using [`ClassDeclaration`]
//!   - __Method__ is represented using [`MethodDeclaration`]
//!   - __Field__ is represented using [`FieldDeclaration`]

mod class;
mod field;
mod method;
mod value;

pub use class::*;
pub use field::*;
pub use method::*;
pub use value::*;
