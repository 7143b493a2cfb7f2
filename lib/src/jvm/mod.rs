//! Read JVM classes
//!
//! Classes go through three representations on their way to the printer:
//!
//!   - raw bytes, as found in a `.class` file
//!   - [`class_file::ClassFile`], a faithful structural view of the binary format where
//!     everything still points into the constant pool
//!   - [`model::ClassDeclaration`], where names, descriptors and constant values have been
//!     resolved and every method body has been decoded into [`code::Instruction`]s
//!
//! ### Simple example
//!
//! ```
//! use patch_editor::jvm::class_file::{ClassFile, ConstantPool, Field, Version};
//! use patch_editor::jvm::model::ClassDeclaration;
//! use patch_editor::jvm::*;
//!
//! # fn read_class() -> Result<(), Error> {
//! // Build a tiny class `Point` with one field `x`
//! let mut constants = ConstantPool::new();
//! let this_class = constants.get_class("Point")?;
//! let super_class = constants.get_class("java/lang/Object")?;
//! let field = Field {
//!     access_flags: FieldAccessFlags::PUBLIC,
//!     name_index: constants.get_utf8("x")?,
//!     descriptor_index: constants.get_utf8("I")?,
//!     attributes: vec![],
//! };
//! let class_file = ClassFile {
//!     version: Version::JAVA8,
//!     constants,
//!     access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
//!     this_class,
//!     super_class,
//!     interfaces: vec![],
//!     fields: vec![field],
//!     methods: vec![],
//!     attributes: vec![],
//! };
//!
//! // Round trip it through bytes
//! let bytes = class_file.to_bytes()?;
//! let class = ClassDeclaration::parse(&bytes)?;
//! assert_eq!(class.name.as_str(), "Point");
//! assert_eq!(class.fields[0].name.as_str(), "x");
//! # Ok(())
//! # }
//! # read_class().unwrap();
//! ```

mod access_flags;
pub mod class_file;
pub mod code;
mod descriptors;
mod errors;
pub mod model;
mod names;

pub use access_flags::*;
pub use descriptors::*;
pub use errors::*;
pub use names::*;
