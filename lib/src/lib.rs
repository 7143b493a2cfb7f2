//! Core of a JVM bytecode patch editor
//!
//! The editor shows a class as pseudo-assembly, lets the user write a patch script against it,
//! and re-renders everything after each edit. The interesting pieces live here:
//!
//!   - [`printer`] renders a [`jvm::model::ClassDeclaration`] as stable, diffable text
//!   - [`highlight`] classifies ranges of arbitrary text against pattern classes and keeps
//!     that classification current while the text is being edited
//!   - [`jvm`] reads (and writes) class files and decodes method bytecode
//!   - [`editor`] ties these together with the external patch and decompiler collaborators
//!
//! ### Printing a class
//!
//! ```no_run
//! use patch_editor::jvm::model::ClassDeclaration;
//! use patch_editor::printer::BytecodePrinter;
//!
//! # fn print() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("Point.class")?;
//! let class = ClassDeclaration::parse(&bytes)?;
//! let text = BytecodePrinter::new().print(&class)?;
//! print!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod editor;
pub mod highlight;
pub mod jvm;
pub mod printer;
