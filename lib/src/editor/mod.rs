//! Editing sessions on a single class
//!
//! An [`EditorSession`] holds the original bytes of one class along with the patch script being
//! written against it. Applying patches and decompiling are left to outside collaborators
//! ([`PatchApplier`] and [`Decompiler`]), which is where the actual patching engine and a Java
//! decompiler plug in. Classes are read from plain files or from inside jars (see
//! [`ClassSource`]).
//!
//! ### Simple example
//!
//! ```no_run
//! use patch_editor::editor::*;
//!
//! # fn edit() -> Result<(), Error> {
//! let mut session = EditorSession::open(
//!     "Point.class",
//!     Box::new(IdentityPatcher),
//!     None,
//!     SessionSettings::default(),
//! )?;
//! session.load_patch("point.patch")?;
//! session.set_patch_text(".aload 0\n");
//! assert_eq!(session.title(), "* PTE - point.patch - Point.class");
//!
//! let computed = session.recompute()?;
//! print!("{}", computed.bytecode);
//! session.save()?;
//! # Ok(())
//! # }
//! ```

mod collaborators;
mod errors;
mod location;
mod session;

pub use collaborators::*;
pub use errors::*;
pub use location::*;
pub use session::*;
