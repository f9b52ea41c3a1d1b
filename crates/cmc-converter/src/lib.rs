//! Single-file conversion engine from C++ headers to C++20 modules.
//!
//! The engine turns the text of one header or source file into a module
//! interface or implementation unit. It does not parse C++: every line is
//! classified with a regular expression and sorted into the regions of the
//! unit by a small nesting-aware state machine.
//!
//! # Overview
//!
//! - [`Converter`]: per-file entry point, routing by content type
//! - [`UnitBuilder`]: the staging and flush state machine
//! - [`scan`]: file-comment capture and line dispatch
//! - [`IncludeResolver`]: include lookup and module-name derivation
//! - [`ExportRules`]: which imports an interface re-exports
//! - [`PathMap`]: snapshot of the files of the tree
//!
//! # Example
//!
//! ```
//! use cmc_converter::{Converter, InterfaceRegistry, PathMap};
//! use cmc_core::{ConvertAction, FileOptions, Options};
//!
//! let paths = PathMap::from_files(["simple.h", "local_include.h"]);
//! let converter = Converter::new(ConvertAction::Modules, Options::default()).with_paths(paths);
//! let mut registry = InterfaceRegistry::new();
//!
//! let outputs = converter
//!     .convert(
//!         &mut registry,
//!         "#include \"local_include.h\"\n#include <vector>\n",
//!         "simple.h".as_ref(),
//!         FileOptions::default(),
//!     )
//!     .unwrap();
//! assert_eq!(
//!     outputs[0].content,
//!     "module;\n#include <vector>\nexport module simple;\nimport local_include;\n"
//! );
//! ```
//!
//! # Architecture
//!
//! ```text
//! Converter::convert
//!     │
//!     ├── scan (LogicalLines → classify)
//!     │       │
//!     │       └── UnitBuilder (staging buffers → regions)
//!     │               │
//!     │               ├── IncludeResolver (PathMap lookups)
//!     │               └── ExportRules
//!     │
//!     ├── compat::compat_header (compat interfaces)
//!     └── InterfaceRegistry (fragments for implementation units)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod classify;
pub mod compat;
mod engine;
mod error;
mod export;
mod path_map;
pub mod resolver;
mod scan;
mod unit;

pub use engine::{Converter, InterfaceRegistry, convert_file_content};
pub use error::ConvertError;
pub use export::ExportRules;
pub use path_map::{PathEntry, PathMap};
pub use resolver::IncludeResolver;
pub use scan::scan;
pub use unit::{BuiltUnit, UnitBuilder, UnitKind};
