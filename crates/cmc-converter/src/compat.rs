//! Forwarding headers for interface units converted in compatibility mode.
//!
//! A compat interface unit can be consumed both as a module and as a
//! classic header. The forwarding header keeps the original header name and
//! includes the module file with the compat macro defined, which disables
//! every module-only line of it.

use camino::Utf8Path;
use cmc_core::{ContentType, OutputFile};

use crate::ConvertError;

/// Renders the forwarding header text for `module_file`.
///
/// # Examples
///
/// ```
/// use cmc_converter::compat::forwarding_header;
///
/// let text = forwarding_header("CXX_COMPAT_HEADER", "empty.cppm");
/// assert!(text.starts_with("#pragma once\n#ifndef CXX_COMPAT_HEADER\n"));
/// assert!(text.ends_with("#include \"empty.cppm\"\n#endif\n"));
/// ```
#[must_use]
pub fn forwarding_header(compat_macro: &str, module_file: &str) -> String {
    format!(
        "#pragma once\n\
         #ifndef {compat_macro}\n\
         #define {compat_macro}\n\
         #include \"{module_file}\"\n\
         #undef {compat_macro}\n\
         #else\n\
         #include \"{module_file}\"\n\
         #endif\n"
    )
}

/// Builds the forwarding header output for the interface unit written to
/// `module_path`, converted from `source_path`.
pub fn compat_header(
    source_path: &Utf8Path,
    module_path: &Utf8Path,
    compat_macro: &str,
    header_extension: &str,
) -> Result<OutputFile, ConvertError> {
    if compat_macro.is_empty() {
        return Err(ConvertError::invariant(source_path, "compat macro is empty"));
    }
    let Some(module_file) = module_path.file_name() else {
        return Err(ConvertError::invariant(
            source_path,
            "module interface unit has no file name",
        ));
    };
    let path = source_path.with_extension(header_extension.trim_start_matches('.'));
    Ok(OutputFile::new(
        path,
        ContentType::Header,
        forwarding_header(compat_macro, module_file),
    ))
}
