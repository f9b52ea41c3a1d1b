//! Per-file conversion orchestration.
//!
//! A [`Converter`] owns the run's [`Options`] and the [`PathMap`] snapshot of
//! the tree. Each [`Converter::convert`] call turns one file into one or
//! more [`OutputFile`]s. Interface units leave their global module fragment
//! in an [`InterfaceRegistry`] so that the implementation unit converted
//! after them can repeat it.

use camino::Utf8Path;
use cmc_core::{ContentType, ConvertAction, FileOptions, Options, OutputFile};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::compat::compat_header;
use crate::{ConvertError, PathMap, UnitBuilder, UnitKind, scan};

/// Fragment bodies of the interface units converted so far, by module name.
#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry {
    fragments: FxHashMap<String, Vec<String>>,
}

impl InterfaceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the fragment body of the interface unit `module`.
    pub fn register(&mut self, module: impl Into<String>, fragment: Vec<String>) {
        self.fragments.insert(module.into(), fragment);
    }

    /// Returns the fragment body recorded for `module`.
    #[must_use]
    pub fn fragment(&self, module: &str) -> Option<&[String]> {
        self.fragments.get(module).map(Vec::as_slice)
    }

    /// Number of registered interface units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Converts single files in one direction.
///
/// # Examples
///
/// ```
/// use cmc_converter::{Converter, InterfaceRegistry};
/// use cmc_core::{ConvertAction, FileOptions, Options};
///
/// let converter = Converter::new(ConvertAction::Modules, Options::default());
/// let mut registry = InterfaceRegistry::new();
/// let outputs = converter
///     .convert(&mut registry, "#include <vector>\n", "simple.h".as_ref(), FileOptions::default())
///     .unwrap();
///
/// assert_eq!(outputs[0].path, "simple.cppm");
/// assert_eq!(outputs[0].content, "module;\n#include <vector>\nexport module simple;\n");
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    action: ConvertAction,
    options: Options,
    paths: PathMap,
}

impl Converter {
    /// Creates a converter with an empty [`PathMap`].
    #[must_use]
    pub fn new(action: ConvertAction, options: Options) -> Self {
        Self {
            action,
            options,
            paths: PathMap::new(),
        }
    }

    /// Replaces the path snapshot used to resolve includes.
    #[must_use]
    pub fn with_paths(mut self, paths: PathMap) -> Self {
        self.paths = paths;
        self
    }

    /// Replaces the path snapshot used to resolve includes.
    pub fn set_paths(&mut self, paths: PathMap) {
        self.paths = paths;
    }

    /// Returns the conversion direction.
    #[inline]
    #[must_use]
    pub const fn action(&self) -> ConvertAction {
        self.action
    }

    /// Returns the run options.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the path snapshot.
    #[inline]
    #[must_use]
    pub const fn paths(&self) -> &PathMap {
        &self.paths
    }

    /// Returns the content type of `path` under the converter's action.
    #[must_use]
    pub fn content_type_of(&self, path: &Utf8Path) -> ContentType {
        self.options.content_type_of(self.action, path)
    }

    /// Converts the file at `path` (relative to the root) with text
    /// `content`.
    ///
    /// Module-form files, and every file under
    /// [`ConvertAction::Headers`], are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedContentType`] for files that are
    /// neither headers nor sources, and
    /// [`ConvertError::InternalInvariantViolation`] when the unit cannot be
    /// laid out or has no output extension.
    pub fn convert(
        &self,
        registry: &mut InterfaceRegistry,
        content: &str,
        path: &Utf8Path,
        file_options: FileOptions,
    ) -> Result<Vec<OutputFile>, ConvertError> {
        let content_type = self.content_type_of(path);

        if self.action == ConvertAction::Headers || content_type.is_module_form() {
            debug!(path = %path, content_type = %content_type, "passing through unchanged");
            return Ok(vec![OutputFile::new(path, content_type, content)]);
        }

        let Some(kind) = UnitKind::for_source(content_type) else {
            return Err(ConvertError::UnsupportedContentType {
                path: path.to_owned(),
                content_type,
            });
        };

        let mut builder = UnitBuilder::new(kind, path, &self.options, &self.paths, file_options);
        scan(&mut builder, content);
        let name = builder.name().to_owned();
        let sibling = match kind {
            UnitKind::Implementation => registry.fragment(&name),
            UnitKind::Interface => None,
        };
        let built = builder.build(sibling)?;

        let output_type = kind.content_type();
        let output_path = self.output_path(path, output_type)?;
        info!(
            path = %path,
            output = %output_path,
            module = %built.name,
            compat = file_options.compat,
            "converted {}",
            content_type.label()
        );

        let mut outputs = vec![OutputFile::new(&output_path, output_type, built.content)];
        if kind == UnitKind::Interface {
            if file_options.compat {
                let header_extension = self.extension_for(path, ContentType::Header)?;
                outputs.push(compat_header(
                    path,
                    &output_path,
                    &self.options.compat_macro,
                    header_extension,
                )?);
            }
            registry.register(built.name, built.fragment);
        }
        Ok(outputs)
    }

    fn extension_for(
        &self,
        path: &Utf8Path,
        content_type: ContentType,
    ) -> Result<&str, ConvertError> {
        self.options
            .output_extension(content_type)
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| {
                ConvertError::invariant(
                    path,
                    format!("no output extension for {}", content_type.label()),
                )
            })
    }

    fn output_path(
        &self,
        path: &Utf8Path,
        content_type: ContentType,
    ) -> Result<camino::Utf8PathBuf, ConvertError> {
        let extension = self.extension_for(path, content_type)?;
        Ok(path.with_extension(extension))
    }
}

/// Converts one file with default options and returns the text of its first
/// output.
///
/// # Errors
///
/// Fails like [`Converter::convert`].
///
/// # Examples
///
/// ```
/// use cmc_converter::convert_file_content;
/// use cmc_core::ConvertAction;
///
/// let text = convert_file_content(ConvertAction::Modules, "", "simple.h".as_ref()).unwrap();
/// assert_eq!(text, "export module simple;\n");
/// ```
pub fn convert_file_content(
    action: ConvertAction,
    content: &str,
    path: &Utf8Path,
) -> Result<String, ConvertError> {
    let converter = Converter::new(action, Options::default());
    let mut registry = InterfaceRegistry::new();
    let outputs = converter.convert(&mut registry, content, path, FileOptions::default())?;
    outputs
        .into_iter()
        .next()
        .map(|output| output.content)
        .ok_or_else(|| ConvertError::invariant(path, "conversion produced no output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules(content: &str, path: &str) -> String {
        convert_file_content(ConvertAction::Modules, content, Utf8Path::new(path)).unwrap()
    }

    fn convert_with(converter: &Converter, content: &str, path: &str) -> Vec<OutputFile> {
        convert_compat(converter, content, path, false)
    }

    fn convert_compat(
        converter: &Converter,
        content: &str,
        path: &str,
        compat: bool,
    ) -> Vec<OutputFile> {
        let mut registry = InterfaceRegistry::new();
        converter
            .convert(
                &mut registry,
                content,
                Utf8Path::new(path),
                FileOptions::default().with_compat(compat),
            )
            .unwrap()
    }

    fn default_converter() -> Converter {
        Converter::new(ConvertAction::Modules, Options::default())
    }

    const FORWARDING_SIMPLE: &str = "#pragma once\n\
        #ifndef CXX_COMPAT_HEADER\n\
        #define CXX_COMPAT_HEADER\n\
        #include \"simple.cppm\"\n\
        #undef CXX_COMPAT_HEADER\n\
        #else\n\
        #include \"simple.cppm\"\n\
        #endif\n";

    // ========================================================================
    // Interface units
    // ========================================================================

    #[test]
    fn test_empty_header() {
        assert_eq!(modules("", "simple.h"), "export module simple;\n");
    }

    #[test]
    fn test_system_include() {
        assert_eq!(
            modules("#include <vector>\n", "simple.h"),
            "module;\n#include <vector>\nexport module simple;\n"
        );
    }

    #[test]
    fn test_local_include() {
        assert_eq!(
            modules("#include \"local_include.h\"\n", "simple.h"),
            "export module simple;\nimport local_include;\n"
        );
    }

    #[test]
    fn test_includes_with_inline_comment() {
        assert_eq!(
            modules("#include <vector>    // inline comment\n", "simple.h"),
            "module;\n#include <vector>    // inline comment\nexport module simple;\n"
        );
        assert_eq!(
            modules("#include \"local_include.h\"   // inline comment\n", "simple.h"),
            "export module simple;\nimport local_include;   // inline comment\n"
        );
    }

    #[test]
    fn test_includes_with_left_padding() {
        assert_eq!(
            modules(" # include <vector>\n", "simple.h"),
            "module;\n # include <vector>\nexport module simple;\n"
        );
        assert_eq!(
            modules(" # include \"local_include.h\"\n", "simple.h"),
            "export module simple;\n  import local_include;\n"
        );
    }

    #[test]
    fn test_local_and_system_include() {
        assert_eq!(
            modules("#include \"local_include.h\"\n#include <vector>\n", "simple.h"),
            "module;\n#include <vector>\nexport module simple;\nimport local_include;\n"
        );
    }

    #[test]
    fn test_system_include_in_ifdef() {
        let input = "#include \"local_include.h\"\n\
                     #ifdef FLAG\n # include <vector>\n#endif // FLAG\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#ifdef FLAG\n # include <vector>\n#endif // FLAG\n\
             export module simple;\nimport local_include;\n"
        );
    }

    #[test]
    fn test_system_include_in_ifdef_and_content() {
        let input = "#include \"local_include.h\"\n\
                     #ifdef FLAG\n # include <vector>\n#endif // FLAG\n\
                     namespace TestNS {}\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#ifdef FLAG\n # include <vector>\n#endif // FLAG\n\
             export module simple;\nimport local_include;\n\
             export {\nnamespace TestNS {}\n} // export\n"
        );
    }

    #[test]
    fn test_local_include_in_ifdef_and_content() {
        let input = "#include \"local_include.h\"\n\
                     #ifdef FLAG\n # include \"local_include_2.h\"\n#endif // FLAG\n\
                     namespace TestNS {}\n";
        assert_eq!(
            modules(input, "simple.h"),
            "export module simple;\nimport local_include;\n\
             #ifdef FLAG\n  import local_include_2;\n#endif // FLAG\n\
             export {\nnamespace TestNS {}\n} // export\n"
        );
    }

    #[test]
    fn test_ifdef_and_content_with_blank_lines() {
        let input = "#include \"local_include.h\"\n\n#ifdef FLAG\n\n # include <vector>\n\n\
                     #endif // FLAG\n\nnamespace TestNS {}\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n\n#ifdef FLAG\n\n # include <vector>\n\n#endif // FLAG\n\
             export module simple;\nimport local_include;\n\
             export {\n\nnamespace TestNS {}\n} // export\n"
        );
    }

    #[test]
    fn test_two_ifdefs() {
        let system = "#include \"local_include.h\"\n\
                      #ifdef FLAG1\n # include <vector>\n#endif // FLAG1\n\
                      #ifdef FLAG2\n # include <string>\n#endif // FLAG2\n";
        assert_eq!(
            modules(system, "simple.h"),
            "module;\n#ifdef FLAG1\n # include <vector>\n#endif // FLAG1\n\
             #ifdef FLAG2\n # include <string>\n#endif // FLAG2\n\
             export module simple;\nimport local_include;\n"
        );

        let local = "#include \"local_include.h\"\n\
                     #ifdef FLAG1\n # include \"local_include_2.h\"\n#endif // FLAG1\n\
                     #ifdef FLAG2\n # include \"local_include_3.h\"\n#endif // FLAG2\n";
        assert_eq!(
            modules(local, "simple.h"),
            "export module simple;\nimport local_include;\n\
             #ifdef FLAG1\n  import local_include_2;\n#endif // FLAG1\n\
             #ifdef FLAG2\n  import local_include_3;\n#endif // FLAG2\n"
        );
    }

    #[test]
    fn test_ifdef_elif_else() {
        let input = "#include \"local_include.h\"\n#ifdef FLAG1\n # include <vector>\n\
                     #elif FLAG2\n # include <string>\n#else // FLAG2\n # include <map>\n\
                     #endif // FLAG2\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#ifdef FLAG1\n # include <vector>\n#elif FLAG2\n # include <string>\n\
             #else // FLAG2\n # include <map>\n#endif // FLAG2\n\
             export module simple;\nimport local_include;\n"
        );
    }

    #[test]
    fn test_pragma_once_is_commented_out() {
        assert_eq!(
            modules(
                "#pragma once\n#include \"local_include.h\"\n#include <vector>\n",
                "simple.h"
            ),
            "module;\n#include <vector>\nexport module simple;\n\
             // #pragma once\nimport local_include;\n"
        );
    }

    #[test]
    fn test_other_directives_move_with_system_include() {
        let input = "#include \"local_include.h\"\n#define FLAG\n#error \"error\"\n\
                     #pragma test\n#warning \"warning\"\n#include <vector>\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#define FLAG\n#error \"error\"\n#pragma test\n#warning \"warning\"\n\
             #include <vector>\nexport module simple;\nimport local_include;\n"
        );
    }

    #[test]
    fn test_multiline_define() {
        let input = "#include \"local_include.h\"\n#define FLAG \\\n    1 \\\n    2\n\
                     #include <vector>\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#define FLAG \\\n    1 \\\n    2\n#include <vector>\n\
             export module simple;\nimport local_include;\n"
        );
    }

    #[test]
    fn test_system_and_local_in_one_ifdef() {
        let input = "#include \"local_include.h\"\n#ifdef FLAG\n # include <vector>\n\
                     \x20# include \"local_include_2.h\"\n#endif // FLAG\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#ifdef FLAG\n # include <vector>\n#endif // FLAG\n\
             export module simple;\nimport local_include;\n\
             #ifdef FLAG\n  import local_include_2;\n#endif // FLAG\n"
        );
    }

    #[test]
    fn test_two_ifdefs_with_comments() {
        let input = "#include \"local_include.h\"\n// comment flag1\n#ifdef FLAG1\n\
                     \x20// comment system include\n # include <vector>\n#endif // FLAG1\n\
                     // comment flag2\n#ifdef FLAG2\n // comment local include\n\
                     \x20# include \"local_include_2.h\"\n#endif // FLAG2\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n// comment flag1\n#ifdef FLAG1\n // comment system include\n\
             \x20# include <vector>\n#endif // FLAG1\n\
             export module simple;\nimport local_include;\n\
             // comment flag2\n#ifdef FLAG2\n // comment local include\n\
             \x20 import local_include_2;\n#endif // FLAG2\n"
        );
    }

    #[test]
    fn test_multiline_ifdef_elif() {
        let input = "#include \"local_include.h\"\n#ifdef FLAG1 \\\n    && FLAG11\n\
                     \x20# include <vector>\n#elif FLAG1 \\\n    && FLAG11\n // nothing\n\
                     #endif // FLAG1\n#ifdef FLAG2 \\\n    && FLAG22\n\
                     \x20# include \"local_include_2.h\"\n#endif // FLAG2\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#ifdef FLAG1 \\\n    && FLAG11\n # include <vector>\n\
             #elif FLAG1 \\\n    && FLAG11\n // nothing\n#endif // FLAG1\n\
             export module simple;\nimport local_include;\n\
             #ifdef FLAG2 \\\n    && FLAG22\n  import local_include_2;\n#endif // FLAG2\n"
        );
    }

    #[test]
    fn test_content_inside_ifdef_is_exported_from_ifdef() {
        let input = "#include \"local_include.h\"\n#include <vector>\n\n\
                     // before preprocessor\n#ifdef FLAG1\n\n// inside preprocessor\n\
                     namespace TestNS\n{\n} // namespace TestNS\n#endif // FLAG1\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#include <vector>\nexport module simple;\nimport local_include;\n\n\
             // before preprocessor\nexport {\n#ifdef FLAG1\n\n// inside preprocessor\n\
             namespace TestNS\n{\n} // namespace TestNS\n#endif // FLAG1\n} // export\n"
        );
    }

    #[test]
    fn test_comments_before_includes() {
        assert_eq!(
            modules(
                "#include \"local_include.h\"\n// comment before system include\n#include <vector>\n",
                "simple.h"
            ),
            "module;\n// comment before system include\n#include <vector>\n\
             export module simple;\nimport local_include;\n"
        );
        assert_eq!(
            modules(
                "#include \"local_include.h\"\n// comment before local include\n # include \"local_include_2.h\"\n",
                "simple.h"
            ),
            "export module simple;\nimport local_include;\n\
             // comment before local include\n  import local_include_2;\n"
        );
    }

    #[test]
    fn test_always_include_defaults() {
        assert_eq!(
            modules("#include \"assert.h\"\n", "simple.h"),
            "module;\n#include \"assert.h\"\nexport module simple;\n"
        );
    }

    #[test]
    fn test_always_include_configured() {
        let mut options = Options::default();
        options.always_include.push("options.h").unwrap();
        let converter = Converter::new(ConvertAction::Modules, options);
        assert_eq!(
            convert_with(&converter, "#include \"options.h\"\n", "simple.h")[0].content,
            "module;\n#include \"options.h\"\nexport module simple;\n"
        );
    }

    #[test]
    fn test_always_include_in_subdir_with_root_name() {
        let mut options = Options::default();
        options.always_include.push("subdir/options.h").unwrap();
        let paths = PathMap::from_files(["subdir/options.h", "subdir/simple.h"]);

        let converter = Converter::new(ConvertAction::Modules, options.clone())
            .with_paths(paths.clone());
        assert_eq!(
            convert_with(&converter, "#include \"options.h\"\n", "subdir/simple.h")[0].content,
            "module;\n#include \"options.h\"\nexport module subdir.simple;\n"
        );

        let converter = Converter::new(ConvertAction::Modules, options.with_root_module_name("org"))
            .with_paths(paths);
        assert_eq!(
            convert_with(&converter, "#include \"options.h\"\n", "subdir/simple.h")[0].content,
            "module;\n#include \"options.h\"\nexport module org.subdir.simple;\n"
        );
    }

    #[test]
    fn test_nested_ifdefs_with_system_and_local_include() {
        let input = "#ifdef A\n#ifdef B\n#include <x>\n#include \"y.h\"\n#endif\n#endif\n";
        assert_eq!(
            modules(input, "simple.h"),
            "module;\n#ifdef A\n#ifdef B\n#include <x>\n#endif\n#endif\n\
             export module simple;\n#ifdef A\n#ifdef B\nimport y;\n#endif\n#endif\n"
        );
    }

    #[test]
    fn test_malformed_include_is_kept_as_content() {
        assert_eq!(
            modules("#include <vector>\n#include MACRO_HEADER\n", "simple.h"),
            "module;\n#include <vector>\nexport module simple;\n\
             export {\n#include MACRO_HEADER\n} // export\n"
        );
    }

    #[test]
    fn test_angle_include_found_in_tree_becomes_import() {
        let converter = default_converter()
            .with_paths(PathMap::from_files(["simple.h", "local.h"]));
        assert_eq!(
            convert_with(&converter, "#include <local.h>\n#include <vector>\n", "simple.h")[0]
                .content,
            "module;\n#include <vector>\nexport module simple;\nimport local;\n"
        );
    }

    // ========================================================================
    // File comments
    // ========================================================================

    #[test]
    fn test_file_comment() {
        assert_eq!(
            modules("// this is file comment\n", "simple.h"),
            "// this is file comment\nexport module simple;\n"
        );
        assert_eq!(
            modules("\u{feff}// this is file comment\n", "simple.h"),
            "\u{feff}// this is file comment\nexport module simple;\n"
        );
    }

    #[test]
    fn test_file_comment_and_includes() {
        assert_eq!(
            modules(
                "// this is file comment\n#include \"local_include.h\"\n#include <vector>\n",
                "simple.h"
            ),
            "// this is file comment\nmodule;\n#include <vector>\n\
             export module simple;\nimport local_include;\n"
        );
        assert_eq!(
            modules("\n// this is file comment\n\n#include <vector>\n\n", "simple.h"),
            "\n// this is file comment\n\nmodule;\n#include <vector>\nexport module simple;\n"
        );
    }

    #[test]
    fn test_file_comment_includes_and_content() {
        let input = "\n// this is file comment\n\n#include \"local_include.h\"\n\n\
                     #include <vector>\n\nnamespace TestNS\n{\n} // namespace TestNS\n\n";
        assert_eq!(
            modules(input, "simple.h"),
            "\n// this is file comment\n\nmodule;\n\n#include <vector>\n\
             export module simple;\nimport local_include;\nexport {\n\n\
             namespace TestNS\n{\n} // namespace TestNS\n\n} // export\n"
        );
    }

    // ========================================================================
    // Implementation units
    // ========================================================================

    #[test]
    fn test_implementation_includes() {
        assert_eq!(
            modules("#include \"local_include.h\"\n", "simple.cpp"),
            "import local_include;\n"
        );
        assert_eq!(modules("#include <vector>\n", "simple.cpp"), "#include <vector>\n");
        assert_eq!(modules("#include \"simple.h\"\n", "simple.cpp"), "module simple;\n");
    }

    #[test]
    fn test_implementation_self_include_with_others() {
        assert_eq!(
            modules("#include \"simple.h\"\n#include <vector>\n", "simple.cpp"),
            "module;\n#include <vector>\nmodule simple;\n"
        );
        assert_eq!(
            modules(
                "#include \"simple.h\"\n#include \"local_include.h\"\n#include <vector>\n",
                "simple.cpp"
            ),
            "module;\n#include <vector>\nmodule simple;\nimport local_include;\n"
        );
        assert_eq!(
            modules(
                "#include \"simple.h\"\n#include \"local_include.h\"\n#include \"assert.h\"\n#include <vector>\n",
                "simple.cpp"
            ),
            "module;\n#include \"assert.h\"\n#include <vector>\nmodule simple;\nimport local_include;\n"
        );
    }

    #[test]
    fn test_implementation_self_include_in_subdir() {
        let converter = default_converter()
            .with_paths(PathMap::from_files(["subdir/local_include.h", "subdir/simple.h"]));
        assert_eq!(
            convert_with(
                &converter,
                "#include \"simple.h\"\n#include \"local_include.h\"\n",
                "subdir/simple.cpp"
            )[0]
            .content,
            "module subdir.simple;\nimport subdir.local_include;\n"
        );

        let converter = default_converter().with_paths(PathMap::from_files([
            "prefix/subdir/local_include.h",
            "prefix/subdir/simple.h",
        ]));
        assert_eq!(
            convert_with(
                &converter,
                "#include \"simple.h\"\n#include \"local_include.h\"\n",
                "prefix/subdir/simple.cpp"
            )[0]
            .content,
            "module prefix.subdir.simple;\nimport prefix.subdir.local_include;\n"
        );
    }

    #[test]
    fn test_implementation_repeats_interface_fragment() {
        let converter = default_converter();
        let mut registry = InterfaceRegistry::new();
        converter
            .convert(
                &mut registry,
                "#include <vector>\n",
                Utf8Path::new("simple.h"),
                FileOptions::default(),
            )
            .unwrap();
        assert_eq!(registry.fragment("simple"), Some(&["#include <vector>".to_owned()][..]));

        let outputs = converter
            .convert(
                &mut registry,
                "#include \"simple.h\"\n#include <map>\n",
                Utf8Path::new("simple.cpp"),
                FileOptions::default(),
            )
            .unwrap();
        assert_eq!(
            outputs[0].content,
            "module;\n#include <vector>\n#include <map>\nmodule simple;\n"
        );
        assert_eq!(outputs[0].content_type, ContentType::ModuleImpl);
    }

    // ========================================================================
    // Export rules
    // ========================================================================

    #[test]
    fn test_export_rules() {
        let input = "#include \"simple_fwd.h\"\n#include \"simple2.h\"\n";
        let cases = [
            (("simple", "simple_fwd"), "export import simple_fwd;\nimport simple2;\n"),
            (("simple", "*"), "export import simple_fwd;\nexport import simple2;\n"),
            (("*", "simple2"), "import simple_fwd;\nexport import simple2;\n"),
            (("*", "*"), "export import simple_fwd;\nexport import simple2;\n"),
        ];
        for ((owner, target), imports) in cases {
            let mut options = Options::default();
            options.add_export(owner, target);
            let converter = Converter::new(ConvertAction::Modules, options);
            assert_eq!(
                convert_with(&converter, input, "simple.h")[0].content,
                format!("export module simple;\n{imports}"),
                "rule {owner}={target}"
            );
        }
    }

    #[test]
    fn test_implementation_never_exports() {
        let mut options = Options::default();
        options.add_export("simple", "simple_fwd");
        options.export_suffixes.push("_fwd".to_owned());
        let converter = Converter::new(ConvertAction::Modules, options);
        assert_eq!(
            convert_with(
                &converter,
                "#include \"simple.h\"\n#include \"simple_fwd.h\"\n#include \"simple2.h\"\n",
                "simple.cpp"
            )[0]
            .content,
            "module simple;\nimport simple_fwd;\nimport simple2;\n"
        );
    }

    #[test]
    fn test_export_suffix() {
        let input = "#include \"simple_fwd.h\"\n#include \"simple2.h\"\n#include \"simple2_fwd.h\"\n";
        let mut options = Options::default();
        options.export_suffixes.push("_fwd".to_owned());
        let converter = Converter::new(ConvertAction::Modules, options.clone());
        assert_eq!(
            convert_with(&converter, input, "simple.h")[0].content,
            "export module simple;\nexport import simple_fwd;\nimport simple2;\nimport simple2_fwd;\n"
        );

        let converter = Converter::new(ConvertAction::Modules, options.with_root_module_name("org"))
            .with_paths(PathMap::from_files([
                "simple.h",
                "simple_fwd.h",
                "simple2.h",
                "simple2_fwd.h",
            ]));
        assert_eq!(
            convert_with(&converter, input, "simple.h")[0].content,
            "export module org.simple;\nexport import org.simple_fwd;\n\
             import org.simple2;\nimport org.simple2_fwd;\n"
        );
    }

    // ========================================================================
    // Compat mode
    // ========================================================================

    #[test]
    fn test_compat_empty_header() {
        let outputs = convert_compat(&default_converter(), "", "empty.h", true);
        assert_eq!(
            outputs,
            vec![
                OutputFile::new(
                    "empty.cppm",
                    ContentType::ModuleInterface,
                    "#ifndef CXX_COMPAT_HEADER\nexport module empty;\n#endif\n"
                ),
                OutputFile::new(
                    "empty.h",
                    ContentType::Header,
                    FORWARDING_SIMPLE.replace("simple", "empty")
                ),
            ]
        );
    }

    #[test]
    fn test_compat_header_with_local_include() {
        let outputs = convert_compat(
            &default_converter(),
            "#include \"local_include.h\"\n",
            "simple.h",
            true,
        );
        assert_eq!(outputs.len(), 2);
        assert_eq!(
            outputs[0].content,
            "#ifndef CXX_COMPAT_HEADER\nmodule;\n#else\n#pragma once\n\
             #include \"local_include.h\"\n#endif\n\
             #ifndef CXX_COMPAT_HEADER\nexport module simple;\n#endif\n\
             #ifndef CXX_COMPAT_HEADER\nimport local_include;\n#endif\n"
        );
        assert_eq!(outputs[1], OutputFile::new("simple.h", ContentType::Header, FORWARDING_SIMPLE));
    }

    #[test]
    fn test_compat_header_with_system_include() {
        let outputs = convert_compat(
            &default_converter(),
            "#include \"local_include.h\"\n#include <string>\n",
            "simple.h",
            true,
        );
        assert_eq!(
            outputs[0].content,
            "#ifndef CXX_COMPAT_HEADER\nmodule;\n#else\n#pragma once\n\
             #include \"local_include.h\"\n#endif\n#include <string>\n\
             #ifndef CXX_COMPAT_HEADER\nexport module simple;\n#endif\n\
             #ifndef CXX_COMPAT_HEADER\nimport local_include;\n#endif\n"
        );
    }

    #[test]
    fn test_compat_implementation() {
        let converter = default_converter();
        assert_eq!(
            convert_compat(&converter, "#include \"simple.h\"\n", "simple.cpp", true),
            vec![OutputFile::new("simple.cpp", ContentType::ModuleImpl, "module simple;\n")]
        );
        assert_eq!(
            convert_compat(
                &converter,
                "#include \"assert.h\"\n#include \"simple.h\"\n",
                "simple.cpp",
                true
            )[0]
            .content,
            "module;\n#include \"assert.h\"\nmodule simple;\n"
        );
        assert_eq!(
            convert_compat(&converter, "#include \"local_include.h\"\n", "simple.cpp", true)[0]
                .content,
            "import local_include;\n"
        );
    }

    #[test]
    fn test_compat_uses_configured_macro() {
        let mut options = Options::default();
        options.set_compat_macro("LEGACY_HEADERS").unwrap();
        let converter = Converter::new(ConvertAction::Modules, options);
        let outputs = convert_compat(&converter, "", "empty.h", true);
        assert_eq!(
            outputs[0].content,
            "#ifndef LEGACY_HEADERS\nexport module empty;\n#endif\n"
        );
        assert!(outputs[1].content.contains("#define LEGACY_HEADERS\n"));
    }

    // ========================================================================
    // Routing
    // ========================================================================

    #[test]
    fn test_module_form_passes_through() {
        let mut options = Options::default();
        options.add_extension(ConvertAction::Modules, ".cppm", ContentType::ModuleInterface);
        let converter = Converter::new(ConvertAction::Modules, options);
        let text = "export module simple;\nimport other;\n";
        assert_eq!(
            convert_with(&converter, text, "simple.cppm"),
            vec![OutputFile::new("simple.cppm", ContentType::ModuleInterface, text)]
        );
    }

    #[test]
    fn test_headers_action_passes_through() {
        let converter = Converter::new(ConvertAction::Headers, Options::default());
        let text = "export module simple;\n";
        assert_eq!(
            convert_with(&converter, text, "simple.cppm"),
            vec![OutputFile::new("simple.cppm", ContentType::ModuleInterface, text)]
        );
        assert_eq!(
            convert_with(&converter, text, "simple.cpp")[0].content_type,
            ContentType::ModuleImpl
        );
    }

    #[test]
    fn test_other_content_is_unsupported() {
        let mut registry = InterfaceRegistry::new();
        let err = default_converter()
            .convert(
                &mut registry,
                "text",
                Utf8Path::new("notes.txt"),
                FileOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnsupportedContentType { content_type: ContentType::Other, .. }
        ));
    }

    #[test]
    fn test_custom_output_extension() {
        let mut options = Options::default();
        options
            .set_output_extension(ContentType::ModuleInterface, ".ixx")
            .unwrap();
        let converter = Converter::new(ConvertAction::Modules, options);
        assert_eq!(convert_with(&converter, "", "simple.h")[0].path, "simple.ixx");
    }
}
