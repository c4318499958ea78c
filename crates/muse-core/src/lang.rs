//! File-extension to language mapping.
//!
//! Used by the rule table for language-scoped rules and by the classifier
//! for symbol detection. Extensions not in the map yield `None`; rules
//! scoped to a specific language never apply to such files.

use std::path::Path;

/// Map a file path's extension to a language name.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    language_for_extension(ext)
}

/// Map a bare extension (without the dot) to a language name.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    Some(match ext {
        "py" => "python",
        "rs" => "rust",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "clj" | "cljs" => "clojure",
        "hs" => "haskell",
        "ml" | "mli" => "ocaml",
        "elm" => "elm",
        "dart" => "dart",
        _ => return None,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn common_extensions_map() {
        assert_eq!(language_for_extension("py"), Some("python"));
        assert_eq!(language_for_extension("rs"), Some("rust"));
        assert_eq!(language_for_extension("tsx"), Some("typescript"));
        assert_eq!(language_for_extension("go"), Some("go"));
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(language_for_extension("toml"), None);
        assert_eq!(language_for_extension(""), None);
    }

    #[test]
    fn path_without_extension_is_none() {
        assert_eq!(language_for_path(&PathBuf::from("Makefile")), None);
    }

    #[test]
    fn path_with_extension_maps() {
        assert_eq!(
            language_for_path(&PathBuf::from("src/auth/login.py")),
            Some("python")
        );
    }
}
