//! Build target configuration.
//!
//! These types are deserialized by the host from its project file; the core
//! only reads them.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration of one named build target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TargetConfig {
    /// Ordered source files.
    pub src: Vec<PathBuf>,

    /// Single combined output file (`--out`).
    pub out: Option<PathBuf>,

    /// Output directory (`--outDir`).
    pub out_dir: Option<PathBuf>,

    /// Base directory whose structure is preserved under `out_dir`.
    pub base_dir: Option<PathBuf>,

    /// Reference manifest that lists the sources in compile order.
    pub reference: Option<PathBuf>,

    /// Compiler flags.
    pub options: CompilerOptions,

    /// Only recompile files changed since the last successful build.
    pub fast: bool,

    /// Echo the full invocation at info level.
    pub verbose: bool,
}

/// Compiler options forwarded as flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CompilerOptions {
    pub source_map: bool,
    pub declaration: bool,
    pub remove_comments: bool,
    pub no_implicit_any: bool,
    pub no_resolve: bool,

    /// ECMAScript target version, emitted upper-cased.
    pub target: String,

    /// Module kind, emitted lower-cased.
    pub module: String,

    pub source_root: Option<String>,
    pub map_root: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            source_map: false,
            declaration: false,
            remove_comments: false,
            no_implicit_any: false,
            no_resolve: false,
            target: "es5".to_string(),
            module: "commonjs".to_string(),
            source_root: None,
            map_root: None,
        }
    }
}

impl TargetConfig {
    /// Returns true when all sources are merged into one output file.
    pub fn is_combined_output(&self) -> bool {
        self.out.is_some()
    }

    /// Resolve every relative path in the configuration against `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };

        self.src = self.src.into_iter().map(join).collect();
        self.out = self.out.map(join);
        self.out_dir = self.out_dir.map(join);
        self.base_dir = self.base_dir.map(join);
        self.reference = self.reference.map(join);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: TargetConfig = serde_json::from_str("{}").unwrap();
        assert!(config.src.is_empty());
        assert!(!config.fast);
        assert_eq!(config.options.target, "es5");
        assert_eq!(config.options.module, "commonjs");
    }

    #[test]
    fn test_camel_case_fields() {
        let config: TargetConfig = serde_json::from_str(
            r#"{
                "src": ["a.ts", "b.ts"],
                "outDir": "build",
                "baseDir": "src",
                "fast": true,
                "options": { "sourceMap": true, "noImplicitAny": true, "target": "es3" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.src, vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")]);
        assert_eq!(config.out_dir, Some(PathBuf::from("build")));
        assert!(config.options.source_map);
        assert!(config.options.no_implicit_any);
        assert_eq!(config.options.module, "commonjs");
        assert!(!config.is_combined_output());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<TargetConfig, _> = serde_json::from_str(r#"{ "outdir": "x" }"#);
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_rooted_at() {
        let config = TargetConfig {
            src: vec![PathBuf::from("a.ts"), PathBuf::from("/abs/b.ts")],
            out: Some(PathBuf::from("bundle.js")),
            ..Default::default()
        }
        .rooted_at(Path::new("/project"));

        assert_eq!(config.src[0], PathBuf::from("/project/a.ts"));
        assert_eq!(config.src[1], PathBuf::from("/abs/b.ts"));
        assert_eq!(config.out, Some(PathBuf::from("/project/bundle.js")));
    }
}
