//! Project file loading.
//!
//! A project file (`kiln.json`) names the targets and where Kiln keeps its
//! state. Relative paths inside it are resolved against its directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use kiln_core::{
    ChangeCache, Compiler, CompilerLocation, Orchestrator, OrchestratorSettings, ProjectDirs,
    TargetConfig,
};
use serde::Deserialize;

/// On-disk shape of `kiln.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProjectFile {
    cache_dir: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    compiler: CompilerLocation,
    targets: BTreeMap<String, TargetConfig>,
}

/// Command-line overrides applied to every selected target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub fast: bool,
    pub verbose: bool,
}

/// A loaded project.
#[derive(Debug)]
pub struct Project {
    /// Directory containing the project file.
    pub root: PathBuf,
    pub dirs: ProjectDirs,
    pub settings: OrchestratorSettings,
    pub compiler: CompilerLocation,
    pub targets: BTreeMap<String, TargetConfig>,
}

impl Project {
    /// Load the project file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {}", path.display()))?;
        let file: ProjectFile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid project file {}", path.display()))?;

        let root = std::path::absolute(path)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let rooted = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };

        let dirs = match file.cache_dir {
            Some(cache_dir) => ProjectDirs::with_cache_dir(root.join(".kiln"), rooted(cache_dir))?,
            None => ProjectDirs::from_project_dir(&root)?,
        };

        let mut settings = OrchestratorSettings::default();
        if let Some(temp_dir) = file.temp_dir {
            settings.temp_dir = rooted(temp_dir);
            fs::create_dir_all(&settings.temp_dir)?;
        }

        let compiler = CompilerLocation {
            project_root: Some(root.clone()),
            local_root: std::env::current_dir().ok(),
            ..file.compiler
        };

        let targets = file
            .targets
            .into_iter()
            .map(|(name, config)| (name, config.rooted_at(&root)))
            .collect();

        Ok(Self {
            root,
            dirs,
            settings,
            compiler,
            targets,
        })
    }

    /// Pick the targets named in `names`, or every target when empty.
    ///
    /// A name given twice is compiled once.
    pub fn select(
        &self,
        names: &[String],
        overrides: Overrides,
    ) -> anyhow::Result<Vec<(String, TargetConfig)>> {
        let names: Vec<&String> = if names.is_empty() {
            self.targets.keys().collect()
        } else {
            let mut unique = Vec::new();
            for name in names {
                if !unique.contains(&name) {
                    unique.push(name);
                }
            }
            unique
        };

        names
            .into_iter()
            .map(|name| {
                let mut config = self
                    .targets
                    .get(name)
                    .cloned()
                    .with_context(|| format!("Unknown target '{}'", name))?;
                config.fast |= overrides.fast;
                config.verbose |= overrides.verbose;
                Ok((name.clone(), config))
            })
            .collect()
    }

    pub fn cache(&self) -> ChangeCache {
        ChangeCache::new(self.dirs.cache_dir.clone())
    }

    /// Locate the compiler and build an orchestrator for this project.
    pub fn orchestrator(&self) -> anyhow::Result<Orchestrator> {
        let compiler = Compiler::locate(&self.compiler)?;
        Ok(Orchestrator::new(self.cache(), compiler, self.settings.clone()))
    }
}
