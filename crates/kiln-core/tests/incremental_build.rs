//! End-to-end tests of the orchestrator against a scripted compiler.
//!
//! The compiler is a shell script run through `/bin/sh` that appends the
//! contents of its argument file to a log and fails while a flag file exists.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use kiln_core::{ChangeCache, Compiler, Orchestrator, OrchestratorSettings, TargetConfig};
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir_all(dir.path().join("tmp")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();

        let script = format!(
            r#"argfile="${{1#@}}"
printf '%s\n' "$(cat "$argfile")" >> "{log}"
if [ -f "{flag}" ]; then echo "error TS1005: ';' expected."; exit 1; fi
echo "compiled"
"#,
            log = dir.path().join("invocations.log").display(),
            flag = dir.path().join("fail").display(),
        );
        fs::write(dir.path().join("fake-tsc.sh"), script).unwrap();

        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn source(&self, name: &str) -> PathBuf {
        let path = self.root().join("src").join(name);
        fs::write(&path, format!("export const {} = 1;", name.replace('.', "_"))).unwrap();
        path
    }

    fn touch(&self, path: &Path) {
        fs::OpenOptions::new()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(90))
            .unwrap();
    }

    /// A fresh orchestrator, as a new process would build it.
    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            ChangeCache::new(self.root().join(".kiln").join("cache")),
            Compiler {
                program: PathBuf::from("/bin/sh"),
                script: Some(self.root().join("fake-tsc.sh")),
                version: None,
            },
            OrchestratorSettings {
                temp_dir: self.root().join("tmp"),
            },
        )
    }

    fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("invocations.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn set_failing(&self, failing: bool) {
        let flag = self.root().join("fail");
        if failing {
            fs::write(flag, "").unwrap();
        } else {
            let _ = fs::remove_file(flag);
        }
    }

    fn argument_files_left(&self) -> usize {
        fs::read_dir(self.root().join("tmp")).unwrap().count()
    }
}

fn fast_target() -> TargetConfig {
    TargetConfig {
        fast: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_incremental_cycle_across_runs() {
    let project = Project::new();
    let files = vec![project.source("a.ts"), project.source("b.ts")];

    let first = project
        .orchestrator()
        .compile("dev", &fast_target(), &files)
        .await
        .unwrap();
    assert_eq!(first.code, 0);
    assert_eq!(first.file_count, 2);
    assert!(first.output.contains("compiled"));

    // A new orchestrator sees the records persisted by the first one
    let second = project
        .orchestrator()
        .compile("dev", &fast_target(), &files)
        .await
        .unwrap();
    assert!(second.is_skipped());

    project.touch(&files[1]);
    let third = project
        .orchestrator()
        .compile("dev", &fast_target(), &files)
        .await
        .unwrap();
    assert_eq!(third.file_count, 1);

    let invocations = project.invocations();
    assert_eq!(invocations.len(), 2);
    assert!(invocations[1].contains("b.ts"));
    assert!(!invocations[1].contains("a.ts"));
    assert_eq!(project.argument_files_left(), 0);
}

#[tokio::test]
async fn test_failed_compile_is_retried() {
    let project = Project::new();
    let files = vec![project.source("a.ts")];

    project.set_failing(true);
    let failed = project
        .orchestrator()
        .compile("dev", &fast_target(), &files)
        .await
        .unwrap();
    assert_eq!(failed.code, 1);
    assert!(failed.output.contains("error TS1005"));

    project.set_failing(false);
    let retried = project
        .orchestrator()
        .compile("dev", &fast_target(), &files)
        .await
        .unwrap();
    assert_eq!(retried.code, 0);
    assert_eq!(retried.file_count, 1);
    assert_eq!(project.invocations().len(), 2);
    assert_eq!(project.argument_files_left(), 0);
}

#[tokio::test]
async fn test_concurrent_targets() {
    let project = Project::new();
    let files = vec![project.source("a.ts"), project.source("b.ts")];
    let orchestrator = project.orchestrator();
    let dev = fast_target();
    let release = TargetConfig {
        out: Some(project.root().join("out").join("bundle.js")),
        ..fast_target()
    };

    let (dev_result, release_result) = tokio::join!(
        orchestrator.compile("dev", &dev, &files),
        orchestrator.compile("release", &release, &files),
    );

    assert_eq!(dev_result.unwrap().file_count, 2);
    assert_eq!(release_result.unwrap().file_count, 2);
    assert_eq!(project.invocations().len(), 2);
    assert_eq!(project.argument_files_left(), 0);

    // Combined output never skips, even with nothing changed
    let again = orchestrator.compile("release", &release, &files).await.unwrap();
    assert_eq!(again.file_count, 2);
    let dev_again = orchestrator.compile("dev", &dev, &files).await.unwrap();
    assert!(dev_again.is_skipped());
}
