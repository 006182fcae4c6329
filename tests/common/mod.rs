#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;
use xmllint_action::{LintOutput, Linter, Result};

/// Temporary checkout with helpers for laying out files
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}

/// Linter returning canned diagnostics, keyed by path relative to a workspace
pub struct FakeLinter {
    workspace: PathBuf,
    responses: HashMap<PathBuf, (bool, String)>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeLinter {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail `relative` with xmllint-style output for one message.
    pub fn fail(
        mut self,
        relative: &str,
        position: u64,
        kind: &str,
        message: &str,
        source: &str,
        pointer: &str,
    ) -> Self {
        let path = self.workspace.join(relative);
        let entry = self
            .responses
            .entry(PathBuf::from(relative))
            .or_insert((false, String::new()));
        entry.0 = false;
        entry.1.push_str(&format!(
            "{}:{}: {} error : {}\n{}\n{}\n",
            path.display(),
            position,
            kind,
            message,
            source,
            pointer
        ));
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Linter for FakeLinter {
    async fn lint(&self, file: &Path) -> Result<LintOutput> {
        let relative = file.strip_prefix(&self.workspace).unwrap().to_path_buf();
        self.calls.lock().unwrap().push(relative.clone());

        let (success, diagnostics) = self
            .responses
            .get(&relative)
            .cloned()
            .unwrap_or((true, String::new()));
        Ok(LintOutput {
            success,
            status: format!("exit status: {}", if success { 0 } else { 1 }),
            diagnostics,
        })
    }
}

/// Shell script standing in for xmllint.
///
/// Files whose name contains `bad` get one parser error at byte 15; every
/// other file passes.
#[cfg(unix)]
pub fn write_fake_xmllint(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-xmllint");
    std::fs::write(
        &script,
        r#"#!/bin/sh
for last; do :; done
case "$last" in
  *bad*)
    echo "$last:15: parser error : Opening and ending tag mismatch: a line 2 and root" >&2
    echo "<a></root>" >&2
    echo "        ^" >&2
    exit 1
    ;;
esac
exit 0
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Shell script standing in for `xmllint --validate`: it passes only when the
/// flag was given and fails without diagnostics otherwise.
#[cfg(unix)]
pub fn write_validating_xmllint(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("validating-xmllint");
    std::fs::write(
        &script,
        r#"#!/bin/sh
for arg; do
  if [ "$arg" = "--validate" ]; then
    exit 0
  fi
done
exit 1
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}
