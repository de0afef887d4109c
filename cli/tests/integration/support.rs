//! Scratch projects with a fake interpreter that behaves like python3 with
//! pip and virtualenv installed.

#![allow(clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

const FAKE_PYTHON: &str = r##"#!/bin/sh
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  if [ "$4" = "-r" ]; then
    if [ ! -f "$5" ]; then
      echo "ERROR: Could not open requirements file: $5" >&2
      exit 1
    fi
    site="${VIRTUAL_ENV:-.}/lib/site-packages"
    mkdir -p "$site"
    while read -r req; do
      echo "Successfully installed $req"
      echo "$req" >> "$site/installed.txt"
    done < "$5"
    exit 0
  fi
  echo "Successfully installed $4"
  exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "virtualenv" ]; then
  mkdir -p "$3/bin"
  cp "$0" "$3/bin/python"
  echo "created virtual environment in $3"
  exit 0
fi
exec /bin/sh "$@"
"##;

/// A temporary project directory wired to the fake interpreter.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Project with `requests==2.0.0` and an entry point that prints `OK`.
    pub fn new() -> Self {
        let project = Self::bare();
        project.write("requirements.txt", "requests==2.0.0\n");
        project.write("test.py", "echo OK\n");
        project
    }

    /// Project with only the fake tool chain configured.
    pub fn bare() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let tools = dir.path().join("tools");
        std::fs::create_dir_all(&tools).expect("tools dir");
        let python = tools.join("python3");
        std::fs::write(&python, FAKE_PYTHON).expect("write fake python");
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake python");

        let config = format!("tools:\n  interpreter:\n    program: {}\n", python.display());
        std::fs::write(dir.path().join("envstrap.yaml"), config).expect("write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("write project file");
    }

    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("remove project file");
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("envstrap.log")
    }

    pub fn log(&self) -> String {
        std::fs::read_to_string(self.log_path()).expect("read run log")
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.log().lines().map(str::to_string).collect()
    }

    /// `envstrap` pointed at this project.
    pub fn envstrap(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("envstrap"));
        cmd.env("NO_COLOR", "1")
            .env_remove("ENVSTRAP_CONFIG")
            .arg("--project-dir")
            .arg(self.path());
        cmd
    }
}
