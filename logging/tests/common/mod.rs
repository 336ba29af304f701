#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Writes `yaml` as `campus_logging.yaml` in `dir` and returns the path.
pub fn write_config(dir: &Path, name: &str, yaml: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, yaml).expect("config file is writable");
  path
}

pub fn read_lines(path: &Path) -> Vec<String> {
  fs::read_to_string(path)
    .unwrap_or_default()
    .lines()
    .map(str::to_string)
    .collect()
}

/// Every file under `dir` whose name starts with `prefix`.
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = fs::read_dir(dir)
    .map(|entries| {
      entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
          p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix))
        })
        .collect()
    })
    .unwrap_or_default();
  files.sort();
  files
}
