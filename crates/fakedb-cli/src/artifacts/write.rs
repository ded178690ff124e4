use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use fakedb_generate::RenderedOutput;

use super::{ArtifactError, ArtifactResult};

/// Write `contents` through a sibling temp file, then rename into place.
pub fn write_text(path: &Path, contents: &str) -> ArtifactResult<()> {
    ensure_parent(path)?;

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(contents.as_bytes())?;
    if !contents.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> ArtifactResult<()> {
    let data = serde_json::to_string_pretty(value)?;
    write_text(path, &data)
}

/// Path of the CSV document for `table` inside `dir`.
pub fn csv_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.csv"))
}

/// Write one `<table>.csv` per rendered table, returning the paths in
/// sequence order.
pub fn write_csv_tables(dir: &Path, output: &RenderedOutput) -> ArtifactResult<Vec<PathBuf>> {
    create_dir_all(dir)?;
    let mut written = Vec::with_capacity(output.tables.len());
    for table in &output.tables {
        let path = csv_path(dir, &table.table);
        write_text(&path, &table.contents)?;
        written.push(path);
    }
    Ok(written)
}

fn ensure_parent(path: &Path) -> ArtifactResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }
    Ok(())
}

fn temp_path(path: &Path) -> ArtifactResult<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ArtifactError::InvalidPath(path.display().to_string()))?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakedb_generate::{OutputFormat, RenderedTable};

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("fakedb_cli_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn write_text_creates_parents_and_ends_with_newline() {
        let dir = scratch_dir();
        let path = dir.join("nested").join("output.sql");

        write_text(&path, "INSERT INTO t(a) VALUES\n\t(1);").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "INSERT INTO t(a) VALUES\n\t(1);\n");
        assert!(!temp_path(&path).unwrap().exists());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn csv_tables_land_in_one_file_each() {
        let dir = scratch_dir();
        let output = RenderedOutput {
            format: OutputFormat::Csv,
            tables: vec![
                RenderedTable {
                    table: "users".to_string(),
                    contents: "id,name\n1,ana\n".to_string(),
                },
                RenderedTable {
                    table: "orders".to_string(),
                    contents: "id,user_id\n7,1\n".to_string(),
                },
            ],
        };

        let written = write_csv_tables(&dir, &output).unwrap();
        assert_eq!(written, [csv_path(&dir, "users"), csv_path(&dir, "orders")]);
        assert_eq!(
            std::fs::read_to_string(csv_path(&dir, "orders")).unwrap(),
            "id,user_id\n7,1\n"
        );
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn write_json_pretty_prints() {
        let dir = scratch_dir();
        let path = dir.join("report.json");
        write_json(&path, &serde_json::json!({"seed": 7})).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\n  \"seed\": 7\n}\n"
        );
        std::fs::remove_dir_all(dir).unwrap();
    }
}
