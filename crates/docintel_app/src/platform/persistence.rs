use std::fs;
use std::io;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use docintel_core::SaveRequest;
use docintel_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use docintel_logging::{docintel_error, docintel_info, docintel_warn};
use serde::{Deserialize, Serialize};

const MIRROR_FILENAME: &str = ".docintel_saved.ron";
const BACKUP_FILENAME: &str = ".docintel_saved.ron.bak";

/// A document kept on disk because the backend could not store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LocalSave {
    pub(crate) saved_at: String,
    pub(crate) document: SaveRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct MirrorFile {
    saved: Vec<LocalSave>,
}

pub(crate) fn load_local_saves(data_dir: &Path) -> Vec<LocalSave> {
    let path = data_dir.join(MIRROR_FILENAME);
    match read_mirror(&path) {
        Ok(Ok(saved)) => saved,
        Ok(Err(err)) => {
            docintel_warn!("Failed to parse local saves from {:?}: {}", path, err);
            Vec::new()
        }
        Err(err) => {
            docintel_warn!("Failed to read local saves from {:?}: {}", path, err);
            Vec::new()
        }
    }
}

/// Outer error: the file could not be read. Inner error: it is not valid ron.
fn read_mirror(path: &Path) -> io::Result<Result<Vec<LocalSave>, String>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Ok(Vec::new())),
        Err(err) => return Err(err),
    };
    Ok(ron::from_str::<MirrorFile>(&content)
        .map(|file| file.saved)
        .map_err(|err| err.to_string()))
}

/// Appends `document` to the local mirror in `data_dir`. A mirror that does
/// not parse is moved to `BACKUP_FILENAME` before a fresh one is written.
pub(crate) fn append_local_save(data_dir: &Path, document: SaveRequest) -> Result<(), PersistError> {
    ensure_output_dir(data_dir)?;

    let path = data_dir.join(MIRROR_FILENAME);
    let saved = match read_mirror(&path)? {
        Ok(saved) => saved,
        Err(err) => {
            let backup = data_dir.join(BACKUP_FILENAME);
            docintel_warn!(
                "Local saves in {:?} are corrupt ({}); moving them to {:?}",
                path,
                err,
                backup
            );
            fs::rename(&path, &backup)?;
            Vec::new()
        }
    };

    let mut file = MirrorFile { saved };
    file.saved.push(LocalSave {
        saved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        document,
    });

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(&file, pretty).map_err(|err| {
        docintel_error!("Failed to serialize local saves: {}", err);
        PersistError::Io(io::Error::other(err.to_string()))
    })?;

    let writer = AtomicFileWriter::new(data_dir.to_path_buf());
    writer.write(MIRROR_FILENAME, content.as_bytes())?;
    docintel_info!(
        "Mirrored document locally ({} entries in {:?})",
        file.saved.len(),
        data_dir
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request(name: &str) -> SaveRequest {
        SaveRequest {
            filename: name.to_string(),
            text: "body".to_string(),
            summary: "gist".to_string(),
            summary_type: "bullet_points".to_string(),
            summary_length: "short".to_string(),
            analysis: None,
            file_size: 42,
        }
    }

    #[test]
    fn missing_mirror_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(load_local_saves(temp.path()).is_empty());
    }

    #[test]
    fn saves_accumulate_in_order() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("state");

        append_local_save(&dir, request("a.pdf")).unwrap();
        append_local_save(&dir, request("b.png")).unwrap();

        let saved = load_local_saves(&dir);
        let names: Vec<_> = saved.iter().map(|s| s.document.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.png"]);
        assert_eq!(saved[0].document, request("a.pdf"));
        assert!(saved[0].saved_at.ends_with('Z'));
    }

    #[test]
    fn corrupt_mirror_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MIRROR_FILENAME), "not ron at all (").unwrap();
        assert!(load_local_saves(temp.path()).is_empty());
    }

    #[test]
    fn corrupt_mirror_is_kept_aside_before_appending() {
        let temp = TempDir::new().unwrap();
        let corrupt = "not ron at all (";
        fs::write(temp.path().join(MIRROR_FILENAME), corrupt).unwrap();

        append_local_save(temp.path(), request("c.pdf")).unwrap();

        let backup = fs::read_to_string(temp.path().join(BACKUP_FILENAME)).unwrap();
        assert_eq!(backup, corrupt);
        let saved = load_local_saves(temp.path());
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].document.filename, "c.pdf");
    }
}
