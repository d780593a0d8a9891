//! Selective zip extraction.

use crate::error::DepsResult;
use crate::layout::{route_member, ExtractRule};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Copy every archive member matched by `rules` under `root`.
///
/// Members that would escape the archive root are skipped. Files written
/// before a failure are left in place. Returns the written paths in archive
/// order.
pub fn extract_matching(archive: &Path, root: &Path, rules: &[ExtractRule]) -> DepsResult<Vec<PathBuf>> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    let mut written = Vec::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let Some(member) = entry.enclosed_name() else {
            warn!("Skipping unsafe archive member {:?}", entry.name());
            continue;
        };
        let Some(relative) = route_member(rules, &member) else {
            continue;
        };

        let dest = root.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&dest)?;
        io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode & 0o777))?;
        }

        debug!("Extracted {:?} -> {:?}", member, dest);
        written.push(dest);
    }

    Ok(written)
}

#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}
