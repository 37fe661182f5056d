//! Recursive discovery of icon files.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::SheetError;
use crate::icon::IconFile;

/// File name suffix that marks an icon. Matched case-sensitively.
pub const ICON_EXTENSION: &str = ".svg";

/// Finds every icon file under `root`, sorted by path relative to `root`.
///
/// Directories and files without the icon extension are skipped. The order
/// does not depend on the file system's listing order, so an unchanged tree
/// always yields the same layout.
pub fn discover_icons(root: &Path) -> Result<Vec<IconFile>, SheetError> {
    if !root.is_dir() {
        return Err(SheetError::InputNotFound {
            path: root.to_owned(),
        });
    }

    let mut icons = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| SheetError::Walk {
            path: root.to_owned(),
            source: e,
        })?;

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file || !is_icon_name(entry.file_name()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        icons.push(IconFile::new(entry.path(), relative));
    }

    icons.sort();
    log::debug!("discovered {} icons under {}", icons.len(), root.display());
    Ok(icons)
}

fn is_icon_name(name: &std::ffi::OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| name.len() > ICON_EXTENSION.len() && name.ends_with(ICON_EXTENSION))
}
