#![forbid(unsafe_code)]

use std::fs;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::error;
use serde::Serialize;

use crate::utils::errors::Errors;
use crate::utils::wiki_utils::{get_files_in_dir, timestamp_utc_to_str};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Every page is persisted as a single flat file with this suffix.
pub const PAGE_FILE_SUFFIX: &str = ".page";

// Page files are readable and writable by the server account only.
const PAGE_FILE_MODE: u32 = 0o600;

// ***************************************************************************
//                               Page Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// Page:
// ---------------------------------------------------------------------------
/** Page describes how wiki page data is held in memory: a title and the raw
 * page text.  On disk the page lives at <pages_dir>/<title>.page; the title
 * is never stored inside the file.
 */
#[derive(Debug, Serialize)]
pub struct Page {
    pub title: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// PageInfo:
// ---------------------------------------------------------------------------
/** Summary record for the page index listing. */
#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub title: String,
    pub modified: String,
}

// ***************************************************************************
//                               Page Methods
// ***************************************************************************
impl Page {
    pub fn new(title: &str, body: &str) -> Self {
        Self { title: title.to_string(), body: body.to_string() }
    }

    /// An existing title with no saved content yet.
    pub fn empty(title: &str) -> Self {
        Self { title: title.to_string(), body: String::new() }
    }

    // -----------------------------------------------------------------------
    // save_to:
    // -----------------------------------------------------------------------
    /** Write the page body to its file in the pages directory, creating the
     * file with owner-only permissions if it doesn't exist and truncating it
     * if it does.  Last write wins; there is no coordination between
     * concurrent saves of the same title.
     */
    pub fn save_to(&self, pages_dir: &str) -> Result<()> {
        let path = page_path(pages_dir, &self.title);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(PAGE_FILE_MODE)
            .open(&path)?;
        file.write_all(self.body.as_bytes())?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // load_from:
    // -----------------------------------------------------------------------
    /** Read the page file for the given title.  A missing file surfaces as a
     * PageNotFound error for the caller to handle; page bytes that are not
     * valid UTF-8 are converted lossily rather than rejected.
     */
    pub fn load_from(pages_dir: &str, title: &str) -> Result<Page> {
        let path = page_path(pages_dir, title);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(_) => {
                return Result::Err(Errors::PageNotFound(title.to_string()).into());
            }
        };
        Ok(Page {
            title: title.to_string(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

// ***************************************************************************
//                              Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// page_path:
// ---------------------------------------------------------------------------
/** Construct the flat-file path for a title. */
pub fn page_path(pages_dir: &str, title: &str) -> PathBuf {
    Path::new(pages_dir).join(title.to_string() + PAGE_FILE_SUFFIX)
}

// ---------------------------------------------------------------------------
// list_pages:
// ---------------------------------------------------------------------------
/** Return a summary record for every page file in the pages directory,
 * sorted by title.  Files without the page suffix are ignored.  A file whose
 * metadata cannot be read is logged and skipped rather than failing the
 * whole listing.
 */
pub fn list_pages(pages_dir: &str) -> Result<Vec<PageInfo>> {
    let mut pages = vec![];
    for file in get_files_in_dir(pages_dir)? {
        // Only <title>.page files participate in the listing.
        let name = match file.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        let title = match name.strip_suffix(PAGE_FILE_SUFFIX) {
            Some(t) => t,
            None => continue,
        };

        let modified = match file.metadata().and_then(|m| m.modified()) {
            Ok(ts) => timestamp_utc_to_str(DateTime::<Utc>::from(ts)),
            Err(e) => {
                error!("Unable to read metadata for {:?}: {}", file, e);
                continue;
            }
        };

        pages.push(PageInfo { title: title.to_string(), modified });
    }

    pages.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(pages)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let pages_dir = dir.path().to_str().unwrap();

        let page = Page::new("TestPage", "Hello, wiki!");
        page.save_to(pages_dir).unwrap();

        let loaded = Page::load_from(pages_dir, "TestPage").unwrap();
        assert_eq!(loaded.title, "TestPage");
        assert_eq!(loaded.body, "Hello, wiki!");
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let pages_dir = dir.path().to_str().unwrap();

        Page::new("Draft", "first").save_to(pages_dir).unwrap();
        Page::new("Draft", "second").save_to(pages_dir).unwrap();

        let loaded = Page::load_from(pages_dir, "Draft").unwrap();
        assert_eq!(loaded.body, "second");
    }

    #[test]
    fn test_save_sets_owner_only_mode() {
        let dir = tempfile::tempdir().unwrap();
        let pages_dir = dir.path().to_str().unwrap();

        Page::new("Secret", "shh").save_to(pages_dir).unwrap();

        let meta = fs::metadata(page_path(pages_dir, "Secret")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_load_missing_page() {
        let dir = tempfile::tempdir().unwrap();
        let pages_dir = dir.path().to_str().unwrap();

        let err = Page::load_from(pages_dir, "NoSuchPage").unwrap_err();
        assert!(err.to_string().contains("NoSuchPage"));
    }

    #[test]
    fn test_list_pages_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let pages_dir = dir.path().to_str().unwrap();

        Page::new("Zebra", "z").save_to(pages_dir).unwrap();
        Page::new("Alpha", "a").save_to(pages_dir).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pages = list_pages(pages_dir).unwrap();
        let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Zebra"]);
        assert!(pages[0].modified.ends_with('Z'));
    }

    #[test]
    fn test_empty_page() {
        let p = Page::empty("Fresh");
        assert_eq!(p.title, "Fresh");
        assert!(p.body.is_empty());
    }
}
