#![forbid(unsafe_code)]

use std::ops::Deref;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use glob::glob;
use log::{debug, error, LevelFilter};
use path_absolutize::Absolutize;
use poem::Request;

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable references in a path name and
 * then construct the absolute path name.  Unlike std's canonicalize, the
 * absolutize method does not require that the file exist, which lets us
 * normalize paths for directories we are about to create.  On any expansion
 * failure the original path is returned unchanged.
 */
pub fn get_absolute_path(path: &str) -> String {
    // Replace ~ and environment variable values if possible.
    // On error, return the string version of the original path.
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    // Convert to absolute path if necessary.
    // Return original input on error.
    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    let p2 = match p1.to_str() {
        Some(x) => x,
        None => return path.to_owned(),
    };

    p2.to_owned()
}

// ---------------------------------------------------------------------------
// get_files_in_dir:
// ---------------------------------------------------------------------------
/** Return a list of PathBufs representing the immediate file children of the
 * directory.  This function is not recursive and does not include
 * subdirectories.
 */
pub fn get_files_in_dir(dir: &str) -> Result<Vec<PathBuf>> {
    // Create the result vector and globify the directory string.
    let mut v = vec![];
    let pattern = if dir.ends_with('/') {
        dir.to_string() + "*"
    } else {
        dir.to_string() + "/*"
    };

    // Collect all the immediate files in the directory.
    for entry in glob(&pattern)? {
        match entry {
            Ok(f) => {
                if f.is_file() {
                    v.push(f);
                }
            }
            Err(e) => {
                let msg = format!("Unable to access a directory entry in {}: {:?}.", &pattern, e);
                error!("{}", msg);
                return Result::Err(anyhow!(msg));
            }
        }
    }

    Ok(v)
}

// ---------------------------------------------------------------------------
// timestamp_utc:
// ---------------------------------------------------------------------------
/** Get the current UTC timestamp. */
#[allow(dead_code)]
pub fn timestamp_utc() -> DateTime<Utc> {
    Utc::now()
}

// ---------------------------------------------------------------------------
// timestamp_utc_to_str:
// ---------------------------------------------------------------------------
/** Convert a UTC datetime to rfc3339 format with second precision, which
 * looks like this:  2022-09-13T14:14:42Z
 */
pub fn timestamp_utc_to_str(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// debug_request:
// ---------------------------------------------------------------------------
// Dump http request information to the log.
pub fn debug_request(http_req: &Request) {
    // Check that debug or higher logging is in effect.
    let level = log::max_level();
    if level < LevelFilter::Debug {
        return;
    }

    // Accumulate the output.
    let mut s = "\n".to_string();

    // Restate the method and URI.
    s += format!("  Method: {}\n", http_req.method()).as_str();
    s += format!("  URI: {:?}\n", http_req.uri()).as_str();

    // Accumulate the headers.
    for v in http_req.headers().iter() {
        s += format!("  Header: {} = {:?}\n", v.0, v.1).as_str();
    }

    debug!("{}", s);
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_passthrough() {
        // Already-absolute paths come back unchanged.
        assert_eq!(get_absolute_path("/tmp/wiki"), "/tmp/wiki");
    }

    #[test]
    fn test_absolute_path_tilde() {
        // Tilde expansion produces an absolute path.
        let p = get_absolute_path("~/wiki");
        assert!(p.starts_with('/'));
        assert!(p.ends_with("/wiki"));
    }

    #[test]
    fn test_timestamp_format() {
        let s = timestamp_utc_to_str(timestamp_utc());
        assert!(s.ends_with('Z'));
        assert!(s.contains('T'));
    }
}
