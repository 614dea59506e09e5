#![forbid(unsafe_code)]

use poem::handler;
use poem::web::Json;
use serde::Serialize;

// From cargo.toml.
const WIKI_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

// ***************************************************************************
//                          Response Definitions
// ***************************************************************************
#[derive(Debug, Serialize)]
pub struct RespVersion {
    result_code: String,
    result_msg: String,
    wiki_version: String,
    git_branch: String,
    git_commit: String,
    git_dirty: String,
    source_ts: String,
    rustc_version: String,
}

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_version:
// ---------------------------------------------------------------------------
/** GET /version
 *
 * Report the build provenance captured by build.rs.
 */
#[handler]
pub async fn get_version() -> Json<RespVersion> {
    Json(RespVersion::assemble())
}

// ***************************************************************************
//                            Response Methods
// ***************************************************************************
impl RespVersion {
    fn assemble() -> Self {
        Self {
            result_code: "0".to_string(),
            result_msg: "success".to_string(),
            wiki_version: WIKI_VERSION.unwrap_or("unknown").to_string(),
            git_branch: env!("GIT_BRANCH").to_string(),
            git_commit: env!("GIT_COMMIT_SHORT").to_string(),
            git_dirty: env!("GIT_DIRTY").to_string(),
            source_ts: env!("SOURCE_TIMESTAMP").to_string(),
            rustc_version: env!("RUSTC_VERSION").to_string(),
        }
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_serializes() {
        let resp = RespVersion::assemble();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"result_code\":\"0\""));
        assert!(json.contains("wiki_version"));
        assert!(json.contains("rustc_version"));
    }
}
