#![forbid(unsafe_code)]

use log::error;
use poem::http::StatusCode;
use poem::web::{Form, Path};
use poem::{handler, Request, Response};
use serde::Deserialize;

use crate::routes::{redirect_found, validate_title};
use crate::utils::pages::Page;
use crate::utils::wiki_utils;
use crate::RUNTIME_CTX;

// ***************************************************************************
//                          Request Definitions
// ***************************************************************************
// Form submission from the edit template's <textarea name="body">.
#[derive(Debug, Deserialize)]
pub struct ReqSavePage {
    pub body: String,
}

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// save_page:
// ---------------------------------------------------------------------------
/** POST /save/:title
 *
 * Persist the submitted body as the page content, overwriting any previous
 * content, then redirect to the view route.  A write failure is logged and
 * returned as a 500 with the error text.
 */
#[handler]
pub async fn save_page(
    http_req: &Request,
    Path(title): Path<String>,
    Form(req): Form<ReqSavePage>,
) -> poem::Result<Response> {
    // Conditional logging depending on log level.
    wiki_utils::debug_request(http_req);

    validate_title(&title)?;

    let page = Page::new(&title, &req.body);
    match page.save_to(&RUNTIME_CTX.wiki_dirs.pages_dir) {
        Ok(_) => Ok(redirect_found(&format!("/view/{}", title))),
        Err(e) => {
            let msg = format!("Unable to save page {}: {}", title, e);
            error!("{}", msg);
            Err(poem::Error::from_string(msg, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}
