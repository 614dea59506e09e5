#![forbid(unsafe_code)]

use log::error;
use poem::http::StatusCode;
use poem::web::Html;
use poem::{handler, Request};
use tera::Context;

use crate::utils::pages;
use crate::utils::templates::PAGES_TEMPLATE;
use crate::utils::wiki_utils;
use crate::RUNTIME_CTX;

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// index_pages:
// ---------------------------------------------------------------------------
/** GET /pages
 *
 * List every stored page, sorted by title, with last-modified timestamps.
 */
#[handler]
pub async fn index_pages(http_req: &Request) -> poem::Result<Html<String>> {
    // Conditional logging depending on log level.
    wiki_utils::debug_request(http_req);

    let page_list = match pages::list_pages(&RUNTIME_CTX.wiki_dirs.pages_dir) {
        Ok(p) => p,
        Err(e) => {
            let msg = format!("Unable to list pages: {}", e);
            error!("{}", msg);
            return Err(poem::Error::from_string(msg, StatusCode::INTERNAL_SERVER_ERROR));
        }
    };

    let mut context = Context::new();
    context.insert("site", &RUNTIME_CTX.parms.config.title);
    context.insert("pages", &page_list);

    match RUNTIME_CTX.tmpl.render(PAGES_TEMPLATE, &context) {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            let msg = format!("Unable to render template {}: {}", PAGES_TEMPLATE, e);
            error!("{}", msg);
            Err(poem::Error::from_string(msg, StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}
