#![forbid(unsafe_code)]

use poem::web::Path;
use poem::{handler, IntoResponse, Request, Response};

use crate::routes::{render_template, validate_title};
use crate::utils::pages::Page;
use crate::utils::templates::EDIT_TEMPLATE;
use crate::utils::wiki_utils;
use crate::RUNTIME_CTX;

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// edit_page:
// ---------------------------------------------------------------------------
/** GET /edit/:title
 *
 * Display the edit form for the page.  A title with no stored page gets an
 * empty form; saving it creates the page.
 */
#[handler]
pub async fn edit_page(http_req: &Request, Path(title): Path<String>) -> poem::Result<Response> {
    // Conditional logging depending on log level.
    wiki_utils::debug_request(http_req);

    validate_title(&title)?;

    // An unsaved title is edited as an empty page.
    let page = Page::load_from(&RUNTIME_CTX.wiki_dirs.pages_dir, &title)
        .unwrap_or_else(|_| Page::empty(&title));

    Ok(render_template(EDIT_TEMPLATE, &page)?.into_response())
}
