#![forbid(unsafe_code)]

use log::info;
use poem::web::Path;
use poem::{handler, IntoResponse, Request, Response};

use crate::routes::{redirect_found, render_template, validate_title};
use crate::utils::pages::Page;
use crate::utils::templates::VIEW_TEMPLATE;
use crate::utils::wiki_utils;
use crate::RUNTIME_CTX;

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// view_page:
// ---------------------------------------------------------------------------
/** GET /view/:title
 *
 * Render the stored page.  A title with no stored page redirects to the
 * edit form so the user can create it.
 */
#[handler]
pub async fn view_page(http_req: &Request, Path(title): Path<String>) -> poem::Result<Response> {
    // Conditional logging depending on log level.
    wiki_utils::debug_request(http_req);

    // Reject malformed titles before touching the filesystem.
    validate_title(&title)?;

    // Missing pages are not an error here; they bounce to the editor.
    let page = match Page::load_from(&RUNTIME_CTX.wiki_dirs.pages_dir, &title) {
        Ok(p) => p,
        Err(e) => {
            info!("{}; redirecting to /edit/{}", e, title);
            return Ok(redirect_found(&format!("/edit/{}", title)));
        }
    };

    Ok(render_template(VIEW_TEMPLATE, &page)?.into_response())
}
