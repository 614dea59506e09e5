#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use log::{error, warn};
use poem::http::{header, StatusCode};
use poem::web::Html;
use poem::Response;
use regex::Regex;

use crate::utils::errors::Errors;
use crate::utils::pages::Page;
use crate::utils::templates;
use crate::RUNTIME_CTX;

// Route handler modules, one file per endpoint.
pub mod page_edit;
pub mod page_index;
pub mod page_save;
pub mod page_view;
pub mod version;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Titles are restricted to a single alphanumeric path segment.  The regex is
// compiled once; a compilation failure is a programming error and panics at
// first use.
lazy_static! {
    static ref VALID_TITLE: Regex = Regex::new("^[a-zA-Z0-9]+$").unwrap();
}

// ***************************************************************************
//                              Shared Helpers
// ***************************************************************************
// ---------------------------------------------------------------------------
// validate_title:
// ---------------------------------------------------------------------------
/** Reject any title that is not a single alphanumeric segment.  Every page
 * route funnels its title parameter through here before touching the page
 * store; an invalid title yields 404, as if the route didn't exist.
 */
pub fn validate_title(title: &str) -> poem::Result<()> {
    if VALID_TITLE.is_match(title) {
        Ok(())
    } else {
        warn!("{}", Errors::InvalidPageTitle(title.to_string()));
        Err(poem::Error::from_status(StatusCode::NOT_FOUND))
    }
}

// ---------------------------------------------------------------------------
// redirect_found:
// ---------------------------------------------------------------------------
/** Build a plain 302 Found redirect to the given location. */
pub fn redirect_found(location: &str) -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .finish()
}

// ---------------------------------------------------------------------------
// render_template:
// ---------------------------------------------------------------------------
/** Render a page through the pre-parsed engine, mapping a render failure to
 * a logged 500 response.
 */
pub fn render_template(template_name: &str, page: &Page) -> poem::Result<Html<String>> {
    match templates::render_page(&RUNTIME_CTX.tmpl, template_name, page) {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            let msg = format!("Unable to render template {}: {}", template_name, e);
            error!("{}", msg);
            Err(poem::Error::from_string(msg, StatusCode::INTERNAL_SERVER_ERROR))
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
    fn test_valid_titles() {
        assert!(validate_title("Welcome").is_ok());
        assert!(validate_title("page42").is_ok());
        assert!(validate_title("X").is_ok());
    }

    #[test]
    fn test_invalid_titles() {
        assert!(validate_title("").is_err());
        assert!(validate_title("has space").is_err());
        assert!(validate_title("dotted.name").is_err());
        assert!(validate_title("../escape").is_err());
        assert!(validate_title("semi;colon").is_err());
        assert!(validate_title("ünïcode").is_err());
    }

    #[test]
    fn test_redirect_found() {
        let resp = redirect_found("/view/Welcome");
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "/view/Welcome");
    }
}
