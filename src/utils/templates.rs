#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use anyhow::Result;
use log::info;
use tera::{Context, Tera};

use crate::utils::errors::Errors;
use crate::utils::pages::Page;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Template file names referenced by the route handlers.
pub const VIEW_TEMPLATE: &str = "view.html";
pub const EDIT_TEMPLATE: &str = "edit.html";
pub const PAGES_TEMPLATE: &str = "pages.html";

// Default template content compiled into the binary and installed into the
// templates directory on first run.  Installed copies can be customized;
// they are never overwritten once present.
const DEFAULT_VIEW_TEMPLATE: &str = include_str!("../../resources/templates/view.html");
const DEFAULT_EDIT_TEMPLATE: &str = include_str!("../../resources/templates/edit.html");
const DEFAULT_PAGES_TEMPLATE: &str = include_str!("../../resources/templates/pages.html");

// ***************************************************************************
//                              Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_templates:
// ---------------------------------------------------------------------------
/** Install any missing default templates into the templates directory and
 * parse the whole directory into a single Tera engine.  Parsing happens
 * exactly once, at startup; a parse failure here is fatal to the caller.
 * Tera html templates auto-escape interpolated values, so raw page text is
 * safe to render.
 */
pub fn init_templates(templates_dir: &str) -> Result<Tera> {
    install_default_templates(templates_dir)?;

    let pattern = templates_dir.to_string() + "/*.html";
    match Tera::new(&pattern) {
        Ok(t) => Ok(t),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TemplateInitialization(templates_dir.to_string()), e);
            Result::Err(anyhow::anyhow!(msg))
        }
    }
}

// ---------------------------------------------------------------------------
// render_page:
// ---------------------------------------------------------------------------
/** Render a single page through the named template. */
pub fn render_page(tmpl: &Tera, template_name: &str, page: &Page) -> Result<String> {
    let mut context = Context::new();
    context.insert("title", &page.title);
    context.insert("body", &page.body);
    Ok(tmpl.render(template_name, &context)?)
}

// ---------------------------------------------------------------------------
// install_default_templates:
// ---------------------------------------------------------------------------
/** Write each built-in template into the templates directory unless a file
 * with that name already exists.
 */
pub fn install_default_templates(templates_dir: &str) -> Result<()> {
    let defaults = [
        (VIEW_TEMPLATE, DEFAULT_VIEW_TEMPLATE),
        (EDIT_TEMPLATE, DEFAULT_EDIT_TEMPLATE),
        (PAGES_TEMPLATE, DEFAULT_PAGES_TEMPLATE),
    ];

    for (name, content) in defaults {
        let path = Path::new(templates_dir).join(name);
        if !path.exists() {
            fs::write(&path, content)?;
            info!("Installed default template: {:?}", path);
        }
    }
    Ok(())
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    // Build an engine from the compiled-in defaults without touching disk.
    fn raw_engine() -> Tera {
        let mut t = Tera::default();
        t.add_raw_template(VIEW_TEMPLATE, DEFAULT_VIEW_TEMPLATE).unwrap();
        t.add_raw_template(EDIT_TEMPLATE, DEFAULT_EDIT_TEMPLATE).unwrap();
        t.add_raw_template(PAGES_TEMPLATE, DEFAULT_PAGES_TEMPLATE).unwrap();
        t.autoescape_on(vec![".html"]);
        t
    }

    #[test]
    fn test_render_view() {
        let t = raw_engine();
        let page = Page::new("Home", "welcome text");
        let html = render_page(&t, VIEW_TEMPLATE, &page).unwrap();
        assert!(html.contains("<h1>Home</h1>"));
        assert!(html.contains("welcome text"));
        assert!(html.contains("/edit/Home"));
    }

    #[test]
    fn test_render_edit_form() {
        let t = raw_engine();
        let page = Page::empty("NewPage");
        let html = render_page(&t, EDIT_TEMPLATE, &page).unwrap();
        assert!(html.contains("action=\"/save/NewPage\""));
        assert!(html.contains("<textarea name=\"body\""));
    }

    #[test]
    fn test_render_escapes_html() {
        let t = raw_engine();
        let page = Page::new("Risky", "<script>alert(1)</script>");
        let html = render_page(&t, VIEW_TEMPLATE, &page).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_install_defaults_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let tdir = dir.path().to_str().unwrap();

        install_default_templates(tdir).unwrap();
        // Customize one template; a second install must not clobber it.
        std::fs::write(dir.path().join(VIEW_TEMPLATE), "custom").unwrap();
        install_default_templates(tdir).unwrap();

        let content = std::fs::read_to_string(dir.path().join(VIEW_TEMPLATE)).unwrap();
        assert_eq!(content, "custom");
    }

    #[test]
    fn test_init_templates_parses_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tdir = dir.path().to_str().unwrap();

        let t = init_templates(tdir).unwrap();
        let names: Vec<&str> = t.get_template_names().collect();
        assert!(names.contains(&VIEW_TEMPLATE));
        assert!(names.contains(&EDIT_TEMPLATE));
        assert!(names.contains(&PAGES_TEMPLATE));
    }
}
