#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use log::info;
use poem::listener::TcpListener;
use poem::{get, handler, post, Response, Route};

// Wiki utilities
use crate::routes::redirect_found;
use crate::routes::{page_edit, page_index, page_save, page_view, version};
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;

// Modules
mod routes;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "WikiServer"; // for poem logging

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the runtime context so that it has a 'static lifetime.
// Initialization reads the configuration file, creates the data directories
// and parses all templates exactly once.  We exit if any of that fails.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Wiki ----------------
    // Announce ourselves.
    println!("Starting wiki_server!");

    // Initialize the server.
    wiki_init();

    // --------------- Main Loop Set Up ---------------
    // Create the routes and run the server.
    let addr = format!("{}:{}",
        RUNTIME_CTX.parms.config.http_addr,
        RUNTIME_CTX.parms.config.http_port);
    let app = Route::new()
        .at("/view/:title", get(page_view::view_page))
        .at("/edit/:title", get(page_edit::edit_page))
        .at("/save/:title", post(page_save::save_page))
        .at("/pages", get(page_index::index_pages))
        .at("/version", get(version::get_version))
        .at("/", get(home_page));

    info!("Listening for HTTP requests on {}.", addr);

    // ------------------ Main Loop -------------------
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// wiki_init:
// ---------------------------------------------------------------------------
/** Initialize all subsystems and data structures other than those needed
 * to configure the main loop processor.
 */
fn wiki_init() {
    // Configure our log.
    init_log();

    // Force the reading of input parameters and initialization of the runtime
    // context.  The runtime context also installs and parses the templates,
    // which makes the pre-parsed engine available to all handlers.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    // Log build info.
    print_version_info();

    // Honor the flag that only sets up the data directories.
    if RUNTIME_CTX.wiki_args.create_dirs_only {
        println!("Data directories created under {}; exiting.", RUNTIME_CTX.wiki_dirs.root_dir);
        std::process::exit(0);
    }
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    // Log build info.
    info!("{}.", format!("\n*** Running WIKI={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}",
                        option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
                        env!("GIT_BRANCH"),
                        env!("GIT_COMMIT_SHORT"),
                        env!("GIT_DIRTY"),
                        env!("SOURCE_TIMESTAMP"),
                        env!("RUSTC_VERSION")),
    );
}

// ***************************************************************************
//                              Home Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// home_page:
// ---------------------------------------------------------------------------
/** GET /
 *
 * Send visitors to the configured default page.
 */
#[handler]
async fn home_page() -> Response {
    redirect_found(&format!("/view/{}", RUNTIME_CTX.parms.config.default_page))
}
