#![forbid(unsafe_code)]

use anyhow::{anyhow, Result};
use fs_mistrust::Mistrust;
use lazy_static::lazy_static;
use log::{error, info};
use serde::Deserialize;
use std::os::unix::fs::PermissionsExt;
use std::{env, fs, path::Path};
use structopt::StructOpt;
use tera::Tera;
use toml;

// Wiki utilities
use crate::utils::errors::Errors;
use crate::utils::{templates, wiki_utils};

use super::wiki_utils::get_absolute_path;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_WIKI_ROOT_DIR    : &str = "WIKI_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.wiki";
const CONFIG_DIR           : &str = "/config";
const LOGS_DIR             : &str = "/logs";
const PAGES_DIR            : &str = "/pages";
const TEMPLATES_DIR        : &str = "/templates";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml";  // relative to config dir
const WIKI_CONFIG_FILE     : &str = "/wiki.toml";   // relative to config dir

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "0.0.0.0";
const DEFAULT_HTTP_PORT    : u16  = 8080;

// The page the root URL redirects to when no other default is configured.
const DEFAULT_PAGE         : &str = "Welcome";

// Default logger configuration installed on first run.  The placeholder is
// replaced with the calculated logs directory at install time.
const DEFAULT_LOG4RS_CONFIG: &str = include_str!("../../resources/log4rs.yml");
const LOGS_DIR_PLACEHOLDER : &str = "%LOGS_DIR%";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref WIKI_ARGS: WikiArgs = init_wiki_args();
}

// Calculate the data directories BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref WIKI_DIRS: WikiDirs = init_wiki_dirs();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// WikiDirs:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
pub struct WikiDirs {
    pub root_dir: String,
    pub config_dir: String,
    pub logs_dir: String,
    pub pages_dir: String,
    pub templates_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// CommandLineArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "wiki_args", about = "Command line arguments for the wiki server.")]
pub struct WikiArgs {
    /// Specify the wiki's root data directory.
    ///
    /// This directory contains all the files the wiki uses during execution.
    #[structopt(short, long)]
    pub root_dir: Option<String>,

    /// Create the data directories, install default assets, and then exit.
    ///
    /// The data directories will be rooted at a root directory calculated
    /// using the following priority order:
    ///
    ///   1. If set, the value of the WIKI_ROOT_DIR environment variable,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.wiki
    ///
    #[structopt(short, long)]
    pub create_dirs_only: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
/** The shared state every request handler reads: the merged configuration,
 * the pre-parsed template engine, and the calculated paths.  Templates are
 * parsed exactly once, here, so request handling never re-reads template
 * files.
 */
#[derive(Debug)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub tmpl: Tera,
    pub wiki_args: &'static WikiArgs,
    pub wiki_dirs: &'static WikiDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    pub default_page: String,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Wiki Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            default_page: DEFAULT_PAGE.to_string(),
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_wiki_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_wiki_args() -> WikiArgs {
    let args = WikiArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// init_wiki_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories. */
fn init_wiki_dirs() -> WikiDirs {
    // Initialize the mistrust object.
    let mistrust = get_mistrust();

    // Check that each path is absolute and is a directory with the
    // proper permission assigned if it exists.  If it doesn't exist,
    // create it.
    let root_dir = get_root_dir();
    check_wiki_dir(&root_dir, "root directory", &mistrust);

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_wiki_dir(&config_dir, "config directory", &mistrust);

    let logs_dir = root_dir.clone() + LOGS_DIR;
    check_wiki_dir(&logs_dir, "logs directory", &mistrust);

    let pages_dir = root_dir.clone() + PAGES_DIR;
    check_wiki_dir(&pages_dir, "pages directory", &mistrust);

    let templates_dir = root_dir.clone() + TEMPLATES_DIR;
    check_wiki_dir(&templates_dir, "templates directory", &mistrust);

    // Package up and return the directories.
    WikiDirs {
        root_dir, config_dir, logs_dir, pages_dir, templates_dir,
    }
}

// ---------------------------------------------------------------------------
// check_wiki_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that it has the proper
 * permissions assigned.  If it doesn't exist, create it.  The mistrust package
 * creates directories with 0o700 permissions.
 *
 * Any failure results in a panic.
 */
fn check_wiki_dir(dir: &String, msgname: &str, mistrust: &Mistrust) {
    // Get the path object.
    let path = Path::new(dir);
    if !path.is_absolute() {
        panic!("The wiki {} path must be absolute: {}", msgname, dir);
    }
    if path.exists() {
        // Make sure the path represents a directory.
        if !path.is_dir() {
            panic!("The wiki {} path must be a directory: {}", msgname, dir);
        }

        // Make sure the directory has rwx for owner only.
        let meta = path.metadata().unwrap_or_else(|_| panic!("Unable to read metadata for {}: {}", msgname, dir));
        let perm = meta.permissions().mode();
        if perm & 0o777 != 0o700 {
            panic!("The wiki {} path must have 0o700 permissions: {}", msgname, dir);
        }
    } else {
        // Create the directory with the correct permissions.
        match mistrust.make_directory(path) {
            Ok(_) => (),
            Err(e) => {
                panic!("Make directory error for {:?}: {}", path, &e.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// get_mistrust:
// ---------------------------------------------------------------------------
/** Configure a new mistrust object for initial directory processing. */
fn get_mistrust() -> Mistrust {
    // Configure our mistrust object.
    let mistrust = match Mistrust::builder()
        .ignore_prefix(get_absolute_path("~"))
        .trust_group(0)
        .build() {
            Ok(m) => m,
            Err(e) => {
                panic!("Mistrust configuration error: {}", &e.to_string());
            }
        };
    mistrust
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_WIKI_ROOT_DIR).unwrap_or_else(
        |_| {
            match WIKI_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
pub fn init_log() {
    // Install the default logger configuration on first run, then
    // initialize log4rs from whatever file is in the config directory.
    let logconfig = init_log_config();
    install_default_log_config(&logconfig);
    match log4rs::init_file(logconfig.clone(), Default::default()) {
        Ok(_) => (),
        Err(e) => {
            println!("{}", e);
            let s = format!("{}", Errors::Log4rsInitialization(logconfig));
            panic!("{}", s);
        },
    }
    info!("Log4rs initialized using: {}", logconfig);
}

// ---------------------------------------------------------------------------
// init_log_config:
// ---------------------------------------------------------------------------
fn init_log_config() -> String {
    WIKI_DIRS.config_dir.clone() + LOG4RS_CONFIG_FILE
}

// ---------------------------------------------------------------------------
// install_default_log_config:
// ---------------------------------------------------------------------------
/** Write the built-in log4rs configuration if none exists yet, pointing its
 * file appenders at the calculated logs directory.  An existing file is
 * left untouched so site customizations survive restarts.
 */
fn install_default_log_config(logconfig: &str) {
    let path = Path::new(logconfig);
    if path.exists() {
        return;
    }
    let content = DEFAULT_LOG4RS_CONFIG.replace(LOGS_DIR_PLACEHOLDER, &WIKI_DIRS.logs_dir);
    if let Err(e) = fs::write(path, content) {
        panic!("Unable to install default logger configuration at {}: {}", logconfig, e);
    }
    println!("Installed default logger configuration: {}", logconfig);
}

/// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config data directory.  If the file cannot be read, compiled-in defaults
 * are used; a file that exists but fails to parse is an error.
 */
fn get_parms() -> Result<Parms> {
    // Get the config file path from its data directory.
    let config_file = WIKI_DIRS.config_dir.clone() + WIKI_CONFIG_FILE;

    // Read the configuration file.
    let config_file_abs = wiki_utils::get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    // Parse the toml configuration.
    let config : Config = match toml::from_str(&contents) {
        Ok(c)  => c,
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file_abs), e);
            error!("{}", msg);
            return Result::Err(anyhow!(msg));
        }
    };

    Ok(Parms { config_file: config_file_abs, config })
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // If either of these fail the application aborts.
    let parms = get_parms().expect("FAILED to read configuration file.");
    let tmpl = templates::init_templates(&WIKI_DIRS.templates_dir)
        .expect("FAILED to parse templates.");
    RuntimeCtx { parms, tmpl, wiki_args: &WIKI_ARGS, wiki_dirs: &WIKI_DIRS }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use crate::utils::config::Config;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.http_addr, "0.0.0.0");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.default_page, "Welcome");
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            title = "Team Wiki"
            http_addr = "127.0.0.1"
            http_port = 9090
            default_page = "Home"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.title, "Team Wiki");
        assert_eq!(config.http_addr, "127.0.0.1");
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.default_page, "Home");
    }
}
