#![forbid(unsafe_code)]

fn main() {
    // Build provenance reported by the /version endpoint.  The git probes
    // fall back to "unknown" so builds outside a checkout still succeed.
    println!(
        "cargo:rustc-env=GIT_BRANCH={}",
        build_data::get_git_branch().unwrap_or_else(|_| "unknown".to_string())
    );
    println!(
        "cargo:rustc-env=GIT_COMMIT_SHORT={}",
        build_data::get_git_commit_short().unwrap_or_else(|_| "unknown".to_string())
    );
    println!(
        "cargo:rustc-env=GIT_DIRTY={}",
        build_data::get_git_dirty()
            .map(|d| d.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    );

    // Honor SOURCE_DATE_EPOCH when provided; using the wall clock here
    // would make builds unreproducible.
    println!(
        "cargo:rustc-env=SOURCE_TIMESTAMP={}",
        std::env::var("SOURCE_DATE_EPOCH").unwrap_or_else(|_| "unknown".to_string())
    );

    build_data::set_RUSTC_VERSION();
}
