//! Build version with embedded git metadata.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

/// `{version}+{branch}.{sha}`, with `.dirty` appended for a dirty tree.
///
/// Outside a git checkout this is `{version}+unknown.unknown`.
pub fn version_string() -> String {
    let dirty = option_env!("VERGEN_GIT_DIRTY") == Some("true");
    format!(
        "{PKG_VERSION}+{GIT_BRANCH}.{}{}",
        &GIT_SHA[..7.min(GIT_SHA.len())],
        if dirty { ".dirty" } else { "" }
    )
}
