//! Source URL → archive URL.
//!
//! Catalog entries usually point at a repository page; the code-hosting
//! service serves the branch snapshot at `<repo>/archive/<branch>.zip`.
//! URLs that already name a `.zip` are used as-is.

use url::Url;

/// Resolves the zip URL for a catalog source URL.
pub fn archive_url(source: &Url, branch: &str) -> Url {
    if source.path().ends_with(".zip") {
        return source.clone();
    }
    let mut url = source.clone();
    let path = format!(
        "{}/archive/{}.zip",
        source.path().trim_end_matches('/'),
        branch
    );
    url.set_path(&path);
    url
}

/// Top-level directory the code-hosting service puts in a branch snapshot.
pub fn expected_root_dir(name: &str, branch: &str) -> String {
    format!("{}-{}", name, branch)
}
