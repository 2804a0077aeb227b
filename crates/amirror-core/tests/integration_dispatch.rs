//! Integration tests: local HTTP server, full dispatcher runs.
//!
//! Each test serves canned archives and error statuses, runs the dispatcher
//! against a temp destination root with a temp scratch parent, and checks
//! results, destination trees and scratch cleanup.

mod common;

use amirror_core::catalog::Catalog;
use amirror_core::checksum::sha256_bytes;
use amirror_core::config::HttpConfig;
use amirror_core::dispatcher::{DispatchError, Dispatcher};
use amirror_core::fetcher::{FetchOutcome, FetchResult, FetchStage, Fetcher};
use amirror_core::replace::WORK_DIR;
use common::archive_server::{self, Route};
use common::fixtures::{plugin_zip, snapshot, write_tree, zip_bytes};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tempfile::tempdir;

fn dispatcher(scratch_parent: &Path) -> Dispatcher {
    let http = HttpConfig {
        connect_timeout_secs: 5,
        timeout_secs: 30,
        ..HttpConfig::default()
    };
    Dispatcher::new(Fetcher::new(http, "master")).with_scratch_parent(scratch_parent)
}

fn by_name(results: &[FetchResult]) -> BTreeMap<&str, &FetchResult> {
    results.iter().map(|r| (r.name.as_str(), r)).collect()
}

fn expected_plugin_tree(marker: &str) -> BTreeMap<String, Vec<u8>> {
    BTreeMap::from([
        ("doc/help.txt".to_string(), b"help".to_vec()),
        ("plugin/main.vim".to_string(), marker.as_bytes().to_vec()),
    ])
}

fn assert_scratch_empty(scratch_parent: &Path) {
    let left: Vec<_> = std::fs::read_dir(scratch_parent).unwrap().collect();
    assert!(left.is_empty(), "scratch leftovers: {:?}", left);
}

#[tokio::test]
async fn valid_archive_and_server_error() {
    let archive = plugin_zip("a-master", "a v1");
    let base = archive_server::start(vec![
        ("/a.zip", Route::Body(archive.clone())),
        ("/b.zip", Route::Status("500 Internal Server Error")),
    ]);
    let catalog = Catalog::load(&format!("a {base}/a.zip\nb {base}/b.zip\n")).unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let results = dispatcher(scratch.path())
        .run(catalog, 2, dest.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    let results = by_name(&results);
    match &results["a"].outcome {
        FetchOutcome::Success(s) => {
            assert_eq!(s.bytes, archive.len() as u64);
            assert_eq!(s.sha256, sha256_bytes(&archive));
            assert_eq!(s.destination, dest.path().join("a"));
        }
        FetchOutcome::Failed(e) => panic!("a failed: {e}"),
    }
    assert_eq!(results["b"].failed_stage(), Some(FetchStage::Download));
    assert_eq!(results["b"].error().unwrap().to_string(), "HTTP 500");

    assert_eq!(snapshot(&dest.path().join("a")), expected_plugin_tree("a v1"));
    assert!(!dest.path().join("b").exists());
    assert_scratch_empty(scratch.path());
}

#[tokio::test]
async fn download_failure_leaves_previous_tree_untouched() {
    let base = archive_server::start(vec![]);
    let catalog = Catalog::load(&format!("kept {base}/missing.zip")).unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    write_tree(
        &dest.path().join("kept"),
        &[("plugin/kept.vim", "old"), ("README", "old readme")],
    );
    let before = snapshot(&dest.path().join("kept"));

    let results = dispatcher(scratch.path())
        .run(catalog, 4, dest.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].failed_stage(), Some(FetchStage::Download));
    assert_eq!(results[0].error().unwrap().to_string(), "HTTP 404");
    assert_eq!(snapshot(&dest.path().join("kept")), before);
    assert_scratch_empty(scratch.path());
}

#[tokio::test]
async fn unreachable_host_is_download_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let catalog = Catalog::load(&format!("gone http://127.0.0.1:{port}/gone.zip")).unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let results = dispatcher(scratch.path())
        .run(catalog, 1, dest.path())
        .await
        .unwrap();

    assert_eq!(results[0].failed_stage(), Some(FetchStage::Download));
    assert!(!dest.path().join("gone").exists());
    assert_scratch_empty(scratch.path());
}

#[tokio::test]
async fn rerun_is_idempotent_and_replaces_stale_files() {
    let base = archive_server::start(vec![
        ("/x.zip", Route::Body(plugin_zip("x-master", "x"))),
        ("/y.zip", Route::Body(plugin_zip("y-master", "y"))),
    ]);
    let text = format!("x {base}/x.zip\ny {base}/y.zip\n");
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    write_tree(&dest.path().join("x"), &[("stale.vim", "from an older copy")]);
    let d = dispatcher(scratch.path());

    let first = d
        .run(Catalog::load(&text).unwrap(), 2, dest.path())
        .await
        .unwrap();
    assert!(first.iter().all(FetchResult::is_success));
    let after_first = snapshot(dest.path());

    let second = d
        .run(Catalog::load(&text).unwrap(), 2, dest.path())
        .await
        .unwrap();
    assert!(second.iter().all(FetchResult::is_success));
    assert_eq!(snapshot(dest.path()), after_first);

    assert_eq!(snapshot(&dest.path().join("x")), expected_plugin_tree("x"));
    let top: BTreeSet<String> = std::fs::read_dir(dest.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != WORK_DIR)
        .collect();
    assert_eq!(top, BTreeSet::from(["x".to_string(), "y".to_string()]));
    assert!(snapshot(&dest.path().join(WORK_DIR)).is_empty());
    assert_scratch_empty(scratch.path());
}

#[tokio::test]
async fn extract_failure_does_not_block_siblings() {
    let base = archive_server::start(vec![
        ("/one.zip", Route::Body(plugin_zip("one-master", "1"))),
        ("/broken.zip", Route::Body(b"PK\x03\x04 this is not a zip".to_vec())),
        ("/two.zip", Route::Body(plugin_zip("two-master", "2"))),
        ("/three.zip", Route::Body(plugin_zip("three-master", "3"))),
    ]);
    let catalog = Catalog::load(&format!(
        "one {base}/one.zip\nbroken {base}/broken.zip\ntwo {base}/two.zip\nthree {base}/three.zip\n"
    ))
    .unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let results = dispatcher(scratch.path())
        .run(catalog, 3, dest.path())
        .await
        .unwrap();

    let results = by_name(&results);
    assert_eq!(results["broken"].failed_stage(), Some(FetchStage::Extract));
    for name in ["one", "two", "three"] {
        assert!(results[name].is_success(), "{name}: {:?}", results[name].error());
    }
    assert!(!dest.path().join("broken").exists());
    assert_eq!(snapshot(&dest.path().join("two")), expected_plugin_tree("2"));
    assert_scratch_empty(scratch.path());
}

#[tokio::test]
async fn archive_with_two_roots_is_rejected() {
    let base = archive_server::start(vec![(
        "/split.zip",
        Route::Body(zip_bytes(&[("left/a.txt", "a"), ("right/b.txt", "b")])),
    )]);
    let catalog = Catalog::load(&format!("split {base}/split.zip")).unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    write_tree(&dest.path().join("split"), &[("old.txt", "old")]);

    let results = dispatcher(scratch.path())
        .run(catalog, 1, dest.path())
        .await
        .unwrap();

    assert_eq!(results[0].failed_stage(), Some(FetchStage::Extract));
    assert_eq!(
        snapshot(&dest.path().join("split")),
        BTreeMap::from([("old.txt".to_string(), b"old".to_vec())])
    );
    assert_scratch_empty(scratch.path());
}

#[tokio::test]
async fn repository_url_resolves_to_branch_archive() {
    let base = archive_server::start(vec![(
        "/owner/repo.vim/archive/master.zip",
        Route::Body(plugin_zip("repo.vim-master", "repo")),
    )]);
    let catalog = Catalog::load(&format!("repo.vim {base}/owner/repo.vim")).unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let results = dispatcher(scratch.path())
        .run(catalog, 1, dest.path())
        .await
        .unwrap();

    match &results[0].outcome {
        FetchOutcome::Success(s) => {
            assert_eq!(s.archive_url, format!("{base}/owner/repo.vim/archive/master.zip"))
        }
        FetchOutcome::Failed(e) => panic!("repo.vim failed: {e}"),
    }
    assert_eq!(
        snapshot(&dest.path().join("repo.vim")),
        expected_plugin_tree("repo")
    );
}

#[tokio::test]
async fn one_result_per_entry_under_mixed_outcomes() {
    let mut routes = Vec::new();
    let mut text = String::new();
    let paths: Vec<String> = (0..10).map(|i| format!("/p{i}.zip")).collect();
    for (i, path) in paths.iter().enumerate() {
        let route = match i % 3 {
            0 => Route::Body(plugin_zip(&format!("p{i}-master"), "ok")),
            1 => Route::Status("503 Service Unavailable"),
            _ => Route::Body(b"garbage".to_vec()),
        };
        routes.push((path.as_str(), route));
    }
    let base = archive_server::start(routes);
    for i in 0..10 {
        text.push_str(&format!("p{i} {base}/p{i}.zip\n"));
    }
    let catalog = Catalog::load(&text).unwrap();
    let expected: BTreeSet<String> = catalog
        .entries()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let results = dispatcher(scratch.path())
        .run(catalog, 4, dest.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 10);
    let got: BTreeSet<String> = results.iter().map(|r| r.name.clone()).collect();
    assert_eq!(got, expected);
    let ok = results.iter().filter(|r| r.is_success()).count();
    assert_eq!(ok, 4);
    assert_scratch_empty(scratch.path());
}

#[tokio::test]
async fn missing_scratch_parent_dispatches_nothing() {
    let base = archive_server::start(vec![("/a.zip", Route::Body(plugin_zip("a-master", "a")))]);
    let catalog = Catalog::load(&format!("a {base}/a.zip")).unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let err = dispatcher(&scratch.path().join("does-not-exist"))
        .run(catalog, 1, dest.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Scratch(_)));
    assert!(!dest.path().join("a").exists());
}

#[tokio::test]
async fn destination_root_is_created() {
    let base = archive_server::start(vec![("/a.zip", Route::Body(plugin_zip("a-master", "a")))]);
    let catalog = Catalog::load(&format!("a {base}/a.zip")).unwrap();
    let parent = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let dest_root = parent.path().join("bundle");

    let results = dispatcher(scratch.path())
        .run(catalog, 1, &dest_root)
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert_eq!(snapshot(&dest_root.join("a")), expected_plugin_tree("a"));
}

#[tokio::test]
async fn lookalike_hidden_entry_survives_sibling_replace() {
    let base = archive_server::start(vec![
        ("/hidden.zip", Route::Body(plugin_zip("hidden-master", "hidden"))),
        ("/a.zip", Route::Body(plugin_zip("a-master", "a"))),
    ]);
    let catalog = Catalog::load(&format!(
        ".a.amirror-new {base}/hidden.zip\n.a.amirror-old {base}/hidden.zip\na {base}/a.zip\n"
    ))
    .unwrap();
    let dest = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let results = dispatcher(scratch.path())
        .run(catalog, 1, dest.path())
        .await
        .unwrap();

    assert!(results.iter().all(FetchResult::is_success));
    for name in [".a.amirror-new", ".a.amirror-old"] {
        assert_eq!(
            snapshot(&dest.path().join(name)),
            expected_plugin_tree("hidden"),
            "{name}"
        );
    }
    assert_eq!(snapshot(&dest.path().join("a")), expected_plugin_tree("a"));
}
