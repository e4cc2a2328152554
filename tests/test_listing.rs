use std::fs;
use std::path::Path;

use tempfile::TempDir;
use webroot::fs::DiskFs;
use webroot::http::listing::{DirectoryListing, list, render};

fn names(listing: &DirectoryListing) -> Vec<String> {
    listing.entries.iter().map(|e| e.name.clone()).collect()
}

fn create_test_directory() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path();

    fs::write(root.join("b.txt"), b"bb").unwrap();
    fs::write(root.join("A.txt"), b"a").unwrap();
    fs::write(root.join("a.txt"), b"hello").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::create_dir(root.join("Docs")).unwrap();
    fs::write(root.join("sub/inner.md"), b"# inner").unwrap();

    temp_dir
}

#[test]
fn test_listing_order_at_root() {
    let dir = create_test_directory();
    let root = dir.path().canonicalize().unwrap();

    let listing = list(&DiskFs, &root, &root);

    assert!(listing.readable);
    assert_eq!(names(&listing), ["Docs", "sub", "A.txt", "a.txt", "b.txt"]);
}

#[test]
fn test_listing_is_stable_across_calls() {
    let dir = create_test_directory();
    let root = dir.path().canonicalize().unwrap();

    let first = list(&DiskFs, &root, &root);
    let second = list(&DiskFs, &root, &root);

    assert_eq!(first, second);
}

#[test]
fn test_listing_subdirectory_has_parent_first() {
    let dir = create_test_directory();
    let root = dir.path().canonicalize().unwrap();

    let listing = list(&DiskFs, &root.join("sub"), &root);

    assert_eq!(names(&listing), ["..", "inner.md"]);
    assert!(listing.entries[0].is_parent());
    assert_eq!(listing.entries[1].size_bytes, Some(7));
}

#[test]
fn test_listing_sizes_only_for_files() {
    let dir = create_test_directory();
    let root = dir.path().canonicalize().unwrap();

    let listing = list(&DiskFs, &root, &root);
    for entry in &listing.entries {
        assert_eq!(entry.size_bytes.is_none(), entry.is_directory, "{}", entry.name);
        assert!(entry.last_modified.is_some());
    }
}

#[test]
fn test_listing_missing_directory_is_unreadable() {
    let dir = create_test_directory();
    let root = dir.path().canonicalize().unwrap();

    let listing = list(&DiskFs, &root.join("gone"), &root);

    assert!(!listing.readable);
    assert!(listing.entries.is_empty());
}

#[cfg(unix)]
#[test]
fn test_listing_skips_dangling_symlinks() {
    let dir = create_test_directory();
    let root = dir.path().canonicalize().unwrap();
    std::os::unix::fs::symlink(Path::new("/definitely/not/here"), root.join("dangling")).unwrap();

    let listing = list(&DiskFs, &root, &root);

    assert!(!names(&listing).contains(&"dangling".to_string()));
}

#[test]
fn test_listing_page_contents() {
    let dir = create_test_directory();
    let root = dir.path().canonicalize().unwrap();

    let page = render("/sub/", &list(&DiskFs, &root.join("sub"), &root));

    assert!(page.starts_with("<!DOCTYPE html>\r\n"));
    assert!(page.contains("<h1>Index of /sub/</h1>"));
    assert!(page.contains("<th>Name</th><th>Last Modified</th><th>Size</th>"));
    assert!(page.contains("<a href=\"/\">Parent Directory</a>"));
    assert!(page.contains("<a href=\"/sub/inner.md\">inner.md</a>"));
    assert!(page.contains("<td>7 B</td>"));
}
