use std::io::Read;

use super::*;
use crate::state::test_helpers::TempTree;

fn entry_names(zip_path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    archive.file_names().map(str::to_owned).collect()
}

#[test]
fn entries_are_relative_and_sorted() {
    let tree = TempTree::new();
    tree.write("dist/index.html", "<html></html>");
    tree.write("dist/assets/index-abc.js", "console.log(1)");
    tree.write("dist/vite.svg", "<svg/>");
    let zip_path = tree.join("out.zip");

    let summary = archive_dir(&tree.join("dist"), &zip_path).unwrap();
    assert_eq!(summary.entries, 3);
    assert!(summary.bytes > 0);
    assert_eq!(summary.bytes, std::fs::metadata(&zip_path).unwrap().len());

    let mut names = entry_names(&zip_path);
    names.sort();
    assert_eq!(names, vec!["assets/index-abc.js", "index.html", "vite.svg"]);
}

#[test]
fn contents_round_trip_deflated() {
    let tree = TempTree::new();
    let body = "const x = 1;\n".repeat(500);
    tree.write("dist/assets/app.js", &body);
    let zip_path = tree.join("out.zip");
    archive_dir(&tree.join("dist"), &zip_path).unwrap();

    let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let mut entry = archive.by_name("assets/app.js").unwrap();
    assert_eq!(entry.compression(), CompressionMethod::Deflated);
    assert!(entry.compressed_size() < entry.size());
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    assert_eq!(text, body);
}

#[test]
fn empty_dist_yields_empty_archive() {
    let tree = TempTree::new();
    std::fs::create_dir_all(tree.join("dist")).unwrap();
    let zip_path = tree.join("out.zip");
    let summary = archive_dir(&tree.join("dist"), &zip_path).unwrap();
    assert_eq!(summary.entries, 0);
    assert!(entry_names(&zip_path).is_empty());
}

#[test]
fn missing_source_dir_is_fatal() {
    let tree = TempTree::new();
    let err = archive_dir(&tree.join("dist"), &tree.join("out.zip")).unwrap_err();
    assert!(matches!(err, ExportError::ArchiveIo { .. }));
}

#[test]
fn vanished_entry_is_skipped() {
    let tree = TempTree::new();
    tree.write("dist/index.html", "<html></html>");
    let files = vec![
        ("assets/gone.js".to_owned(), tree.join("dist/assets/gone.js")),
        ("index.html".to_owned(), tree.join("dist/index.html")),
    ];
    let zip_path = tree.join("out.zip");

    let summary = write_archive(&files, &zip_path).unwrap();
    assert_eq!(summary.entries, 1);
    assert_eq!(entry_names(&zip_path), vec!["index.html"]);
}

#[cfg(unix)]
#[test]
fn unreadable_entry_other_than_missing_is_fatal() {
    let tree = TempTree::new();
    tree.write("dist/assets/app.js", "x");
    // A directory opens on unix but fails to read with something other than NotFound.
    let files = vec![("assets".to_owned(), tree.join("dist/assets"))];
    let err = write_archive(&files, &tree.join("out.zip")).unwrap_err();
    assert!(matches!(err, ExportError::ArchiveIo { .. }));
}
