//! End-to-end workspace lifecycle: ingest an archive, edit artifacts, undo, and
//! track what changed.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use jarscope::codec::{ClassBuilder, MethodBody};
use jarscope::prelude::*;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn archive_load_populates_clean_tables() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("app.jar");
    let main = ClassBuilder::new("com/app/Main")
        .method(AccessFlags::PUBLIC, "main", "([Ljava/lang/String;)V", MethodBody::NoOp)
        .build();
    write_jar(
        &jar,
        &[
            ("com/app/Main.class", &main),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
        ],
    );

    let mut resource = Resource::new(Box::new(ArchiveContentSource::new(&jar)));
    let report = resource.read().unwrap();

    assert_eq!(resource.classes().len(), 1);
    assert_eq!(resource.files().len(), 1);
    assert!(resource.classes().dirty_keys().is_empty());
    assert!(resource.files().dirty_keys().is_empty());
    assert_eq!(report.patches_attempted, 0);
    assert_eq!(report.demoted_to_files, 0);

    let main = resource.classes().get("com/app/Main").unwrap();
    assert_eq!(main.super_name(), Some("java/lang/Object"));
    assert_eq!(main.methods().len(), 1);
}

#[test]
fn mismatched_entry_is_stored_under_declared_name() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("app.jar");
    let class = ClassBuilder::new("real/Name").build();
    write_jar(&jar, &[("obfuscated/Path.class", &class)]);

    let mut resource = Resource::new(Box::new(ArchiveContentSource::new(&jar)));
    let report = resource.read().unwrap();

    assert_eq!(report.mismatches_resolved, 1);
    assert!(resource.classes().get("real/Name").is_some());
    assert!(resource.classes().get("obfuscated/Path").is_none());
}

#[test]
fn edit_undo_and_rename_through_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("app.jar");
    let original = ClassBuilder::new("com/app/Widget").build();
    write_jar(&jar, &[("com/app/Widget.class", &original)]);

    let mut resource = Resource::new(Box::new(ArchiveContentSource::new(&jar)));
    resource.read().unwrap();

    // An edit replaces the artifact and dirties the key.
    let edited = ClassArtifact::read(
        &ClassBuilder::new("com/app/Widget")
            .method(AccessFlags::PUBLIC, "spin", "()V", MethodBody::NoOp)
            .build(),
    )
    .unwrap();
    resource.classes_mut().put("com/app/Widget".to_string(), edited);
    assert_eq!(resource.classes().dirty_keys(), ["com/app/Widget"]);
    assert_eq!(
        resource.classes().history_of("com/app/Widget").unwrap().len(),
        2
    );

    // Undo restores the loaded version and the clean state.
    resource.classes_mut().history_decrement("com/app/Widget").unwrap();
    assert!(resource.classes().dirty_keys().is_empty());
    assert!(resource
        .classes()
        .get("com/app/Widget")
        .unwrap()
        .methods()
        .is_empty());

    // Renames refuse to clobber and refuse missing sources.
    resource
        .classes_mut()
        .rename("com/app/Widget", "com/app/Gadget")
        .unwrap();
    assert!(resource.classes().get("com/app/Widget").is_none());
    assert!(resource.classes().get("com/app/Gadget").is_some());
    assert!(matches!(
        resource.classes_mut().rename("com/app/Missing", "x/Y"),
        Err(Error::KeyNotFound(_))
    ));
}

#[test]
fn reload_discards_edits_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("app.jar");
    write_jar(
        &jar,
        &[("com/app/Main.class", &ClassBuilder::new("com/app/Main").build())],
    );

    let mut resource = Resource::new(Box::new(ArchiveContentSource::new(&jar)));
    resource.read().unwrap();
    let extra = ClassArtifact::read(&ClassBuilder::new("com/app/Extra").build()).unwrap();
    resource.classes_mut().put("com/app/Extra".to_string(), extra);
    assert_eq!(resource.classes().len(), 2);

    resource.read().unwrap();
    assert_eq!(resource.classes().len(), 1);
    assert!(resource.classes().get("com/app/Extra").is_none());
    assert!(resource.classes().dirty_keys().is_empty());
}

#[test]
fn directory_and_archive_loads_agree() {
    let dir = tempfile::tempdir().unwrap();
    let class = ClassBuilder::new("com/app/Same").build();

    let jar = dir.path().join("app.jar");
    write_jar(&jar, &[("com/app/Same.class", &class)]);
    let tree = dir.path().join("tree");
    std::fs::create_dir_all(tree.join("com/app")).unwrap();
    std::fs::write(tree.join("com/app/Same.class"), &class).unwrap();

    let mut from_jar = Resource::new(Box::new(ArchiveContentSource::new(&jar)));
    from_jar.read().unwrap();
    let mut from_tree = Resource::new(Box::new(DirectoryContentSource::new(&tree)));
    from_tree.read().unwrap();

    assert_eq!(from_jar.source_type(), SourceType::Archive);
    assert_eq!(from_tree.source_type(), SourceType::Directory);
    assert_eq!(
        from_jar.classes().get("com/app/Same").unwrap().bytes(),
        from_tree.classes().get("com/app/Same").unwrap().bytes()
    );
}
