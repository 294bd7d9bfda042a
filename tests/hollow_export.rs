//! Hollow export: the written archive keeps every declaration surface while all
//! method bodies collapse to no-op returns.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use jarscope::codec::{ClassBuilder, MethodBody, RefKind, SymbolRef};
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
fn hollowed_archive_keeps_declarations_and_drops_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.jar");
    let output = dir.path().join("out.jar");

    // A class whose only method body calls into another class.
    let original = ClassBuilder::new("api/Service")
        .interface("java/io/Serializable")
        .field(AccessFlags::PRIVATE, "count", "I")
        .method(
            AccessFlags::PUBLIC,
            "process",
            "(Ljava/lang/String;)I",
            MethodBody::Refs(vec![SymbolRef::member(
                RefKind::InvokeStatic,
                "api/Backend",
                "compute",
                "(Ljava/lang/String;)I",
            )]),
        )
        .method(
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
            "describe",
            "()Ljava/lang/String;",
            MethodBody::None,
        )
        .build();
    write_jar(&input, &[("api/Service.class", &original)]);

    let mut resource = Resource::new(Box::new(ArchiveContentSource::new(&input)));
    resource.read().unwrap();

    let mut exporter = Exporter::new().hollow_classes(true);
    exporter.add_resource(&resource).unwrap();
    let summary = exporter.write_as_archive(&output).unwrap();
    assert_eq!(summary.entries, 1);

    let mut hollowed = Resource::new(Box::new(ArchiveContentSource::new(&output)));
    hollowed.read().unwrap();
    let class = hollowed.classes().get("api/Service").unwrap();

    // The declaration surface survives untouched.
    assert_eq!(class.name(), "api/Service");
    assert_eq!(class.interfaces(), ["java/io/Serializable"]);
    assert_eq!(class.fields().len(), 1);
    assert_eq!(class.fields()[0].descriptor, "I");
    assert_eq!(class.methods().len(), 2);
    let process = class.methods().iter().find(|m| m.name == "process").unwrap();
    assert_eq!(process.descriptor, "(Ljava/lang/String;)I");

    // But the call into the backend is gone along with the body.
    assert_ne!(class.bytes(), &original[..]);
    let refs = jarscope::codec::referenced_symbols(class.bytes()).unwrap();
    assert!(refs.iter().all(|r| r.owner != "api/Backend"));
}

#[test]
fn skip_files_leaves_loose_content_behind() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.jar");
    let output = dir.path().join("out.jar");
    write_jar(
        &input,
        &[
            ("app/Main.class", &ClassBuilder::new("app/Main").build()),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            ("assets/logo.png", b"\x89PNG"),
        ],
    );

    let mut resource = Resource::new(Box::new(ArchiveContentSource::new(&input)));
    resource.read().unwrap();

    let mut exporter = Exporter::new().skip_files(true);
    exporter.add_resource(&resource).unwrap();
    let summary = exporter.write_as_archive(&output).unwrap();
    assert_eq!(summary.entries, 1);

    let mut reread = Resource::new(Box::new(ArchiveContentSource::new(&output)));
    reread.read().unwrap();
    assert!(reread.files().is_empty());
    assert!(reread.classes().get("app/Main").is_some());
}

#[test]
fn shading_folds_libraries_into_one_archive() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("fat.jar");

    let app = ClassArtifact::read(&ClassBuilder::new("app/Main").build()).unwrap();
    let lib = ClassArtifact::read(&ClassBuilder::new("lib/Helper").build()).unwrap();

    struct NoRuntime;
    impl RuntimeClassProvider for NoRuntime {
        fn class_bytes(&self, _name: &str) -> Option<Vec<u8>> {
            None
        }
    }
    let mut resources = Resources::new(
        Resource::from_classes(vec![app]),
        RuntimeResource::new(Box::new(NoRuntime)),
    );
    resources.add_library(Resource::from_classes(vec![lib]));

    let mut slim = Exporter::new();
    slim.add_resources(&resources).unwrap();
    assert_eq!(slim.entry_count(), 1);

    let mut fat = Exporter::new().shade_libraries(true);
    fat.add_resources(&resources).unwrap();
    fat.write_as_archive(&output).unwrap();

    let mut reread = Resource::new(Box::new(ArchiveContentSource::new(&output)));
    reread.read().unwrap();
    assert!(reread.classes().get("app/Main").is_some());
    assert!(reread.classes().get("lib/Helper").is_some());
}
