//! The post-read recovery pass.
//!
//! Runs once per full container read, after raw decoding and before the collection is
//! applied to a resource's tables. Each step is independent and best-effort: a failure
//! on one entry never blocks the others, and unrecoverable entries are demoted to files
//! or left pending rather than raised.

use rayon::prelude::*;

use crate::artifact::{ClassArtifact, FileArtifact};
use crate::codec;
use crate::ingest::collection::{ContentCollection, PendingEntry};

/// Counters describing what one recovery pass did.
#[derive(Debug, Default, Clone)]
pub struct RecoveryReport {
    /// Malformed entries the repair step attempted.
    pub patches_attempted: usize,
    /// Malformed entries successfully repaired into classes.
    pub patches_recovered: usize,
    /// Name mismatches promoted under their declared name.
    pub mismatches_resolved: usize,
    /// Name mismatches left pending because the declared name was occupied.
    pub mismatches_pending: usize,
    /// Entries demoted to plain files.
    pub demoted_to_files: usize,
    /// Classes whose invalid signature metadata was stripped (filled in by the
    /// sanitation step, which runs against the populated class table).
    pub signatures_sanitized: usize,
}

/// Run recovery steps 1-3 over a pending collection, in place.
///
/// Step 4 (signature sanitation) runs later against the populated class table so the
/// sanitized bytes land as a versioned `put`; see
/// [`crate::workspace::Resource::read`].
pub(crate) fn process(collection: &mut ContentCollection) -> RecoveryReport {
    let mut report = RecoveryReport::default();
    repair_malformed(collection, &mut report);
    resolve_mismatches(collection, &mut report);
    demote_non_classes(collection, &mut report);
    report
}

/// Step 1: patch-then-reparse every malformed entry; demote failures to files.
fn repair_malformed(collection: &mut ContentCollection, report: &mut RecoveryReport) {
    let pending = std::mem::take(&mut collection.malformed);
    report.patches_attempted = pending.len();

    // Entries are independent; the repair itself is the expensive part.
    let repaired: Vec<(PendingEntry, Option<ClassArtifact>)> = pending
        .into_par_iter()
        .map(|entry| {
            let artifact = codec::patch_class(&entry.bytes)
                .and_then(|fixed| ClassArtifact::read(&fixed))
                .ok();
            (entry, artifact)
        })
        .collect();

    for (entry, artifact) in repaired {
        match artifact {
            Some(artifact) if !collection.classes.contains_key(artifact.name()) => {
                log::debug!("repaired malformed class '{}'", entry.path);
                report.patches_recovered += 1;
                collection.add_class(artifact);
            }
            Some(artifact) => {
                // Repaired, but its declared name collides with a clean class.
                log::warn!(
                    "repaired class '{}' collides with existing '{}'; keeping as file",
                    entry.path,
                    artifact.name()
                );
                demote(collection, report, entry);
            }
            None => {
                log::warn!("could not repair class '{}'; keeping as file", entry.path);
                demote(collection, report, entry);
            }
        }
    }
}

/// Step 2: promote mismatched classes under their declared name unless occupied.
fn resolve_mismatches(collection: &mut ContentCollection, report: &mut RecoveryReport) {
    let pending = std::mem::take(&mut collection.mismatched);
    for entry in pending {
        if collection.classes.contains_key(entry.artifact.name()) {
            log::warn!(
                "class at '{}' declares occupied name '{}'; left pending",
                entry.path_name,
                entry.artifact.name()
            );
            report.mismatches_pending += 1;
            collection.mismatched.push(entry);
        } else {
            log::debug!(
                "promoting '{}' under declared name '{}'",
                entry.path_name,
                entry.artifact.name()
            );
            report.mismatches_resolved += 1;
            collection.add_class(entry.artifact);
        }
    }
}

/// Step 3: everything with a class-like extension that never decoded is a plain file.
fn demote_non_classes(collection: &mut ContentCollection, report: &mut RecoveryReport) {
    let pending = std::mem::take(&mut collection.non_classes);
    for entry in pending {
        demote(collection, report, entry);
    }
}

fn demote(collection: &mut ContentCollection, report: &mut RecoveryReport, entry: PendingEntry) {
    report.demoted_to_files += 1;
    collection.add_file(FileArtifact::new(entry.path, entry.bytes));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ClassBuilder;

    #[test]
    fn test_malformed_entry_is_repaired() {
        let mut bytes = ClassBuilder::new("com/example/Broken").build();
        // A class-level attribute whose length overruns the input defeats a strict
        // parse but is exactly what the patch step removes.
        let count_offset = bytes.len() - 2;
        bytes[count_offset..].copy_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&0xFFFF_u32.to_be_bytes());

        let mut collection = ContentCollection::new();
        collection.add_entry("com/example/Broken.class", bytes);
        assert_eq!(collection.malformed().len(), 1);

        let report = process(&mut collection);
        assert_eq!(report.patches_attempted, 1);
        assert_eq!(report.patches_recovered, 1);
        assert!(collection.classes().contains_key("com/example/Broken"));
        assert!(collection.malformed().is_empty());
    }

    #[test]
    fn test_unrepairable_entry_demotes_to_file() {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52];
        bytes.extend_from_slice(&[0, 9]); // pool count with no pool behind it
        bytes.extend_from_slice(&[0xFF; 8]);

        let mut collection = ContentCollection::new();
        collection.add_entry("com/example/Hopeless.class", bytes);
        let report = process(&mut collection);
        assert_eq!(report.patches_recovered, 0);
        assert_eq!(report.demoted_to_files, 1);
        assert!(collection.files().contains_key("com/example/Hopeless.class"));
    }

    #[test]
    fn test_mismatch_resolution_and_conflict() {
        let mut collection = ContentCollection::new();
        collection.add_entry("real/Name.class", ClassBuilder::new("real/Name").build());
        // Declares a free name: promoted.
        collection.add_entry("odd/Path.class", ClassBuilder::new("declared/Free").build());
        // Declares an occupied name: left pending.
        collection.add_entry("other/Path.class", ClassBuilder::new("real/Name").build());

        let report = process(&mut collection);
        assert_eq!(report.mismatches_resolved, 1);
        assert_eq!(report.mismatches_pending, 1);
        assert!(collection.classes().contains_key("declared/Free"));
        assert_eq!(collection.mismatched().len(), 1);
    }

    #[test]
    fn test_non_class_demotion() {
        let mut collection = ContentCollection::new();
        collection.add_entry("fake/Entry.class", b"plain text".to_vec());
        let report = process(&mut collection);
        assert_eq!(report.demoted_to_files, 1);
        assert!(collection.files().contains_key("fake/Entry.class"));
    }
}
