//! Phantom synthesis: minimal stand-in classes for referenced-but-missing types.
//!
//! The pipeline: build a type graph over the known classes (seeded with the root
//! object type, lazily extended with platform classes), extract one constraint per
//! unresolved reference, deduplicate, solve for the minimal shapes, and emit tagged
//! class files. The whole pass is soft-fail: a class that will not decode is skipped
//! with a log line, and zero constraints yields no resource at all rather than an empty
//! one, so callers can tell "nothing was missing" apart from "we generated stubs".

mod graph;
mod solve;

use std::collections::BTreeSet;

use crate::artifact::ClassArtifact;
use crate::codec::{self, RefKind};
use crate::phantom::graph::{Resolution, TypeGraph};
use crate::phantom::solve::Constraint;
use crate::util::CancelToken;
use crate::workspace::{Resource, Resources};
use crate::Result;

/// Class-level attribute name marking a synthesized class.
///
/// Paired with the synthetic access flag so both attribute-aware and flag-only tooling
/// can tell stand-ins from real types.
pub const PHANTOM_ATTRIBUTE: &str = "PhantomGenerated";

/// Runs the synthesis pipeline over a workspace view.
///
/// # Examples
///
/// ```rust,ignore
/// use jarscope::phantom::PhantomGenerator;
///
/// if let Some(phantoms) = PhantomGenerator::new().generate(&resources)? {
///     resources.set_phantom(phantoms);
/// }
/// ```
#[derive(Default)]
pub struct PhantomGenerator {
    cancel: CancelToken,
}

impl PhantomGenerator {
    /// Create a generator with its own (never-flipped) cancel token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator observing an external cancel token, for use inside a task
    /// slot: opening a new workspace cancels synthesis still running for the old one.
    #[must_use]
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// Run synthesis over the known classes (primary plus libraries).
    ///
    /// Returns `None` when no constraints were found; otherwise a generated resource
    /// ready to install via [`Resources::set_phantom`].
    ///
    /// # Errors
    /// [`crate::Error::Cancelled`] when the cancel token flips mid-run. Per-class
    /// failures never error; they are logged and skipped.
    pub fn generate(&self, resources: &Resources) -> Result<Option<Resource>> {
        let known: Vec<&ClassArtifact> = resources.known_classes().collect();
        let mut graph = TypeGraph::build(known.iter().copied(), resources.runtime());

        let mut constraints: BTreeSet<Constraint> = BTreeSet::new();
        for artifact in &known {
            self.cancel.check()?;
            self.extract(artifact, &mut graph, &mut constraints);
        }
        if constraints.is_empty() {
            log::debug!("phantom synthesis found nothing missing");
            return Ok(None);
        }
        log::debug!("solving {} phantom constraints", constraints.len());

        self.cancel.check()?;
        let mut generated = Vec::new();
        for (name, bytes) in solve::solve(&constraints) {
            self.cancel.check()?;
            match ClassArtifact::read(&bytes) {
                Ok(artifact) => generated.push(artifact),
                // Soft-fail: skip the one shape, keep the rest.
                Err(err) => log::warn!("emitted phantom '{name}' does not decode: {err}"),
            }
        }
        if generated.is_empty() {
            return Ok(None);
        }
        log::debug!("synthesized {} phantom classes", generated.len());
        Ok(Some(Resource::from_classes(generated)))
    }

    /// Extract constraints contributed by one known class.
    fn extract(
        &self,
        artifact: &ClassArtifact,
        graph: &mut TypeGraph<'_>,
        constraints: &mut BTreeSet<Constraint>,
    ) {
        if let Some(super_name) = artifact.super_name() {
            if !graph.is_present(super_name) {
                constraints.insert(Constraint::Extends {
                    name: super_name.to_string(),
                });
            }
        }
        for interface in artifact.interfaces() {
            if !graph.is_present(interface) {
                constraints.insert(Constraint::Type {
                    name: interface.clone(),
                    interface: true,
                });
            }
        }

        let refs = match codec::referenced_symbols(artifact.bytes()) {
            Ok(refs) => refs,
            Err(err) => {
                log::warn!(
                    "skipping reference scan of '{}' during phantom synthesis: {err}",
                    artifact.name()
                );
                return;
            }
        };
        for symbol in refs {
            if symbol.kind == RefKind::TypeUse {
                if !graph.is_present(&symbol.owner) {
                    constraints.insert(Constraint::Type {
                        name: symbol.owner.clone(),
                        interface: false,
                    });
                }
                continue;
            }
            let resolution = graph.resolve(
                &symbol.owner,
                &symbol.name,
                &symbol.descriptor,
                symbol.kind.is_field_use(),
            );
            let owner = match resolution {
                Resolution::Found => continue,
                Resolution::MissingOn(missing) => missing,
                Resolution::Unsolvable => {
                    log::debug!(
                        "reference {}.{}{} resolves nowhere but every type is real; skipping",
                        symbol.owner,
                        symbol.name,
                        symbol.descriptor
                    );
                    continue;
                }
            };
            // Types dragged in by the member's own descriptor must exist too.
            for name in symbol.descriptor_class_names() {
                if !graph.is_present(&name) {
                    constraints.insert(Constraint::Type {
                        name,
                        interface: false,
                    });
                }
            }
            if symbol.kind.is_field_use() {
                constraints.insert(Constraint::Field {
                    owner,
                    name: symbol.name.clone(),
                    descriptor: symbol.descriptor.clone(),
                    is_static: symbol.kind.is_static_use(),
                });
            } else {
                constraints.insert(Constraint::Method {
                    owner,
                    name: symbol.name.clone(),
                    descriptor: symbol.descriptor.clone(),
                    is_static: symbol.kind.is_static_use(),
                    via_interface: symbol.kind == RefKind::InvokeInterface,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::AccessFlags;
    use crate::codec::{ClassBuilder, MethodBody, SymbolRef};
    use crate::workspace::{RuntimeClassProvider, RuntimeResource};

    struct EmptyProvider;
    impl RuntimeClassProvider for EmptyProvider {
        fn class_bytes(&self, _name: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn resources_with(classes: Vec<ClassArtifact>) -> Resources {
        Resources::new(
            Resource::from_classes(classes),
            RuntimeResource::new(Box::new(EmptyProvider)),
        )
    }

    #[test]
    fn test_nothing_missing_yields_no_resource() {
        let complete = ClassArtifact::read(
            &ClassBuilder::new("java/lang/Object").build(),
        )
        .unwrap();
        let resources = resources_with(vec![complete]);
        assert!(PhantomGenerator::new().generate(&resources).unwrap().is_none());
    }

    #[test]
    fn test_missing_virtual_method_scenario() {
        // Class A calls B.foo()I with B absent everywhere.
        let caller = ClassArtifact::read(
            &ClassBuilder::new("app/A")
                .method(
                    AccessFlags::PUBLIC,
                    "run",
                    "()V",
                    MethodBody::Refs(vec![SymbolRef::member(
                        RefKind::InvokeVirtual,
                        "app/B",
                        "foo",
                        "()I",
                    )]),
                )
                .build(),
        )
        .unwrap();
        let mut resources = resources_with(vec![caller]);
        assert!(resources.get_class("app/B").is_none());

        let phantoms = PhantomGenerator::new().generate(&resources).unwrap().unwrap();
        assert_eq!(phantoms.classes().len(), 1);
        resources.set_phantom(phantoms);

        let phantom = resources.get_class("app/B").unwrap();
        assert!(phantom.is_phantom());
        assert_eq!(phantom.methods().len(), 1);
        assert_eq!(phantom.methods()[0].name, "foo");
        assert_eq!(phantom.methods()[0].descriptor, "()I");
        assert!(phantom.fields().is_empty());
    }

    #[test]
    fn test_class_literal_only_mention_gets_a_phantom() {
        // "gone/Only" appears in a Class constant and nowhere else, the shape a
        // class literal leaves behind. Hand-built so no instruction mentions it.
        let mut data = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52, 0, 7];
        let mut slot = 0u16;
        for name in ["app/Literals", "java/lang/Object", "gone/Only"] {
            data.push(1);
            data.extend_from_slice(&(name.len() as u16).to_be_bytes());
            data.extend_from_slice(name.as_bytes());
            slot += 1;
            data.push(7);
            data.extend_from_slice(&slot.to_be_bytes());
            slot += 1;
        }
        data.extend_from_slice(&[0x00, 0x21, 0, 2, 0, 4]);
        data.extend_from_slice(&[0; 8]);

        let caller = ClassArtifact::read(&data).unwrap();
        let mut resources = resources_with(vec![caller]);
        let phantoms = PhantomGenerator::new().generate(&resources).unwrap().unwrap();
        resources.set_phantom(phantoms);
        assert!(resources.get_class("gone/Only").unwrap().is_phantom());
    }

    #[test]
    fn test_cancellation() {
        let caller = ClassArtifact::read(&ClassBuilder::new("app/A").build()).unwrap();
        let resources = resources_with(vec![caller]);
        let token = CancelToken::new();
        token.cancel();
        let generator = PhantomGenerator::with_cancel(token);
        assert!(matches!(
            generator.generate(&resources),
            Err(crate::Error::Cancelled)
        ));
    }

    #[test]
    fn test_missing_supertype_becomes_phantom_class() {
        let sub = ClassArtifact::read(
            &ClassBuilder::new("app/Sub").super_name("gone/Base").build(),
        )
        .unwrap();
        let resources = resources_with(vec![sub]);
        let phantoms = PhantomGenerator::new().generate(&resources).unwrap().unwrap();
        let base = phantoms.classes().get("gone/Base").unwrap();
        assert!(!base.is_interface());
        assert!(base.is_phantom());
    }
}
