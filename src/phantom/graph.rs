//! Type hierarchy and member table over the known class set.
//!
//! The resolver answers one question for constraint extraction: does a referenced
//! member resolve anywhere along the owner's ancestor chain, and if not, which missing
//! ancestor should absorb the constraint? Platform classes from the runtime view are
//! folded in lazily the first time a walk reaches them, so hierarchy walks terminate at
//! the root object type without preloading the whole platform.

use std::collections::{HashMap, HashSet};

use crate::artifact::{ClassArtifact, Member, ROOT_OBJECT};
use crate::workspace::RuntimeResource;

/// Methods every type inherits from the root object type.
const ROOT_METHODS: &[(&str, &str)] = &[
    ("<init>", "()V"),
    ("hashCode", "()I"),
    ("equals", "(Ljava/lang/Object;)Z"),
    ("toString", "()Ljava/lang/String;"),
    ("getClass", "()Ljava/lang/Class;"),
    ("clone", "()Ljava/lang/Object;"),
    ("notify", "()V"),
    ("notifyAll", "()V"),
    ("wait", "()V"),
    ("wait", "(J)V"),
    ("wait", "(JI)V"),
    ("finalize", "()V"),
];

/// What a member reference resolved to.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The member exists on the owner or an ancestor.
    Found,
    /// The member is missing and this missing type should declare it.
    MissingOn(String),
    /// Every type along the chain is real, yet none declares the member. Nothing can
    /// be synthesized without corrupting a real type.
    Unsolvable,
}

/// Hierarchy edges plus declared members for the known and lazily-imported platform
/// classes.
pub(crate) struct TypeGraph<'a> {
    supers: HashMap<String, Vec<String>>,
    fields: HashSet<(String, String, String)>,
    methods: HashSet<(String, String, String)>,
    /// Types with a real body: workspace classes plus imported platform classes.
    present: HashSet<String>,
    imported: HashSet<String>,
    runtime: &'a RuntimeResource,
}

impl<'a> TypeGraph<'a> {
    /// Build the graph from the workspace's known classes.
    pub(crate) fn build<'c>(
        classes: impl Iterator<Item = &'c ClassArtifact>,
        runtime: &'a RuntimeResource,
    ) -> Self {
        let mut graph = Self {
            supers: HashMap::new(),
            fields: HashSet::new(),
            methods: HashSet::new(),
            present: HashSet::new(),
            imported: HashSet::new(),
            runtime,
        };
        for (name, descriptor) in ROOT_METHODS {
            graph
                .methods
                .insert((ROOT_OBJECT.to_string(), (*name).to_string(), (*descriptor).to_string()));
        }
        graph.present.insert(ROOT_OBJECT.to_string());
        for artifact in classes {
            graph.absorb(artifact);
        }
        graph
    }

    fn absorb(&mut self, artifact: &ClassArtifact) {
        let name = artifact.name().to_string();
        let mut edges: Vec<String> = artifact
            .super_name()
            .map(str::to_string)
            .into_iter()
            .collect();
        edges.extend(artifact.interfaces().iter().cloned());
        self.supers.insert(name.clone(), edges);
        self.present.insert(name.clone());
        let record = |set: &mut HashSet<(String, String, String)>, members: &[Member]| {
            for member in members {
                set.insert((name.clone(), member.name.clone(), member.descriptor.clone()));
            }
        };
        record(&mut self.fields, artifact.fields());
        record(&mut self.methods, artifact.methods());
    }

    /// Whether a type exists anywhere: workspace, already-imported platform class, or
    /// the platform on first probe.
    pub(crate) fn is_present(&mut self, name: &str) -> bool {
        if self.present.contains(name) {
            return true;
        }
        self.import_platform(name)
    }

    /// Pull a platform class into the graph on first contact.
    fn import_platform(&mut self, name: &str) -> bool {
        if self.imported.contains(name) {
            return self.present.contains(name);
        }
        self.imported.insert(name.to_string());
        match self.runtime.get(name) {
            Some(artifact) => {
                self.absorb(&artifact);
                true
            }
            None => false,
        }
    }

    /// Resolve a member reference along the owner's ancestor chain.
    pub(crate) fn resolve(
        &mut self,
        owner: &str,
        member_name: &str,
        descriptor: &str,
        field: bool,
    ) -> Resolution {
        let mut queue = vec![owner.to_string()];
        let mut seen = HashSet::new();
        let mut first_missing: Option<String> = None;
        while let Some(current) = queue.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if !self.is_present(&current) {
                first_missing.get_or_insert(current);
                continue;
            }
            let key = (current.clone(), member_name.to_string(), descriptor.to_string());
            let table = if field { &self.fields } else { &self.methods };
            if table.contains(&key) {
                return Resolution::Found;
            }
            if let Some(edges) = self.supers.get(&current) {
                queue.extend(edges.iter().cloned());
            }
        }
        match first_missing {
            Some(missing) => Resolution::MissingOn(missing),
            None => Resolution::Unsolvable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::AccessFlags;
    use crate::codec::{ClassBuilder, MethodBody};
    use crate::workspace::RuntimeClassProvider;

    struct EmptyProvider;
    impl RuntimeClassProvider for EmptyProvider {
        fn class_bytes(&self, _name: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn class(bytes: Vec<u8>) -> ClassArtifact {
        ClassArtifact::read(&bytes).unwrap()
    }

    #[test]
    fn test_member_found_via_ancestor() {
        let base = class(
            ClassBuilder::new("app/Base")
                .method(AccessFlags::PUBLIC, "work", "()V", MethodBody::NoOp)
                .build(),
        );
        let sub = class(ClassBuilder::new("app/Sub").super_name("app/Base").build());
        let runtime = RuntimeResource::new(Box::new(EmptyProvider));
        let mut graph = TypeGraph::build([&base, &sub].into_iter(), &runtime);
        assert_eq!(graph.resolve("app/Sub", "work", "()V", false), Resolution::Found);
    }

    #[test]
    fn test_root_methods_always_resolve() {
        let sub = class(ClassBuilder::new("app/Solo").build());
        let runtime = RuntimeResource::new(Box::new(EmptyProvider));
        let mut graph = TypeGraph::build([&sub].into_iter(), &runtime);
        assert_eq!(
            graph.resolve("app/Solo", "hashCode", "()I", false),
            Resolution::Found
        );
    }

    #[test]
    fn test_missing_member_lands_on_missing_ancestor() {
        let sub = class(ClassBuilder::new("app/Sub").super_name("gone/Parent").build());
        let runtime = RuntimeResource::new(Box::new(EmptyProvider));
        let mut graph = TypeGraph::build([&sub].into_iter(), &runtime);
        assert_eq!(
            graph.resolve("app/Sub", "mystery", "()I", false),
            Resolution::MissingOn("gone/Parent".to_string())
        );
    }

    #[test]
    fn test_all_real_but_member_absent_is_unsolvable() {
        let solo = class(ClassBuilder::new("app/Solo").build());
        let runtime = RuntimeResource::new(Box::new(EmptyProvider));
        let mut graph = TypeGraph::build([&solo].into_iter(), &runtime);
        assert_eq!(
            graph.resolve("app/Solo", "mystery", "()I", false),
            Resolution::Unsolvable
        );
    }

    #[test]
    fn test_platform_import() {
        struct OneClass;
        impl RuntimeClassProvider for OneClass {
            fn class_bytes(&self, name: &str) -> Option<Vec<u8>> {
                (name == "java/io/Serializable").then(|| {
                    ClassBuilder::new("java/io/Serializable")
                        .access(
                            AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
                        )
                        .build()
                })
            }
        }
        let runtime = RuntimeResource::new(Box::new(OneClass));
        let mut graph = TypeGraph::build(std::iter::empty(), &runtime);
        assert!(graph.is_present("java/io/Serializable"));
        assert!(!graph.is_present("java/io/Imaginary"));
    }
}
