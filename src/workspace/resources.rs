//! The ordered composition of everything a workspace can see.

use crate::artifact::{ClassArtifact, DexClassArtifact, FileArtifact};
use crate::workspace::resource::Resource;
use crate::workspace::runtime::RuntimeResource;

/// One primary resource, user libraries, and the internally-managed resources: the
/// runtime view and, once synthesis has run, the phantom library.
///
/// Lookup precedence for every artifact kind is fixed: primary, then user libraries in
/// order, then internal resources in order (runtime view before phantom). The primary
/// and the runtime view are fixed for the workspace's lifetime; libraries and the
/// phantom come and go.
pub struct Resources {
    primary: Resource,
    libraries: Vec<Resource>,
    runtime: RuntimeResource,
    phantom: Option<Resource>,
}

impl Resources {
    /// Compose a workspace view from its fixed parts.
    #[must_use]
    pub fn new(primary: Resource, runtime: RuntimeResource) -> Self {
        Self {
            primary,
            libraries: Vec::new(),
            runtime,
            phantom: None,
        }
    }

    /// The primary resource.
    #[must_use]
    pub fn primary(&self) -> &Resource {
        &self.primary
    }

    /// The primary resource, mutable.
    pub fn primary_mut(&mut self) -> &mut Resource {
        &mut self.primary
    }

    /// User library resources, in precedence order.
    #[must_use]
    pub fn libraries(&self) -> &[Resource] {
        &self.libraries
    }

    /// Append a user library at the end of the precedence order.
    pub fn add_library(&mut self, library: Resource) {
        self.libraries.push(library);
    }

    /// Remove the library at `index`, returning it when present.
    pub fn remove_library(&mut self, index: usize) -> Option<Resource> {
        (index < self.libraries.len()).then(|| self.libraries.remove(index))
    }

    /// The runtime view.
    #[must_use]
    pub fn runtime(&self) -> &RuntimeResource {
        &self.runtime
    }

    /// The phantom library, once synthesis has produced one.
    #[must_use]
    pub fn phantom(&self) -> Option<&Resource> {
        self.phantom.as_ref()
    }

    /// Install (or replace) the phantom library.
    pub fn set_phantom(&mut self, phantom: Resource) {
        self.phantom = Some(phantom);
    }

    /// Drop the phantom library, e.g. before a fresh synthesis run.
    pub fn clear_phantom(&mut self) -> Option<Resource> {
        self.phantom.take()
    }

    /// Class lookup across the full precedence chain. Returns an owned artifact because
    /// the runtime view hands out decoded copies rather than table references.
    #[must_use]
    pub fn get_class(&self, name: &str) -> Option<ClassArtifact> {
        self.table_resources()
            .find_map(|resource| resource.classes().get(name).cloned())
            .or_else(|| self.runtime.get(name))
            .or_else(|| {
                self.phantom
                    .as_ref()
                    .and_then(|phantom| phantom.classes().get(name).cloned())
            })
    }

    /// File lookup: primary, then libraries. Internal resources carry no files.
    #[must_use]
    pub fn get_file(&self, name: &str) -> Option<&FileArtifact> {
        self.table_resources()
            .find_map(|resource| resource.files().get(name))
    }

    /// Dex class lookup: primary, then libraries.
    #[must_use]
    pub fn get_dex_class(&self, name: &str) -> Option<&DexClassArtifact> {
        self.table_resources()
            .find_map(|resource| resource.dex_classes().get(name))
    }

    /// The resource owning a class under `name`, walking the same precedence as
    /// [`Self::get_class`] minus the runtime view (which is not table-backed).
    #[must_use]
    pub fn resource_containing_class(&self, name: &str) -> Option<&Resource> {
        self.table_resources_with_phantom()
            .find(|resource| resource.classes().contains_key(name))
    }

    /// The first resource holding any class key under the given package prefix.
    ///
    /// Containment queries test "does any key start with the prefix", not exact keys;
    /// this is what package and directory tree views are built from.
    #[must_use]
    pub fn resource_containing_package(&self, prefix: &str) -> Option<&Resource> {
        self.table_resources_with_phantom().find(|resource| {
            resource
                .classes()
                .keys()
                .any(|key| key.starts_with(prefix))
        })
    }

    /// Primary and libraries, in precedence order.
    fn table_resources(&self) -> impl Iterator<Item = &Resource> {
        std::iter::once(&self.primary).chain(self.libraries.iter())
    }

    /// Primary, libraries, then phantom.
    fn table_resources_with_phantom(&self) -> impl Iterator<Item = &Resource> {
        self.table_resources().chain(self.phantom.iter())
    }

    /// Every class the workspace currently knows from table-backed resources (primary
    /// plus libraries), the input set for phantom synthesis.
    pub fn known_classes(&self) -> impl Iterator<Item = &ClassArtifact> {
        self.table_resources()
            .flat_map(|resource| resource.classes().iter().map(|(_, artifact)| artifact))
    }
}
