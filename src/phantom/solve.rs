//! Constraint representation, deduplication, and the shape solver.

use std::collections::{BTreeMap, BTreeSet};

use crate::artifact::AccessFlags;
use crate::codec::{ClassBuilder, MethodBody};
use crate::phantom::PHANTOM_ATTRIBUTE;

/// One structural requirement on a missing type.
///
/// Constraints are plain text tuples precisely so that identical requirements from
/// thousands of call sites collapse in a set before the solver runs; the solver's cost
/// grows much faster than linearly with constraint count.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Constraint {
    /// The type must exist; `interface` records whether usage implies an interface.
    Type {
        /// Missing type name.
        name: String,
        /// Whether the reference site implies an interface.
        interface: bool,
    },
    /// The type must exist as a class, because a known class extends it.
    Extends {
        /// Missing superclass name.
        name: String,
    },
    /// The type must expose a field of this exact shape.
    Field {
        /// Missing owner.
        owner: String,
        /// Field name.
        name: String,
        /// Field descriptor.
        descriptor: String,
        /// Whether the access was static.
        is_static: bool,
    },
    /// The type must expose a method of this exact shape.
    Method {
        /// Missing owner.
        owner: String,
        /// Method name.
        name: String,
        /// Method descriptor.
        descriptor: String,
        /// Whether the call was static.
        is_static: bool,
        /// Whether the call went through `invokeinterface`.
        via_interface: bool,
    },
}

impl Constraint {
    fn owner(&self) -> &str {
        match self {
            Self::Type { name, .. } | Self::Extends { name } => name,
            Self::Field { owner, .. } | Self::Method { owner, .. } => owner,
        }
    }
}

/// The solved minimal shape of one phantom type.
#[derive(Debug, Default)]
struct Shape {
    interface: bool,
    /// Set when a known class extends this type; overrides interface evidence.
    forced_class: bool,
    fields: BTreeSet<(String, String, bool)>,
    methods: BTreeSet<(String, String, bool)>,
}

/// Solve the deduplicated constraint set into emitted class bytes per missing type.
///
/// The weakest legal shape wins throughout: everything is public, members are instance
/// unless a static use was observed, methods get no-op bodies of the right return
/// shape. Conflicting class/interface evidence resolves to a class with a log line,
/// since an `extends` edge is harder evidence than a call-site opcode.
pub(crate) fn solve(constraints: &BTreeSet<Constraint>) -> BTreeMap<String, Vec<u8>> {
    let mut shapes: BTreeMap<String, Shape> = BTreeMap::new();
    for constraint in constraints {
        let shape = shapes.entry(constraint.owner().to_string()).or_default();
        match constraint {
            Constraint::Type { interface, .. } => shape.interface |= interface,
            Constraint::Extends { .. } => shape.forced_class = true,
            Constraint::Field {
                name,
                descriptor,
                is_static,
                ..
            } => {
                shape
                    .fields
                    .insert((name.clone(), descriptor.clone(), *is_static));
            }
            Constraint::Method {
                name,
                descriptor,
                is_static,
                via_interface,
                ..
            } => {
                shape.interface |= via_interface;
                shape
                    .methods
                    .insert((name.clone(), descriptor.clone(), *is_static));
            }
        }
    }

    let mut emitted = BTreeMap::new();
    for (name, shape) in shapes {
        if shape.forced_class && shape.interface {
            log::warn!("phantom '{name}' has both class and interface evidence; emitting a class");
        }
        emitted.insert(name.clone(), emit(&name, &shape));
    }
    emitted
}

fn emit(name: &str, shape: &Shape) -> Vec<u8> {
    let interface = shape.interface && !shape.forced_class;
    let access = if interface {
        AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT | AccessFlags::SYNTHETIC
    } else {
        AccessFlags::PUBLIC | AccessFlags::SUPER | AccessFlags::SYNTHETIC
    };
    let mut builder = ClassBuilder::new(name)
        .access(access)
        .attribute(PHANTOM_ATTRIBUTE);
    for (field_name, descriptor, is_static) in &shape.fields {
        let mut flags = AccessFlags::PUBLIC;
        if *is_static || interface {
            // Interface fields must be constants.
            flags |= AccessFlags::STATIC | AccessFlags::FINAL;
        }
        builder = builder.field(flags, field_name, descriptor);
    }
    for (method_name, descriptor, is_static) in &shape.methods {
        let (flags, body) = match (interface, is_static) {
            (true, false) => (AccessFlags::PUBLIC | AccessFlags::ABSTRACT, MethodBody::None),
            (_, true) => (AccessFlags::PUBLIC | AccessFlags::STATIC, MethodBody::NoOp),
            (false, false) => (AccessFlags::PUBLIC, MethodBody::NoOp),
        };
        builder = builder.method(flags, method_name, descriptor, body);
    }
    builder.build()
}
