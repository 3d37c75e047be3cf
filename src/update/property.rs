//! Property grouping analysis
//!
//! A requirement can be tied to a named version property shared with
//! other dependencies. A property referenced by a single dependency is a
//! private version and can move on its own; a property referenced by two
//! or more dependencies joins them into a group that must move together.

use crate::domain::{Dependency, Requirement};

/// Requirement entries on this dependency that reference a version property
pub fn declarations_using_property(dependency: &Dependency) -> Vec<&Requirement> {
    dependency
        .requirements
        .iter()
        .filter(|req| req.property_name.is_some())
        .collect()
}

/// The first property on this dependency that another dependency also
/// references, if any
pub fn shared_property_name<'a>(
    dependency: &'a Dependency,
    all_dependencies: &[Dependency],
) -> Option<&'a str> {
    dependency.property_names().into_iter().find(|property| {
        all_dependencies
            .iter()
            .filter(|other| other.name != dependency.name)
            .any(|other| references_property(other, property))
    })
}

/// True iff this dependency's version comes from a property referenced by
/// at least one other dependency; this is the trigger for group updates
pub fn is_multi_dependency_property(dependency: &Dependency, all_dependencies: &[Dependency]) -> bool {
    shared_property_name(dependency, all_dependencies).is_some()
}

/// Every dependency referencing the property, in declaration order
pub fn dependencies_sharing_property<'a>(
    property: &str,
    all_dependencies: &'a [Dependency],
) -> Vec<&'a Dependency> {
    all_dependencies
        .iter()
        .filter(|dep| references_property(dep, property))
        .collect()
}

fn references_property(dependency: &Dependency, property: &str) -> bool {
    dependency
        .requirements
        .iter()
        .any(|req| req.property_name.as_deref() == Some(property))
}
