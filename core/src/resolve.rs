//! Inheritance-aware ordering of component batches.
//!
//! A component's inherited attributes are read from its parent's entry in
//! the schema, so within one batch a parent has to be merged before its
//! children. [`sort_by_inheritance_depth`] produces that order.
//!
//! # Example
//!
//! ```
//! use scenegraph_schema_core::*;
//!
//! let batch = vec![
//!     Component::new("A", "B"),
//!     Component::new("B", "C"),
//!     Component::new("C", ""),
//! ];
//! let ordered = sort_by_inheritance_depth(batch).unwrap();
//! let names: Vec<_> = ordered.iter().map(|c| c.name.as_str()).collect();
//! assert_eq!(names, vec!["C", "B", "A"]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::Component;

/// Errors raised while ordering a component batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A chain of `extends` references loops back on itself.
    ///
    /// `chain` starts at the component being resolved and ends with the
    /// first name seen twice.
    #[error("cyclic inheritance: {}", .chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },
}

/// Counts the `extends` hops from `component` that resolve inside
/// `candidates`.
///
/// The walk stops at an empty parent name or at a parent missing from
/// `candidates`; such a parent is assumed to already live in the schema.
///
/// # Errors
///
/// Returns [`ResolveError::CyclicInheritance`] if the walk revisits a name.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_core::*;
///
/// let batch = vec![Component::new("Label", "Group"), Component::new("Group", "Node")];
/// assert_eq!(ancestor_chain_length(&batch[0], &batch), Ok(1));
/// assert_eq!(ancestor_chain_length(&batch[1], &batch), Ok(0));
///
/// let looped = vec![Component::new("A", "B"), Component::new("B", "A")];
/// assert!(ancestor_chain_length(&looped[0], &looped).is_err());
/// ```
pub fn ancestor_chain_length(
    component: &Component,
    candidates: &[Component],
) -> Result<usize, ResolveError> {
    let mut chain = vec![component.name.as_str()];
    let mut visited: HashSet<&str> = HashSet::from([component.name.as_str()]);
    let mut current = component;

    while !current.is_root() {
        let Some(parent) = candidates.iter().find(|c| c.name == current.parent_name) else {
            break;
        };

        chain.push(parent.name.as_str());
        if !visited.insert(parent.name.as_str()) {
            return Err(ResolveError::CyclicInheritance {
                chain: chain.into_iter().map(String::from).collect(),
            });
        }
        current = parent;
    }

    Ok(chain.len() - 1)
}

/// Orders components so that every parent present in the batch comes
/// before its children.
///
/// The sort is stable: components of equal depth keep their input order.
///
/// # Errors
///
/// Returns [`ResolveError::CyclicInheritance`] if any component's chain
/// loops. The whole batch is rejected since no valid order exists.
pub fn sort_by_inheritance_depth(
    components: Vec<Component>,
) -> Result<Vec<Component>, ResolveError> {
    let depths = components
        .iter()
        .map(|c| ancestor_chain_length(c, &components))
        .collect::<Result<Vec<_>, _>>()?;

    let mut ranked: Vec<(usize, Component)> = depths.into_iter().zip(components).collect();
    ranked.sort_by_key(|(depth, _)| *depth);

    Ok(ranked.into_iter().map(|(_, c)| c).collect())
}
