//! Dependency graph construction and topological ordering.
//!
//! Resources are indexed by declaration position; edges are stored as explicit
//! adjacency lists over those indices. Ordering uses Kahn's algorithm with a
//! FIFO worklist, so resources that are ready at the same time keep their
//! declaration order.

use crate::error::{Error, Result};
use crate::resource::Resource;
use std::collections::{BTreeMap, VecDeque};

/// Adjacency view of a desired set's dependencies.
#[derive(Debug)]
pub struct DependencyGraph {
    names: Vec<String>,
    /// dependencies[i] = indices that must be reconciled before i
    dependencies: Vec<Vec<usize>>,
    /// dependents[i] = indices that wait on i
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph, validating names along the way.
    ///
    /// Fails on duplicate resource names and on dependencies that name a
    /// resource outside the set. No provider is involved at this stage.
    pub fn build(resources: &[Resource]) -> Result<Self> {
        let mut index: BTreeMap<&str, usize> = BTreeMap::new();
        for (i, resource) in resources.iter().enumerate() {
            if index.insert(resource.name.as_str(), i).is_some() {
                return Err(Error::DuplicateResource {
                    name: resource.name.clone(),
                });
            }
        }

        let mut dependencies = vec![Vec::new(); resources.len()];
        let mut dependents = vec![Vec::new(); resources.len()];

        for (i, resource) in resources.iter().enumerate() {
            for dep in &resource.depends_on {
                let Some(&j) = index.get(dep.as_str()) else {
                    return Err(Error::UnknownDependency {
                        resource: resource.name.clone(),
                        dependency: dep.clone(),
                    });
                };
                dependencies[i].push(j);
                dependents[j].push(i);
            }
        }

        Ok(Self {
            names: resources.iter().map(|r| r.name.clone()).collect(),
            dependencies,
            dependents,
        })
    }

    /// Number of resources in the graph.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Indices that must be reconciled before `i`.
    pub fn dependencies_of(&self, i: usize) -> &[usize] {
        &self.dependencies[i]
    }

    /// Indices waiting on `i`.
    pub fn dependents_of(&self, i: usize) -> &[usize] {
        &self.dependents[i]
    }

    /// Compute a topological order over the resource indices.
    ///
    /// Returns [`Error::Cycle`] naming the unorderable resources if the graph
    /// contains a cycle.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        let mut indegree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut ready: VecDeque<usize> = (0..self.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(i) = ready.pop_front() {
            order.push(i);
            for &dependent in &self.dependents[i] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
        }

        if order.len() < self.len() {
            let members = (0..self.len())
                .filter(|&i| indegree[i] > 0)
                .map(|i| self.names[i].clone())
                .collect();
            return Err(Error::Cycle { members });
        }

        Ok(order)
    }
}
