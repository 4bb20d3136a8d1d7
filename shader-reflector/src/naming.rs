use crate::ir::{ParsedType, ReflectionSource, Resource};
use crate::{ReflectorError, ReflectorResult};
use fnv::FnvHashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out `unnamed_N` identifiers. A single allocator is meant to be shared by every reflection
/// pass in the process (including passes running on other threads) so that generated identifiers
/// never collide between shaders.
#[derive(Debug, Default)]
pub struct NameAllocator {
    next_unnamed_id: AtomicUsize,
}

impl NameAllocator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn allocate(
        &self,
        suffix: &str,
    ) -> String {
        let id = self.next_unnamed_id.fetch_add(1, Ordering::Relaxed);
        format!("unnamed_{}{}", id, suffix)
    }
}

/// Appended to a member's name to name the padding that follows it
pub const PADDING_SUFFIX: &str = "_pad";

pub struct NameResolver<'a> {
    source: &'a dyn ReflectionSource,
    names: &'a NameAllocator,
}

impl<'a> NameResolver<'a> {
    pub fn new(
        source: &'a dyn ReflectionSource,
        names: &'a NameAllocator,
    ) -> Self {
        NameResolver { source, names }
    }

    pub fn allocate(
        &self,
        suffix: &str,
    ) -> String {
        self.names.allocate(suffix)
    }

    /// Copies of `resources` where every resource without a debug name has been given one
    pub fn named_resources(
        &self,
        resources: &[Resource],
    ) -> Vec<Resource> {
        resources
            .iter()
            .map(|resource| {
                let mut resource = resource.clone();
                if resource.name.is_empty() {
                    resource.name = self.allocate("");
                }
                resource
            })
            .collect()
    }

    /// Finds the debug name of a member, following type aliases to the canonical type
    pub fn member_name_if_exists(
        &self,
        parent_type: &ParsedType,
        index: usize,
    ) -> ReflectorResult<Option<String>> {
        let mut visited = FnvHashSet::default();
        let mut current = parent_type;
        while let Some(alias) = current.type_alias {
            if !visited.insert(current.id) {
                return Err(ReflectorError::CyclicTypeAlias(parent_type.id));
            }
            current = self.source.get_type(alias)?;
        }

        Ok(self
            .source
            .get_member_name(current.identity(), index)
            .map(|x| x.to_string()))
    }

    pub fn member_name(
        &self,
        parent_type: &ParsedType,
        index: usize,
    ) -> ReflectorResult<String> {
        Ok(match self.member_name_if_exists(parent_type, index)? {
            Some(name) => name,
            None => self.allocate(""),
        })
    }

    pub fn struct_name(
        &self,
        struct_type: &ParsedType,
    ) -> String {
        let name = self.source.get_name(struct_type.identity());
        if name.is_empty() {
            self.allocate("")
        } else {
            name.to_string()
        }
    }
}
