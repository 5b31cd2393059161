//! Structural member index.
//!
//! Answers "does type `T` declare property `p`, and with what type?" for the
//! named types a union may contain. Each module carries an index of its own
//! declarations plus the indexes of the modules it imports from.

use crate::types::IrType;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Properties declared by one named type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMembers {
    pub properties: FxHashMap<String, IrType>,
}

impl TypeMembers {
    pub fn property(&self, name: &str) -> Option<&IrType> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

/// Member index for the declarations of a single module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberIndex {
    types: FxHashMap<String, TypeMembers>,
}

impl MemberIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or extend) the members of `type_name`.
    pub fn declare(&mut self, type_name: impl Into<String>, properties: impl IntoIterator<Item = (String, IrType)>) {
        self.types
            .entry(type_name.into())
            .or_default()
            .properties
            .extend(properties);
    }

    /// Builder form of [`MemberIndex::declare`].
    pub fn with_type<'s>(mut self, type_name: &str, properties: impl IntoIterator<Item = (&'s str, IrType)>) -> Self {
        self.declare(
            type_name,
            properties
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty)),
        );
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeMembers> {
        self.types.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// A type name declared by more than one imported module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type `{type_name}` is declared by multiple modules: {}", modules.join(", "))]
pub struct AmbiguousHost {
    pub type_name: String,
    pub modules: Vec<String>,
}

/// Member index visible from one module: its own declarations first, then
/// every imported module's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleMemberIndex {
    pub local: MemberIndex,
    #[serde(default)]
    pub external: Vec<(String, MemberIndex)>,
}

impl ModuleMemberIndex {
    pub fn new(local: MemberIndex) -> Self {
        Self {
            local,
            external: Vec::new(),
        }
    }

    pub fn with_external(mut self, module: impl Into<String>, index: MemberIndex) -> Self {
        self.external.push((module.into(), index));
        self
    }

    /// Resolve the members of `type_name`.
    ///
    /// Local declarations win outright. Otherwise the type must be declared by
    /// exactly one external module: none is `Ok(None)`, several is an error.
    pub fn lookup(&self, type_name: &str) -> Result<Option<&TypeMembers>, AmbiguousHost> {
        if let Some(members) = self.local.get(type_name) {
            return Ok(Some(members));
        }

        let mut found: Option<&TypeMembers> = None;
        let mut hosts: Vec<&str> = Vec::new();
        for (module, index) in &self.external {
            if let Some(members) = index.get(type_name) {
                found = Some(members);
                hosts.push(module.as_str());
            }
        }

        match hosts.len() {
            0 => {
                trace!(type_name, "no member host found");
                Ok(None)
            }
            1 => Ok(found),
            _ => Err(AmbiguousHost {
                type_name: type_name.to_string(),
                modules: hosts.into_iter().map(str::to_string).collect(),
            }),
        }
    }

    /// Resolve the type of `property` on a union member type.
    ///
    /// Only named references have an entry in the index; any other member
    /// type declares no properties.
    pub fn property_of<'a>(&'a self, member: &IrType, property: &str) -> Result<Option<&'a IrType>, AmbiguousHost> {
        let Some(name) = member.reference_name() else {
            return Ok(None);
        };
        Ok(self
            .lookup(name)?
            .and_then(|members| members.property(property)))
    }
}

#[cfg(test)]
#[path = "../tests/members.rs"]
mod tests;
