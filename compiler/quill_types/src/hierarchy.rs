//! The narrow view of the class system the engine depends on.
//!
//! The engine needs class identity, ancestor testing with private-inheritance
//! visibility, and class names for messages. Nothing else about classes is
//! visible here.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::RegistryError;

/// Class identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// How a descendant relates to an ancestor.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Inheritance {
    /// Inheritance steps; 0 for the class itself.
    pub distance: u32,
    /// Some step on the path is private.
    pub private: bool,
}

/// Queries the engine issues to the class system.
pub trait ClassHierarchyView: Send + Sync {
    fn class_name(&self, id: ClassId) -> Option<String>;

    /// How `descendant` inherits `ancestor`, or `None` when unrelated.
    ///
    /// A class is related to itself at distance 0.
    fn relation(&self, ancestor: ClassId, descendant: ClassId) -> Option<Inheritance>;

    /// Whether code running in `context` may see `base` through private
    /// inheritance.
    fn can_access_private(&self, base: ClassId, context: Option<ClassId>) -> bool;
}

struct ClassEntry {
    name: String,
    parents: Vec<(ClassId, bool)>,
}

/// A simple in-memory class table.
///
/// Classes are declared parents-first; a class id is only valid once
/// declared.
#[derive(Default)]
pub struct ClassTable {
    classes: RwLock<Vec<ClassEntry>>,
    by_name: RwLock<FxHashMap<String, ClassId>>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a class. Each parent is `(id, private)`.
    pub fn declare(
        &self,
        name: impl Into<String>,
        parents: &[(ClassId, bool)],
    ) -> Result<ClassId, RegistryError> {
        let name = name.into();
        let mut classes = self.classes.write();
        let mut by_name = self.by_name.write();
        if by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if let Some((missing, _)) = parents.iter().find(|(p, _)| p.0 as usize >= classes.len()) {
            return Err(RegistryError::UnknownClass(*missing));
        }
        let raw = u32::try_from(classes.len()).map_err(|_| RegistryError::Exhausted)?;
        let id = ClassId(raw);
        classes.push(ClassEntry {
            name: name.clone(),
            parents: parents.to_vec(),
        });
        by_name.insert(name, id);
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.read().get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth-first search; a public path wins over a private one, then the
    /// shorter path.
    fn search(classes: &[ClassEntry], ancestor: ClassId, current: ClassId) -> Option<Inheritance> {
        if current == ancestor {
            return Some(Inheritance {
                distance: 0,
                private: false,
            });
        }
        let entry = classes.get(current.0 as usize)?;
        let mut best: Option<Inheritance> = None;
        for &(parent, private) in &entry.parents {
            let Some(found) = Self::search(classes, ancestor, parent) else {
                continue;
            };
            let candidate = Inheritance {
                distance: found.distance + 1,
                private: found.private || private,
            };
            best = Some(match best {
                Some(b) if (b.private, b.distance) <= (candidate.private, candidate.distance) => b,
                _ => candidate,
            });
        }
        best
    }
}

impl ClassHierarchyView for ClassTable {
    fn class_name(&self, id: ClassId) -> Option<String> {
        self.classes.read().get(id.0 as usize).map(|c| c.name.clone())
    }

    fn relation(&self, ancestor: ClassId, descendant: ClassId) -> Option<Inheritance> {
        let classes = self.classes.read();
        if descendant.0 as usize >= classes.len() {
            return None;
        }
        Self::search(&classes, ancestor, descendant)
    }

    fn can_access_private(&self, base: ClassId, context: Option<ClassId>) -> bool {
        context.is_some_and(|ctx| self.relation(base, ctx).is_some())
    }
}

#[cfg(test)]
mod tests;
