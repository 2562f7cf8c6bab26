use std::convert::TryFrom;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::{Tag, TagType, Value};

/// A shared handle to a child tag of a [`List`] or [`Compound`].
///
/// Cloning a `Node` aliases the same tag; this is what a shallow
/// [`Tag::copy`] is made of. A node never hands out `&mut Tag`, so the type
/// of the tag it holds cannot change through it.
///
/// Holding the guard returned by [`Node::read`] while mutating the same node
/// from the same thread deadlocks.
///
/// Edits through a node refuse to make a tag hold itself, so a tree stays
/// acyclic even when shallow copies share nodes. Names of children are only
/// changed through [`Compound::rename`]; list elements stay unnamed.
#[derive(Clone)]
pub struct Node(Arc<RwLock<Tag>>);

impl Node {
    pub fn new(tag: Tag) -> Self {
        Self(Arc::new(RwLock::new(tag)))
    }

    /// Lock the tag for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Tag> {
        self.0.read()
    }

    /// Whether both handles refer to the same tag.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Replace the value of the tag. The new value must have the same type
    /// and must not hold this node.
    pub fn set_value(&self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let mut tag = self.0.write();
        self.check_not_within(&value)?;
        tag.set_value(value)
    }

    /// Lock the tag for writing if it is a list.
    pub fn list_mut(&self) -> Option<ListMut<'_>> {
        let list = RwLockWriteGuard::try_map(self.0.write(), |t| t.as_list_mut()).ok()?;
        Some(ListMut { owner: self, list })
    }

    /// Lock the tag for writing if it is a compound.
    pub fn compound_mut(&self) -> Option<CompoundMut<'_>> {
        let compound =
            RwLockWriteGuard::try_map(self.0.write(), |t| t.as_compound_mut()).ok()?;
        Some(CompoundMut {
            owner: self,
            compound,
        })
    }

    /// Fails if `value` holds this node anywhere below it.
    ///
    /// Called with this node write-locked, so it is never read here. Any other
    /// node found locked for writing is rejected rather than waited on.
    fn check_not_within(&self, value: &Value) -> Result<()> {
        let children = match value {
            Value::List(l) => l.iter(),
            Value::Compound(c) => c.iter(),
            _ => return Ok(()),
        };
        for child in children {
            if Node::ptr_eq(child, self) {
                return Err(Error::construction("a tag cannot contain itself"));
            }
            let tag = child.0.try_read().ok_or_else(|| {
                Error::construction("cannot insert a tag that is locked for writing")
            })?;
            self.check_not_within(tag.value())?;
        }
        Ok(())
    }

    /// Take the tag out of this node if no other handle refers to it,
    /// otherwise get a deep copy.
    pub fn into_tag(self) -> Tag {
        match Arc::try_unwrap(self.0) {
            Ok(lock) => lock.into_inner(),
            Err(shared) => shared.read().clone(),
        }
    }

    fn deep_copy(&self) -> Node {
        Node::new(self.read().clone())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Node::ptr_eq(self, other) || *self.read() == *other.read()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

impl From<Tag> for Node {
    fn from(tag: Tag) -> Self {
        Node::new(tag)
    }
}

/// An ordered sequence of unnamed tags that all have the same type.
///
/// The element type is fixed when the list is made. A list of End may only
/// be empty.
#[derive(PartialEq)]
pub struct List {
    element: TagType,
    items: Vec<Node>,
}

impl List {
    /// An empty list of `element` tags.
    pub fn new(element: TagType) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    /// Build a list from `items`, checking every item has type `element`.
    pub fn from_tags(element: TagType, items: Vec<Tag>) -> Result<Self> {
        let mut list = Self {
            element,
            items: Vec::with_capacity(items.len()),
        };
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }

    /// Used by the decoder, which has already read `element` for every item.
    pub(crate) fn from_nodes(element: TagType, items: Vec<Node>) -> Self {
        Self { element, items }
    }

    pub fn element_type(&self) -> TagType {
        self.element
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }

    fn check(&self, tag: &Tag) -> Result<()> {
        if self.element == TagType::End {
            return Err(Error::construction("a list of TAG_End must be empty"));
        }
        if tag.type_id() != self.element {
            return Err(Error::construction(format!(
                "cannot put {} into list of {}",
                tag.type_id(),
                self.element
            )));
        }
        Ok(())
    }

    /// Append a tag. Its name is discarded.
    pub fn push(&mut self, mut tag: Tag) -> Result<()> {
        self.check(&tag)?;
        if i32::try_from(self.items.len() + 1).is_err() {
            return Err(Error::construction("list length exceeds i32::MAX"));
        }
        tag.set_name("");
        self.items.push(Node::new(tag));
        Ok(())
    }

    /// Replace the slot at `index`, returning the node that was there.
    pub fn set(&mut self, index: usize, mut tag: Tag) -> Result<Node> {
        self.check(&tag)?;
        tag.set_name("");
        let slot = self.items.get_mut(index).ok_or_else(|| {
            Error::construction(format!("list index {} out of range", index))
        })?;
        Ok(std::mem::replace(slot, Node::new(tag)))
    }

    pub fn remove(&mut self, index: usize) -> Option<Node> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub(crate) fn shallow_copy(&self) -> List {
        Self {
            element: self.element,
            items: self.items.clone(),
        }
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.items
    }
}

impl Clone for List {
    fn clone(&self) -> Self {
        Self {
            element: self.element,
            items: self.items.iter().map(Node::deep_copy).collect(),
        }
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("element", &self.element)
            .field("items", &self.items)
            .finish()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// An ordered collection of named tags.
///
/// The wire format allows repeated names, and decoded compounds keep every
/// entry. Building a compound through [`Compound::from_tags`] rejects
/// duplicates, and [`Compound::insert`] replaces an existing entry in place.
#[derive(PartialEq, Default)]
pub struct Compound {
    entries: Vec<Node>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a compound from `children`, in order. Fails on a repeated name.
    pub fn from_tags(children: Vec<Tag>) -> Result<Self> {
        let mut compound = Self {
            entries: Vec::with_capacity(children.len()),
        };
        for child in children {
            if compound.contains_key(child.name()) {
                return Err(Error::construction(format!(
                    "duplicate name in compound: {:?}",
                    child.name()
                )));
            }
            compound.entries.push(Node::new(child));
        }
        Ok(compound)
    }

    /// Append without checking for a repeated name, as read from the wire.
    pub(crate) fn push_unchecked(&mut self, child: Tag) {
        self.entries.push(Node::new(child));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first entry called `name`.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.position(name).map(|i| &self.entries[i])
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Insert a named tag. If an entry with the same name exists its slot is
    /// replaced and the old node returned; otherwise the tag is appended.
    pub fn insert(&mut self, child: Tag) -> Option<Node> {
        match self.position(child.name()) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i], Node::new(child))),
            None => {
                self.entries.push(Node::new(child));
                None
            }
        }
    }

    /// Remove the first entry called `name`.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.position(name).map(|i| self.entries.remove(i))
    }

    /// Rename the first entry called `old`. Fails if there is no such entry
    /// or another entry is already called `new`.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        let i = self
            .position(old)
            .ok_or_else(|| Error::construction(format!("no entry called {:?}", old)))?;
        if old != new && self.contains_key(&new) {
            return Err(Error::construction(format!(
                "duplicate name in compound: {:?}",
                new
            )));
        }
        self.entries[i].0.write().set_name(new);
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.entries.iter()
    }

    /// Names of the entries, in order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|n| n.read().name().to_owned())
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|n| n.read().name() == name)
    }

    pub(crate) fn shallow_copy(&self) -> Compound {
        Self {
            entries: self.entries.clone(),
        }
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.entries
    }
}

impl Clone for Compound {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.iter().map(Node::deep_copy).collect(),
        }
    }
}

impl fmt::Debug for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Compound {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Write access to a list held by a [`Node`].
///
/// Reads go through `Deref`. Edits that add a tag first check the tag does
/// not hold the node being edited.
pub struct ListMut<'a> {
    owner: &'a Node,
    list: MappedRwLockWriteGuard<'a, List>,
}

impl ListMut<'_> {
    pub fn push(&mut self, tag: Tag) -> Result<()> {
        self.owner.check_not_within(tag.value())?;
        self.list.push(tag)
    }

    pub fn set(&mut self, index: usize, tag: Tag) -> Result<Node> {
        self.owner.check_not_within(tag.value())?;
        self.list.set(index, tag)
    }

    pub fn remove(&mut self, index: usize) -> Option<Node> {
        self.list.remove(index)
    }
}

impl Deref for ListMut<'_> {
    type Target = List;

    fn deref(&self) -> &List {
        &self.list
    }
}

/// Write access to a compound held by a [`Node`]. See [`ListMut`].
pub struct CompoundMut<'a> {
    owner: &'a Node,
    compound: MappedRwLockWriteGuard<'a, Compound>,
}

impl CompoundMut<'_> {
    pub fn insert(&mut self, child: Tag) -> Result<Option<Node>> {
        self.owner.check_not_within(child.value())?;
        Ok(self.compound.insert(child))
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.compound.remove(name)
    }

    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        self.compound.rename(old, new)
    }
}

impl Deref for CompoundMut<'_> {
    type Target = Compound;

    fn deref(&self) -> &Compound {
        &self.compound
    }
}
