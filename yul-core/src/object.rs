//! Object trees: a code block plus nested sub-objects and data blobs

use crate::ast::{Block, Name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw data section attached to an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub name: Name,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectNode {
    Object(Object),
    Data(Data),
}

impl ObjectNode {
    pub fn name(&self) -> &str {
        match self {
            ObjectNode::Object(object) => &object.name,
            ObjectNode::Data(data) => &data.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub name: Name,
    pub code: Block,
    pub sub_objects: Vec<ObjectNode>,
}

impl Object {
    /// Name given to a bare code block without an `object` wrapper
    pub const DEFAULT_NAME: &'static str = "object";

    pub fn new(name: impl Into<Name>, code: Block) -> Self {
        Self {
            name: name.into(),
            code,
            sub_objects: Vec::new(),
        }
    }

    pub fn from_code(code: Block) -> Self {
        Self::new(Self::DEFAULT_NAME, code)
    }

    pub fn with_sub_object(mut self, node: ObjectNode) -> Self {
        self.sub_objects.push(node);
        self
    }

    pub fn sub_object(&self, name: &str) -> Option<&ObjectNode> {
        self.sub_objects.iter().find(|node| node.name() == name)
    }

    /// Nested code objects, in declaration order
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.sub_objects.iter().filter_map(|node| match node {
            ObjectNode::Object(object) => Some(object),
            ObjectNode::Data(_) => None,
        })
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.sub_objects.iter_mut().filter_map(|node| match node {
            ObjectNode::Object(object) => Some(object),
            ObjectNode::Data(_) => None,
        })
    }

    /// Names that `datasize`, `dataoffset` and `datacopy` may refer to from
    /// this object's code: the object itself, every direct sub node, and
    /// dotted paths into nested objects.
    pub fn qualified_data_names(&self) -> BTreeSet<Name> {
        let mut names = BTreeSet::new();
        names.insert(self.name.clone());
        for node in &self.sub_objects {
            names.insert(node.name().to_string());
            if let ObjectNode::Object(object) = node {
                for nested in object.qualified_data_names() {
                    if nested != object.name {
                        names.insert(format!("{}.{}", object.name, nested));
                    }
                }
            }
        }
        names
    }

    /// Total number of code objects in the tree, this one included
    pub fn object_count(&self) -> usize {
        1 + self.objects().map(Object::object_count).sum::<usize>()
    }
}
