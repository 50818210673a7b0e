//! Arguments passed to abilities and policies.

use std::any::{Any, TypeId, type_name};
use std::fmt;

/// A subject type, used for class-level checks (e.g. "may create a Post").
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectType {
    id: TypeId,
    name: &'static str,
}

impl SubjectType {
    /// The subject type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Runtime type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One argument: a borrowed subject instance or a bare subject type.
#[derive(Clone, Copy)]
pub enum Argument<'a> {
    /// A subject instance.
    Value(&'a (dyn Any + Send + Sync)),
    /// A subject type with no instance.
    Type(SubjectType),
}

impl Argument<'_> {
    /// Type id used for policy lookup.
    pub fn type_id(&self) -> TypeId {
        match *self {
            Argument::Value(value) => value.type_id(),
            Argument::Type(subject) => subject.id(),
        }
    }
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Value(_) => f.write_str("Value(..)"),
            Argument::Type(subject) => write!(f, "Type({subject:?})"),
        }
    }
}

/// Ordered ability arguments.
#[derive(Debug, Clone, Default)]
pub struct Arguments<'a> {
    items: Vec<Argument<'a>>,
}

impl<'a> Arguments<'a> {
    /// No arguments.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single subject instance.
    pub fn subject<T: Any + Send + Sync>(value: &'a T) -> Self {
        Self::none().with(value)
    }

    /// A single subject type.
    pub fn of_type<T: Any>() -> Self {
        Self::none().with_type::<T>()
    }

    /// Appends a subject instance.
    pub fn with<T: Any + Send + Sync>(mut self, value: &'a T) -> Self {
        self.items.push(Argument::Value(value));
        self
    }

    /// Appends a subject type.
    pub fn with_type<T: Any>(mut self) -> Self {
        self.items.push(Argument::Type(SubjectType::of::<T>()));
        self
    }

    /// Argument at `index`.
    pub fn get(&self, index: usize) -> Option<Argument<'a>> {
        self.items.get(index).copied()
    }

    /// Argument at `index`, downcast to `T`.
    pub fn value<T: Any>(&self, index: usize) -> Option<&'a T> {
        match self.get(index)? {
            Argument::Value(value) => value.downcast_ref::<T>(),
            Argument::Type(_) => None,
        }
    }

    /// The first argument, downcast to `T`.
    pub fn first<T: Any>(&self) -> Option<&'a T> {
        self.value(0)
    }

    /// Type id of the first argument.
    pub fn subject_type_id(&self) -> Option<TypeId> {
        self.items.first().map(Argument::type_id)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True with no arguments.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
