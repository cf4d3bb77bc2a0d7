//! User defined properties
//!
//! The second section of a DocumentSummaryInformation holds properties whose names
//! live in the section dictionary. [`CustomProperties`] gives name based access to them.
use crate::property::Property;
use crate::section::Section;
use crate::variant::Variant;
use std::borrow::{Borrow, BorrowMut};
use tracing::warn;

/// Name based view over a user defined section
///
/// `S` is either a shared or a mutable reference to the section (or the section itself).
#[derive(Debug)]
pub struct CustomProperties<S> {
    section: S,
}

impl<S: Borrow<Section>> CustomProperties<S> {
    /// Creates a view over `section`
    pub fn new(section: S) -> Self {
        Self { section }
    }

    /// The underlying section
    pub fn section(&self) -> &Section {
        self.section.borrow()
    }

    /// Returns the value of the property named `name`
    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.section()
            .property_by_name(name)
            .map(|p| &p.value)
    }

    /// Checks whether a property named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the `(name, value)` pairs in id order
    ///
    /// Dictionary entries without a property are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variant)> + '_ {
        let section = self.section();
        section
            .dictionary()
            .into_iter()
            .flat_map(|d| d.iter())
            .filter_map(|(id, name)| section.value(id).map(|v| (name, v)))
    }

    /// Iterates over the property names
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(name, _)| name)
    }

    /// Number of named properties
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Checks whether there are no named properties
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that names and properties map one to one
    pub fn is_pure(&self) -> bool {
        let section = self.section();
        section.dictionary().map_or(true, |d| d.is_pure(section))
    }
}

impl<S: BorrowMut<Section>> CustomProperties<S> {
    /// Sets the property named `name`, returns the previous value
    ///
    /// The type of the stored value is derived from `value`. New names get the first
    /// free property id; the value is dropped if none is left.
    pub fn put<V: Into<Variant>>(&mut self, name: &str, value: V) -> Option<Variant> {
        let section = self.section.borrow_mut();
        let id = match section.dictionary().and_then(|d| d.id_of(name)) {
            Some(id) => id,
            None => {
                let Some(id) = section.next_free_id() else {
                    warn!("No property id left for {name:?}");
                    return None;
                };
                section.dictionary_or_default().insert(id, name);
                id
            }
        };
        section
            .set_property(Property::new(id, value))
            .map(|p| p.value)
    }

    /// Removes the property named `name` together with its dictionary entry
    pub fn remove(&mut self, name: &str) -> Option<Variant> {
        let section = self.section.borrow_mut();
        let dict = section.dictionary_mut()?;
        let id = dict.id_of(name)?;
        dict.remove(id);
        section.remove_property(id).map(|p| p.value)
    }
}
