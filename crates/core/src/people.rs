use crate::domain::{ImageRef, Person};
use crate::error::{Error, Result};

/// Ordered, index-addressable list of people. Insertion order is kept and
/// duplicate names are allowed. Indices are positions in the current order, so
/// callers must re-derive them after any removal.
#[derive(Debug, Default, Clone)]
pub struct People {
    people: Vec<Person>,
}

impl People {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a person and return its index.
    pub fn add(&mut self, person: Person) -> usize {
        self.people.push(person);
        self.people.len() - 1
    }

    /// Replace the name at `index`. Whitespace-only names are rejected and the
    /// entry is left untouched.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<()> {
        self.check_index(index)?;
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyName);
        }
        self.people[index].name = trimmed.to_string();
        Ok(())
    }

    /// Remove and return the person at `index`; later entries shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<Person> {
        self.check_index(index)?;
        Ok(self.people.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Person> {
        self.check_index(index)?;
        Ok(&self.people[index])
    }

    pub fn count(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Person> {
        self.people.iter()
    }

    pub fn contains_ref(&self, image_ref: &ImageRef) -> bool {
        self.people.iter().any(|p| &p.image_ref == image_ref)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.people.len() {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                index,
                len: self.people.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a People {
    type Item = &'a Person;
    type IntoIter = std::slice::Iter<'a, Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
