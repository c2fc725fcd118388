/*
** This file is a part of Marktree (markup document engine)
** Copyright (C) 2026 The Marktree Authors
**
** Marktree is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Attribute name to value mapping of a node.
///
/// Names are unique and iteration is ordered by name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attributes {
    map: BTreeMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes {
            map: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Sets an attribute and returns the previous value if there was one.
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        self.map.insert(name.to_string(), value.to_string())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map.remove(name)
    }

    /// Copies every attribute of `other`, its values win on collision.
    pub fn merge(&mut self, other: &Attributes) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.map.iter(),
        }
    }
}

pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

impl std::ops::Add for Attributes {
    type Output = Attributes;

    fn add(mut self, rhs: Attributes) -> Self::Output {
        self.merge(&rhs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut attrs = Attributes::new();
        assert!(attrs.is_empty());
        assert_eq!(attrs.set("b", "2"), None);
        assert_eq!(attrs.set("a", "1"), None);
        assert_eq!(attrs.set("b", "3"), Some("2".to_string()));
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("b"), Some("3"));
        assert_eq!(attrs.get("c"), None);
        assert!(attrs.contains("a"));

        let mut iter = attrs.iter();
        assert_eq!(iter.next(), Some(("a", "1")));
        assert_eq!(iter.next(), Some(("b", "3")));
        assert_eq!(iter.next(), None);

        assert_eq!(attrs.remove("a"), Some("1".to_string()));
        assert_eq!(attrs.remove("a"), None);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn merge_prefers_right_side() {
        let left: Attributes = [("x", "1"), ("y", "2")].into_iter().collect();
        let right: Attributes = [("y", "20"), ("z", "30")].into_iter().collect();
        let merged = left + right;
        let pairs: Vec<_> = merged.iter().collect();
        assert_eq!(pairs, vec![("x", "1"), ("y", "20"), ("z", "30")]);
    }
}
