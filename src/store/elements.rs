use std::collections::BTreeMap;

use crate::{
    foundation::core::{ElementId, PropertyKey, PropertyValue},
    foundation::error::{TimelineError, TimelineResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// An overlay element as seen by the keyframe engine: identity plus base values.
pub struct Element {
    /// Stable id.
    pub id: ElementId,
    /// Human-readable name, used to build property paths.
    pub name: String,
    /// Static (non-keyframed) property values.
    #[serde(default)]
    pub properties: BTreeMap<PropertyKey, PropertyValue>,
}

impl Element {
    /// New element with no base properties.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(id),
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style base value.
    pub fn with(mut self, key: PropertyKey, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value.into());
        self
    }

    /// Addressable path such as `"Lower Third.opacity"`.
    pub fn property_path(&self, key: &PropertyKey) -> String {
        format!("{}.{}", self.name, key)
    }
}

/// Read/write access to element base values.
pub trait ElementStore {
    /// Current base value of `key` on `element`.
    fn get_property(&self, element: &ElementId, key: &PropertyKey) -> Option<PropertyValue>;

    /// Overwrite the base value of `key` on `element`.
    fn set_property(
        &mut self,
        element: &ElementId,
        key: PropertyKey,
        value: PropertyValue,
    ) -> TimelineResult<()>;
}

/// In-memory [`ElementStore`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    into = "BTreeMap<ElementId, Element>",
    try_from = "BTreeMap<ElementId, Element>"
)]
pub struct MemoryElementStore {
    elements: BTreeMap<ElementId, Element>,
}

impl From<MemoryElementStore> for BTreeMap<ElementId, Element> {
    fn from(store: MemoryElementStore) -> Self {
        store.elements
    }
}

impl TryFrom<BTreeMap<ElementId, Element>> for MemoryElementStore {
    type Error = TimelineError;

    fn try_from(elements: BTreeMap<ElementId, Element>) -> Result<Self, Self::Error> {
        if let Some((key, el)) = elements.iter().find(|(key, el)| **key != el.id) {
            return Err(TimelineError::validation(format!(
                "element stored under '{key}' has id '{}'",
                el.id
            )));
        }
        Ok(Self { elements })
    }
}

impl MemoryElementStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an element.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    /// Look up an element.
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Remove an element. Its animations are the caller's to clean up.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        self.elements.remove(id)
    }

    /// Iterate elements in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }
}

impl ElementStore for MemoryElementStore {
    fn get_property(&self, element: &ElementId, key: &PropertyKey) -> Option<PropertyValue> {
        self.elements.get(element)?.properties.get(key).cloned()
    }

    fn set_property(
        &mut self,
        element: &ElementId,
        key: PropertyKey,
        value: PropertyValue,
    ) -> TimelineResult<()> {
        value.validate()?;
        let el = self
            .elements
            .get_mut(element)
            .ok_or_else(|| TimelineError::not_found(format!("element '{element}'")))?;
        el.properties.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/elements.rs"]
mod tests;
