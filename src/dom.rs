//! Minimal element tree the viewer renders into.
//!
//! Elements live in an arena owned by [`Document`] and are addressed by
//! [`ElementId`] handles. Removed slots are reused; each reuse bumps the
//! slot's generation so a stale handle never aliases a newer element.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub text: String,
    pub attrs: BTreeMap<String, String>,
    /// Inline style properties in the order they were first set.
    pub style: Vec<(String, String)>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    fn matches(&self, selector: &Selector<'_>) -> bool {
        selector.tag.is_none_or(|tag| self.tag == tag)
            && selector
                .id
                .is_none_or(|id| self.attrs.get("id").is_some_and(|v| v == id))
            && selector.class.is_none_or(|class| self.has_class(class))
    }
}

/// `tag`, `#id`, `.class` or a tag followed by one of the other two.
struct Selector<'a> {
    tag: Option<&'a str>,
    id: Option<&'a str>,
    class: Option<&'a str>,
}

impl<'a> Selector<'a> {
    fn parse(query: &'a str) -> Self {
        let split = query.find(['#', '.']).unwrap_or(query.len());
        let (tag, rest) = query.split_at(split);
        let tag = (!tag.is_empty()).then_some(tag);
        match rest.chars().next() {
            Some('#') => Self { tag, id: Some(&rest[1..]), class: None },
            Some('.') => Self { tag, id: None, class: Some(&rest[1..]) },
            _ => Self { tag, id: None, class: None },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    body: ElementId,
    viewport: Size,
}

impl Document {
    pub fn new(viewport: Size) -> Self {
        let body = Element {
            tag: "body".into(),
            ..Element::default()
        };
        Self {
            slots: vec![Slot { generation: 0, element: Some(body) }],
            free: Vec::new(),
            body: ElementId { index: 0, generation: 0 },
            viewport,
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Element {
            tag: tag.into(),
            ..Element::default()
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.element = Some(element);
        ElementId { index, generation: slot.generation }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    fn remove(&mut self, id: ElementId) -> Option<Element> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let removed = slot.element.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(removed)
    }

    /// Number of arena slots, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
    }

    /// Removes every descendant of `id`, leaving `id` itself empty.
    pub fn clear_children(&mut self, id: ElementId) {
        let Some(el) = self.get_mut(id) else { return };
        let mut pending = std::mem::take(&mut el.children);
        el.text.clear();
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.remove(child) {
                pending.extend(removed.children);
            }
        }
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.text = text.into();
        }
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.attrs.insert(name.into(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: ElementId, name: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attrs.remove(name);
        }
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            if !el.has_class(class) {
                el.classes.push(class.into());
            }
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn set_style(&mut self, id: ElementId, property: &str, value: impl Into<String>) {
        let Some(el) = self.get_mut(id) else { return };
        let value = value.into();
        match el.style.iter_mut().find(|(p, _)| p == property) {
            Some(slot) => slot.1 = value,
            None => el.style.push((property.into(), value)),
        }
    }

    /// First attached element matching `query`, in document order.
    pub fn query(&self, query: &str) -> Option<ElementId> {
        let selector = Selector::parse(query);
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            let Some(el) = self.get(id) else { continue };
            if el.matches(&selector) {
                return Some(id);
            }
            stack.extend(el.children.iter().rev());
        }
        None
    }

    /// Like [`Document::query`], but a missing element is an error.
    pub fn find(&self, query: &str) -> Result<ElementId> {
        self.query(query).ok_or_else(|| Error::ElementNotFound {
            query: query.to_string(),
        })
    }

    /// Nearest element, starting at `id` and walking up, that has `class`.
    pub fn closest(&self, id: ElementId, class: &str) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(id) = current {
            let el = self.get(id)?;
            if el.has_class(class) {
                return Some(id);
            }
            current = el.parent;
        }
        None
    }

    /// Value of the selected `<option>` of a `<select>`.
    pub fn select_value(&self, select: ElementId) -> Option<&str> {
        let el = self.get(select)?;
        el.children
            .iter()
            .filter_map(|&id| self.get(id))
            .find(|opt| opt.attrs.contains_key("selected"))
            .or_else(|| el.children.first().and_then(|&id| self.get(id)))
            .and_then(|opt| opt.attrs.get("value"))
            .map(String::as_str)
    }

    pub fn set_select_value(&mut self, select: ElementId, value: &str) {
        let options = match self.get(select) {
            Some(el) => el.children.clone(),
            None => return,
        };
        for option in options {
            let matches = self
                .get(option)
                .and_then(|opt| opt.attrs.get("value"))
                .is_some_and(|v| v == value);
            if matches {
                self.set_attr(option, "selected", "");
            } else {
                self.remove_attr(option, "selected");
            }
        }
    }

    /// Number of elements currently attached below `id`.
    pub fn descendant_count(&self, id: ElementId) -> usize {
        self.get(id).map_or(0, |el| {
            el.children
                .iter()
                .map(|&c| 1 + self.descendant_count(c))
                .sum()
        })
    }
}
