use super::Property;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRules {
    /// Schema order; names are unique.
    pub children: Vec<Property>,
    pub additional_properties: bool,
}

impl ObjectRules {
    /// Adds a child, replacing an existing child of the same name in place.
    pub fn insert(&mut self, property: Property) {
        match self.children.iter_mut().find(|c| c.name == property.name) {
            Some(slot) => *slot = property,
            None => self.children.push(property),
        }
    }
    pub fn child(&self, name: &str) -> Option<&Property> {
        self.children.iter().find(|c| c.name == name)
    }
    pub fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }
    pub fn names(&self) -> Vec<String> {
        self.children.iter().map(|c| c.name.clone()).collect()
    }
}
