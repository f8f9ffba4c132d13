//! Class token list
//!
//! Ordered set of class names backing an element's `class` attribute.
//! Inputs are whitespace separated; duplicates keep their first position.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Insert every token in `input` that is not already present
    pub fn add(&mut self, input: &str) {
        for token in input.split_whitespace() {
            if !self.contains(token) {
                self.tokens.push(token.to_owned());
            }
        }
    }

    /// Drop every token named in `input`
    pub fn remove(&mut self, input: &str) {
        let doomed: Vec<&str> = input.split_whitespace().collect();
        self.tokens.retain(|t| !doomed.contains(&t.as_str()));
    }

    /// Serialized form, single spaces between tokens
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Replace the whole list from an attribute value
    pub fn set_value(&mut self, value: &str) {
        self.tokens.clear();
        self.add(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_dedups_and_normalizes() {
        let mut list = DOMTokenList::new();
        list.set_value("  btn\tbtn-primary btn ");
        assert_eq!(list.len(), 2);
        assert_eq!(list.value(), "btn btn-primary");
    }

    #[test]
    fn test_add_and_remove_multiple_tokens() {
        let mut list = DOMTokenList::new();
        list.add("a b c");
        list.remove("b  c d");
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["a"]);

        list.add("");
        list.remove("a");
        assert!(list.is_empty());
    }
}
