use std::collections::HashMap;

/// First-seen-order string interning for one column chunk.
///
/// Codes start at 0 and are never reused; [`Dictionary::keys`] indexed by
/// code is the decode table. Codes from two dictionaries are unrelated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    ids: HashMap<String, usize>,
    keys: Vec<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `text`, assigning the next one on first sight.
    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(&code) = self.ids.get(text) {
            return code;
        }
        let code = self.keys.len();
        self.keys.push(text.to_string());
        self.ids.insert(text.to_string(), code);
        code
    }

    pub fn code_of(&self, text: &str) -> Option<usize> {
        self.ids.get(text).copied()
    }

    pub fn key(&self, code: usize) -> Option<&str> {
        self.keys.get(code).map(String::as_str)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<String> {
        self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.keys.clear();
    }
}
