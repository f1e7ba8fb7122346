//! Categories and candidate word lists

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::sanitize::words_match;

/// Built-in dataset, embedded at compile time
const BUILTIN_CATEGORIES: &str = include_str!("../data/categories.json");

/// A topic card: a name and the words the secret word is drawn from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub words: Vec<String>,
}

impl Category {
    pub fn new<N: Into<String>, W: Into<String>>(
        name: N,
        words: impl IntoIterator<Item = W>,
    ) -> Self {
        Self {
            name: name.into(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Membership test under the same rule as guess matching
    pub fn contains_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| words_match(w, word))
    }
}

/// Ordered, validated collection of categories
#[derive(Clone, Debug)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    /// Validate and wrap categories. Every category needs at least one word
    /// and names must be unique. Surrounding whitespace is stripped from
    /// names and words.
    pub fn new(mut categories: Vec<Category>) -> Result<Self> {
        for category in &mut categories {
            category.name = category.name.trim().to_string();
            for word in &mut category.words {
                *word = word.trim().to_string();
            }
            category.words.retain(|w| !w.is_empty());
        }

        for (i, category) in categories.iter().enumerate() {
            if category.words.is_empty() {
                return Err(CoreError::EmptyCategory(category.name.clone()));
            }
            if categories[..i].iter().any(|c| c.name == category.name) {
                return Err(CoreError::DuplicateCategory(category.name.clone()));
            }
        }
        Ok(Self { categories })
    }

    /// The dataset shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATEGORIES)
    }

    /// Parse a dataset (handles both list and map formats).
    ///
    /// List: `[{"name": "Animals", "words": ["Lion", ...]}, ...]`
    /// Map:  `{"Animals": ["Lion", ...], ...}`
    ///
    /// Both formats keep the file's category order.
    pub fn from_json(content: &str) -> Result<Self> {
        if let Ok(list) = serde_json::from_str::<Vec<Category>>(content) {
            return Self::new(list);
        }

        // serde_json is built with `preserve_order`, so the map iterates in file order
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
        let categories = map
            .into_iter()
            .map(|(name, words)| -> Result<Category> {
                let words: Vec<String> = serde_json::from_value(words)?;
                Ok(Category { name, words })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(categories)
    }

    /// Load a dataset from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Keep only the named categories, in the order given
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let selected = names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| CoreError::UnknownCategory(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(selected)
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}
