//! Selectable topics and difficulties per language.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::CatalogCfg;
use crate::domain::{Category, Language};
use crate::seeds::{seed_categories, seed_difficulties};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LanguageCatalog {
  pub categories: Vec<Category>,
  pub difficulties: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
  by_lang: HashMap<Language, LanguageCatalog>,
}

impl Default for Catalog {
  fn default() -> Self {
    Self::with_overrides(&[])
  }
}

impl Catalog {
  /// Built-in catalog with per-language overrides applied. Empty override lists keep the defaults.
  pub fn with_overrides(overrides: &[CatalogCfg]) -> Self {
    let mut by_lang = HashMap::new();
    for lang in Language::ALL {
      by_lang.insert(
        lang,
        LanguageCatalog { categories: seed_categories(lang), difficulties: seed_difficulties(lang) },
      );
    }
    for o in overrides {
      if let Some(entry) = by_lang.get_mut(&o.language) {
        if !o.categories.is_empty() {
          entry.categories = o.categories.clone();
        }
        if !o.difficulties.is_empty() {
          entry.difficulties = o.difficulties.clone();
        }
      }
    }
    Self { by_lang }
  }

  pub fn for_language(&self, lang: Language) -> &LanguageCatalog {
    // Every language is inserted at construction.
    &self.by_lang[&lang]
  }

  pub fn categories(&self, lang: Language) -> &[Category] {
    &self.for_language(lang).categories
  }

  pub fn difficulties(&self, lang: Language) -> &[String] {
    &self.for_language(lang).difficulties
  }

  pub fn contains_topic(&self, lang: Language, topic: &str) -> bool {
    self.categories(lang).iter().any(|c| c.subcategories.iter().any(|s| s == topic))
  }

  pub fn contains_difficulty(&self, lang: Language, difficulty: &str) -> bool {
    self.difficulties(lang).iter().any(|d| d == difficulty)
  }
}
