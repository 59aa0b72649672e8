//! Response classification
//!
//! Maps a status code (or a transport failure) to a finding category, but
//! only for the categories the crawl was asked to check.

use crate::config::Settings;
use crate::state::Category;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Classifier {
    checked: HashSet<Category>,
}

impl Classifier {
    pub fn new(checked: impl IntoIterator<Item = Category>) -> Self {
        Self {
            checked: checked.into_iter().collect(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.checked_categories.iter().copied())
    }

    /// Category of a response, if it is one being checked
    ///
    /// 2xx and any code outside 300-599 never produce a category.
    pub fn classify(&self, status_code: u16) -> Option<Category> {
        Category::from_status(status_code).filter(|category| self.checked.contains(category))
    }

    /// Category of a transport failure, if fetch errors are being checked
    pub fn classify_fetch_error(&self) -> Option<Category> {
        self.checked
            .contains(&Category::FetchError)
            .then_some(Category::FetchError)
    }
}
