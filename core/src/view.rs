//! Filtered, sorted projection of a `PostCollection`.
//!
//! `view` is a pure function of its inputs and returns owned copies, so the
//! caller may mutate the result freely.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::collection::PostCollection;
use crate::types::Post;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Id,
    Title,
    AuthorId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Filter and sort selection for one rendering of the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub filter_text: String,
    #[serde(default)]
    pub filter_author_id: Option<u64>,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl ViewState {
    pub fn sorted_by(sort_key: SortKey, sort_direction: SortDirection) -> Self {
        Self {
            sort_key,
            sort_direction,
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        let text_matches = self.filter_text.is_empty() || {
            let needle = self.filter_text.to_lowercase();
            post.title.to_lowercase().contains(&needle)
                || post.body.to_lowercase().contains(&needle)
        };
        let author_matches = self.filter_author_id.is_none_or(|id| post.author_id == id);
        text_matches && author_matches
    }

    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let ordering = match self.sort_key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::AuthorId => a.author_id.cmp(&b.author_id),
        };
        match self.sort_direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Posts of `collection` that pass `state`'s filters, in `state`'s order.
///
/// Equal sort keys keep their collection order in both directions.
pub fn view(collection: &PostCollection, state: &ViewState) -> Vec<Post> {
    let mut posts: Vec<Post> = collection
        .iter()
        .filter(|post| state.matches(post))
        .cloned()
        .collect();
    posts.sort_by(|a, b| state.compare(a, b));
    posts
}
