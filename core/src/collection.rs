//! In-memory ordered list of posts, mutated after successful remote calls.

use tracing::debug;

use crate::error::ApiError;
use crate::types::{Post, PostDraft};

/// Posts in insertion order, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostCollection {
    posts: Vec<Post>,
}

impl PostCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `draft` under `max(existing ids) + 1`, or 1 when empty.
    pub fn insert_optimistic(&mut self, draft: PostDraft) -> Post {
        let id = self.max_id().map_or(1, |max| max + 1);
        let post = draft.with_id(id);
        self.posts.push(post.clone());
        debug!(id, "inserted post");
        post
    }

    /// Replace the post with `id` in place. The stored post keeps `id` even if
    /// `post.id` differs.
    pub fn replace(&mut self, id: u64, post: Post) -> Result<(), ApiError> {
        let slot = self
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::NotFound { id })?;
        *slot = Post { id, ..post };
        Ok(())
    }

    /// Remove the post with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.position(id) {
            Some(index) => {
                self.posts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Discard all contents and take `posts` as the new list.
    ///
    /// Later duplicates of an id are dropped so ids stay unique.
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        let mut unique: Vec<Post> = Vec::with_capacity(posts.len());
        for post in posts {
            if unique.iter().any(|p| p.id == post.id) {
                debug!(id = post.id, "dropping duplicate id from fetched posts");
                continue;
            }
            unique.push(post);
        }
        self.posts = unique;
    }

    pub fn get(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn as_slice(&self) -> &[Post] {
        &self.posts
    }

    pub fn ids(&self) -> Vec<u64> {
        self.posts.iter().map(|p| p.id).collect()
    }

    fn max_id(&self) -> Option<u64> {
        self.posts.iter().map(|p| p.id).max()
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.posts.iter().position(|p| p.id == id)
    }
}

impl From<Vec<Post>> for PostCollection {
    fn from(posts: Vec<Post>) -> Self {
        let mut collection = Self::new();
        collection.replace_all(posts);
        collection
    }
}

impl<'a> IntoIterator for &'a PostCollection {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64) -> Post {
        Post {
            id,
            title: format!("title {id}"),
            body: format!("body {id}"),
            author_id: 1,
        }
    }

    fn collection(ids: &[u64]) -> PostCollection {
        PostCollection::from(ids.iter().copied().map(post).collect::<Vec<_>>())
    }

    #[test]
    fn insert_into_empty_collection_gets_id_one() {
        let mut posts = PostCollection::new();
        let inserted = posts.insert_optimistic(PostDraft::new("A", "B", 2));
        assert_eq!(inserted.id, 1);
        assert_eq!(inserted.title, "A");
        assert_eq!(inserted.author_id, 2);
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn insert_uses_max_id_plus_one() {
        let mut posts = collection(&[1, 2, 5]);
        let inserted = posts.insert_optimistic(PostDraft::new("A", "B", 2));
        assert_eq!(inserted.id, 6);
        assert_eq!(posts.ids(), vec![1, 2, 5, 6]);
    }

    #[test]
    fn insert_is_above_every_id_regardless_of_order() {
        let mut posts = collection(&[9, 3, 4]);
        let inserted = posts.insert_optimistic(PostDraft::new("A", "B", 1));
        assert!(posts.iter().filter(|p| p.id != inserted.id).all(|p| p.id < inserted.id));
        assert_eq!(inserted.id, 10);
    }

    #[test]
    fn replace_preserves_position_and_others() {
        let mut posts = collection(&[1, 2, 3]);
        let before = posts.clone();
        let updated = Post {
            title: "changed".to_string(),
            ..post(2)
        };
        posts.replace(2, updated.clone()).unwrap();

        assert_eq!(posts.len(), 3);
        assert_eq!(posts.ids(), vec![1, 2, 3]);
        assert_eq!(posts.get(2), Some(&updated));
        assert_eq!(posts.get(1), before.get(1));
        assert_eq!(posts.get(3), before.get(3));
    }

    #[test]
    fn replace_missing_id_is_not_found_and_unchanged() {
        let mut posts = collection(&[1, 2]);
        let before = posts.clone();
        let err = posts.replace(99, post(99)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { id: 99 }));
        assert_eq!(posts, before);
    }

    #[test]
    fn replace_keeps_the_targeted_id() {
        let mut posts = collection(&[1, 2]);
        posts.replace(2, post(1)).unwrap();
        assert_eq!(posts.ids(), vec![1, 2]);
    }

    #[test]
    fn remove_absent_id_is_a_no_op() {
        let mut posts = collection(&[1, 2]);
        let before = posts.clone();
        assert!(!posts.remove(7));
        assert_eq!(posts, before);
    }

    #[test]
    fn remove_present_id_drops_exactly_one() {
        let mut posts = collection(&[1, 2, 3]);
        assert!(posts.remove(2));
        assert_eq!(posts.len(), 2);
        assert_eq!(posts.get(1), Some(&post(1)));
        assert_eq!(posts.get(3), Some(&post(3)));
        assert!(!posts.contains(2));
    }

    #[test]
    fn replace_all_discards_previous_contents() {
        let mut posts = collection(&[1, 2, 3]);
        posts.replace_all(vec![post(10), post(11)]);
        assert_eq!(posts.ids(), vec![10, 11]);
    }

    #[test]
    fn replace_all_keeps_ids_unique() {
        let mut posts = PostCollection::new();
        let duplicate = Post {
            title: "second copy".to_string(),
            ..post(1)
        };
        posts.replace_all(vec![post(1), post(2), duplicate]);
        assert_eq!(posts.ids(), vec![1, 2]);
        assert_eq!(posts.get(1).unwrap().title, "title 1");
    }

    #[test]
    fn as_slice_follows_insertion_order() {
        let mut posts = collection(&[5, 2]);
        let added = posts.insert_optimistic(PostDraft::new("new", "body", 1));
        assert_eq!(posts.as_slice(), &[post(5), post(2), added][..]);
        assert!(posts.as_slice().iter().eq(posts.iter()));
    }
}
