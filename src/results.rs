//! Merged extraction results. The record schema belongs to the fetch layer;
//! only the four top-level keys matter here.

use crate::params::ContentType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResults {
    pub posts: Vec<Value>,
    pub comments: Vec<Value>,
    pub users: Vec<Value>,
    pub communities: Vec<Value>,
}

impl ExtractionResults {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, t: ContentType) -> &[Value] {
        match t {
            ContentType::Posts => &self.posts,
            ContentType::Comments => &self.comments,
            ContentType::Users => &self.users,
            ContentType::Communities => &self.communities,
        }
    }

    fn get_mut(&mut self, t: ContentType) -> &mut Vec<Value> {
        match t {
            ContentType::Posts => &mut self.posts,
            ContentType::Comments => &mut self.comments,
            ContentType::Users => &mut self.users,
            ContentType::Communities => &mut self.communities,
        }
    }

    /// Append `other` after what is already here, key by key.
    pub fn merge(&mut self, other: ExtractionResults) {
        self.posts.extend(other.posts);
        self.comments.extend(other.comments);
        self.users.extend(other.users);
        self.communities.extend(other.communities);
    }

    pub fn total(&self) -> usize {
        self.posts.len() + self.comments.len() + self.users.len() + self.communities.len()
    }

    pub fn is_empty(&self) -> bool { self.total() == 0 }

    /// Cap the combined record count at `limit`, filling posts first, then
    /// comments, users and communities.
    pub fn trim_to(&mut self, limit: usize) {
        let mut left = limit;
        for t in ContentType::ALL {
            let v = self.get_mut(*t);
            v.truncate(left);
            left -= v.len();
        }
    }

    /// Empty every content type that was not requested.
    pub fn retain_included(&mut self, include: &[ContentType]) {
        for t in ContentType::ALL {
            if !include.contains(t) {
                self.get_mut(*t).clear();
            }
        }
    }
}
