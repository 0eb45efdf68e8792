//! Posts and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  user::{Id, User},
};

/// A post in the feed, with its comments attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id:            Id,
  pub author:        User,
  pub content:       String,
  pub picture:       Option<String>,
  pub creation_date: DateTime<Utc>,
  pub updated_date:  Option<DateTime<Utc>>,
  /// Oldest first.
  #[serde(default)]
  pub comments:      Vec<Comment>,
  #[serde(default)]
  pub likes_count:   u32,
}

/// A comment; belongs to exactly one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id:            Id,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub post_id:       Option<Id>,
  pub author:        User,
  pub content:       String,
  pub creation_date: DateTime<Utc>,
  pub updated_date:  Option<DateTime<Utc>>,
}

/// Body of `POST /feed/posts` and `PUT /feed/posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
  pub content: String,
  #[serde(default)]
  pub picture: Option<String>,
}

impl NewPost {
  pub fn new(content: impl Into<String>) -> Self {
    Self { content: content.into(), picture: None }
  }

  /// Trim the content and reject blanks; an empty picture URL becomes `None`.
  pub fn normalized(self) -> Result<Self> {
    let content = self.content.trim().to_owned();
    if content.is_empty() {
      return Err(Error::EmptyContent);
    }
    let picture = self
      .picture
      .map(|p| p.trim().to_owned())
      .filter(|p| !p.is_empty());
    Ok(Self { content, picture })
  }
}

/// Body of the comment create/edit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_rejects_blank_content() {
    assert!(matches!(NewPost::new("   ").normalized(), Err(Error::EmptyContent)));
  }

  #[test]
  fn normalized_drops_empty_picture() {
    let post = NewPost { content: " hi ".into(), picture: Some("".into()) }
      .normalized()
      .unwrap();
    assert_eq!(post.content, "hi");
    assert!(post.picture.is_none());
  }
}
