//! Comment-thread assembly for the post read path.
//!
//! Comments are fetched flat (approved only, oldest first) and grouped
//! into top-level threads with one level of replies.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::CommentWithAuthor;

/// A top-level comment and its replies, in fetch order.
#[derive(Debug, Clone)]
pub struct CommentThread {
    pub comment: CommentWithAuthor,
    pub replies: Vec<CommentWithAuthor>,
}

/// Group a flat, ordered comment list into threads.
///
/// Replies whose parent is absent from the input (unapproved or deleted
/// between queries) are dropped rather than surfaced as orphans.
pub fn assemble_threads(flat: Vec<CommentWithAuthor>) -> Vec<CommentThread> {
    let mut reply_buckets: HashMap<Uuid, Vec<CommentWithAuthor>> = HashMap::new();
    let mut roots: Vec<CommentWithAuthor> = Vec::new();

    for entry in flat {
        match entry.comment.parent_id {
            None => roots.push(entry),
            Some(parent) => reply_buckets.entry(parent).or_default().push(entry),
        }
    }

    roots
        .into_iter()
        .map(|root| {
            let replies = reply_buckets.remove(&root.comment.id).unwrap_or_default();
            CommentThread {
                comment: root,
                replies,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, Comment};

    fn entry(post: Uuid, parent: Option<Uuid>) -> CommentWithAuthor {
        CommentWithAuthor {
            comment: Comment::new(Uuid::new_v4(), post, "hi".to_string(), parent, None),
            author: Author::default(),
        }
    }

    #[test]
    fn nests_replies_under_their_parents_in_order() {
        let post = Uuid::new_v4();
        let first = entry(post, None);
        let second = entry(post, None);
        let reply_a = entry(post, Some(first.comment.id));
        let reply_b = entry(post, Some(first.comment.id));

        let threads = assemble_threads(vec![
            first.clone(),
            reply_a.clone(),
            second.clone(),
            reply_b.clone(),
        ]);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.comment.id, first.comment.id);
        assert_eq!(threads[0].replies.len(), 2);
        assert_eq!(threads[0].replies[0].comment.id, reply_a.comment.id);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn drops_replies_to_missing_parents() {
        let post = Uuid::new_v4();
        let orphan = entry(post, Some(Uuid::new_v4()));
        let root = entry(post, None);

        let threads = assemble_threads(vec![orphan, root.clone()]);

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.comment.id, root.comment.id);
        assert!(threads[0].replies.is_empty());
    }

    #[test]
    fn empty_input_yields_no_threads() {
        assert!(assemble_threads(Vec::new()).is_empty());
    }
}
