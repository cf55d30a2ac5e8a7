//! Reply trees rebuilt from a flat comment list.

use crate::orm::comments;
use std::collections::HashMap;

/// A comment placed in its reply tree.
#[derive(Clone, Debug)]
pub struct ThreadedComment {
    /// Zero for top-level comments.
    pub depth: usize,
    pub comment: comments::Model,
    /// Deleted, but kept because replies below it are still visible.
    pub is_tombstone: bool,
}

impl ThreadedComment {
    /// Left indent in em for the template.
    pub fn indent(&self) -> usize {
        self.depth * 2
    }
}

/// Orders comments depth-first, each parent followed by its replies
/// oldest-first.
///
/// Deleted comments with no visible replies are dropped. Deleted comments
/// that still have visible replies become tombstones. A reply whose parent
/// is not in `comments` is treated as top-level.
pub fn build_reply_tree(mut comments: Vec<comments::Model>) -> Vec<ThreadedComment> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let index: HashMap<i32, usize> = comments
        .iter()
        .enumerate()
        .map(|(idx, comment)| (comment.id, idx))
        .collect();

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    for (idx, comment) in comments.iter().enumerate() {
        match comment.parent_id.and_then(|parent| index.get(&parent)) {
            Some(&parent) if parent != idx => children[parent].push(idx),
            _ => roots.push(idx),
        }
    }

    // Pre-order walk. The stack holds reversed siblings so the oldest pops first.
    let mut order: Vec<(usize, usize)> = Vec::with_capacity(comments.len());
    let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|&idx| (idx, 0)).collect();
    while let Some((idx, depth)) = stack.pop() {
        order.push((idx, depth));
        for &child in children[idx].iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    // Replies follow their parent in pre-order, so a reverse pass sees
    // every child before its parent.
    let mut visible = vec![false; comments.len()];
    for &(idx, _) in order.iter().rev() {
        visible[idx] =
            !comments[idx].is_deleted || children[idx].iter().any(|&child| visible[child]);
    }

    order
        .into_iter()
        .filter(|&(idx, _)| visible[idx])
        .map(|(idx, depth)| ThreadedComment {
            depth,
            comment: comments[idx].clone(),
            is_tombstone: comments[idx].is_deleted,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i32, parent_id: Option<i32>, minute: u32, is_deleted: bool) -> comments::Model {
        let created_at = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap();
        comments::Model {
            id,
            thread_id: Some(1),
            poll_id: None,
            author_id: Some(1),
            parent_id,
            content: format!("comment {}", id),
            attachment: None,
            views: 0,
            is_deleted,
            created_at,
            updated_at: created_at,
        }
    }

    fn shape(tree: &[ThreadedComment]) -> Vec<(i32, usize, bool)> {
        tree.iter()
            .map(|node| (node.comment.id, node.depth, node.is_tombstone))
            .collect()
    }

    #[test]
    fn test_replies_follow_parent_oldest_first() {
        let tree = build_reply_tree(vec![
            comment(4, Some(1), 4, false),
            comment(2, None, 2, false),
            comment(1, None, 1, false),
            comment(3, Some(1), 3, false),
            comment(5, Some(3), 5, false),
        ]);

        assert_eq!(
            shape(&tree),
            vec![
                (1, 0, false),
                (3, 1, false),
                (5, 2, false),
                (4, 1, false),
                (2, 0, false),
            ]
        );
        assert_eq!(tree[2].indent(), 4);
    }

    #[test]
    fn test_deleted_leaf_is_dropped() {
        let tree = build_reply_tree(vec![
            comment(1, None, 1, false),
            comment(2, Some(1), 2, true),
        ]);
        assert_eq!(shape(&tree), vec![(1, 0, false)]);
    }

    #[test]
    fn test_deleted_parent_with_replies_is_tombstone() {
        let tree = build_reply_tree(vec![
            comment(1, None, 1, true),
            comment(2, Some(1), 2, true),
            comment(3, Some(2), 3, false),
            comment(4, None, 4, true),
        ]);
        assert_eq!(
            shape(&tree),
            vec![(1, 0, true), (2, 1, true), (3, 2, false)]
        );
    }

    #[test]
    fn test_orphaned_reply_is_top_level() {
        let tree = build_reply_tree(vec![comment(7, Some(99), 1, false)]);
        assert_eq!(shape(&tree), vec![(7, 0, false)]);
    }

    #[test]
    fn test_empty() {
        assert!(build_reply_tree(Vec::new()).is_empty());
    }
}
