use super::{PostRepository, Result, check_limit};
use crate::types::{AdjacentRef, Direction, Neighbors, Post};
use chrono::NaiveDate;
use std::cmp::Reverse;

/// In-process repository over a fixed set of posts.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    posts: Vec<Post>,
}

impl MemoryRepository {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn insert(&mut self, post: Post) {
        self.posts.push(post);
    }
}

fn adjacent(post: &Post, direction: Direction) -> AdjacentRef {
    AdjacentRef {
        id: post.id,
        subject: post.subject.clone(),
        post_date: post.post_date,
        direction,
    }
}

impl PostRepository for MemoryRepository {
    fn latest(&self, limit: u32) -> Result<Vec<Post>> {
        check_limit(limit)?;
        let mut posts = self.posts.clone();
        posts.sort_by_key(|p| Reverse((p.post_date, p.id)));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    fn by_date_and_subject(&self, date: NaiveDate, subject: &str) -> Result<Option<Post>> {
        Ok(self
            .posts
            .iter()
            .filter(|p| p.post_date.date() == date && p.subject == subject)
            .min_by_key(|p| p.id)
            .cloned())
    }

    fn neighbors(&self, post_id: i64) -> Result<Neighbors> {
        let previous = self
            .posts
            .iter()
            .filter(|p| p.id < post_id)
            .max_by_key(|p| p.id)
            .map(|p| adjacent(p, Direction::Previous));
        let next = self
            .posts
            .iter()
            .filter(|p| p.id > post_id)
            .min_by_key(|p| p.id)
            .map(|p| adjacent(p, Direction::Next));
        Ok(Neighbors { previous, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;
    use crate::test_helpers::{day, post};

    fn repo() -> MemoryRepository {
        MemoryRepository::new(vec![
            post(1, "first", "2024-01-01 09:00:00"),
            post(2, "second", "2024-02-01 09:00:00"),
            post(5, "fifth", "2024-03-05 23:59:00"),
            post(7, "seventh", "2024-04-01 09:00:00"),
        ])
    }

    #[test]
    fn latest_is_newest_first_and_bounded() {
        let posts = repo().latest(3).unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 5, 2]);
    }

    #[test]
    fn inserted_posts_are_queryable() {
        let mut repo = repo();
        repo.insert(post(9, "ninth", "2024-05-01 09:00:00"));

        assert_eq!(repo.latest(1).unwrap()[0].id, 9);
        assert_eq!(repo.neighbors(7).unwrap().next.map(|p| p.id), Some(9));
        assert!(
            repo.by_date_and_subject(day("2024-05-01"), "ninth")
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn latest_with_large_limit_returns_everything() {
        assert_eq!(repo().latest(100).unwrap().len(), 4);
    }

    #[test]
    fn latest_rejects_zero() {
        assert!(matches!(
            repo().latest(0),
            Err(RepositoryError::InvalidLimit(0))
        ));
    }

    #[test]
    fn lookup_matches_calendar_day() {
        let found = repo()
            .by_date_and_subject(day("2024-03-05"), "fifth")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, 5);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let found = repo().by_date_and_subject(day("2024-03-05"), "Fifth").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn lookup_wrong_day_is_none() {
        let found = repo().by_date_and_subject(day("2024-03-06"), "fifth").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn neighbors_skip_id_gaps() {
        let n = repo().neighbors(5).unwrap();
        assert_eq!(n.previous.as_ref().map(|p| p.id), Some(2));
        assert_eq!(n.next.as_ref().map(|p| p.id), Some(7));
        assert_eq!(n.previous.unwrap().direction, Direction::Previous);
        assert_eq!(n.next.unwrap().direction, Direction::Next);
    }

    #[test]
    fn neighbors_at_the_ends() {
        let first = repo().neighbors(1).unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.next.map(|p| p.id), Some(2));

        let last = repo().neighbors(7).unwrap();
        assert_eq!(last.previous.map(|p| p.id), Some(5));
        assert!(last.next.is_none());
    }

    #[test]
    fn neighbors_of_unknown_id_still_bracket_it() {
        let n = repo().neighbors(3).unwrap();
        assert_eq!(n.previous.map(|p| p.id), Some(2));
        assert_eq!(n.next.map(|p| p.id), Some(5));
    }
}
