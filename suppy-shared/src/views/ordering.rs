//! Display ordering for tasks and notes
//!
//! Tasks are stored and listed newest first, but the task board shows them by
//! urgency. Notes are already ordered by the store; [`sort_notes`] restores the
//! same order after an in-memory change.

use std::cmp::Ordering;

use crate::models::note::Note;
use crate::models::task::Task;

/// Orders tasks by priority (urgent first), then newest created first
pub fn sort_tasks_for_display(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

/// Orders notes favorite first, then most recently updated first
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(compare_notes);
}

fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.status
        .priority()
        .cmp(&b.status.priority())
        .then_with(|| b.created_at.cmp(&a.created_at))
}

fn compare_notes(a: &Note, b: &Note) -> Ordering {
    b.is_favorite
        .cmp(&a.is_favorite)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn task(status: TaskStatus, created_at: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            client_id: Uuid::nil(),
            description: String::new(),
            status,
            created_at,
            updated_at: created_at,
            client: None,
        }
    }

    fn note(title: &str, is_favorite: bool, updated_at: DateTime<Utc>) -> Note {
        Note {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.to_string(),
            content: String::new(),
            is_favorite,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn test_tasks_sorted_by_priority() {
        let t0 = Utc::now();
        // created in this order, store returns newest first
        let mut tasks = vec![
            task(TaskStatus::InProgress, t0 + Duration::seconds(3)),
            task(TaskStatus::Pending, t0 + Duration::seconds(2)),
            task(TaskStatus::Urgent, t0 + Duration::seconds(1)),
            task(TaskStatus::Done, t0),
        ];

        sort_tasks_for_display(&mut tasks);

        let statuses: Vec<_> = tasks.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![
                TaskStatus::Urgent,
                TaskStatus::InProgress,
                TaskStatus::Pending,
                TaskStatus::Done
            ]
        );
    }

    #[test]
    fn test_same_priority_newest_first() {
        let t0 = Utc::now();
        let older = task(TaskStatus::Urgent, t0);
        let newer = task(TaskStatus::Urgent, t0 + Duration::minutes(5));
        let (older_id, newer_id) = (older.id, newer.id);

        let mut tasks = vec![older, newer];
        sort_tasks_for_display(&mut tasks);

        assert_eq!(tasks[0].id, newer_id);
        assert_eq!(tasks[1].id, older_id);
    }

    #[test]
    fn test_notes_favorite_first_then_recent() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(1);
        let t2 = t0 + Duration::seconds(2);

        let mut notes = vec![note("A", false, t1), note("B", true, t0), note("C", false, t2)];
        sort_notes(&mut notes);

        let titles: Vec<_> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_empty_lists() {
        let mut tasks: Vec<Task> = vec![];
        let mut notes: Vec<Note> = vec![];
        sort_tasks_for_display(&mut tasks);
        sort_notes(&mut notes);
        assert!(tasks.is_empty() && notes.is_empty());
    }
}
