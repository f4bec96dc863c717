//! Derived, read-only views over a task list. Nothing here mutates its input.

use std::cmp::Ordering;

use chrono::{Local, NaiveDate};

use crate::model::{Criterion, SortKey, Task, TaskStats};

/// The local calendar date used for overdue checks.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn filter(tasks: &[Task], criterion: Criterion, today: NaiveDate) -> Vec<Task> {
    match criterion {
        Criterion::All => tasks.to_vec(),
        Criterion::Completed => tasks.iter().filter(|t| t.completed).cloned().collect(),
        Criterion::Pending => tasks.iter().filter(|t| !t.completed).cloned().collect(),
        Criterion::Overdue => tasks
            .iter()
            .filter(|t| t.is_overdue(today))
            .cloned()
            .collect(),
    }
}

/// Filter by criterion name; unrecognized names return the list unchanged.
pub fn filter_named(tasks: &[Task], name: &str, today: NaiveDate) -> Vec<Task> {
    filter(tasks, Criterion::parse_or_all(name), today)
}

/// Stable sort into a new list. Tasks without a due date go last under both due-date keys.
pub fn sort(tasks: &[Task], key: SortKey) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match key {
        SortKey::CreatedDesc => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::CreatedAsc => sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::DueDateAsc => sorted.sort_by(|a, b| compare_due(a, b, false)),
        SortKey::DueDateDesc => sorted.sort_by(|a, b| compare_due(a, b, true)),
        SortKey::PriorityDesc => sorted.sort_by(|a, b| b.priority.cmp(&a.priority)),
        SortKey::PriorityAsc => sorted.sort_by(|a, b| a.priority.cmp(&b.priority)),
    }
    sorted
}

fn compare_due(a: &Task, b: &Task, descending: bool) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    TaskStats {
        total,
        completed,
        pending: total - completed,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{Priority, TaskId};
    use crate::testing::task_fixture;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn mixed_list() -> Vec<Task> {
        let mut a = task_fixture("a", 0);
        a.priority = Priority::new(2).unwrap();
        a.due_date = Some(ymd(2024, 1, 10));
        let mut b = task_fixture("b", 5);
        b.completed = true;
        b.priority = Priority::new(5).unwrap();
        b.due_date = Some(ymd(2024, 1, 1));
        let mut c = task_fixture("c", 2);
        c.priority = Priority::new(1).unwrap();
        let mut d = task_fixture("d", 9);
        d.priority = Priority::new(4).unwrap();
        d.due_date = Some(ymd(2024, 2, 1));
        vec![a, b, c, d]
    }

    #[test]
    fn overdue_scenario_skips_completed_tasks() {
        let mut first = task_fixture("1", 0);
        first.due_date = Some(ymd(2020, 1, 1));
        let mut second = task_fixture("2", 1);
        second.due_date = Some(ymd(2020, 1, 1));
        second.completed = true;
        let list = vec![first, second];

        let overdue = filter(&list, Criterion::Overdue, ymd(2024, 6, 1));
        assert_eq!(ids(&overdue), vec!["1"]);
    }

    #[test]
    fn overdue_uses_strict_date_comparison() {
        let list = mixed_list();
        assert_eq!(ids(&filter(&list, Criterion::Overdue, ymd(2024, 1, 10))), Vec::<&str>::new());
        assert_eq!(ids(&filter(&list, Criterion::Overdue, ymd(2024, 1, 11))), vec!["a"]);
        assert_eq!(ids(&filter(&list, Criterion::Overdue, ymd(2024, 3, 1))), vec!["a", "d"]);
    }

    #[test]
    fn completed_and_pending_partition_the_list() {
        let list = mixed_list();
        let today = ymd(2024, 1, 15);
        let completed: BTreeSet<TaskId> = filter(&list, Criterion::Completed, today)
            .into_iter()
            .map(|t| t.id)
            .collect();
        let pending: BTreeSet<TaskId> = filter(&list, Criterion::Pending, today)
            .into_iter()
            .map(|t| t.id)
            .collect();
        let all: BTreeSet<TaskId> = list.iter().map(|t| t.id.clone()).collect();

        assert!(completed.is_disjoint(&pending));
        assert_eq!(&completed | &pending, all);
    }

    #[test]
    fn unknown_criterion_returns_input_unchanged() {
        let list = mixed_list();
        assert_eq!(filter_named(&list, "archived", ymd(2024, 1, 1)), list);
        assert_eq!(filter(&list, Criterion::All, ymd(2024, 1, 1)), list);
    }

    #[rstest]
    #[case(vec![], 0, 0)]
    #[case(vec![false], 1, 0)]
    #[case(vec![true, false, true], 3, 2)]
    fn stats_counts_sum_to_total(
        #[case] flags: Vec<bool>,
        #[case] total: usize,
        #[case] completed: usize,
    ) {
        let list: Vec<Task> = flags
            .iter()
            .enumerate()
            .map(|(idx, done)| {
                let mut task = task_fixture(&idx.to_string(), idx as i64);
                task.completed = *done;
                task
            })
            .collect();
        let counts = stats(&list);
        assert_eq!(counts.total, total);
        assert_eq!(counts.completed, completed);
        assert_eq!(counts.completed + counts.pending, counts.total);
    }

    #[test]
    fn sorts_by_creation_time() {
        let list = mixed_list();
        assert_eq!(ids(&sort(&list, SortKey::CreatedDesc)), vec!["d", "b", "c", "a"]);
        assert_eq!(ids(&sort(&list, SortKey::CreatedAsc)), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn priority_orders_are_reversals() {
        let list = mixed_list();
        let mut ascending = sort(&list, SortKey::PriorityAsc);
        ascending.reverse();
        assert_eq!(ascending, sort(&list, SortKey::PriorityDesc));
        assert_eq!(ids(&sort(&list, SortKey::PriorityDesc)), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn missing_due_dates_sort_last_both_ways() {
        let list = mixed_list();
        assert_eq!(ids(&sort(&list, SortKey::DueDateAsc)), vec!["b", "a", "d", "c"]);
        assert_eq!(ids(&sort(&list, SortKey::DueDateDesc)), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn sort_is_stable_and_leaves_input_alone() {
        let list = vec![task_fixture("x", 1), task_fixture("y", 1), task_fixture("z", 1)];
        let before = list.clone();
        assert_eq!(ids(&sort(&list, SortKey::CreatedDesc)), vec!["x", "y", "z"]);
        assert_eq!(list, before);
    }
}
