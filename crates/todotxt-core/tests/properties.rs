#![allow(missing_docs)]

use proptest::prelude::*;

use todotxt_core::{
    DoneFilter, Priority, SortField, SortOrder, SortSpec, Task, TaskFilter, TaskFilterBuilder,
    parse_document, serialize_document,
};

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{1,40}",
        (
            prop::option::of("[A-Z]"),
            any::<bool>(),
            "[a-z ]{1,12}",
            prop::option::of("[a-z]{1,6}"),
            prop::option::of("[a-z]{1,6}"),
        )
            .prop_map(|(priority, done, words, project, context)| {
                let mut line = String::new();
                if done {
                    line.push_str("x ");
                }
                if let Some(priority) = priority {
                    line.push_str(&format!("({priority}) "));
                }
                line.push_str(&words);
                if let Some(project) = project {
                    line.push_str(&format!(" +{project}"));
                }
                if let Some(context) = context {
                    line.push_str(&format!(" @{context} due:{context}"));
                }
                line
            }),
    ]
}

fn numbered(lines: &[String]) -> Vec<Task> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let mut task = Task::parse(line);
            task.set_line_number(index + 1);
            task
        })
        .collect()
}

fn priority_strategy() -> impl Strategy<Value = Option<Priority>> {
    prop::option::of(prop::char::range('A', 'Z').prop_filter_map("letter", |c| Priority::new(c).ok()))
}

fn filter_strategy() -> impl Strategy<Value = TaskFilter> {
    (
        prop_oneof![
            Just(DoneFilter::DontCare),
            Just(DoneFilter::Include),
            Just(DoneFilter::Exclude)
        ],
        priority_strategy(),
        prop::option::of("[a-z]{1,3}"),
        "[a-z]{0,2}",
    )
        .prop_map(|(done, priority, project, text)| {
            let mut builder = TaskFilterBuilder::new().done(done).priority(priority).text(text);
            if let Some(project) = project {
                builder = builder.project(project);
            }
            builder.build()
        })
}

proptest! {
    #[test]
    fn parse_serialize_round_trip(lines in prop::collection::vec(line_strategy(), 0..24)) {
        let tasks = numbered(&lines);
        let serialized = serialize_document(&tasks);
        prop_assert_eq!(parse_document(&serialized), tasks);
    }

    #[test]
    fn single_line_round_trip(line in line_strategy()) {
        let task = Task::parse(&line);
        prop_assert_eq!(task.text(), line.as_str());
    }

    #[test]
    fn toggle_done_twice_is_identity(line in line_strategy()) {
        let original = Task::parse(&line);
        let mut task = original.clone();
        task.toggle_done();
        prop_assert_ne!(task.is_done(), original.is_done());
        task.toggle_done();
        prop_assert_eq!(task, original);
    }

    #[test]
    fn set_priority_is_idempotent(line in line_strategy(), priority in priority_strategy()) {
        let mut once = Task::parse(&line);
        once.set_priority(priority);
        let mut twice = once.clone();
        twice.set_priority(priority);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.priority(), priority);
    }

    #[test]
    fn mutated_tasks_agree_with_a_fresh_parse(line in line_strategy(), priority in priority_strategy()) {
        let mut task = Task::parse(&line);
        task.set_priority(priority);
        task.toggle_done();
        prop_assert_eq!(&task, &Task::parse(task.text()));
    }

    #[test]
    fn sort_is_idempotent(
        lines in prop::collection::vec(line_strategy(), 0..24),
        by_priority in any::<bool>(),
        descending in any::<bool>(),
    ) {
        let field = if by_priority { SortField::Priority } else { SortField::Text };
        let order = if descending { SortOrder::Descending } else { SortOrder::Ascending };
        let spec = SortSpec::new(field, order);

        let mut once = numbered(&lines);
        spec.sort(&mut once);
        let mut twice = once.clone();
        spec.sort(&mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn default_sort_never_puts_done_before_open(lines in prop::collection::vec(line_strategy(), 0..24)) {
        let mut tasks = numbered(&lines);
        SortSpec::default().sort(&mut tasks);
        let first_done = tasks.iter().position(Task::is_done).unwrap_or(tasks.len());
        prop_assert!(tasks[first_done..].iter().all(Task::is_done));
    }

    #[test]
    fn filter_returns_a_stable_subsequence(
        lines in prop::collection::vec(line_strategy(), 0..24),
        filter in filter_strategy(),
    ) {
        let tasks = numbered(&lines);
        let once = filter.apply(&tasks);
        let line_numbers: Vec<_> = once.iter().map(Task::line_number).collect();
        prop_assert!(line_numbers.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(once.iter().all(|task| tasks.contains(task)));
        prop_assert_eq!(filter.apply(&once), once);
    }
}
