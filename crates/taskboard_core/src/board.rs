use crate::error::AppError;
use crate::input::InputController;
use crate::model::{Task, TaskId, TaskPhase, Timestamp};
use crate::scheduler::{DEFAULT_HIDE_DELAY_SECS, HideScheduler, PendingHide};
use crate::stats::Stats;
use crate::storage::Slots;
use crate::storage::json_store::{self, LoadSource};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardOptions {
    pub hide_delay: Duration,
    pub keep_position_on_complete: bool,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            hide_delay: Duration::seconds(DEFAULT_HIDE_DELAY_SECS as i64),
            keep_position_on_complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Completed { task: Task, hide_at: OffsetDateTime },
    AlreadyCompleted,
    NotFound,
}

/// What the renderer needs: figures, the input field and the rows to draw.
#[derive(Debug, Clone)]
pub struct BoardView<'a> {
    pub stats: Stats,
    pub input: &'a str,
    pub tasks: Vec<&'a Task>,
}

/// The task list, its pending input and hide deadlines, mirrored to a slot.
///
/// Every mutation builds the next list on the side, writes it, and only then
/// swaps it in; a failed write leaves the board as it was.
#[derive(Debug)]
pub struct TaskBoard<S: Slots> {
    slots: S,
    tasks: Vec<Task>,
    input: InputController,
    stats: Stats,
    scheduler: HideScheduler,
    options: BoardOptions,
    load_source: LoadSource,
}

impl<S: Slots> TaskBoard<S> {
    #[tracing::instrument(skip(slots))]
    pub fn load(slots: S, options: BoardOptions) -> Self {
        let loaded = json_store::load_tasks(&slots);
        let mut tasks = loaded.tasks;

        let mut reopened = 0;
        for task in tasks.iter_mut().filter(|task| !task.completed && !task.visible) {
            task.visible = true;
            reopened += 1;
        }
        if reopened > 0 {
            info!(count = reopened, "open tasks stored as hidden, showing them");
        }

        let scheduler = HideScheduler::rederive(options.hide_delay, &tasks);
        let stats = Stats::from_tasks(&tasks);
        debug!(
            source = ?loaded.source,
            total = stats.total,
            pending_hides = scheduler.pending().len(),
            "loaded board"
        );

        Self {
            slots,
            tasks,
            input: InputController::default(),
            stats,
            scheduler,
            options,
            load_source: loaded.source,
        }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.visible)
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn input(&self) -> &str {
        self.input.value()
    }

    pub fn set_input(&mut self, text: &str) {
        self.input.set(text);
    }

    /// Accepts a full id or the bare number of a `task-<n>` id.
    pub fn resolve_id(&self, text: &str) -> Option<TaskId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(task) = self.tasks.iter().find(|task| task.id.matches(trimmed)) {
            return Some(task.id.clone());
        }

        let counter: u64 = trimmed.parse().ok()?;
        self.tasks
            .iter()
            .find(|task| task.id.counter() == Some(counter))
            .map(|task| task.id.clone())
    }

    pub fn next_hide_at(&self) -> Option<OffsetDateTime> {
        self.scheduler.next_fire_at()
    }

    pub fn pending_hides(&self) -> &[PendingHide] {
        self.scheduler.pending()
    }

    pub fn view(&self) -> BoardView<'_> {
        BoardView {
            stats: self.stats,
            input: self.input.value(),
            tasks: self.visible_tasks().collect(),
        }
    }

    /// Appends a task named `name` verbatim; empty names are allowed.
    pub fn add(&mut self, name: &str, now: OffsetDateTime) -> Result<Task, AppError> {
        let task = Task::new(self.next_id()?, name, Timestamp::from_datetime(now)?);

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.extend(self.tasks.iter().cloned());
        next.push(task.clone());
        self.commit(next)?;

        self.input.clear();
        debug!(id = %task.id, total = self.stats.total, "added task");
        Ok(task)
    }

    /// Adds whatever is in the input field.
    pub fn submit_input(&mut self, now: OffsetDateTime) -> Result<Task, AppError> {
        let name = self.input.value().to_string();
        self.add(&name, now)
    }

    /// Marks a task completed and schedules it to be hidden.
    ///
    /// The completed copy goes to the end of the list unless
    /// `keep_position_on_complete` is set.
    pub fn complete(&mut self, id: &TaskId, now: OffsetDateTime) -> Result<Completion, AppError> {
        let Some(index) = self.tasks.iter().position(|task| &task.id == id) else {
            return Ok(Completion::NotFound);
        };

        if self.tasks[index].completed {
            return Ok(Completion::AlreadyCompleted);
        }

        let mut updated = self.tasks[index].clone();
        updated.completed = true;
        updated.completed_at = Some(Timestamp::from_datetime(now)?);

        let next: Vec<Task> = if self.options.keep_position_on_complete {
            self.tasks
                .iter()
                .enumerate()
                .map(|(position, task)| {
                    if position == index {
                        updated.clone()
                    } else {
                        task.clone()
                    }
                })
                .collect()
        } else {
            self.tasks
                .iter()
                .enumerate()
                .filter(|(position, _)| *position != index)
                .map(|(_, task)| task.clone())
                .chain(std::iter::once(updated.clone()))
                .collect()
        };
        self.commit(next)?;

        let hide_at = self.scheduler.schedule(updated.id.clone(), now);
        debug!(id = %updated.id, %hide_at, "completed task");

        Ok(Completion::Completed {
            task: updated,
            hide_at,
        })
    }

    /// Hides every completed task whose deadline has passed. Returns how many
    /// were hidden; deadlines for tasks no longer on the board are dropped.
    pub fn tick(&mut self, now: OffsetDateTime) -> Result<usize, AppError> {
        let due = self.scheduler.take_due(now);
        if due.is_empty() {
            return Ok(0);
        }

        let mut next = self.tasks.clone();
        let mut hidden = 0;
        for entry in &due {
            match next
                .iter_mut()
                .find(|task| task.id == entry.task_id && task.phase() == TaskPhase::Completed)
            {
                Some(task) => {
                    task.visible = false;
                    hidden += 1;
                    debug!(id = %entry.task_id, "hid completed task");
                }
                None => debug!(id = %entry.task_id, "hide target gone, skipping"),
            }
        }

        if hidden == 0 {
            return Ok(0);
        }

        if let Err(err) = self.commit(next) {
            self.scheduler.requeue(due);
            return Err(err);
        }

        Ok(hidden)
    }

    fn next_id(&self) -> Result<TaskId, AppError> {
        let highest = self
            .tasks
            .iter()
            .filter_map(|task| task.id.counter())
            .max()
            .unwrap_or(0);
        let next = highest.checked_add(1).ok_or_else(|| {
            AppError::invalid_data(format!(
                "no task ids left after {}",
                TaskId::from_counter(highest)
            ))
        })?;
        Ok(TaskId::from_counter(next))
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), AppError> {
        json_store::save_tasks(&self.slots, &next)?;
        self.tasks = next;
        self.stats = Stats::from_tasks(&self.tasks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardOptions, Completion, TaskBoard};
    use crate::error::AppError;
    use crate::model::{TaskId, TaskPhase};
    use crate::scheduler::NEVER;
    use crate::storage::json_store::{LoadSource, TASKS_KEY, load_tasks};
    use crate::storage::{MemorySlots, Slots};
    use std::cell::Cell;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    const T0: OffsetDateTime = datetime!(2025-12-20 10:00:00 UTC);

    fn board() -> TaskBoard<MemorySlots> {
        TaskBoard::load(MemorySlots::new(), BoardOptions::default())
    }

    fn names<S: Slots>(board: &TaskBoard<S>) -> Vec<&str> {
        board.tasks().iter().map(|task| task.name.as_str()).collect()
    }

    fn completed(outcome: Completion) -> crate::model::Task {
        match outcome {
            Completion::Completed { task, .. } => task,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    /// Slots whose writes can be switched off.
    #[derive(Default)]
    struct FlakySlots {
        inner: MemorySlots,
        fail_writes: Cell<bool>,
    }

    impl Slots for FlakySlots {
        fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
            if self.fail_writes.get() {
                return Err(AppError::slot(key, "read-only"));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn empty_board_has_zero_stats() {
        let board = board();
        let stats = board.stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completed_pct, 0);
        assert_eq!(stats.pending_pct, 0);
        assert_eq!(board.load_source(), LoadSource::Missing);
    }

    #[test]
    fn adding_n_tasks_gives_n_distinct_ids() {
        let mut board = board();
        for index in 0..25 {
            board.add(&format!("task {index}"), T0).unwrap();
        }

        assert_eq!(board.stats().total, 25);
        let mut ids: Vec<String> = board.tasks().iter().map(|t| t.id.to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn add_appends_and_persists() {
        let mut board = board();
        let first = board.add("A", T0).unwrap();
        let second = board.add("B", T0).unwrap();

        assert_eq!(first.id, TaskId::from_counter(1));
        assert_eq!(second.id, TaskId::from_counter(2));
        assert_eq!(names(&board), vec!["A", "B"]);
        assert!(!second.completed);
        assert!(second.visible);

        let stored = load_tasks(board.slots());
        assert_eq!(stored.tasks, board.tasks());
    }

    #[test]
    fn add_accepts_empty_names_and_clears_input() {
        let mut board = board();
        board.set_input("draft");
        let task = board.add("", T0).unwrap();

        assert_eq!(task.name, "");
        assert_eq!(board.input(), "");
        assert_eq!(board.view().tasks.len(), 1);
    }

    #[test]
    fn submit_input_uses_pending_text() {
        let mut board = board();
        board.set_input("Buy milk");
        let task = board.submit_input(T0).unwrap();

        assert_eq!(task.name, "Buy milk");
        assert_eq!(board.input(), "");
    }

    #[test]
    fn ids_continue_after_the_highest_stored_counter() {
        let slots = MemorySlots::with_value(
            TASKS_KEY,
            r#"{"items":[
                {"name":"old","timestamp":"x","finished":false,"uuid":"task-9","visible":true},
                {"name":"legacy","timestamp":"x","finished":false,"uuid":0.25,"visible":true}
            ]}"#,
        );
        let mut board = TaskBoard::load(slots, BoardOptions::default());
        let task = board.add("new", T0).unwrap();

        assert_eq!(task.id, TaskId::from_counter(10));
    }

    #[test]
    fn exhausted_id_counter_is_an_error_not_a_duplicate() {
        let slots = MemorySlots::with_value(
            TASKS_KEY,
            r#"{"items":[
                {"name":"last","timestamp":"x","finished":false,"uuid":"task-18446744073709551615","visible":true}
            ]}"#,
        );
        let mut board = TaskBoard::load(&slots, BoardOptions::default());
        let stored_before = slots.get(TASKS_KEY).unwrap();

        let err = board.add("one more", T0).unwrap_err();

        assert_eq!(err.code(), "invalid_data");
        assert_eq!(names(&board), vec!["last"]);
        assert_eq!(slots.get(TASKS_KEY).unwrap(), stored_before);
    }

    #[test]
    fn buy_milk_scenario() {
        let mut board = board();
        let task = board.add("Buy milk", T0).unwrap();
        let stats = board.stats();
        assert_eq!((stats.total, stats.completed_pct, stats.pending_pct), (1, 0, 100));

        let done = completed(board.complete(&task.id, T0).unwrap());
        let stats = board.stats();
        assert!(done.completed);
        assert_eq!((stats.completed_pct, stats.pending_pct), (100, 0));
        assert_eq!(board.view().tasks.len(), 1);

        assert_eq!(board.tick(T0 + Duration::seconds(29)).unwrap(), 0);
        assert_eq!(board.view().tasks.len(), 1);

        assert_eq!(board.tick(T0 + Duration::seconds(30)).unwrap(), 1);
        assert!(board.view().tasks.is_empty());
        assert_eq!(board.stats().total, 1);
        assert_eq!(board.tasks()[0].phase(), TaskPhase::Hidden);
    }

    #[test]
    fn two_tasks_half_complete() {
        let mut board = board();
        let a = board.add("A", T0).unwrap();
        board.add("B", T0).unwrap();
        assert_eq!(board.stats().total, 2);

        board.complete(&a.id, T0).unwrap();
        let stats = board.stats();
        assert_eq!(stats.completed_pct, 50);
        assert_eq!(stats.pending_pct, 50);
    }

    #[test]
    fn completing_moves_the_task_last() {
        let mut board = board();
        let a = board.add("A", T0).unwrap();
        board.add("B", T0).unwrap();
        board.add("C", T0).unwrap();

        board.complete(&a.id, T0).unwrap();

        assert_eq!(names(&board), vec!["B", "C", "A"]);
        let last = board.tasks().last().unwrap();
        assert!(last.completed);
        assert!(last.visible);
        assert!(last.completed_at.is_some());
    }

    #[test]
    fn keep_position_option_updates_in_place() {
        let options = BoardOptions {
            keep_position_on_complete: true,
            ..BoardOptions::default()
        };
        let mut board = TaskBoard::load(MemorySlots::new(), options);
        let a = board.add("A", T0).unwrap();
        board.add("B", T0).unwrap();

        board.complete(&a.id, T0).unwrap();

        assert_eq!(names(&board), vec!["A", "B"]);
        assert!(board.tasks()[0].completed);
    }

    #[test]
    fn completing_unknown_id_changes_nothing() {
        let mut board = board();
        board.add("A", T0).unwrap();
        let before = board.tasks().to_vec();
        let stored_before = board.slots().get(TASKS_KEY).unwrap();

        let outcome = board.complete(&TaskId::from_counter(42), T0).unwrap();

        assert_eq!(outcome, Completion::NotFound);
        assert_eq!(board.tasks(), before.as_slice());
        assert_eq!(board.slots().get(TASKS_KEY).unwrap(), stored_before);
        assert!(board.next_hide_at().is_none());
    }

    #[test]
    fn completing_twice_is_a_no_op() {
        let mut board = board();
        let a = board.add("A", T0).unwrap();
        board.complete(&a.id, T0).unwrap();

        let later = T0 + Duration::seconds(10);
        let outcome = board.complete(&a.id, later).unwrap();

        assert_eq!(outcome, Completion::AlreadyCompleted);
        assert_eq!(board.next_hide_at(), Some(T0 + Duration::seconds(30)));
    }

    #[test]
    fn hide_resolves_by_id_after_later_mutations() {
        let mut board = board();
        let a = board.add("A", T0).unwrap();
        let b = board.add("B", T0).unwrap();
        board.add("C", T0).unwrap();

        board.complete(&a.id, T0).unwrap();
        board.complete(&b.id, T0 + Duration::seconds(5)).unwrap();
        board.add("D", T0 + Duration::seconds(6)).unwrap();

        assert_eq!(board.tick(T0 + Duration::seconds(30)).unwrap(), 1);
        let hidden: Vec<&str> = board
            .tasks()
            .iter()
            .filter(|task| !task.visible)
            .map(|task| task.name.as_str())
            .collect();
        assert_eq!(hidden, vec!["A"]);

        assert_eq!(board.tick(T0 + Duration::seconds(35)).unwrap(), 1);
        let visible: Vec<&str> = board.visible_tasks().map(|task| task.name.as_str()).collect();
        assert_eq!(visible, vec!["C", "D"]);
    }

    #[test]
    fn delay_past_the_calendar_keeps_the_task_visible() {
        let options = BoardOptions {
            hide_delay: Duration::seconds(i64::MAX),
            ..BoardOptions::default()
        };
        let slots = MemorySlots::new();
        let mut board = TaskBoard::load(&slots, options);
        let a = board.add("A", T0).unwrap();

        match board.complete(&a.id, T0).unwrap() {
            Completion::Completed { hide_at, .. } => assert_eq!(hide_at, NEVER),
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(board.tick(T0).unwrap(), 0);
        assert_eq!(board.tick(T0 + Duration::days(365 * 100)).unwrap(), 0);

        let mut reloaded = TaskBoard::load(&slots, options);
        assert_eq!(reloaded.next_hide_at(), Some(NEVER));
        assert_eq!(reloaded.tick(T0 + Duration::days(365)).unwrap(), 0);
        assert_eq!(reloaded.view().tasks.len(), 1);
    }

    #[test]
    fn hide_is_persisted() {
        let slots = MemorySlots::new();
        let mut board = TaskBoard::load(&slots, BoardOptions::default());
        let a = board.add("A", T0).unwrap();
        board.complete(&a.id, T0).unwrap();
        board.tick(T0 + Duration::minutes(1)).unwrap();

        let stored = load_tasks(&slots);
        assert!(!stored.tasks[0].visible);
    }

    #[test]
    fn reload_round_trips_names_and_flags() {
        let slots = MemorySlots::new();
        {
            let mut board = TaskBoard::load(&slots, BoardOptions::default());
            let a = board.add("Buy milk", T0).unwrap();
            board.add("Walk dog", T0).unwrap();
            board.add("", T0).unwrap();
            board.complete(&a.id, T0).unwrap();
        }

        let reloaded = TaskBoard::load(&slots, BoardOptions::default());
        let flags: Vec<(&str, bool)> = reloaded
            .tasks()
            .iter()
            .map(|task| (task.name.as_str(), task.completed))
            .collect();

        assert_eq!(reloaded.load_source(), LoadSource::Stored);
        assert_eq!(
            flags,
            vec![("Walk dog", false), ("", false), ("Buy milk", true)]
        );
        assert_eq!(reloaded.stats().completed_pct, 34);
    }

    #[test]
    fn reload_rederives_pending_hides() {
        let slots = MemorySlots::new();
        {
            let mut board = TaskBoard::load(&slots, BoardOptions::default());
            let a = board.add("A", T0).unwrap();
            board.complete(&a.id, T0).unwrap();
        }

        let mut reloaded = TaskBoard::load(&slots, BoardOptions::default());
        assert_eq!(reloaded.pending_hides().len(), 1);
        assert_eq!(reloaded.next_hide_at(), Some(T0 + Duration::seconds(30)));
        assert_eq!(reloaded.tick(T0 + Duration::seconds(10)).unwrap(), 0);
        assert_eq!(reloaded.tick(T0 + Duration::seconds(30)).unwrap(), 1);
        assert!(reloaded.view().tasks.is_empty());
    }

    #[test]
    fn legacy_completed_tasks_without_time_stay_visible() {
        let slots = MemorySlots::with_value(
            TASKS_KEY,
            r#"{"items":[{"name":"old","timestamp":"2023-05-01T12:00:00.000Z","finished":true,"uuid":0.5,"visible":true}]}"#,
        );
        let mut board = TaskBoard::load(slots, BoardOptions::default());

        assert!(board.next_hide_at().is_none());
        assert_eq!(board.tick(T0 + Duration::days(365)).unwrap(), 0);
        assert_eq!(board.view().tasks.len(), 1);
    }

    #[test]
    fn open_tasks_stored_hidden_are_shown() {
        let slots = MemorySlots::with_value(
            TASKS_KEY,
            r#"{"items":[{"name":"odd","timestamp":"x","finished":false,"uuid":"task-1","visible":false}]}"#,
        );
        let board = TaskBoard::load(slots, BoardOptions::default());
        assert_eq!(board.view().tasks.len(), 1);
    }

    #[test]
    fn malformed_slot_starts_empty() {
        let slots = MemorySlots::with_value(TASKS_KEY, "not json at all");
        let mut board = TaskBoard::load(slots, BoardOptions::default());

        assert_eq!(board.load_source(), LoadSource::Malformed);
        assert_eq!(board.stats().total, 0);
        board.add("fresh", T0).unwrap();
        assert_eq!(board.stats().total, 1);
    }

    #[test]
    fn resolve_id_accepts_full_id_or_counter() {
        let mut board = board();
        board.add("A", T0).unwrap();
        board.add("B", T0).unwrap();

        assert_eq!(board.resolve_id("task-2"), Some(TaskId::from_counter(2)));
        assert_eq!(board.resolve_id(" 1 "), Some(TaskId::from_counter(1)));
        assert_eq!(board.resolve_id("3"), None);
        assert_eq!(board.resolve_id(""), None);
    }

    #[test]
    fn failed_write_leaves_board_unchanged() {
        let slots = FlakySlots::default();
        let mut board = TaskBoard::load(&slots, BoardOptions::default());
        let a = board.add("A", T0).unwrap();
        board.set_input("B");

        slots.fail_writes.set(true);
        let err = board.submit_input(T0).unwrap_err();
        assert_eq!(err.code(), "slot_error");
        assert_eq!(board.stats().total, 1);
        assert_eq!(board.input(), "B");

        assert!(board.complete(&a.id, T0).is_err());
        assert!(!board.tasks()[0].completed);
        assert!(board.next_hide_at().is_none());
    }

    #[test]
    fn failed_hide_write_is_retried() {
        let slots = FlakySlots::default();
        let mut board = TaskBoard::load(&slots, BoardOptions::default());
        let a = board.add("A", T0).unwrap();
        board.complete(&a.id, T0).unwrap();

        let later = T0 + Duration::minutes(1);
        slots.fail_writes.set(true);
        assert!(board.tick(later).is_err());
        assert!(board.tasks()[0].visible);

        slots.fail_writes.set(false);
        assert_eq!(board.tick(later).unwrap(), 1);
        assert!(!board.tasks()[0].visible);
    }
}
