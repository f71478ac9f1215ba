use pretty_assertions::assert_eq;

use super::*;
use crate::clock::ManualClock;
use crate::models::{SortKey, TaskFilter, NO_DUE_DATE};
use crate::testing::{sample_tasks, FakeBackend};

const NOW: i64 = 1_729_600_000_000;

type Reconciler = TaskReconciler<FakeBackend, ManualClock>;

fn local() -> Reconciler {
    TaskReconciler::local(ManualClock::new(NOW)).with_tasks(sample_tasks())
}

fn remote() -> (Reconciler, FakeBackend) {
    let backend = FakeBackend::healthy().with_tasks(sample_tasks());
    let reconciler =
        TaskReconciler::remote(backend.clone(), ManualClock::new(NOW)).with_tasks(sample_tasks());
    (reconciler, backend)
}

fn ids(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|task| task.id.to_string()).collect()
}

#[test]
fn filters_split_fixture_into_four_two_two() {
    let list = TaskList::from_tasks(sample_tasks());
    let counts = TaskFilter::ALL
        .iter()
        .map(|filter| list.filtered(&TaskQuery::new(*filter)).len())
        .collect::<Vec<_>>();
    assert_eq!(counts, vec![4, 2, 2]);
    assert_eq!(list.count(TaskFilter::Completed), 2);
}

#[test]
fn search_ignores_case() {
    let list = TaskList::from_tasks(sample_tasks());
    for needle in ["gym", "GYM", "Gym", " gYm "] {
        let matches = list.filtered(&TaskQuery::default().with_search(needle));
        assert_eq!(matches.len(), 1, "needle {needle:?}");
        assert_eq!(matches[0].title, "Renew gym membership");
    }
}

#[test]
fn search_keeps_surrounding_whitespace() {
    let list = TaskList::from_tasks(sample_tasks());
    assert!(list
        .filtered(&TaskQuery::default().with_search("  gym"))
        .is_empty());
    assert!(list
        .filtered(&TaskQuery::default().with_search("groceries "))
        .is_empty());
    assert_eq!(list.filtered(&TaskQuery::default().with_search(" ")).len(), 4);
}

#[test]
fn search_and_filter_compose() {
    let list = TaskList::from_tasks(sample_tasks());
    let completed_q4 = list.filtered(&TaskQuery::new(TaskFilter::Completed).with_search("q4"));
    assert_eq!(ids(&completed_q4), vec!["4"]);

    let active_report = list.filtered(&TaskQuery::new(TaskFilter::Active).with_search("report"));
    assert!(active_report.is_empty());
}

#[test]
fn sorting_projects_without_reordering_collection() {
    let list = TaskList::from_tasks(sample_tasks());

    let by_due = list.filtered(&TaskQuery::default().with_sort(SortKey::DueDate));
    assert_eq!(ids(&by_due), vec!["4", "3", "1", "2"]);

    let by_created = list.filtered(&TaskQuery::default().with_sort(SortKey::Created));
    assert_eq!(ids(&by_created), vec!["4", "3", "2", "1"]);

    assert_eq!(list.tasks(), sample_tasks().as_slice());
}

#[tokio::test]
async fn blank_description_is_rejected_without_side_effects() {
    let mut reconciler = local();
    let (mut remote, backend) = remote();

    for description in ["", "   ", "\t\n"] {
        let draft = TaskDraft::new(description);
        assert!(!draft.is_submittable());

        let error = reconciler.add(&draft).await.expect_err("blank draft");
        assert!(error.is_validation());
        let error = remote.add(&draft).await.expect_err("blank draft");
        assert!(error.is_validation());
    }

    assert_eq!(reconciler.tasks().len(), 4);
    assert_eq!(remote.tasks().len(), 4);
    assert_eq!(backend.mutation_calls(), 0);
    assert_eq!(remote.last_error(), None);
}

#[tokio::test]
async fn local_add_defaults_due_date_and_goes_first() {
    let mut reconciler = local();

    let task = reconciler
        .add(&TaskDraft::new("Buy milk"))
        .await
        .expect("valid draft");

    assert_eq!(task.id, TaskId::from_millis(NOW));
    assert_eq!(task.due_date, None);
    assert_eq!(task.due_date_label(), NO_DUE_DATE);
    assert!(!task.is_completed);
    assert_eq!(task.added_at, NOW);
    assert_eq!(reconciler.tasks().len(), 5);
    assert_eq!(reconciler.tasks()[0].title, "Buy milk");
}

#[tokio::test]
async fn local_ids_stay_unique_within_one_millisecond() {
    let mut reconciler: Reconciler = TaskReconciler::local(ManualClock::new(NOW));

    let first = reconciler.add(&TaskDraft::new("One")).await.expect("valid");
    let second = reconciler.add(&TaskDraft::new("Two")).await.expect("valid");

    assert_ne!(first.id, second.id);
    assert_eq!(ids(&reconciler.visible(&TaskQuery::default())), vec![
        second.id.to_string(),
        first.id.to_string()
    ]);
}

#[tokio::test]
async fn local_add_rejects_malformed_due_date() {
    let mut reconciler = local();
    let draft = TaskDraft::new("Pay rent").with_due_date("next friday");

    assert!(reconciler.add(&draft).await.is_err());
    assert_eq!(reconciler.tasks().len(), 4);
}

#[tokio::test]
async fn toggling_twice_restores_completion() {
    let mut reconciler = local();
    let id = TaskId::new("3");

    let once = reconciler.toggle(&id).await.expect("known id");
    assert!(once.is_completed);
    let twice = reconciler.toggle(&id).await.expect("known id");
    assert!(!twice.is_completed);
    assert_eq!(reconciler.tasks(), sample_tasks().as_slice());
}

#[tokio::test]
async fn remote_toggle_twice_restores_completion() {
    let (mut reconciler, backend) = remote();
    let id = TaskId::new("4");

    reconciler.toggle(&id).await.expect("backend accepts");
    reconciler.toggle(&id).await.expect("backend accepts");

    assert!(reconciler.list().require(&id).expect("present").is_completed);
    assert_eq!(backend.mutation_calls(), 2);
}

#[tokio::test]
async fn toggle_unknown_id_is_not_found() {
    let mut reconciler = local();
    let error = reconciler
        .toggle(&TaskId::new("missing"))
        .await
        .expect_err("unknown id");
    assert!(matches!(error, Error::NotFound(_)));
}

#[tokio::test]
async fn edit_replaces_fields_in_place() {
    let mut reconciler = local();
    let id = TaskId::new("2");
    let mut edit = TaskEdit::from_task(reconciler.list().require(&id).expect("present"));
    edit.title = "  Buy groceries and flowers ".to_string();
    edit.is_completed = false;
    edit.due_date = Some("2024-10-30".to_string());

    let saved = reconciler.save_edit(&id, &edit).await.expect("valid edit");

    assert_eq!(saved.title, "Buy groceries and flowers");
    assert_eq!(saved.due_date.as_deref(), Some("2024-10-30"));
    assert_eq!(reconciler.tasks()[2], saved);
}

#[tokio::test]
async fn edit_with_blank_title_is_rejected() {
    let (mut reconciler, backend) = remote();
    let id = TaskId::new("1");
    let mut edit = TaskEdit::from_task(reconciler.list().require(&id).expect("present"));
    edit.title = "   ".to_string();
    assert!(!edit.is_submittable());

    let error = reconciler.save_edit(&id, &edit).await.expect_err("blank title");

    assert!(error.is_validation());
    assert_eq!(backend.mutation_calls(), 0);
    assert_eq!(reconciler.tasks(), sample_tasks().as_slice());
}

#[tokio::test]
async fn remote_edit_sends_full_replacement() {
    let (mut reconciler, backend) = remote();
    let id = TaskId::new("1");
    let mut edit = TaskEdit::from_task(reconciler.list().require(&id).expect("present"));
    edit.title = "Renew gym membership for 2025".to_string();

    reconciler.save_edit(&id, &edit).await.expect("backend accepts");

    let stored = backend.stored();
    let stored = stored.iter().find(|task| task.id == id).expect("stored");
    assert_eq!(stored.title, "Renew gym membership for 2025");
    assert_eq!(stored.due_date.as_deref(), Some("2024-11-01"));
}

#[tokio::test]
async fn remote_edit_cannot_clear_due_date() {
    let (mut reconciler, backend) = remote();
    let id = TaskId::new("1");
    let mut edit = TaskEdit::from_task(reconciler.list().require(&id).expect("present"));
    edit.due_date = None;

    let error = reconciler.save_edit(&id, &edit).await.expect_err("cannot clear");

    assert!(error.is_validation());
    assert_eq!(backend.mutation_calls(), 0);
    assert_eq!(reconciler.tasks(), sample_tasks().as_slice());
}

#[tokio::test]
async fn remote_edit_of_undated_task_keeps_no_date() {
    let (mut reconciler, backend) = remote();
    let id = TaskId::new("2");
    let mut edit = TaskEdit::from_task(reconciler.list().require(&id).expect("present"));
    edit.title = "Buy groceries and milk".to_string();

    let saved = reconciler.save_edit(&id, &edit).await.expect("backend accepts");

    assert_eq!(saved.due_date, None);
    assert_eq!(backend.mutation_calls(), 1);
}

#[tokio::test]
async fn local_edit_can_clear_due_date() {
    let mut reconciler = local();
    let id = TaskId::new("1");
    let mut edit = TaskEdit::from_task(reconciler.list().require(&id).expect("present"));
    edit.due_date = None;

    let saved = reconciler.save_edit(&id, &edit).await.expect("local edit");

    assert_eq!(saved.due_date_label(), NO_DUE_DATE);
}

#[tokio::test]
async fn remote_update_failure_leaves_collection_unchanged() {
    let (mut reconciler, backend) = remote();
    backend.fail_next_update();

    let error = reconciler
        .toggle(&TaskId::new("3"))
        .await
        .expect_err("backend fails");

    assert!(matches!(error, Error::Api(_)));
    assert_eq!(reconciler.tasks(), sample_tasks().as_slice());
    assert_eq!(reconciler.last_error(), Some("Failed to update task (HTTP 500)"));

    reconciler.toggle(&TaskId::new("3")).await.expect("retry succeeds");
    assert_eq!(reconciler.last_error(), None);
}

#[tokio::test]
async fn remote_add_inserts_server_record_first() {
    let (mut reconciler, backend) = remote();

    let task = reconciler
        .add(&TaskDraft::new(" Call plumber ").with_due_date("2024-11-05"))
        .await
        .expect("backend accepts");

    assert_eq!(task.id, TaskId::new("remote-1"));
    assert_eq!(task.title, "Call plumber");
    assert_eq!(reconciler.tasks()[0], task);
    assert_eq!(backend.stored().len(), 5);
}

#[tokio::test]
async fn remote_add_of_completed_draft_patches_completion() {
    let (mut reconciler, backend) = remote();

    let task = reconciler
        .add(&TaskDraft::new("Already done").completed(true))
        .await
        .expect("backend accepts");

    assert!(task.is_completed);
    assert_eq!(backend.mutation_calls(), 2);
    assert!(reconciler.tasks()[0].is_completed);
}

#[tokio::test]
async fn remote_create_failure_reports_inline_error() {
    let (mut reconciler, backend) = remote();
    backend.fail_next_create();

    reconciler
        .add(&TaskDraft::new("Buy milk"))
        .await
        .expect_err("backend fails");

    assert_eq!(reconciler.tasks().len(), 4);
    assert_eq!(reconciler.last_error(), Some("Failed to create task (HTTP 500)"));
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let mut reconciler = local();
    let id = TaskId::new("3");

    reconciler.request_delete(&id).expect("known id");
    assert!(reconciler.list().contains(&id));
    assert!(reconciler.delete_gate().is_open());

    reconciler.cancel_delete().expect("not in flight");
    assert!(reconciler.list().contains(&id));
    assert!(!reconciler.delete_gate().is_open());

    reconciler.request_delete(&id).expect("known id");
    let removed = reconciler.confirm_delete().await.expect("staged");
    assert_eq!(removed.title, "Schedule team sync");
    assert!(!reconciler.list().contains(&id));
    assert_eq!(reconciler.delete_gate().state(), &DeleteState::Idle);
}

#[tokio::test]
async fn confirm_without_request_is_rejected() {
    let mut reconciler = local();
    let error = reconciler.confirm_delete().await.expect_err("nothing staged");
    assert!(matches!(error, Error::NothingStaged));
    assert_eq!(reconciler.tasks().len(), 4);
}

#[test]
fn request_delete_of_unknown_id_is_not_found() {
    let mut reconciler = local();
    let error = reconciler
        .request_delete(&TaskId::new("missing"))
        .expect_err("unknown id");
    assert!(matches!(error, Error::NotFound(_)));
    assert!(!reconciler.delete_gate().is_open());
}

#[tokio::test]
async fn remote_delete_failure_keeps_task_and_allows_retry() {
    let (mut reconciler, backend) = remote();
    let id = TaskId::new("1");
    reconciler.request_delete(&id).expect("known id");
    backend.fail_next_delete();

    reconciler.confirm_delete().await.expect_err("backend fails");

    assert!(reconciler.list().contains(&id));
    let gate = reconciler.delete_gate();
    assert!(gate.is_open());
    assert!(gate.can_confirm());
    assert_eq!(gate.staged_id(), Some(&id));
    assert_eq!(gate.error(), Some("Failed to delete task (HTTP 500)"));
    assert_eq!(reconciler.last_error(), Some("Failed to delete task (HTTP 500)"));

    let removed = reconciler.confirm_delete().await.expect("retry succeeds");

    assert_eq!(removed.id, id);
    assert!(!reconciler.list().contains(&id));
    assert!(!reconciler.delete_gate().is_open());
    assert_eq!(reconciler.last_error(), None);
    assert!(backend.stored().iter().all(|task| task.id != id));
}

#[tokio::test]
async fn remote_load_replaces_collection() {
    let backend = FakeBackend::healthy().with_tasks(sample_tasks());
    let mut reconciler: Reconciler = TaskReconciler::remote(backend, ManualClock::new(NOW));

    let loaded = reconciler
        .load(&ListParams {
            completed: Some(true),
            ..ListParams::default()
        })
        .await
        .expect("backend lists");

    assert_eq!(loaded, 2);
    assert!(reconciler.tasks().iter().all(|task| task.is_completed));
}

#[tokio::test]
async fn unauthorized_load_is_distinct() {
    let (mut reconciler, backend) = remote();
    backend.reject_token();

    let error = reconciler
        .load(&ListParams::default())
        .await
        .expect_err("token rejected");

    assert!(error.is_unauthorized());
    assert_eq!(reconciler.tasks().len(), 4);
    assert_eq!(reconciler.last_error(), Some("Unauthorized"));
}

#[tokio::test]
async fn local_load_keeps_collection() {
    let mut reconciler = local();
    assert_eq!(
        reconciler.load(&ListParams::default()).await.expect("local"),
        4
    );
    assert!(!reconciler.is_remote());
}
