use uuid::Uuid;

use attest_policy::domain::types::{AssignmentStatus, MAX_REMINDERS};
use attest_policy::error::PolicyServiceError;
use attest_policy::usecase::reminder::{BulkRemindUseCase, SendReminderUseCase};

use crate::helpers::{
    MockAssignmentRepo, MockNotifier, MockPolicyRepo, MockUserRepo, TEST_JWT_SECRET,
    test_assignment, test_policy, test_tenant, test_user,
};

const FRONTEND_URL: &str = "https://app.example.com";

#[tokio::test]
async fn should_allow_exactly_three_reminders() {
    let workspace_id = Uuid::new_v4();
    let tenant = test_tenant(workspace_id);
    let user = test_user(workspace_id, "alice@example.com");
    let policy = test_policy(workspace_id);
    let assignment = test_assignment(policy.id, user.id);
    let assignment_id = assignment.id;

    let assignments = MockAssignmentRepo::new(vec![assignment]);
    let notifier = MockNotifier::new();
    let uc = SendReminderUseCase {
        users: MockUserRepo::new(vec![user]),
        policies: MockPolicyRepo::new(vec![policy]),
        assignments: assignments.clone(),
        notifier: notifier.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        frontend_url: FRONTEND_URL.to_owned(),
    };

    for expected in 1..=MAX_REMINDERS {
        uc.execute(tenant, assignment_id).await.unwrap();
        assert_eq!(assignments.get(assignment_id).reminder_count, expected);
    }

    let result = uc.execute(tenant, assignment_id).await;
    assert!(matches!(result, Err(PolicyServiceError::ReminderBoundExceeded)));
    assert_eq!(
        assignments.get(assignment_id).reminder_count,
        MAX_REMINDERS,
        "rejected attempt must not move the counter"
    );
    assert_eq!(notifier.sent_kinds().len(), MAX_REMINDERS as usize);
}

#[tokio::test]
async fn should_roll_back_counter_when_delivery_fails() {
    let workspace_id = Uuid::new_v4();
    let tenant = test_tenant(workspace_id);
    let user = test_user(workspace_id, "alice@example.com");
    let policy = test_policy(workspace_id);
    let mut assignment = test_assignment(policy.id, user.id);
    assignment.reminder_count = 1;
    let assignment_id = assignment.id;

    let assignments = MockAssignmentRepo::new(vec![assignment]);
    let uc = SendReminderUseCase {
        users: MockUserRepo::new(vec![user]),
        policies: MockPolicyRepo::new(vec![policy]),
        assignments: assignments.clone(),
        notifier: MockNotifier::failing_for(vec!["alice@example.com"]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        frontend_url: FRONTEND_URL.to_owned(),
    };

    let result = uc.execute(tenant, assignment_id).await;
    assert!(matches!(result, Err(PolicyServiceError::NotificationFailed)));
    assert_eq!(
        assignments.get(assignment_id).reminder_count,
        1,
        "failed send must restore the prior count"
    );
    assert!(assignments.event_types().is_empty(), "no event for a failed send");
}

#[tokio::test]
async fn should_roll_back_counter_when_link_cache_fails() {
    let workspace_id = Uuid::new_v4();
    let tenant = test_tenant(workspace_id);
    let user = test_user(workspace_id, "alice@example.com");
    let policy = test_policy(workspace_id);
    let assignment = test_assignment(policy.id, user.id);
    let assignment_id = assignment.id;

    // No cached token, so the send path must mint and cache one first
    let assignments = MockAssignmentRepo::failing_cache(vec![assignment]);
    let notifier = MockNotifier::new();
    let uc = SendReminderUseCase {
        users: MockUserRepo::new(vec![user]),
        policies: MockPolicyRepo::new(vec![policy]),
        assignments: assignments.clone(),
        notifier: notifier.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        frontend_url: FRONTEND_URL.to_owned(),
    };

    let result = uc.execute(tenant, assignment_id).await;
    assert!(matches!(result, Err(PolicyServiceError::Internal(_))));
    assert_eq!(
        assignments.get(assignment_id).reminder_count,
        0,
        "failure before the send must restore the prior count"
    );
    assert!(notifier.sent_kinds().is_empty(), "nothing was delivered");
    assert!(assignments.event_types().is_empty());
}

#[tokio::test]
async fn should_reject_reminder_for_terminal_assignment() {
    let workspace_id = Uuid::new_v4();
    let tenant = test_tenant(workspace_id);
    let user = test_user(workspace_id, "alice@example.com");
    let policy = test_policy(workspace_id);
    let mut assignment = test_assignment(policy.id, user.id);
    assignment.status = AssignmentStatus::Acknowledged;
    let assignment_id = assignment.id;

    let uc = SendReminderUseCase {
        users: MockUserRepo::new(vec![user]),
        policies: MockPolicyRepo::new(vec![policy]),
        assignments: MockAssignmentRepo::new(vec![assignment]),
        notifier: MockNotifier::new(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        frontend_url: FRONTEND_URL.to_owned(),
    };

    let result = uc.execute(tenant, assignment_id).await;
    assert!(matches!(result, Err(PolicyServiceError::AssignmentClosed)));
}

#[tokio::test]
async fn should_reuse_cached_magic_link_for_reminders() {
    let workspace_id = Uuid::new_v4();
    let tenant = test_tenant(workspace_id);
    let user = test_user(workspace_id, "alice@example.com");
    let policy = test_policy(workspace_id);
    let mut assignment = test_assignment(policy.id, user.id);
    assignment.magic_link_token = Some("cached-token".to_owned());
    let assignment_id = assignment.id;

    let assignments = MockAssignmentRepo::new(vec![assignment]);
    let uc = SendReminderUseCase {
        users: MockUserRepo::new(vec![user]),
        policies: MockPolicyRepo::new(vec![policy]),
        assignments: assignments.clone(),
        notifier: MockNotifier::new(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        frontend_url: FRONTEND_URL.to_owned(),
    };
    uc.execute(tenant, assignment_id).await.unwrap();

    assert_eq!(
        assignments.get(assignment_id).magic_link_token.as_deref(),
        Some("cached-token"),
        "existing link must not be replaced"
    );
}

#[tokio::test]
async fn bulk_remind_isolates_failures_per_assignment() {
    let workspace_id = Uuid::new_v4();
    let tenant = test_tenant(workspace_id);
    let policy = test_policy(workspace_id);

    let ok_user = test_user(workspace_id, "ok@example.com");
    let failing_user = test_user(workspace_id, "broken@example.com");
    let capped_user = test_user(workspace_id, "capped@example.com");
    let done_user = test_user(workspace_id, "done@example.com");

    let ok = test_assignment(policy.id, ok_user.id);
    let failing = test_assignment(policy.id, failing_user.id);
    let mut capped = test_assignment(policy.id, capped_user.id);
    capped.reminder_count = MAX_REMINDERS;
    let mut done = test_assignment(policy.id, done_user.id);
    done.status = AssignmentStatus::Acknowledged;

    let (ok_id, failing_id, capped_id) = (ok.id, failing.id, capped.id);
    let assignments = MockAssignmentRepo::new(vec![ok, failing, capped, done]);

    let uc = BulkRemindUseCase {
        users: MockUserRepo::new(vec![ok_user, failing_user, capped_user, done_user]),
        policies: MockPolicyRepo::new(vec![policy.clone()]),
        assignments: assignments.clone(),
        notifier: MockNotifier::failing_for(vec!["broken@example.com"]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        frontend_url: FRONTEND_URL.to_owned(),
    };
    let outcome = uc.execute(tenant, policy.id).await.unwrap();

    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.failed, vec![failing_id]);
    assert_eq!(outcome.skipped_at_bound, 1);

    assert_eq!(assignments.get(ok_id).reminder_count, 1);
    assert_eq!(
        assignments.get(failing_id).reminder_count,
        0,
        "failed item rolls back its own counter only"
    );
    assert_eq!(assignments.get(capped_id).reminder_count, MAX_REMINDERS);
}

#[tokio::test]
async fn bulk_remind_rejects_foreign_workspace_policy() {
    let policy = test_policy(Uuid::new_v4());
    let foreign_tenant = test_tenant(Uuid::new_v4());

    let uc = BulkRemindUseCase {
        users: MockUserRepo::empty(),
        policies: MockPolicyRepo::new(vec![policy.clone()]),
        assignments: MockAssignmentRepo::empty(),
        notifier: MockNotifier::new(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        frontend_url: FRONTEND_URL.to_owned(),
    };
    let result = uc.execute(foreign_tenant, policy.id).await;
    assert!(matches!(result, Err(PolicyServiceError::PolicyNotFound)));
}
