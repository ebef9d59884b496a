// event_ticketing/tests/admin_tests.rs

mod common;

use chrono::Duration;
use common::*;
use event_ticketing::catalog;
use event_ticketing::errors::AppError;
use event_ticketing::models::PaymentStatus;
use event_ticketing::pipelines;
use event_ticketing::reports::RegistrationReport;

#[tokio::test]
async fn admin_event_crud() {
  let app = test_app();
  let created = catalog::create_event(&app.state, admin(), event_input("RustConf", Duration::days(3)))
    .await
    .unwrap();
  assert_eq!(catalog::get_event(&app.state, created.id).await.unwrap(), created);

  let mut edit = event_input("RustConf 2026", Duration::days(4));
  edit.price_cents = 0;
  let updated = catalog::update_event(&app.state, admin(), created.id, edit).await.unwrap();
  assert_eq!(updated.id, created.id);
  assert_eq!(updated.title, "RustConf 2026");
  assert_eq!(updated.price_cents, 0);

  let listed = catalog::list_events(&app.state).await.unwrap();
  assert_eq!(listed.len(), 1);

  catalog::delete_event(&app.state, admin(), created.id).await.unwrap();
  assert!(matches!(
    catalog::get_event(&app.state, created.id).await,
    Err(AppError::NotFound(_))
  ));
  assert!(matches!(
    catalog::delete_event(&app.state, admin(), created.id).await,
    Err(AppError::NotFound(_))
  ));
}

#[tokio::test]
async fn event_maintenance_requires_admin_and_valid_input() {
  let app = test_app();
  let user = sign_up_user(&app.state, "Asha", None).await;

  let err = catalog::create_event(&app.state, caller_of(&user), event_input("Nope", Duration::days(1)))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Forbidden(_)));

  let mut bad = event_input("Bad Dates", Duration::days(5));
  bad.registration_deadline = bad.date + Duration::hours(1);
  let err = catalog::create_event(&app.state, admin(), bad).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
  assert!(catalog::list_events(&app.state).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_an_event_cascades_to_registrations_and_emails() {
  let app = test_app();
  let user = sign_up_user(&app.state, "Asha", None).await;
  let doomed = open_event(&app.state, "Doomed").await;
  let kept = open_event(&app.state, "Kept").await;
  let caller = caller_of(&user);

  let gone = pipelines::initiate_registration(&app.state, caller, doomed.id).await.unwrap();
  pipelines::send_confirmation(&app.state, caller, gone.id).await.unwrap();
  let stays = pipelines::initiate_registration(&app.state, caller, kept.id).await.unwrap();
  pipelines::send_confirmation(&app.state, caller, stays.id).await.unwrap();
  assert_eq!(ticket_email_count(&app.state, user.id).await, 2);

  catalog::delete_event(&app.state, admin(), doomed.id).await.unwrap();

  assert!(registration(&app.state, gone.id).await.is_none());
  assert!(registration(&app.state, stays.id).await.is_some());
  assert_eq!(ticket_email_count(&app.state, user.id).await, 1);
}

#[tokio::test]
async fn registrations_for_event_and_report() {
  let app = test_app();
  let asha = sign_up_user(&app.state, "Asha", None).await;
  let ben = sign_up_user(&app.state, "Ben", Some("555-0101")).await;
  let event = open_event(&app.state, "RustConf").await;

  pipelines::initiate_registration(&app.state, caller_of(&asha), event.id).await.unwrap();
  let paid = pipelines::initiate_registration(&app.state, caller_of(&ben), event.id).await.unwrap();
  pipelines::record_payment(&app.state, caller_of(&ben), paid.id, Some("pay_9".to_string()))
    .await
    .unwrap();

  let (loaded, attendees) = catalog::list_registrations_for_event(&app.state, admin(), event.id)
    .await
    .unwrap();
  assert_eq!(loaded.id, event.id);
  assert_eq!(attendees.len(), 2);
  assert_eq!(attendees[0].user.id, asha.id);
  assert_eq!(attendees[1].registration.payment_status, PaymentStatus::Success);

  let report = RegistrationReport::build(&loaded, &attendees);
  let csv = report.to_csv();
  assert!(csv.contains("Total Registrations:,2\r\n"));
  assert!(csv.contains("Asha,asha@example.com,N/A,Pending,N/A\r\n"));
  assert!(csv.contains("Ben,ben@example.com,555-0101,Success,pay_9\r\n"));
}

#[tokio::test]
async fn registrations_for_missing_event_is_not_found() {
  let app = test_app();
  let err = catalog::list_registrations_for_event(&app.state, admin(), 77)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}
