// event_ticketing/src/web/routes.rs

use crate::web::handlers::{account_handlers, admin_handlers, event_handlers, payment_handlers, registration_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/Account")
        .route("/Register", web::post().to(account_handlers::register_account_handler))
        .route("/Login", web::post().to(account_handlers::login_handler))
        .route("/Logout", web::post().to(account_handlers::logout_handler)),
    )
    .service(
      web::scope("/Event")
        .route("", web::get().to(event_handlers::list_events_handler))
        .route("/Details/{id}", web::get().to(event_handlers::event_details_handler))
        .route("/MyTickets", web::get().to(event_handlers::my_tickets_handler)),
    )
    .service(
      web::scope("/Registration")
        .service(
          web::resource("/Register/{id}")
            .route(web::get().to(registration_handlers::register_preflight_handler))
            .route(web::post().to(registration_handlers::register_handler)),
        )
        .route("/Payment/{id}", web::get().to(registration_handlers::payment_page_handler))
        .route("/ConfirmPayment", web::post().to(registration_handlers::confirm_payment_handler))
        .route(
          "/PaymentSuccess/{id}",
          web::get().to(registration_handlers::payment_success_handler),
        )
        .route(
          "/SendConfirmationEmail/{id}",
          web::get().to(registration_handlers::send_confirmation_handler),
        )
        .route("/EmailTickets", web::get().to(registration_handlers::email_tickets_handler))
        .route("/DownloadTicket", web::get().to(registration_handlers::download_ticket_handler)),
    )
    .service(
      web::scope("/Payment")
        .route("/Process", web::get().to(payment_handlers::process_handler))
        .route("/Complete", web::post().to(payment_handlers::complete_handler)),
    )
    .service(
      web::scope("/Admin")
        .route("", web::get().to(admin_handlers::admin_index_handler))
        .route("/CreateEvent", web::post().to(admin_handlers::create_event_handler))
        .service(
          web::resource("/EditEvent/{id}")
            .route(web::get().to(admin_handlers::edit_event_form_handler))
            .route(web::post().to(admin_handlers::edit_event_handler)),
        )
        .service(
          web::resource("/DeleteEvent/{id}")
            .route(web::get().to(admin_handlers::delete_event_form_handler))
            .route(web::post().to(admin_handlers::delete_event_handler)),
        )
        .route(
          "/EventRegistrations/{id}",
          web::get().to(admin_handlers::event_registrations_handler),
        )
        .route("/ExportPdf", web::get().to(admin_handlers::export_pdf_handler))
        .route("/ExportExcel", web::get().to(admin_handlers::export_excel_handler)),
    );
}
