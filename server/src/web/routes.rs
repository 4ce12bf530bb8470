// server/src/web/routes.rs

use crate::web::handlers::{
  admin_handlers, auth_handlers, booking_handlers, car_handlers, partner_handlers, payout_handlers, profile_handlers,
  reference_handlers, support_handlers,
};
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/home", web::get().to(car_handlers::home_handler))
      .route("/reference", web::get().to(reference_handlers::reference_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler)),
      )
      .service(
        web::resource("/profile")
          .route(web::get().to(profile_handlers::get_profile_handler))
          .route(web::put().to(profile_handlers::update_profile_handler)),
      )
      .service(
        web::scope("/cars")
          .route("", web::get().to(car_handlers::list_cars_handler))
          .route("", web::post().to(car_handlers::create_car_handler))
          .route("/{car_id}", web::get().to(car_handlers::car_detail_handler))
          .route("/{car_id}", web::put().to(car_handlers::update_car_handler))
          .route("/{car_id}", web::delete().to(car_handlers::delete_car_handler))
          .route("/{car_id}/book", web::post().to(car_handlers::book_car_handler))
          .route("/{car_id}/reviews", web::get().to(car_handlers::car_reviews_handler))
          .route("/{car_id}/status", web::put().to(car_handlers::set_car_status_handler))
          .route("/{car_id}/images", web::post().to(car_handlers::add_image_handler))
          .route("/{car_id}/images/{image_id}", web::delete().to(car_handlers::delete_image_handler)),
      )
      .service(
        web::scope("/partner")
          .route("/cars", web::get().to(partner_handlers::partner_cars_handler))
          .route("/bookings", web::get().to(partner_handlers::partner_bookings_handler)),
      )
      .service(
        web::scope("/bookings")
          .route("", web::get().to(booking_handlers::my_bookings_handler))
          .route("/{booking_id}", web::get().to(booking_handlers::booking_detail_handler))
          .route("/{booking_id}/cancel", web::post().to(booking_handlers::cancel_booking_handler))
          .route("/{booking_id}/review", web::post().to(booking_handlers::review_booking_handler))
          .route("/{booking_id}/payments", web::post().to(booking_handlers::pay_booking_handler)),
      )
      .service(
        web::scope("/support/chats")
          .route("", web::get().to(support_handlers::list_chats_handler))
          .route("", web::post().to(support_handlers::open_chat_handler))
          .route("/{chat_id}", web::get().to(support_handlers::chat_detail_handler))
          .route("/{chat_id}/messages", web::post().to(support_handlers::post_message_handler))
          .route("/{chat_id}/close", web::post().to(support_handlers::close_chat_handler)),
      )
      .service(
        web::scope("/payouts")
          .route("", web::get().to(payout_handlers::list_payouts_handler))
          .route("", web::post().to(payout_handlers::request_payout_handler))
          .route("/{payout_id}/process", web::post().to(payout_handlers::process_payout_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/dashboard", web::get().to(admin_handlers::dashboard_handler))
          .route("/cars", web::get().to(admin_handlers::admin_cars_handler))
          .route("/bookings", web::get().to(admin_handlers::admin_bookings_handler))
          .route("/bookings/{booking_id}/status", web::put().to(admin_handlers::booking_status_handler))
          .route("/bookings/{booking_id}/fine", web::post().to(admin_handlers::fine_booking_handler))
          .route("/users", web::get().to(admin_handlers::admin_users_handler))
          .route("/users/{user_id}/role", web::put().to(admin_handlers::set_user_role_handler))
          .route("/payments/{payment_id}/refund", web::post().to(admin_handlers::refund_payment_handler))
          .route(
            "/maintenance/complete-expired",
            web::post().to(admin_handlers::complete_expired_handler),
          ),
      ),
  );
}
