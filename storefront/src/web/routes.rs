// storefront/src/web/routes.rs

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::debug;

use crate::errors::AppError;
use crate::web::handlers::{
  category_handlers, dashboard_handlers, order_handlers, product_handlers, reservation_handlers, upload_handlers,
};

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  debug!(error = %err, "Rejected JSON body.");
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid query string: {}", err)).into()
}

// Ids in paths are UUIDs; anything else cannot name an existing record.
fn path_error(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
  debug!(error = %err, "Rejected path parameter.");
  AppError::NotFound("Not found".to_string()).into()
}

async fn not_found_handler() -> Result<HttpResponse, AppError> {
  Err(AppError::NotFound("Not found".to_string()))
}

/// Mounts the whole API under `/api`, plus JSON error bodies for extractor
/// failures and unknown routes.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error))
    .app_data(web::QueryConfig::default().error_handler(query_error))
    .app_data(web::PathConfig::default().error_handler(path_error))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(dashboard_handlers::health_check_handler))
        .route("/store-info", web::get().to(dashboard_handlers::store_info_handler))
        .route("/dashboard", web::get().to(dashboard_handlers::dashboard_handler))
        .route("/upload", web::post().to(upload_handlers::presign_upload_handler))
        .service(
          web::scope("/products")
            .service(
              web::resource("")
                .route(web::get().to(product_handlers::list_products_handler))
                .route(web::post().to(product_handlers::create_product_handler)),
            )
            // Before "/{id}" so "reserve-bulk" is never read as an id.
            .route("/reserve-bulk", web::post().to(reservation_handlers::bulk_reserve_handler))
            .service(
              web::resource("/{id}")
                .route(web::get().to(product_handlers::get_product_handler))
                .route(web::patch().to(product_handlers::update_product_handler))
                .route(web::delete().to(product_handlers::delete_product_handler)),
            )
            .route("/{id}/status", web::patch().to(product_handlers::set_product_status_handler))
            .route("/{id}/reserve", web::post().to(reservation_handlers::toggle_reservation_handler)),
        )
        .service(
          web::scope("/categories")
            .service(
              web::resource("")
                .route(web::get().to(category_handlers::list_categories_handler))
                .route(web::post().to(category_handlers::create_category_handler)),
            )
            .service(
              web::resource("/{id}")
                .route(web::get().to(category_handlers::get_category_handler))
                .route(web::patch().to(category_handlers::update_category_handler))
                .route(web::delete().to(category_handlers::delete_category_handler)),
            ),
        )
        .service(
          web::scope("/orders")
            .service(
              web::resource("")
                .route(web::get().to(order_handlers::list_orders_handler))
                .route(web::post().to(order_handlers::checkout_handler)),
            )
            .route("/{id}", web::patch().to(order_handlers::verify_order_handler)),
        ),
    )
    .default_service(web::to(not_found_handler));
}
