// storefront/src/web/handlers/mod.rs

pub mod category_handlers;
pub mod dashboard_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod reservation_handlers;
pub mod upload_handlers;
