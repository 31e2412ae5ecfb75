//! Route definitions for the Chemical Manufacturing Inventory Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Raw materials
        .nest("/chemicals", chemical_routes())
        // Traceable batches
        .nest("/batches", batch_routes())
        // Suppliers
        .nest("/suppliers", supplier_routes())
        // Procurement
        .nest("/purchase-orders", purchase_order_routes())
        // Recipes
        .nest("/formulas", formula_routes())
        // Finished goods
        .nest("/products", product_routes())
        // Manufacturing
        .nest("/production-orders", production_order_routes())
        // Retail sales
        .nest("/sales", sales_routes())
        // Customers
        .nest("/customers", customer_routes())
}

/// Chemical management routes
fn chemical_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_chemicals).post(handlers::create_chemical),
        )
        .route("/low-stock", get(handlers::list_low_stock))
        .route(
            "/:chemical_id",
            get(handlers::get_chemical).put(handlers::update_chemical),
        )
        .route(
            "/:chemical_id/reconcile",
            post(handlers::reconcile_chemical_stock),
        )
}

/// Batch traceability routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches))
        .route("/:batch_id", get(handlers::get_batch))
        .route("/lot/:lot_code", get(handlers::get_batch_by_lot_code))
        .route("/:batch_id/quarantine", post(handlers::quarantine_batch))
        .route("/:batch_id/release", post(handlers::release_batch))
        .route("/:batch_id/expire", post(handlers::expire_batch))
}

/// Supplier management routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier).put(handlers::update_supplier),
        )
}

/// Purchase order routes
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route("/:order_id", get(handlers::get_purchase_order))
        .route("/:order_id/receive", post(handlers::receive_purchase_order))
        .route("/:order_id/cancel", post(handlers::cancel_purchase_order))
}

/// Formula management routes
fn formula_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_formulas).post(handlers::create_formula),
        )
        .route("/:formula_id", get(handlers::get_formula))
}

/// Product management routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
}

/// Production order routes
fn production_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_production_orders).post(handlers::create_production_order),
        )
        .route("/:order_id", get(handlers::get_production_order))
        .route(
            "/:order_id/consumptions",
            get(handlers::get_production_consumptions),
        )
        .route(
            "/:order_id/complete",
            post(handlers::complete_production_order),
        )
        .route("/:order_id/cancel", post(handlers::cancel_production_order))
}

/// Sales routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::process_sale))
        .route("/:transaction_id", get(handlers::get_sale))
        .route("/:transaction_id/void", post(handlers::void_sale))
}

/// Customer management routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer).put(handlers::update_customer),
        )
}
