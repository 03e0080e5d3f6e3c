use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use storefront_api::application::auth_service::AuthService;
use storefront_api::application::cart_service::CartService;
use storefront_api::data::cart_repository::InMemoryCartRepository;
use storefront_api::data::catalog::InMemoryCatalog;
use storefront_api::data::session_registry::SessionRegistry;
use storefront_api::data::user_repository::InMemoryUserRepository;
use storefront_api::domain::cart::Price;
use storefront_api::domain::catalog::Product;
use storefront_api::infrastructure::logging::init_logging;
use storefront_api::presentation::auth::{current_user, login, logout, register};
use storefront_api::presentation::handlers::{
    AppState, cart_add, cart_checkout, cart_remove, catalog_by_category, get_product,
    health_check, view_cart,
};
use storefront_api::presentation::middleware::{RequestIdMiddleware, SessionAuthMiddleware};
use tracing::info;

fn demo_catalog() -> Vec<Product> {
    let product = |id: u32, name: &str, price: u64, category: &str| Product {
        id,
        name: name.to_string(),
        price: Price::new(price),
        photo: format!("/static/{}.jpg", id),
        info: String::new(),
        category: category.to_string(),
    };
    vec![
        product(1, "Ceylon black tea", 450_00, "tea"),
        product(2, "Sencha green tea", 520_00, "tea"),
        product(3, "Earl Grey", 480_00, "tea"),
        product(4, "Jasmine pearls", 690_00, "tea"),
        product(5, "Assam breakfast blend", 430_00, "tea"),
        product(6, "Pu-erh cake", 1200_00, "tea"),
        product(7, "Darjeeling first flush", 850_00, "tea"),
        product(8, "Ethiopia Yirgacheffe", 780_00, "coffee"),
        product(9, "Colombia Supremo", 650_00, "coffee"),
        product(10, "Espresso roast", 590_00, "coffee"),
    ]
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logging();
    info!("Logging initialized");

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let cart_repository = Arc::new(InMemoryCartRepository::new());
    let catalog = Arc::new(InMemoryCatalog::new(demo_catalog()));
    let sessions = SessionRegistry::new();
    info!("In-memory stores created");

    let auth_service = Arc::new(AuthService::new(user_repository.clone(), sessions.clone()));
    let cart_service = Arc::new(CartService::new(cart_repository, catalog.clone()));

    let state = web::Data::new(AppState {
        auth_service,
        cart_service,
        catalog,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    info!(address = %bind_addr, "Starting HTTP server");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionAuthMiddleware::new(
                sessions.clone(),
                user_repository.clone(),
            ))
            .wrap(RequestIdMiddleware)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .route("/auth/register", web::post().to(register))
                    .route("/auth/login", web::post().to(login))
                    .route("/auth/logout", web::post().to(logout))
                    .route("/auth/me", web::get().to(current_user))
                    .route("/cart", web::get().to(view_cart))
                    .route("/cart/add", web::post().to(cart_add))
                    .route("/cart/remove", web::post().to(cart_remove))
                    .route("/cart/checkout", web::post().to(cart_checkout))
                    .route("/catalog/{category}", web::get().to(catalog_by_category))
                    .route("/products/{id}", web::get().to(get_product)),
            )
    });

    server.bind(bind_addr)?.run().await
}
