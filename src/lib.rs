pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::cart::CartService;
use application::catalog::CatalogService;
use application::checkout::CheckoutService;
use infrastructure::cart_repo::DieselCartRepository;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::product_repo::DieselProductRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Services shared by all handlers, wired over the Diesel repositories.
pub struct AppState {
    pub catalog: CatalogService<DieselProductRepository>,
    pub cart: CartService<DieselProductRepository, DieselCartRepository>,
    pub checkout: CheckoutService<DieselCartRepository, DieselOrderRepository>,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        AppState {
            catalog: CatalogService::new(DieselProductRepository::new(pool.clone())),
            cart: CartService::new(
                DieselProductRepository::new(pool.clone()),
                DieselCartRepository::new(pool.clone()),
            ),
            checkout: CheckoutService::new(
                DieselCartRepository::new(pool.clone()),
                DieselOrderRepository::new(pool),
            ),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::cart::list_cart,
        handlers::cart::add_item,
        handlers::cart::update_item,
        handlers::cart::remove_item,
        handlers::orders::create_order,
        handlers::orders::list_orders,
    ),
    components(schemas(
        handlers::products::ProductResponse,
        handlers::cart::AddCartItemRequest,
        handlers::cart::UpdateCartItemRequest,
        handlers::cart::CartLineResponse,
        handlers::orders::CheckoutRequest,
        handlers::orders::ItemSummaryResponse,
        handlers::orders::OrderPlacedResponse,
        handlers::orders::OrderLineResponse,
        handlers::orders::OrderResponse,
    )),
    tags(
        (name = "products", description = "Product catalog"),
        (name = "cart", description = "Cart management"),
        (name = "orders", description = "Checkout and order history"),
    )
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState::new(pool.clone())))
            .wrap(Logger::default())
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("/{id}", web::get().to(handlers::products::get_product)),
            )
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::cart::list_cart))
                    .route("", web::post().to(handlers::cart::add_item))
                    .route("/{id}", web::put().to(handlers::cart::update_item))
                    .route("/{id}", web::delete().to(handlers::cart::remove_item)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
