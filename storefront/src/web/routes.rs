// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  admin_handlers, auth_handlers, cart_handlers, like_handlers, pages_handlers, product_handlers,
};

// Called from `main.rs` and the HTTP tests to mount every route on the App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    // Pages
    .route("/", web::get().to(pages_handlers::index_handler))
    .route("/charity", web::get().to(pages_handlers::charity_handler))
    .route("/about-us", web::get().to(pages_handlers::about_us_handler))
    .route("/health", web::get().to(pages_handlers::health_check_handler))
    .route("/static/{filename}", web::get().to(pages_handlers::static_asset_handler))
    // Identity
    .service(
      web::resource("/register")
        .route(web::get().to(auth_handlers::register_form_handler))
        .route(web::post().to(auth_handlers::register_handler)),
    )
    .service(
      web::resource("/login")
        .route(web::get().to(auth_handlers::login_form_handler))
        .route(web::post().to(auth_handlers::login_handler)),
    )
    .route("/logout", web::get().to(auth_handlers::logout_handler))
    // Catalog
    .route("/shop", web::get().to(product_handlers::shop_handler))
    .route("/category/{category_id}", web::get().to(product_handlers::category_handler))
    .route("/details/{product_id}", web::get().to(product_handlers::details_handler))
    // Cart
    .route("/add_to_cart/{product_id}", web::get().to(cart_handlers::add_to_cart_handler))
    .service(
      web::resource("/cart")
        .route(web::get().to(cart_handlers::view_cart_handler))
        .route(web::post().to(cart_handlers::cart_form_handler)),
    )
    .route(
      "/remove_from_cart/{product_id}",
      web::post().to(cart_handlers::remove_from_cart_handler),
    )
    // Likes
    .route("/like_product", web::post().to(like_handlers::like_product_handler))
    // Admin
    .service(
      web::resource("/addproduct")
        .route(web::get().to(admin_handlers::add_product_form_handler))
        .route(web::post().to(admin_handlers::add_product_handler)),
    )
    .service(
      web::resource("/uploadfile")
        .route(web::get().to(admin_handlers::upload_file_form_handler))
        .route(web::post().to(admin_handlers::upload_file_handler)),
    )
    .service(
      web::resource("/edit/{product_id}")
        .route(web::get().to(admin_handlers::edit_product_form_handler))
        .route(web::post().to(admin_handlers::edit_product_handler)),
    )
    .route("/delete/{product_id}", web::get().to(admin_handlers::delete_product_handler));
}
