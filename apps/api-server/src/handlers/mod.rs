//! HTTP handlers and route configuration.

mod categories;
mod comments;
mod health;
mod posts;
mod users;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/users")
                    .route("/register", web::post().to(users::register))
                    .route("/login", web::post().to(users::login))
                    .route("/profile", web::get().to(users::profile))
                    .route("/avatar", web::put().to(users::update_avatar))
                    .route("", web::get().to(users::list_users))
                    .route("/{user_id}", web::put().to(users::update_profile))
                    .route("/{user_id}", web::delete().to(users::delete_user)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/mine", web::get().to(posts::my_posts))
                    .route("/{slug}", web::get().to(posts::get_post))
                    .route("/{slug}", web::put().to(posts::update_post))
                    .route("/{slug}", web::delete().to(posts::delete_post)),
            )
            .service(
                web::scope("/comments")
                    .route("", web::post().to(comments::create_comment))
                    .route("/{comment_id}", web::put().to(comments::update_comment))
                    .route("/{comment_id}", web::delete().to(comments::delete_comment)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list_categories))
                    .route("", web::post().to(categories::create_category))
                    .route("/{category_id}", web::get().to(categories::get_category))
                    .route("/{category_id}", web::put().to(categories::update_category))
                    .route("/{category_id}", web::delete().to(categories::delete_category)),
            ),
    );
}
