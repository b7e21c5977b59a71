use lazy_static::lazy_static;
use rocket::route::Route;

mod auth;
mod posts;
mod users;

lazy_static! {
    pub(crate) static ref AUTH_ROUTES: Vec<Route> = routes![auth::google_config, auth::google_login];
    pub(crate) static ref POST_ROUTES: Vec<Route> = routes![
        posts::get_posts,
        posts::get_posts_by_user,
        posts::create_post,
        posts::like_post,
        posts::personal_feed,
    ];
    pub(crate) static ref USER_ROUTES: Vec<Route> =
        routes![users::get_user, users::follow_user, users::update_bio];
}
