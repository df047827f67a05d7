use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{events, polls, questions, resources, sessions, users};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/users", user_routes())
        .nest("/events", event_routes())
        .nest("/sessions", session_routes())
        .nest("/polls", poll_routes())
        .nest("/questions", question_routes())
        .nest("/resources", resource_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(users::create_user))
        .routes(routes!(users::get_user))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(events::list_events, events::create_event))
        .routes(routes!(events::get_active_event))
        .routes(routes!(events::get_event))
        .routes(routes!(events::activate_event))
        .routes(routes!(events::deactivate_event))
        .routes(routes!(events::get_event_stats))
        .routes(routes!(events::get_top_engagers))
        .routes(routes!(
            events::list_participants,
            events::register_participant
        ))
        .routes(routes!(sessions::list_sessions, sessions::create_session))
        .routes(routes!(sessions::list_active_sessions))
}

fn session_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(sessions::update_session))
        .routes(routes!(sessions::check_in))
        .routes(routes!(polls::list_polls, polls::create_poll))
        .routes(routes!(polls::get_active_poll))
        .routes(routes!(questions::list_questions, questions::create_question))
        .routes(routes!(resources::list_resources, resources::create_resource))
}

fn poll_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(polls::get_poll_results))
        .routes(routes!(polls::submit_response))
        .routes(routes!(polls::end_poll))
}

fn question_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(questions::answer_question))
        .routes(routes!(questions::upvote_question))
}

fn resource_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(resources::record_download))
}
