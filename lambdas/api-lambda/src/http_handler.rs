use board_block::{boards, task, tasks, team, users};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;
use taskboard_shared::{response, ApiError, AppState};

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    state: &AppState,
) -> Result<Response<Body>, Error> {
    resp.map(|r| response::with_cors_headers(r, &state.config.allowed_origin))
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(ApiError::not_found("Not found").into_response())
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(ApiError::method_not_allowed().into_response())
}

/// Main Lambda handler: CORS preflight, then dispatch on path and method.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().trim_end_matches('/').to_string();
    tracing::info!("invoked: {} {}", method, path);

    if method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return finalize_response(Ok(resp), &state);
    }

    let app = state.as_ref();
    let resp = match path.as_str() {
        "/user/register" => match method {
            Method::POST => users::register(app, &event).await,
            _ => method_not_allowed(),
        },
        "/user/login" => match method {
            Method::POST => users::login(app, &event).await,
            _ => method_not_allowed(),
        },
        "/team" => match method {
            Method::GET => team::get(app, &event).await,
            _ => method_not_allowed(),
        },
        "/team/board" => match method {
            Method::POST => boards::create(app, &event).await,
            Method::PATCH => boards::update(app, &event).await,
            Method::DELETE => boards::delete(app, &event).await,
            _ => method_not_allowed(),
        },
        "/task" => match method {
            Method::POST => task::create(app, &event).await,
            Method::PATCH => task::update(app, &event).await,
            Method::DELETE => task::delete(app, &event).await,
            _ => method_not_allowed(),
        },
        "/tasks" => match method {
            Method::GET => tasks::list(app, &event).await,
            Method::PATCH => tasks::reorder(app, &event).await,
            _ => method_not_allowed(),
        },
        _ => not_found(),
    };

    finalize_response(resp, &state)
}
