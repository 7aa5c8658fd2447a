use crate::app::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use votelens_auth::{gate, GateDecision};

/// Page gate middleware. API routes are public here and check the session
/// themselves.
pub(crate) async fn gate_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = jar
        .get(&state.cookie.name)
        .is_some_and(|c| state.tokens.verify(c.value()).is_ok());

    match gate(request.uri().path(), authenticated) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!(path = %request.uri().path(), to, "auth.gate.redirect");
            Redirect::temporary(to).into_response()
        }
    }
}
