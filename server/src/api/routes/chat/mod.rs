//! Group chat API endpoints
//!
//! Messages are persisted first, then broadcast to the group's topic -
//! the two steps are deliberately uncoupled. A message can commit and
//! reach no subscriber (at-most-once-after-commit); the history endpoint
//! is the source of truth.

pub mod types;

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use tokio::sync::watch;

use crate::api::auth::{Auth, GroupMember};
use crate::api::extractors::{ValidatedJson, ValidatedQuery, is_valid_id};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::core::TopicService;
use crate::data::SqliteService;
use crate::data::sqlite::repositories::message;
use crate::data::topics::TopicError;
use crate::domain::ChatEvent;

use types::{ListMessagesQuery, MessageDto, SendMessageRequest};

/// Shared state for Chat API endpoints
#[derive(Clone)]
pub struct ChatApiState {
    pub database: Arc<SqliteService>,
    pub topics: Arc<TopicService>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Build chat routes nested under /groups/{group_id}/messages
pub fn group_routes(
    database: Arc<SqliteService>,
    topics: Arc<TopicService>,
    shutdown_rx: watch::Receiver<bool>,
) -> Router<()> {
    let state = ChatApiState {
        database,
        topics,
        shutdown_rx,
    };

    Router::new()
        .route("/", get(list_messages).post(send_message))
        .route("/events", get(events))
        .route("/typing", post(typing))
        .with_state(state)
}

/// Top-level message routes (deletion by message id)
pub fn message_routes(
    database: Arc<SqliteService>,
    topics: Arc<TopicService>,
    shutdown_rx: watch::Receiver<bool>,
) -> Router<()> {
    let state = ChatApiState {
        database,
        topics,
        shutdown_rx,
    };

    Router::new()
        .route("/{message_id}", delete(delete_message))
        .with_state(state)
}

/// List chat history for a group (members only)
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}/messages",
    tag = "chat",
    params(
        ("group_id" = String, Path, description = "Group ID"),
        ("page" = Option<u32>, Query, description = "Page number (1-100)"),
        ("limit" = Option<u32>, Query, description = "Items per page (1-200)")
    ),
    responses(
        (status = 200, description = "Messages, each page in chronological order"),
        (status = 403, description = "Not a member of this group")
    )
)]
pub async fn list_messages(
    State(state): State<ChatApiState>,
    auth: GroupMember,
    ValidatedQuery(query): ValidatedQuery<ListMessagesQuery>,
) -> Result<Json<PaginatedResponse<MessageDto>>, ApiError> {
    let (messages, total) = message::list_for_group(
        state.database.pool(),
        &auth.group_id,
        query.page,
        query.limit,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    let data: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Send a chat message (members only).
///
/// The row is committed, then the event is broadcast. Broadcast reaching
/// zero subscribers is not an error.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/messages",
    tag = "chat",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageDto),
        (status = 403, description = "Not a member of this group")
    )
)]
pub async fn send_message(
    State(state): State<ChatApiState>,
    auth: GroupMember,
    ValidatedJson(body): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let created = message::create_message(
        state.database.pool(),
        &cuid2::create_id(),
        &auth.group_id,
        auth.auth.user_id(),
        &body.body,
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    // Broadcast after commit; no transactional coupling
    let topic = state
        .topics
        .broadcast_topic::<ChatEvent>(&ChatEvent::topic_name(&auth.group_id));
    let delivered = topic.publish(ChatEvent::MessageCreated {
        message: created.clone(),
    });
    tracing::trace!(group_id = %auth.group_id, delivered, "Chat message broadcast");

    Ok((StatusCode::CREATED, Json(MessageDto::from(created))))
}

/// Delete a chat message (author only)
#[utoipa::path(
    delete,
    path = "/api/v1/messages/{message_id}",
    tag = "chat",
    params(
        ("message_id" = String, Path, description = "Message ID")
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Only the author may delete this message"),
        (status = 404, description = "Message not found")
    )
)]
pub async fn delete_message(
    State(state): State<ChatApiState>,
    auth: Auth,
    Path(message_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !is_valid_id(&message_id) {
        return Err(ApiError::bad_request("INVALID_ID", "Invalid message id"));
    }

    let pool = state.database.pool();
    let found = message::get_message(pool, &message_id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| ApiError::not_found("MESSAGE_NOT_FOUND", "Message not found"))?;

    if found.author_id != auth.user_id() {
        return Err(ApiError::forbidden(
            "NOT_MESSAGE_AUTHOR",
            "Only the message's author may delete it",
        ));
    }

    message::delete_message(pool, &message_id)
        .await
        .map_err(ApiError::from_sqlite)?;

    let topic = state
        .topics
        .broadcast_topic::<ChatEvent>(&ChatEvent::topic_name(&found.group_id));
    topic.publish(ChatEvent::MessageDeleted {
        message_id,
        group_id: found.group_id,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Broadcast a typing indicator (members only, never persisted)
#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/messages/typing",
    tag = "chat",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 202, description = "Typing indicator broadcast"),
        (status = 403, description = "Not a member of this group")
    )
)]
pub async fn typing(
    State(state): State<ChatApiState>,
    auth: GroupMember,
) -> Result<StatusCode, ApiError> {
    let display_name = crate::data::sqlite::repositories::user::get_user(
        state.database.pool(),
        auth.auth.user_id(),
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .and_then(|u| u.display_name);

    let topic = state
        .topics
        .broadcast_topic::<ChatEvent>(&ChatEvent::topic_name(&auth.group_id));
    topic.publish(ChatEvent::Typing {
        group_id: auth.group_id.clone(),
        user_id: auth.auth.user_id().to_string(),
        display_name,
    });

    Ok(StatusCode::ACCEPTED)
}

/// SSE stream of chat events for a group (members only)
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}/messages/events",
    tag = "chat",
    params(
        ("group_id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Server-sent chat events"),
        (status = 403, description = "Not a member of this group")
    )
)]
pub async fn events(
    State(state): State<ChatApiState>,
    auth: GroupMember,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let topic = state
        .topics
        .broadcast_topic::<ChatEvent>(&ChatEvent::topic_name(&auth.group_id));
    let mut subscriber = topic.subscribe();
    let mut shutdown_rx = state.shutdown_rx.clone();

    let stream = async_stream::stream! {
        loop {
            tokio::select! {
                biased;
                // Check for shutdown signal first
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        // Notify client before closing so it can reconnect
                        yield Ok(Event::default().event("terminate").data("shutdown"));
                        break;
                    }
                }
                result = subscriber.recv() => {
                    match result {
                        Ok(event) => {
                            match serde_json::to_string(&event) {
                                Ok(data) => {
                                    yield Ok(Event::default().event("chat").data(data));
                                }
                                Err(e) => {
                                    tracing::error!(error = %e, "Failed to serialize chat event");
                                }
                            }
                        }
                        Err(TopicError::Lagged(n)) => {
                            tracing::warn!(lagged = n, "Chat subscriber lagged behind");
                        }
                        Err(_) => break,
                    }
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    ))
}
