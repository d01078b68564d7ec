use axum::{
    Extension, Form,
    extract::{Path, State},
    response::Html,
};
use tracing::debug;

use sesame_types::api::SendMessageForm;
use sesame_types::session::CurrentUser;

use crate::{ApiError, AppState, render, with_db};

fn parse_conversation_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation("Invalid conversation ID"))
}

pub async fn show_main_interface(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, ApiError> {
    let user_id = user.id;
    let conversations = with_db(&state, move |db| db.list_conversations(user_id)).await?;

    Ok(Html(render::main_layout(&user.username, &conversations)))
}

pub async fn get_chat_messages(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let conversation_id = parse_conversation_id(&id)?;

    let (conversation, messages) = with_db(&state, move |db| {
        let conversation = db.get_conversation(conversation_id, user.id)?;
        let messages = db.list_messages(conversation.id)?;
        Ok((conversation, messages))
    })
    .await?;

    Ok(Html(render::message_display(&conversation, &messages)))
}

pub async fn create_chat(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, ApiError> {
    let conversation = with_db(&state, move |db| db.create_conversation(user.id)).await?;

    Ok(Html(render::conversation_entry(&conversation)))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<SendMessageForm>,
) -> Result<Html<String>, ApiError> {
    let conversation_id = parse_conversation_id(&id)?;

    let (sent, reply) = with_db(&state, move |db| {
        db.get_conversation(conversation_id, user.id)?;
        db.record_turn(conversation_id, &form.content)
    })
    .await?;

    debug!("Recorded turn {} / {} in conversation {}", sent.id, reply.id, conversation_id);
    Ok(Html(render::turn(&sent, &reply)))
}
