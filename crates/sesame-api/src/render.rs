//! HTML pages and htmx fragments. Pure functions of their inputs; every
//! piece of user-supplied text goes through [`escape`].

use sesame_types::models::{Conversation, Message};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{title} · Sesame</title>
    <link rel="stylesheet" href="/static/app.css" />
    <script src="{HTMX_SRC}"></script>
  </head>
  <body>
{body}
  </body>
</html>
"#,
        title = escape(title),
    )
}

pub fn login_page() -> String {
    page(
        "Sign in",
        r##"    <main class="auth">
      <h1>Sign in</h1>
      <form hx-post="/login" hx-target="#auth-result">
        <input type="email" name="email" placeholder="Email" required />
        <input type="password" name="password" placeholder="Password" required />
        <button type="submit">Sign in</button>
      </form>
      <div id="auth-result"></div>
      <a class="google" href="/auth/google">Continue with Google</a>
      <p>No account? <a href="/register">Register</a></p>
    </main>"##,
    )
}

pub fn register_page() -> String {
    page(
        "Register",
        r##"    <main class="auth">
      <h1>Create an account</h1>
      <form hx-post="/register" hx-target="#auth-result">
        <input type="text" name="username" placeholder="Name" required />
        <input type="email" name="email" placeholder="Email" required />
        <input type="password" name="password" placeholder="Password" required />
        <button type="submit">Register</button>
      </form>
      <div id="auth-result"></div>
      <a class="google" href="/auth/google">Continue with Google</a>
      <p>Already registered? <a href="/login">Sign in</a></p>
    </main>"##,
    )
}

pub fn auth_error(message: &str) -> String {
    format!(r#"<div class="alert alert-error">{}</div>"#, escape(message))
}

pub fn auth_success(message: &str) -> String {
    format!(r#"<div class="alert alert-success">{}</div>"#, escape(message))
}

/// Sidebar entry for one conversation.
pub fn conversation_entry(conversation: &Conversation) -> String {
    format!(
        r##"<li class="conversation" id="conversation-{id}">
  <a href="#" hx-get="/chat/{id}" hx-target="#chat-pane">{title}</a>
  <time datetime="{updated}">{updated_short}</time>
</li>"##,
        id = conversation.id,
        title = escape(&conversation.title),
        updated = conversation.updated_at.to_rfc3339(),
        updated_short = conversation.updated_at.format("%b %d"),
    )
}

pub fn main_layout(username: &str, conversations: &[Conversation]) -> String {
    let mut list = String::new();
    for conversation in conversations {
        list.push_str(&conversation_entry(conversation));
        list.push('\n');
    }

    let body = format!(
        r##"    <div class="layout">
      <aside class="sidebar">
        <header>
          <span class="username">{username}</span>
          <button hx-post="/logout">Log out</button>
        </header>
        <button hx-post="/chat" hx-target="#conversations" hx-swap="afterbegin">New chat</button>
        <ul id="conversations">
{list}        </ul>
      </aside>
      <section id="chat-pane">
        <p class="empty">Select a conversation or start a new one.</p>
      </section>
    </div>"##,
        username = escape(username),
    );

    page("Chats", &body)
}

pub fn message_bubble(message: &Message) -> String {
    let class = if message.is_incoming { "incoming" } else { "outgoing" };
    format!(
        r#"<div class="message {class}" id="message-{id}">
  <p>{content}</p>
  <time datetime="{created}">{created_short}</time>
</div>"#,
        id = message.id,
        content = escape(&message.content),
        created = message.created_at.to_rfc3339(),
        created_short = message.created_at.format("%H:%M"),
    )
}

pub fn message_display(conversation: &Conversation, messages: &[Message]) -> String {
    let mut out = format!(
        r##"<header class="chat-title">{title}</header>
<div class="messages" id="messages">
"##,
        title = escape(&conversation.title),
    );
    for message in messages {
        out.push_str(&message_bubble(message));
        out.push('\n');
    }
    out.push_str(&format!(
        r##"</div>
<form hx-post="/chat/{id}/message" hx-target="#messages" hx-swap="beforeend" hx-on::after-request="this.reset()">
  <input type="text" name="content" placeholder="Type a message" autocomplete="off" required />
  <button type="submit">Send</button>
</form>"##,
        id = conversation.id,
    ));
    out
}

/// Response to one user turn: both bubbles in a single swap target.
pub fn turn(sent: &Message, reply: &Message) -> String {
    format!("<div>{}{}</div>", message_bubble(sent), message_bubble(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(content: &str, is_incoming: bool) -> Message {
        Message {
            id: 1,
            conversation_id: 1,
            content: content.into(),
            is_incoming,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn bubbles_escape_content_and_mark_direction() {
        let html = message_bubble(&message("<b>hi</b>", false));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("outgoing"));

        let html = message_bubble(&message("hello", true));
        assert!(html.contains("incoming"));
    }

    #[test]
    fn layout_lists_conversations_and_escapes_username() {
        let conversation = Conversation {
            id: 42,
            user_id: 1,
            ai_id: None,
            title: "New Chat".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let html = main_layout("<ada>", &[conversation]);
        assert!(html.contains("/chat/42"));
        assert!(html.contains("&lt;ada&gt;"));
        assert!(!html.contains("<ada>"));
    }
}
