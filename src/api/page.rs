use crate::utils::escape_html;

/// Outcome shown above the prompt form.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Created { title: String, url: String },
    Info(String),
    Failed { detail: String },
}

const STYLE: &str = "body{font-family:'Helvetica Neue',sans-serif;max-width:40rem;margin:3rem auto;padding:0 1rem}\
.ok{color:#1b7f3b}.info{color:#8a6d00}.err{color:#b00020}pre{white-space:pre-wrap;background:#f4f4f4;padding:.5rem}\
input[type=text]{width:100%;padding:.5rem;margin:.5rem 0}";

fn layout(body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Vibe Maker</title>\
<style>{}</style></head><body><h2>&#127926; Vibe Maker &#127926;</h2>{}</body></html>",
        STYLE, body
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!("<p class=\"err\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    layout(&format!(
        "{}<p>To generate your own playlists, please:</p><p><a href=\"/login\">Log in to Spotify</a></p>",
        error
    ))
}

pub fn prompt_page(notice: Option<&Notice>, prompt: &str) -> String {
    let notice = match notice {
        Some(Notice::Created { title, url }) => format!(
            "<p class=\"ok\">&#9989; Playlist created: <strong>{}</strong></p>\
<p>&#128279; <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Open on Spotify</a></p>",
            escape_html(title),
            escape_html(url)
        ),
        Some(Notice::Info(message)) => format!("<p class=\"info\">{}</p>", escape_html(message)),
        Some(Notice::Failed { detail }) => format!(
            "<p class=\"err\">Something went wrong while generating the playlist.</p><pre>{}</pre>",
            escape_html(detail)
        ),
        None => String::new(),
    };

    layout(&format!(
        "<p class=\"ok\">You're logged in!</p><hr>\
<p><em>Describe the vibe you're going for, and I'll generate a playlist on your Spotify</em></p>\
{}\
<form method=\"post\" action=\"/playlist\">\
<label for=\"prompt\">Your playlist idea:</label>\
<input type=\"text\" id=\"prompt\" name=\"prompt\" value=\"{}\" placeholder=\"e.g., I need some chill music to study to\">\
<button type=\"submit\">Make My Playlist</button></form>\
<form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>",
        notice,
        escape_html(prompt)
    ))
}

pub fn message_page(title: &str, message: &str) -> String {
    layout(&format!(
        "<h4>{}</h4><p>{}</p>",
        escape_html(title),
        escape_html(message)
    ))
}
