//! HTML for the chat page. All user and model text goes through
//! `ammonia::clean_text` before it reaches the markup.

use ammonia::clean_text;

use crate::session::{ChatTurn, Speaker};

const PAGE_TITLE: &str = "Lavender\u{2019}s Garden Chat";

const STYLE: &str = r#"
    body { font-family: Georgia, serif; background: #1e1b26; color: #ffffff; margin: 0; }
    main { max-width: 46rem; margin: 2rem auto; padding: 2rem; border-radius: 15px;
           background-color: rgba(20, 20, 30, 0.85); box-shadow: 0 0 20px rgba(0,0,0,0.5); }
    h1 { text-align: center; font-size: 3rem; color: #E0D4F5; text-shadow: 2px 2px 8px #00000080; }
    form { display: flex; gap: 0.5rem; }
    label { display: block; margin-bottom: 0.5rem; }
    input[type="text"] { flex: 1; background-color: rgba(255, 255, 255, 0.15); color: #FFFFFF;
           border: 1px solid #CCCCCC; border-radius: 8px; padding: 0.5rem; }
    input[type="text"]:focus { border: 1px solid #B388EB; box-shadow: 0 0 8px #B388EB; outline: none; }
    .turn { padding: 1rem; border-radius: 10px; margin-top: 1rem; white-space: pre-wrap; }
    .turn.user { background-color: rgba(255, 255, 255, 0.85); color: #333333; }
    .turn.assistant { background-color: rgba(240, 240, 255, 0.85); color: #4B4453; }
    .error { padding: 1rem; border-radius: 10px; margin-top: 1rem; background: #5c1f2b; color: #ffd9df; }
"#;

/// Renders the whole page: input form, optional error banner, and every
/// turn oldest first.
pub fn render_chat_page(session_id: &str, turns: &[ChatTurn], error: Option<&str>) -> String {
    let action = format!("/chat/{}", clean_text(session_id));

    let mut body = String::new();
    body.push_str(&format!("<h1>\u{1F338} {}</h1>\n", PAGE_TITLE));
    body.push_str(&format!(
        "<form method=\"post\" action=\"{}\">\n\
         <label for=\"message\">Speak your heart:</label>\n\
         <input type=\"text\" id=\"message\" name=\"message\" autofocus autocomplete=\"off\">\n\
         </form>\n",
        action
    ));

    if let Some(message) = error {
        body.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>\n",
            clean_text(message)
        ));
    }

    body.push_str("<section class=\"transcript\">\n");
    for turn in turns {
        body.push_str(&render_turn(turn));
    }
    body.push_str("</section>\n");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Lavender's Garden</title>\n<style>{}</style>\n</head>\n\
         <body>\n<main>\n{}</main>\n</body>\n</html>\n",
        STYLE, body
    )
}

fn render_turn(turn: &ChatTurn) -> String {
    let class = match turn.speaker {
        Speaker::User => "user",
        Speaker::Assistant => "assistant",
    };
    format!(
        "<div class=\"turn {}\"><strong>{}:</strong><br>{}</div>\n",
        class,
        turn.speaker.label(),
        clean_text(&turn.message)
    )
}
