//! HTML pages.
//!
//! Each page has a view model built by its handler and a `render` method that
//! turns it into a complete HTML document. Rendering reads the model only, so
//! the same model always renders to the same page.

use serde::Serialize;

use crate::models::{Profile, Tweet};
use crate::text::html_escape;

/// Model for `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HomeView {
    /// The caller's profile, or an empty one for anonymous callers.
    pub profile: Profile,
    pub tweets: Vec<Tweet>,
    pub logged_in: bool,
}

/// Model for the registration form at `/login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginView {
    pub profile: Profile,
    pub error: String,
    pub logged_in: bool,
}

/// Model for a user's timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub profile: Profile,
    pub tweets: Vec<Tweet>,
    pub logged_in: bool,
}

const COMPOSE_SCRIPT: &str = r#"
        <script>
            document.getElementById('compose').addEventListener('submit', function (event) {
                event.preventDefault();
                var field = document.getElementById('message');
                fetch('/tweet', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ message: field.value })
                }).then(function (response) {
                    if (response.ok) { window.location.reload(); }
                });
            });
        </script>"#;

fn layout(title: &str, logged_in: bool, content: &str) -> String {
    let nav = if logged_in {
        r#"<a href="/logout">Log out</a>"#
    } else {
        r#"<a href="/login">Log in</a>"#
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/public/style.css">
</head>
<body>
    <div class="container">
        <nav><a href="/">Home</a> {nav}</nav>
{content}
    </div>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav,
        content = content
    )
}

fn tweet_list(tweets: &[Tweet]) -> String {
    if tweets.is_empty() {
        return "        <p class=\"empty\">No tweets yet.</p>\n".to_string();
    }
    let mut html = String::from("        <ul class=\"tweets\">\n");
    for tweet in tweets {
        let username = html_escape(&tweet.username);
        html.push_str(&format!(
            "            <li>\n                <a class=\"author\" href=\"/{}\">@{}</a>\n                <p>{}</p>\n                <time datetime=\"{}\">{}</time>\n            </li>\n",
            urlencoding::encode(&tweet.username),
            username,
            html_escape(&tweet.message),
            tweet.time.to_rfc3339(),
            tweet.time.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    html.push_str("        </ul>\n");
    html
}

impl HomeView {
    pub fn render(&self) -> String {
        let mut content = String::new();
        if self.logged_in && !self.profile.username.is_empty() {
            content.push_str(&format!(
                r#"        <h1>Hello, @{}</h1>
        <form id="compose">
            <textarea id="message" name="message" maxlength="280" required></textarea>
            <button type="submit">Tweet</button>
        </form>{}
"#,
                html_escape(&self.profile.username),
                COMPOSE_SCRIPT
            ));
        } else {
            content.push_str("        <h1>Recent tweets</h1>\n");
        }
        content.push_str(&tweet_list(&self.tweets));
        layout("Chirper", self.logged_in, &content)
    }
}

impl LoginView {
    pub fn render(&self) -> String {
        let error = if self.error.is_empty() {
            String::new()
        } else {
            format!(
                "        <p class=\"error\">{}</p>\n",
                html_escape(&self.error)
            )
        };
        let content = format!(
            r#"        <h1>Choose a username</h1>
        <p>Signed in as {}</p>
{}        <form method="post" action="/login">
            <input type="text" name="username" value="{}" maxlength="15" required>
            <button type="submit">Create profile</button>
        </form>
"#,
            html_escape(&self.profile.email),
            error,
            html_escape(&self.profile.username)
        );
        layout("Chirper - Sign up", self.logged_in, &content)
    }
}

impl ProfileView {
    pub fn render(&self) -> String {
        let mut content = format!(
            "        <h1>@{}</h1>\n",
            html_escape(&self.profile.username)
        );
        content.push_str(&tweet_list(&self.tweets));
        layout(
            &format!("Chirper - @{}", self.profile.username),
            self.logged_in,
            &content,
        )
    }
}
