//! Server-rendered pages. Plain string assembly; everything user-provided
//! goes through [`escape`].

use crate::auth::dto::ValidationError;
use crate::users::User;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, nav: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
</head>
<body>
  <nav>{nav}</nav>
  <main>
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        body = body,
    )
}

fn nav_for(user: Option<&User>) -> String {
    match user {
        Some(u) => format!(
            r#"<a href="/">Home</a> <a href="/dashboard">Dashboard</a> <a href="/logout">Log out</a> <span>{}</span>"#,
            escape(&u.full_name())
        ),
        None => r#"<a href="/">Home</a> <a href="/login">Log in</a> <a href="/register">Register</a>"#
            .to_string(),
    }
}

pub fn home(user: Option<&User>) -> String {
    let body = match user {
        Some(u) => format!(
            "    <h1>Welcome back, {}</h1>\n    <p>Head to your <a href=\"/dashboard\">dashboard</a>.</p>",
            escape(&u.first_name)
        ),
        None => "    <h1>Welcome</h1>\n    <p><a href=\"/login\">Log in</a> or <a href=\"/register\">create an account</a>.</p>"
            .to_string(),
    };
    layout("Home", &nav_for(user), &body)
}

pub fn login_page(flash: Option<&str>) -> String {
    let notice = match flash {
        Some(msg) => format!("    <p class=\"flash\">{}</p>\n", escape(msg)),
        None => String::new(),
    };
    let body = format!(
        r#"    <h1>Log in</h1>
{notice}    <form method="post" action="/login">
      <label>Email <input type="email" name="email" required></label>
      <label>Password <input type="password" name="password" required></label>
      <button type="submit">Log in</button>
    </form>
    <p>No account? <a href="/register">Register</a>.</p>"#,
    );
    layout("Log in", &nav_for(None), &body)
}

pub fn register_page(error: Option<&ValidationError>) -> String {
    let notice = match error {
        Some(e) => format!(
            "    <p class=\"error\" data-field=\"{}\">{}</p>\n",
            escape(e.field),
            escape(e.message)
        ),
        None => String::new(),
    };
    let body = format!(
        r#"    <h1>Register</h1>
{notice}    <form method="post" action="/register">
      <label>First name <input type="text" name="first_name" required></label>
      <label>Last name <input type="text" name="last_name" required></label>
      <label>Email <input type="email" name="email" required></label>
      <label>Password <input type="password" name="password" required></label>
      <label>Role
        <select name="role">
          <option value="user" selected>User</option>
          <option value="admin">Admin</option>
        </select>
      </label>
      <button type="submit">Register</button>
    </form>
    <p>Already registered? <a href="/login">Log in</a>.</p>"#,
    );
    layout("Register", &nav_for(None), &body)
}

fn profile_image_block(user: &User) -> String {
    let current = if user.profile_image.is_empty() {
        "    <p>No profile image yet.</p>".to_string()
    } else {
        format!(
            "    <img src=\"{}\" alt=\"profile image\" width=\"128\">",
            escape(&user.profile_image)
        )
    };
    format!(
        r#"{current}
    <form method="post" action="/upload-profile-image" enctype="multipart/form-data">
      <label>Profile image <input type="file" name="profile_image" accept=".jpg,.jpeg,.png,.gif"></label>
      <button type="submit">Upload</button>
    </form>"#,
    )
}

pub fn user_dashboard(user: &User) -> String {
    let body = format!(
        "    <h1>Dashboard</h1>\n    <p>Signed in as {} ({})</p>\n{}",
        escape(&user.full_name()),
        escape(&user.email),
        profile_image_block(user)
    );
    layout("Dashboard", &nav_for(Some(user)), &body)
}

pub fn admin_dashboard(user: &User) -> String {
    let body = format!(
        "    <h1>Admin dashboard</h1>\n    <p>Signed in as {} ({})</p>\n    <p><a href=\"/admin\">Admin view</a></p>\n{}",
        escape(&user.full_name()),
        escape(&user.email),
        profile_image_block(user)
    );
    layout("Admin dashboard", &nav_for(Some(user)), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserRole;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            password_hash: "$argon2id$hash".into(),
            role,
            profile_image: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("a & b'"), "a &amp; b&#39;");
    }

    #[test]
    fn home_offers_login_when_anonymous() {
        let html = home(None);
        assert!(html.contains("/login"));
        assert!(html.contains("/register"));
        assert!(!html.contains("Welcome back"));
    }

    #[test]
    fn home_greets_signed_in_user() {
        let u = user(UserRole::User);
        let html = home(Some(&u));
        assert!(html.contains("Welcome back, Grace"));
        assert!(html.contains("/logout"));
    }

    #[test]
    fn login_page_renders_flash_once_given() {
        assert!(!login_page(None).contains("class=\"flash\""));
        let html = login_page(Some("Invalid email or password"));
        assert!(html.contains("Invalid email or password"));
    }

    #[test]
    fn register_page_renders_field_error() {
        let err = ValidationError {
            field: "email",
            message: "Email already registered",
        };
        let html = register_page(Some(&err));
        assert!(html.contains("data-field=\"email\""));
        assert!(html.contains("Email already registered"));
    }

    #[test]
    fn dashboards_never_leak_the_password_hash() {
        let u = user(UserRole::Admin);
        for html in [user_dashboard(&u), admin_dashboard(&u)] {
            assert!(!html.contains("argon2id"));
            assert!(html.contains("grace@example.com"));
        }
    }

    #[test]
    fn markup_in_names_is_escaped() {
        let mut u = user(UserRole::User);
        u.first_name = "<b>Grace</b>".into();
        let html = user_dashboard(&u);
        assert!(!html.contains("<b>Grace</b>"));
        assert!(html.contains("&lt;b&gt;Grace&lt;/b&gt;"));
    }
}
