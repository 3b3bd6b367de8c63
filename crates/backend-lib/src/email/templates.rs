// ============================
// crates/backend-lib/src/email/templates.rs
// ============================
//! Email bodies for the password reset flow.

use crate::models::User;
use chrono::{Datelike, Utc};

pub const PASSWORD_RESET_SUBJECT: &str = "Password Reset Request";

/// HTML body for the password reset email
pub fn password_reset_html(user: &User, reset_url: &str) -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<html>
  <body>
    <p>Hello {first_name},</p>
    <p>We received a request to reset the password for your account.</p>
    <p><a href="{reset_url}">Reset your password</a></p>
    <p>If the button does not work, copy this link into your app:</p>
    <p>{reset_url}</p>
    <p>This link expires in one hour. If you did not request a reset,
    you can safely ignore this email.</p>
    <p>&copy; {current_year} Songa</p>
  </body>
</html>"#,
        first_name = user.first_name,
    )
}

/// Plain-text alternative for the password reset email
pub fn password_reset_text(user: &User, reset_url: &str) -> String {
    let current_year = Utc::now().year();
    format!(
        "Hello {first_name},\n\n\
         We received a request to reset the password for your account.\n\n\
         Open this link to choose a new password:\n\
         {reset_url}\n\n\
         This link expires in one hour. If you did not request a reset,\n\
         you can safely ignore this email.\n\n\
         (c) {current_year} Songa\n",
        first_name = user.first_name,
    )
}
