//! Drives a sign-up form through a failed and a successful submit, with
//! engine events printed by a tracing subscriber.
//!
//! Run with: cargo run --example signup_form

use std::time::Duration;

use formguard::prelude::*;
use formguard::testing::{MockForm, MockInput};

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let email = MockInput::text("ada@");
    let username = MockInput::text("admin");
    let password = MockInput::text("short");
    let terms = [MockInput::checkbox()];
    let form = MockForm::new()
        .with_input("#email", &email)
        .with_input("#username", &username)
        .with_input("#password", &password)
        .with_group("#terms", &terms)
        .into_handle();

    let mut engine = FormValidator::new(form).with_renderer(|snapshot: &FormSnapshot| {
        for name in snapshot.invalid_targets() {
            let message = snapshot
                .fields
                .get(name)
                .or_else(|| snapshot.groups.get(name))
                .and_then(|report| report.error_message.as_deref())
                .unwrap_or_default();
            tracing::info!(target: "render", "{}: {}", name, message);
        }
    });

    engine
        .add_field("#email", vec![FieldRule::required(), FieldRule::email()], None)
        .await?;
    engine
        .add_field(
            "#username",
            vec![
                FieldRule::required(),
                FieldRule::custom_async(|value, _| {
                    let taken = value.as_text() == Some("admin");
                    async move {
                        // stands in for a uniqueness lookup
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(!taken)
                    }
                })
                .with_message("Username is already taken"),
            ],
            None,
        )
        .await?;
    engine
        .add_field(
            "#password",
            vec![FieldRule::required(), FieldRule::strong_password()],
            None,
        )
        .await?;
    engine
        .add_required_group("#terms", Some("Accept the terms".into()), None)
        .await?;

    engine
        .on_success(|_| tracing::info!("sign-up accepted"))
        .on_fail(|fields| {
            let invalid = fields.values().filter(|f| f.validity.is_invalid()).count();
            tracing::info!(invalid, "sign-up rejected");
        });

    engine.submit().await;

    email.set_text("ada@example.com");
    username.set_text("ada");
    password.set_text("Lovelace1815!");
    terms[0].set_checked(true);
    engine.submit().await;

    Ok(())
}
