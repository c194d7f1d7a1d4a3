use crate::core::harness::CheckRecorder;
use crate::core::suite::ScenarioContext;
use crate::domain::endpoints;
use crate::domain::ports::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Logs in as every configured role and checks the token, the reported role and that a wrong
/// password is refused.
pub struct AuthScenario;

#[async_trait]
impl Scenario for AuthScenario {
    fn name(&self) -> &str {
        "auth"
    }

    fn description(&self) -> &str {
        "login, /me and wrong-password rejection for each role"
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()> {
        let roles = context.config().configured_roles();
        if roles.is_empty() {
            checks.skip("login", "no credentials configured");
            return Ok(());
        }

        for role in roles {
            let Some(credentials) = context.config().credentials_for(role).cloned() else {
                continue;
            };

            let mut session = context.anonymous_session(role)?;
            match session.login(&credentials).await {
                Ok(info) => {
                    checks.pass(&format!("login as {}", role), "access_token issued");

                    match info.reported_role.as_deref() {
                        Some(reported) => {
                            checks.check(
                                &format!("{} role in login response", role),
                                reported == role.as_api_str(),
                                format!("user.role = {}", reported),
                            );
                        }
                        None => checks.fail(
                            &format!("{} role in login response", role),
                            "login response has no user.role",
                        ),
                    }

                    let me_check = format!("{} /api/auth/me", role);
                    if let Some(me) = checks.request(&me_check, session.get(endpoints::AUTH_ME)).await {
                        if checks.expect_success(&me_check, &me) {
                            let reported = me.body.get("role").and_then(Value::as_str);
                            checks.check(
                                &format!("{} /api/auth/me role", role),
                                reported == Some(role.as_api_str()),
                                format!("role = {}", reported.unwrap_or("<none>")),
                            );
                        }
                    }

                    context.insert_session(session);
                }
                Err(e) => checks.fail(&format!("login as {}", role), e.to_string()),
            }

            let anonymous = context.anonymous_session(role)?;
            let wrong = json!({
                "phone": credentials.phone,
                "password": format!("{}-wrong", credentials.password),
            });
            checks
                .run_check(&format!("{} wrong password rejected", role), async {
                    let response = anonymous
                        .post_json(endpoints::AUTH_LOGIN, &wrong)
                        .await
                        .map_err(|e| e.to_string())?;
                    let details = format!("{} -> {}", response.endpoint, response.status);
                    let rejected = matches!(response.status_code(), 400 | 401 | 403)
                        && response.body.get("access_token").is_none();
                    if rejected {
                        Ok(details)
                    } else {
                        Err(format!("wrong password accepted: {}", details))
                    }
                })
                .await;
        }

        Ok(())
    }
}
