use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Creates or repairs the configured administrator account.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = &admin.first_superuser_email;
    let existing = repositories::users::find_by_email(state.db(), email).await?;
    let now = primitive_now_utc();

    if let Some(user) = existing {
        if user.role != UserRole::Admin {
            tracing::warn!(
                user_id = %user.id,
                email = %email,
                "Configured superuser email belongs to a non-admin account; leaving it untouched"
            );
            return Ok(());
        }

        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);
        if verified {
            tracing::info!("Default superuser already up to date");
            return Ok(());
        }

        let hashed_password = security::hash_password(&admin.first_superuser_password)?;
        repositories::users::update_password(state.db(), &user.id, &hashed_password, now).await?;
        tracing::info!(email = %email, "Updated default superuser password");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            name: &admin.first_superuser_name,
            email,
            hashed_password,
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(email = %email, "Created default superuser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn creates_admin_once_and_repairs_password() {
        let Some(ctx) = test_support::setup_test_context().await else {
            return;
        };

        ensure_superuser(&ctx.state).await.expect("bootstrap");
        ensure_superuser(&ctx.state).await.expect("bootstrap is idempotent");

        let email = &ctx.state.settings().admin().first_superuser_email;
        let admin = repositories::users::find_by_email(ctx.state.db(), email)
            .await
            .expect("lookup")
            .expect("admin exists");
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(repositories::users::count_by_role(ctx.state.db(), UserRole::Admin).await.unwrap(), 1);

        let password = &ctx.state.settings().admin().first_superuser_password;
        assert!(security::verify_password(password, &admin.hashed_password).unwrap());
    }
}
