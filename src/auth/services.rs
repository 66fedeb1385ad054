use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::auth::{
    dto::{LoginRequest, RegisterRequest},
    password::{hash_password, verify_password},
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User, UserChanges},
    validation::{normalize_email, validate_user, PasswordPolicy, EMAIL_TAKEN},
};
use crate::error::{AppError, AppResult};

fn hash(plain: &str) -> AppResult<String> {
    hash_password(plain).map_err(|e| AppError::PasswordHash(e.to_string()))
}

// A write that loses the race on the unique email index reports like a
// validation failure.
fn duplicate_as_validation(e: StoreError) -> AppError {
    match e {
        StoreError::DuplicateEmail => AppError::Validation(vec![EMAIL_TAKEN.to_string()]),
        other => AppError::Store(other),
    }
}

/// Validate, hash and insert a new user.
pub async fn register_user(store: &dyn UserStore, req: RegisterRequest) -> AppResult<User> {
    let full_name = req.full_name.trim();
    let email = normalize_email(&req.email);

    let errors = validate_user(
        store,
        full_name,
        &email,
        &req.password,
        None,
        PasswordPolicy::Required,
    )
    .await?;
    if !errors.is_empty() {
        warn!(errors = ?errors, "registration rejected");
        return Err(AppError::Validation(errors));
    }

    let password_hash = hash(&req.password)?;
    let user = store
        .insert(NewUser {
            full_name: full_name.to_string(),
            email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        })
        .await
        .map_err(duplicate_as_validation)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Check credentials and return the matching user.
pub async fn authenticate_user(store: &dyn UserStore, req: LoginRequest) -> AppResult<User> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.trim().is_empty() {
        return Err(AppError::MissingCredentials);
    }

    let Some(user) = store.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let ok = verify_password(&req.password, &user.password_hash)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, "user logged in");
    Ok(user)
}

pub async fn list_users(store: &dyn UserStore) -> AppResult<Vec<User>> {
    let users = store.list().await?;
    debug!(count = users.len(), "users listed");
    Ok(users)
}

/// Edit name and email; rehash only when a new password is given.
pub async fn edit_user(store: &dyn UserStore, id: i64, req: RegisterRequest) -> AppResult<User> {
    if store.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(id));
    }

    let full_name = req.full_name.trim();
    let email = normalize_email(&req.email);

    let errors = validate_user(
        store,
        full_name,
        &email,
        &req.password,
        Some(id),
        PasswordPolicy::KeepIfEmpty,
    )
    .await?;
    if !errors.is_empty() {
        warn!(user_id = id, errors = ?errors, "edit rejected");
        return Err(AppError::Validation(errors));
    }

    let password_hash = if req.password.trim().is_empty() {
        None
    } else {
        Some(hash(&req.password)?)
    };

    let user = store
        .update(
            id,
            UserChanges {
                full_name: full_name.to_string(),
                email,
                password_hash,
                updated_at: OffsetDateTime::now_utc(),
            },
        )
        .await
        .map_err(duplicate_as_validation)?
        // deleted between the lookup and the write
        .ok_or(AppError::NotFound(id))?;

    info!(user_id = user.id, "user updated");
    Ok(user)
}

pub async fn delete_user(store: &dyn UserStore, id: i64) -> AppResult<()> {
    if !store.delete(id).await? {
        return Err(AppError::NotFound(id));
    }
    info!(user_id = id, "user deleted");
    Ok(())
}
