use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Form;
use contracts::domain::common::{AggregateForm, AggregateRoot};
use contracts::shared::messages::FlashMessage;
use serde::Serialize;
use serde_json::{json, Value};

use crate::shared::crud::{CrudController, CrudError, CrudRepository, ListQuery};
use crate::shared::state::AppState;
use crate::shared::web::{render, ViewContext, ViewOutcome};

/// Catalog aggregate served by the generic handlers below
pub trait CrudResource: Send + Sync + 'static {
    type Aggregate: AggregateRoot + Serialize + Send + Sync + 'static;
    type Repository: CrudRepository<Aggregate = Self::Aggregate> + 'static;
    type Form: AggregateForm<Aggregate = Self::Aggregate>;

    /// Route prefix, e.g. `/worker`
    const BASE_PATH: &'static str;
    const PAGE_SIZE: u64;

    fn repository(state: &AppState) -> Self::Repository;

    /// JSON shape of one record in list and detail pages
    fn present(aggregate: &Self::Aggregate) -> serde_json::Result<Value> {
        serde_json::to_value(aggregate)
    }

    fn controller(state: &AppState) -> CrudController<Self::Repository, Self::Form> {
        CrudController::new(Self::repository(state), Self::PAGE_SIZE)
    }

    fn list_url() -> String {
        format!("{}/", Self::BASE_PATH)
    }
}

/// Map a CRUD error onto the outcome shown to the user.
/// `form` is echoed back when the submission is redisplayed.
pub fn crud_failure(err: CrudError, form: Value) -> anyhow::Result<ViewOutcome> {
    match err {
        CrudError::Validation(errors) | CrudError::Conflict(errors) => {
            Ok(ViewOutcome::Form { form, errors })
        }
        CrudError::NotFound => Ok(ViewOutcome::NotFound),
        other => Err(other.into()),
    }
}

fn success_message<T: CrudResource>(action: &str) -> FlashMessage {
    FlashMessage::success(format!(
        "{} {} successfully.",
        T::Aggregate::element_name(),
        action
    ))
}

async fn list_outcome<T: CrudResource>(
    state: &AppState,
    query: &ListQuery,
) -> anyhow::Result<ViewOutcome> {
    let page = T::controller(state)
        .list(query)
        .await?
        .try_map(|aggregate| T::present(&aggregate))?;
    Ok(ViewOutcome::Page(json!({
        "title": T::Aggregate::list_name(),
        "page": page,
        "search_query": query.q.as_deref().map(str::trim).unwrap_or_default(),
        "create_url": format!("{}/create/", T::BASE_PATH),
    })))
}

/// GET /{entity}/?page=&q=
pub async fn list<T: CrudResource>(
    State(state): State<AppState>,
    ctx: ViewContext,
    Query(query): Query<ListQuery>,
) -> Response {
    let outcome = list_outcome::<T>(&state, &query).await;
    render(ctx, outcome)
}

async fn detail_outcome<T: CrudResource>(state: &AppState, id: &str) -> anyhow::Result<ViewOutcome> {
    match T::controller(state).get(id).await {
        Ok(aggregate) => Ok(ViewOutcome::Page(json!({
            "title": T::Aggregate::element_name(),
            "record": T::present(&aggregate)?,
            "list_url": T::list_url(),
        }))),
        Err(e) => crud_failure(e, Value::Null),
    }
}

/// GET /{entity}/:id/
pub async fn detail<T: CrudResource>(
    State(state): State<AppState>,
    ctx: ViewContext,
    Path(id): Path<String>,
) -> Response {
    let outcome = detail_outcome::<T>(&state, &id).await;
    render(ctx, outcome)
}

/// GET /{entity}/create/
pub async fn create_form<T: CrudResource>(State(state): State<AppState>, ctx: ViewContext) -> Response {
    let form = T::controller(&state).blank_form();
    let outcome = serde_json::to_value(&form)
        .map(|form| {
            ViewOutcome::Page(json!({
                "title": format!("New {}", T::Aggregate::element_name()),
                "form": form,
                "errors": {},
            }))
        })
        .map_err(Into::into);
    render(ctx, outcome)
}

async fn create_outcome<T: CrudResource>(
    state: &AppState,
    form: &T::Form,
) -> anyhow::Result<ViewOutcome> {
    match T::controller(state).create(form).await {
        Ok(_) => Ok(ViewOutcome::redirect(
            T::list_url(),
            success_message::<T>("created"),
        )),
        Err(e) => crud_failure(e, serde_json::to_value(form)?),
    }
}

/// POST /{entity}/create/
pub async fn create<T: CrudResource>(
    State(state): State<AppState>,
    ctx: ViewContext,
    Form(form): Form<T::Form>,
) -> Response {
    let outcome = create_outcome::<T>(&state, &form).await;
    render(ctx, outcome)
}

async fn update_form_outcome<T: CrudResource>(
    state: &AppState,
    id: &str,
) -> anyhow::Result<ViewOutcome> {
    match T::controller(state).edit_form(id).await {
        Ok((aggregate, form)) => Ok(ViewOutcome::Page(json!({
            "title": format!("Edit {}", T::Aggregate::element_name()),
            "record": T::present(&aggregate)?,
            "form": form,
            "errors": {},
        }))),
        Err(e) => crud_failure(e, Value::Null),
    }
}

/// GET /{entity}/:id/update/
pub async fn update_form<T: CrudResource>(
    State(state): State<AppState>,
    ctx: ViewContext,
    Path(id): Path<String>,
) -> Response {
    let outcome = update_form_outcome::<T>(&state, &id).await;
    render(ctx, outcome)
}

async fn update_outcome<T: CrudResource>(
    state: &AppState,
    id: &str,
    form: &T::Form,
) -> anyhow::Result<ViewOutcome> {
    match T::controller(state).update(id, form).await {
        Ok(_) => Ok(ViewOutcome::redirect(
            T::list_url(),
            success_message::<T>("updated"),
        )),
        Err(e) => crud_failure(e, serde_json::to_value(form)?),
    }
}

/// POST /{entity}/:id/update/
pub async fn update<T: CrudResource>(
    State(state): State<AppState>,
    ctx: ViewContext,
    Path(id): Path<String>,
    Form(form): Form<T::Form>,
) -> Response {
    let outcome = update_outcome::<T>(&state, &id, &form).await;
    render(ctx, outcome)
}

async fn delete_confirm_outcome<T: CrudResource>(
    state: &AppState,
    id: &str,
) -> anyhow::Result<ViewOutcome> {
    match T::controller(state).get(id).await {
        Ok(aggregate) => Ok(ViewOutcome::Page(json!({
            "title": format!("Delete {}", T::Aggregate::element_name()),
            "record": T::present(&aggregate)?,
            "cancel_url": T::list_url(),
        }))),
        Err(e) => crud_failure(e, Value::Null),
    }
}

/// GET /{entity}/:id/delete/
pub async fn delete_confirm<T: CrudResource>(
    State(state): State<AppState>,
    ctx: ViewContext,
    Path(id): Path<String>,
) -> Response {
    let outcome = delete_confirm_outcome::<T>(&state, &id).await;
    render(ctx, outcome)
}

/// POST /{entity}/:id/delete/
pub async fn delete<T: CrudResource>(
    State(state): State<AppState>,
    ctx: ViewContext,
    Path(id): Path<String>,
) -> Response {
    let outcome = match T::controller(&state).delete(&id).await {
        Ok(()) => Ok(ViewOutcome::redirect(
            T::list_url(),
            success_message::<T>("deleted"),
        )),
        Err(e) => crud_failure(e, Value::Null),
    };
    render(ctx, outcome)
}
