use axum::extract::State;
use axum::response::Response;
use axum::Form;
use contracts::domain::a001_company::aggregate::{current_year, Company, CompanyForm};
use contracts::shared::messages::FlashMessage;
use serde_json::{json, Value};

use super::crud::crud_failure;
use crate::domain::a001_company::service::CompanyService;
use crate::shared::crud::CrudError;
use crate::shared::state::AppState;
use crate::shared::web::{render, ViewContext, ViewOutcome};

const DETAIL_URL: &str = "/company/";
const ALREADY_EXISTS_MESSAGE: &str = "Company information already exists. You can edit it.";

fn service(state: &AppState) -> CompanyService {
    CompanyService::new(state.db.clone())
}

fn present(company: &Company) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(company)?;
    value["years_of_operation"] = company.years_of_operation(current_year()).into();
    Ok(value)
}

fn already_exists() -> ViewOutcome {
    ViewOutcome::refused(DETAIL_URL, FlashMessage::warning(ALREADY_EXISTS_MESSAGE))
}

async fn detail_outcome(state: &AppState) -> anyhow::Result<ViewOutcome> {
    match service(state).get_singleton().await? {
        Some(company) => Ok(ViewOutcome::Page(json!({
            "title": "Company",
            "record": present(&company)?,
            "update_url": "/company/update/",
            "delete_url": "/company/delete/",
        }))),
        None => Ok(ViewOutcome::NoInformation),
    }
}

/// GET /company/
pub async fn detail(State(state): State<AppState>, ctx: ViewContext) -> Response {
    let outcome = detail_outcome(&state).await;
    render(ctx, outcome)
}

async fn create_form_outcome(state: &AppState) -> anyhow::Result<ViewOutcome> {
    if service(state).exists().await? {
        return Ok(already_exists());
    }
    Ok(ViewOutcome::Page(json!({
        "title": "New company information",
        "form": CompanyForm::default(),
        "errors": {},
    })))
}

/// GET /company/create/
pub async fn create_form(State(state): State<AppState>, ctx: ViewContext) -> Response {
    let outcome = create_form_outcome(&state).await;
    render(ctx, outcome)
}

async fn create_outcome(state: &AppState, form: &CompanyForm) -> anyhow::Result<ViewOutcome> {
    match service(state).create_if_absent(form, current_year()).await {
        Ok(_) => Ok(ViewOutcome::redirect(
            DETAIL_URL,
            FlashMessage::success("Company information created successfully."),
        )),
        Err(CrudError::AlreadyExists) => Ok(already_exists()),
        Err(e) => crud_failure(e, serde_json::to_value(form)?),
    }
}

/// POST /company/create/
pub async fn create(
    State(state): State<AppState>,
    ctx: ViewContext,
    Form(form): Form<CompanyForm>,
) -> Response {
    let outcome = create_outcome(&state, &form).await;
    render(ctx, outcome)
}

async fn update_form_outcome(state: &AppState) -> anyhow::Result<ViewOutcome> {
    match service(state).get_singleton().await? {
        Some(company) => Ok(ViewOutcome::Page(json!({
            "title": "Edit company information",
            "record": present(&company)?,
            "form": CompanyForm::from(&company),
            "errors": {},
        }))),
        None => Ok(ViewOutcome::NotFound),
    }
}

/// GET /company/update/
pub async fn update_form(State(state): State<AppState>, ctx: ViewContext) -> Response {
    let outcome = update_form_outcome(&state).await;
    render(ctx, outcome)
}

async fn update_outcome(state: &AppState, form: &CompanyForm) -> anyhow::Result<ViewOutcome> {
    match service(state).update_singleton(form, current_year()).await {
        Ok(_) => Ok(ViewOutcome::redirect(
            DETAIL_URL,
            FlashMessage::success("Company information updated successfully."),
        )),
        Err(e) => crud_failure(e, serde_json::to_value(form)?),
    }
}

/// POST /company/update/
pub async fn update(
    State(state): State<AppState>,
    ctx: ViewContext,
    Form(form): Form<CompanyForm>,
) -> Response {
    let outcome = update_outcome(&state, &form).await;
    render(ctx, outcome)
}

async fn delete_confirm_outcome(state: &AppState) -> anyhow::Result<ViewOutcome> {
    match service(state).get_singleton().await? {
        Some(company) => Ok(ViewOutcome::Page(json!({
            "title": "Delete company information",
            "record": present(&company)?,
            "cancel_url": DETAIL_URL,
        }))),
        None => Ok(ViewOutcome::NotFound),
    }
}

/// GET /company/delete/
pub async fn delete_confirm(State(state): State<AppState>, ctx: ViewContext) -> Response {
    let outcome = delete_confirm_outcome(&state).await;
    render(ctx, outcome)
}

/// POST /company/delete/
pub async fn delete(State(state): State<AppState>, ctx: ViewContext) -> Response {
    let outcome = match service(&state).delete_singleton().await {
        Ok(()) => Ok(ViewOutcome::redirect(
            DETAIL_URL,
            FlashMessage::success("Company information deleted successfully."),
        )),
        Err(e) => crud_failure(e, Value::Null),
    };
    render(ctx, outcome)
}
