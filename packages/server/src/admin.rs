//! Admin CRUD handlers.
//!
//! Mutations are forwarded to the backend as-is, then the snapshot is
//! refreshed so subsequent reads see the change. The table name in
//! the path must be one of the known backend tables; anything else is
//! a 404, never a pass-through.

use actix_web::{HttpResponse, web};

use cancer_map_store::{StoreError, tables};

use crate::AppState;

/// Resolves a path segment to a known backend table.
fn admin_table(name: &str) -> Option<&'static str> {
    [
        tables::COUNTIES,
        tables::SITES,
        tables::CARCINOGENS,
        tables::CANCERS,
        tables::CARCINOGEN_CANCER_LINKS,
        tables::SITE_CARCINOGEN_LINKS,
    ]
    .into_iter()
    .find(|table| *table == name)
}

fn unknown_table(name: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": format!("Unknown table {name}")
    }))
}

fn backend_failure(op: &str, table: &str, e: &StoreError) -> HttpResponse {
    log::error!("Failed to {op} in {table}: {e}");
    HttpResponse::BadGateway().json(serde_json::json!({
        "error": format!("Failed to {op}")
    }))
}

/// `POST /api/admin/{table}`
pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let name = path.into_inner();
    let Some(table) = admin_table(&name) else {
        return unknown_table(&name);
    };

    match state.loader.store().insert(table, &body.into_inner()).await {
        Ok(()) => {
            state.refresh().await;
            HttpResponse::Created().finish()
        }
        Err(e) => backend_failure("create row", table, &e),
    }
}

/// `PUT /api/admin/{table}/{id}`
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let (name, id) = path.into_inner();
    let Some(table) = admin_table(&name) else {
        return unknown_table(&name);
    };

    match state.loader.store().update(table, &id, &body.into_inner()).await {
        Ok(()) => {
            state.refresh().await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => backend_failure("update row", table, &e),
    }
}

/// `DELETE /api/admin/{table}/{id}`
pub async fn remove(state: web::Data<AppState>, path: web::Path<(String, String)>) -> HttpResponse {
    let (name, id) = path.into_inner();
    let Some(table) = admin_table(&name) else {
        return unknown_table(&name);
    };

    match state.loader.store().delete(table, &id).await {
        Ok(()) => {
            state.refresh().await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => backend_failure("delete row", table, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tables_resolve() {
        assert_eq!(admin_table("counties"), Some(tables::COUNTIES));
        assert_eq!(
            admin_table("environmental_site_carcinogens"),
            Some(tables::SITE_CARCINOGEN_LINKS)
        );
    }

    #[test]
    fn unknown_tables_do_not_pass_through() {
        assert_eq!(admin_table("users"), None);
        assert_eq!(admin_table(""), None);
    }
}
