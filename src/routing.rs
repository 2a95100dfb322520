//! Application router configuration.

use axum::{
    Router,
    routing::get,
};

use crate::{
    AppState,
    category::get_categories_endpoint,
    endpoints,
    transaction::{
        audit_balance_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        get_balance_endpoint, get_transaction_endpoint, list_transactions_endpoint,
        summary_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTIONS_SUMMARY, get(summary_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .patch(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::BALANCE, get(get_balance_endpoint))
        .route(endpoints::BALANCE_AUDIT, get(audit_balance_endpoint))
        .with_state(state)
}

#[cfg(test)]
mod route_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, PaginationConfig, endpoints, owner::OWNER_ID_HEADER};

    use super::build_router;

    fn new_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, "America/Sao_Paulo", PaginationConfig::default()).unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn create_list_and_balance_flow() {
        let server = new_test_server();

        let created = server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 150.0, "category": "pix"}))
            .await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        let created_body: Value = created.json();
        assert_eq!(created_body["transaction"]["amount"], 150.0);
        assert_eq!(created_body["transaction"]["category"], "pix");
        let transaction_id = created_body["transaction"]["id"].as_i64().unwrap();

        let listed = server
            .get(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .await;
        assert_eq!(listed.status_code(), StatusCode::OK);
        let listed_body: Value = listed.json();
        assert_eq!(listed_body["transactions"][0]["id"], transaction_id);
        assert_eq!(listed_body["hasMore"], false);

        let balance = server
            .get(endpoints::BALANCE)
            .add_header(OWNER_ID_HEADER, "1")
            .await;
        assert_eq!(balance.json::<Value>()["balance"], -150.0);
    }

    #[tokio::test]
    async fn update_and_delete_reconcile_the_balance() {
        let server = new_test_server();

        let created = server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 100.0, "category": "pix"}))
            .await;
        let transaction_id = created.json::<Value>()["transaction"]["id"].as_i64().unwrap();
        let transaction_uri = format!("/api/transactions/{transaction_id}");

        let updated = server
            .patch(&transaction_uri)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 100.0, "category": "deposito"}))
            .await;
        assert_eq!(updated.status_code(), StatusCode::OK);
        assert_eq!(updated.json::<Value>()["transaction"]["category"], "deposito");

        let balance = server
            .get(endpoints::BALANCE)
            .add_header(OWNER_ID_HEADER, "1")
            .await;
        assert_eq!(balance.json::<Value>()["balance"], 100.0);

        let deleted = server
            .delete(&transaction_uri)
            .add_header(OWNER_ID_HEADER, "1")
            .await;
        assert_eq!(deleted.status_code(), StatusCode::OK);
        assert_eq!(deleted.json::<Value>()["success"], true);

        let balance = server
            .get(endpoints::BALANCE)
            .add_header(OWNER_ID_HEADER, "1")
            .await;
        assert_eq!(balance.json::<Value>()["balance"], 0.0);
    }

    #[tokio::test]
    async fn requests_without_owner_identity_are_unauthorized() {
        let server = new_test_server();

        let response = server.get(endpoints::TRANSACTIONS).await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"]["kind"], "unauthorized");
    }

    #[tokio::test]
    async fn unregistered_category_is_a_bad_request() {
        let server = new_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 50.0, "category": "boleto"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["kind"], "invalid_category");
    }

    #[tokio::test]
    async fn missing_fields_are_invalid_input() {
        let server = new_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"category": "pix"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn owners_cannot_see_each_others_transactions() {
        let server = new_test_server();

        let created = server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 100.0, "category": "pix"}))
            .await;
        let transaction_id = created.json::<Value>()["transaction"]["id"].as_i64().unwrap();

        let response = server
            .get(&format!("/api/transactions/{transaction_id}"))
            .add_header(OWNER_ID_HEADER, "2")
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"]["kind"], "not_found");
    }

    #[tokio::test]
    async fn statement_pages_with_has_more() {
        let server = new_test_server();
        for amount in 1..=3 {
            server
                .post(endpoints::TRANSACTIONS)
                .add_header(OWNER_ID_HEADER, "1")
                .json(&json!({"amount": f64::from(amount), "category": "deposito"}))
                .await;
        }

        let first_page = server
            .get(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .add_query_param("page", 1)
            .add_query_param("limit", 2)
            .await;
        let first_body: Value = first_page.json();
        assert_eq!(first_body["transactions"].as_array().unwrap().len(), 2);
        assert_eq!(first_body["hasMore"], true);

        let second_page = server
            .get(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .add_query_param("page", 2)
            .add_query_param("limit", 2)
            .await;
        let second_body: Value = second_page.json();
        assert_eq!(second_body["transactions"].as_array().unwrap().len(), 1);
        assert_eq!(second_body["hasMore"], false);
    }

    #[tokio::test]
    async fn absurd_page_numbers_return_an_empty_page() {
        let server = new_test_server();
        server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 10.0, "category": "pix"}))
            .await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .add_query_param("page", u64::MAX)
            .add_query_param("limit", 100)
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert!(body["transactions"].as_array().unwrap().is_empty());
        assert_eq!(body["hasMore"], false);
    }

    #[tokio::test]
    async fn summary_reports_recent_activity() {
        let server = new_test_server();
        server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 200.0, "category": "deposito"}))
            .await;
        server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 50.0, "category": "pix"}))
            .await;

        let response = server
            .get(endpoints::TRANSACTIONS_SUMMARY)
            .add_header(OWNER_ID_HEADER, "1")
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["totalTransactions"], 2);
        assert_eq!(body["netAmount"], 150.0);
    }

    #[tokio::test]
    async fn categories_listing_is_open_to_any_request() {
        let server = new_test_server();

        let response = server.get(endpoints::CATEGORIES).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        let labels: Vec<&str> = body["categories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|category| category["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["Aplicação", "Câmbio", "Depósito", "PIX"]);
    }

    #[tokio::test]
    async fn balance_audit_passes_for_untampered_store() {
        let server = new_test_server();
        server
            .post(endpoints::TRANSACTIONS)
            .add_header(OWNER_ID_HEADER, "1")
            .json(&json!({"amount": 75.0, "category": "cambio"}))
            .await;

        let response = server
            .get(endpoints::BALANCE_AUDIT)
            .add_header(OWNER_ID_HEADER, "1")
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["balance"], -75.0);
    }
}
