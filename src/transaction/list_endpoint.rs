//! Defines the endpoint for listing the logged in user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Query, QueryRejection};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    pagination::{Page, PaginationConfig},
    transaction::{
        TransactionType,
        query::{TransactionFilter, count_transactions, query_transactions},
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The defaults and limits for paging through transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters accepted when listing transactions.
///
/// Parameters given as empty strings are treated as missing. The type and
/// paging parameters are kept as text so that bad values can fall back to
/// a result instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    date_from: Option<Date>,
    date_to: Option<Date>,
    page: Option<String>,
    page_size: Option<String>,
    /// Set to false to get every matching transaction in one flat list.
    paginate: Option<bool>,
}

impl ListQuery {
    /// The filter for this query, or `None` if the requested type can never
    /// match a transaction.
    fn filter(&self) -> Option<TransactionFilter> {
        let transaction_type = match non_empty(&self.transaction_type) {
            Some(text) => Some(text.parse::<TransactionType>().ok()?),
            None => None,
        };

        Some(TransactionFilter {
            category: self.category.clone(),
            transaction_type,
            date_from: self.date_from,
            date_to: self.date_to,
        })
    }

    /// # Errors
    ///
    /// Returns [Error::InvalidPage] if the page is not a whole number.
    fn page(&self) -> Result<Option<u64>, Error> {
        non_empty(&self.page)
            .map(|text| text.parse::<u64>().map_err(|_| Error::InvalidPage))
            .transpose()
    }

    /// Unreadable page sizes are ignored so the default is used.
    fn page_size(&self) -> Option<u64> {
        non_empty(&self.page_size).and_then(|text| text.parse().ok())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// A route handler for listing the transactions of the logged in user, newest
/// first.
///
/// Responds with a page of transactions, or with a flat list of all matching
/// transactions if `paginate=false` was given. A `type` other than "income" or
/// "expense" matches nothing.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    let filter = query.filter();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    if query.paginate == Some(false) {
        let transactions = match &filter {
            Some(filter) => query_transactions(user_id, filter, None, &connection)?,
            None => Vec::new(),
        };
        return Ok(Json(transactions).into_response());
    }

    let request = state
        .pagination_config
        .resolve(query.page()?, query.page_size());
    let (transactions, count) = match &filter {
        Some(filter) => (
            query_transactions(user_id, filter, Some(request), &connection)?,
            count_transactions(user_id, filter, &connection)?,
        ),
        None => (Vec::new(), 0),
    };
    let query_pairs = filter
        .as_ref()
        .map(TransactionFilter::to_query_pairs)
        .unwrap_or_default();

    let page = Page::new(
        transactions,
        count,
        request,
        endpoints::TRANSACTIONS,
        &query_pairs,
    )?;

    Ok(Json(page).into_response())
}

#[cfg(test)]
mod list_transactions_endpoint_tests {
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints,
        pagination::Page,
        test_utils::{create_test_user, get_logged_in_server, post_transaction},
        transaction::{NewTransaction, Transaction, TransactionType, create_transaction},
    };

    #[tokio::test]
    async fn first_page_holds_default_page_size() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        for day in 1..=12 {
            let date = format!("2023-07-{day:02}");
            post_transaction(&server, &cookie, "10", "income", "Pay", &date).await;
        }

        let response = server.get(endpoints::TRANSACTIONS).add_cookie(cookie).await;

        response.assert_status_ok();
        let page: Page<Transaction> = response.json();
        assert_eq!(page.results.len(), 10);
        assert_eq!(page.count, 12);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page_number, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(
            page.next.as_deref(),
            Some("/api/transactions?page_size=10&page=2")
        );
        assert_eq!(page.previous, None);
        assert_eq!(page.results[0].date, date!(2023 - 07 - 12));
    }

    #[tokio::test]
    async fn last_page_links_back_without_page_number() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        for day in 1..=12 {
            let date = format!("2023-07-{day:02}");
            post_transaction(&server, &cookie, "10", "income", "Pay", &date).await;
        }

        let response = server
            .get("/api/transactions?page=2")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let page: Page<Transaction> = response.json();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.next, None);
        assert_eq!(
            page.previous.as_deref(),
            Some("/api/transactions?page_size=10")
        );
    }

    #[tokio::test]
    async fn page_out_of_range_is_not_found() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "10", "income", "Pay", "2023-07-01").await;

        for page in ["0", "2"] {
            let response = server
                .get(&format!("/api/transactions?page={page}"))
                .add_cookie(cookie.clone())
                .await;

            response.assert_status(StatusCode::NOT_FOUND);
            response.assert_json(&json!({ "error": "Invalid page." }));
        }
    }

    #[tokio::test]
    async fn empty_list_has_one_empty_page() {
        let (server, _, _, cookie) = get_logged_in_server().await;

        let response = server.get(endpoints::TRANSACTIONS).add_cookie(cookie).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "page_size": 10,
            "current_page_number": 1,
            "total_pages": 1,
            "count": 0,
            "next": null,
            "previous": null,
            "results": []
        }));
    }

    #[tokio::test]
    async fn filters_narrow_results_and_carry_into_links() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "1000", "income", "Salary", "2023-07-01").await;
        for day in 2..=4 {
            let date = format!("2023-07-{day:02}");
            post_transaction(&server, &cookie, "10", "expense", "Food", &date).await;
        }
        post_transaction(&server, &cookie, "10", "expense", "Rent", "2023-07-03").await;

        let response = server
            .get("/api/transactions?category=Food&type=expense&date_from=2023-07-03&date_to=2023-07-04&page_size=1")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let page: Page<Transaction> = response.json();
        assert_eq!(page.count, 2);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].category, "Food");
        assert_eq!(
            page.next.as_deref(),
            Some(
                "/api/transactions?category=Food&type=expense&date_from=2023-07-03&date_to=2023-07-04&page_size=1&page=2"
            )
        );
    }

    #[tokio::test]
    async fn empty_parameters_are_ignored() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "10", "income", "Pay", "2023-07-01").await;

        let response = server
            .get("/api/transactions?category=&type=&date_from=&date_to=&page=&page_size=")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let page: Page<Transaction> = response.json();
        assert_eq!(page.count, 1);
    }

    #[tokio::test]
    async fn malformed_dates_are_rejected() {
        let (server, _, _, cookie) = get_logged_in_server().await;

        for query in ["date_from=yesterday", "date_to=2023-13-01"] {
            let response = server
                .get(&format!("/api/transactions?{query}"))
                .add_cookie(cookie.clone())
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn unknown_type_matches_nothing() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "10", "income", "Pay", "2023-07-01").await;

        let response = server
            .get("/api/transactions?type=refund")
            .add_cookie(cookie.clone())
            .await;

        response.assert_status_ok();
        let page: Page<Transaction> = response.json();
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());

        let response = server
            .get("/api/transactions?type=Income&paginate=false")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
    }

    #[tokio::test]
    async fn unreadable_page_size_uses_default() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "10", "income", "Pay", "2023-07-01").await;

        for page_size in ["-5", "abc", "1.5"] {
            let response = server
                .get(&format!("/api/transactions?page_size={page_size}"))
                .add_cookie(cookie.clone())
                .await;

            response.assert_status_ok();
            let page: Page<Transaction> = response.json();
            assert_eq!(page.page_size, 10);
            assert_eq!(page.count, 1);
        }
    }

    #[tokio::test]
    async fn non_numeric_page_is_not_found() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "10", "income", "Pay", "2023-07-01").await;

        for page in ["two", "-1"] {
            let response = server
                .get(&format!("/api/transactions?page={page}"))
                .add_cookie(cookie.clone())
                .await;

            response.assert_status(StatusCode::NOT_FOUND);
            response.assert_json(&json!({ "error": "Invalid page." }));
        }
    }

    #[tokio::test]
    async fn unpaginated_list_is_flat() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        for day in 1..=12 {
            let date = format!("2023-07-{day:02}");
            post_transaction(&server, &cookie, "10", "income", "Pay", &date).await;
        }

        let response = server
            .get("/api/transactions?paginate=false")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let transactions: Vec<Transaction> = response.json();
        assert_eq!(transactions.len(), 12);
    }

    #[tokio::test]
    async fn page_size_is_clamped() {
        let (server, _, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "10", "income", "Pay", "2023-07-01").await;

        let response = server
            .get("/api/transactions?page_size=1000")
            .add_cookie(cookie)
            .await;

        let page: Page<Transaction> = response.json();
        assert_eq!(page.page_size, 100);
    }

    #[tokio::test]
    async fn only_lists_own_transactions() {
        let (server, state, _, cookie) = get_logged_in_server().await;
        post_transaction(&server, &cookie, "10", "income", "Mine", "2023-07-01").await;
        let other = create_test_user(&state, "bob");
        let theirs =
            NewTransaction::new(dec!(5), TransactionType::Income, "Theirs", date!(2023 - 07 - 02))
                .unwrap();
        create_transaction(other.id, &theirs, &state.db_connection.lock().unwrap()).unwrap();

        let response = server
            .get("/api/transactions?paginate=false")
            .add_cookie(cookie)
            .await;

        let transactions: Vec<Transaction> = response.json();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].category, "Mine");
    }
}
