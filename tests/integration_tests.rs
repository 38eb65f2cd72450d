use oblio::docs::ClientFilter;
use oblio::{
    Bool, CallContext, CompanyRequest, Config, Credentials, Date, DocumentRequest,
    GetCompaniesRequest, GetInvoicesRequest, InMemoryTokenStore, OblioClient, OblioError,
    TokenStore, TransportErrorKind,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_ID: &str = "test@example.com";
const CLIENT_SECRET: &str = "secret";

/// Build a client against the mock server.
///
/// The blocking client runs its own runtime, so it has to be built and
/// dropped inside `spawn_blocking`.
fn new_client(uri: &str) -> OblioClient {
    OblioClient::with_config(
        Credentials::new(CLIENT_ID, CLIENT_SECRET),
        Config::new(format!("{}/api", uri)),
    )
    .expect("failed to build client")
}

/// Run blocking client code off the async runtime
async fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

fn token_body(token: &str) -> Value {
    json!({
        "access_token": token,
        "expires_in": 3600,
        "token_type": "Bearer",
        "scope": null,
        "request_time": 1706745600
    })
}

fn document_body() -> Value {
    json!({
        "status": 200,
        "statusMessage": "Success",
        "data": {
            "seriesName": "FCT",
            "number": "0001",
            "link": "https://www.oblio.eu/utils/show_file/?ic=1&id=4567",
            "total": "119.00"
        }
    })
}

async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/authorize/token"))
        .and(body_json(json!({
            "client_id": CLIENT_ID,
            "client_secret": CLIENT_SECRET
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_token() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    let uri = server.uri();
    let response = blocking(move || new_client(&uri).generate_token(&CallContext::new()))
        .await
        .expect("generate_token failed");

    assert_eq!(response.access_token, "tok");
    assert_eq!(response.expires_in.get(), 3600);
    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.request_time.unix(), 1706745600);
    assert_eq!(response.cache_ttl(), Duration::from_secs(3590));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_minted_once_and_reused() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/nomenclature/vat_rates"))
        .and(query_param("cif", "RO37311090"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "statusMessage": "Success",
            "data": [{"name": "Normala", "percent": 19, "default": true}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let uri = server.uri();
    let client_store: Arc<dyn TokenStore> = store.clone();

    let (first, second) = blocking(move || {
        let client = new_client(&uri).with_token_store(client_store);
        let ctx = CallContext::new();
        let req = CompanyRequest::new("RO37311090");
        (client.get_vat_rates(&ctx, &req), client.get_vat_rates(&ctx, &req))
    })
    .await;

    let first = first?;
    second?;
    assert_eq!(first.data.len(), 1);
    assert_eq!(first.data[0].name, "Normala");
    assert!(first.data[0].default);
    assert_eq!(store.get()?, "tok");

    server.verify().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_cached_token_is_replaced_once() {
    let server = MockServer::start().await;
    mount_token(&server, "fresh", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/docs/invoice"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "statusMessage": "Invalid access token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/docs/invoice"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    store
        .set("stale", Duration::from_secs(3600))
        .expect("seed token");
    let uri = server.uri();
    let client_store: Arc<dyn TokenStore> = store.clone();

    let response = blocking(move || {
        let client = new_client(&uri).with_token_store(client_store);
        client.get_invoice(
            &CallContext::new(),
            &DocumentRequest::new("RO37311090", "FCT", "0001"),
        )
    })
    .await
    .expect("retried call should succeed");

    assert_eq!(response.data.number, "0001");
    assert_eq!(response.data.id().unwrap(), Some("4567".to_string()));
    assert_eq!(store.get().unwrap(), "fresh");

    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_persistent_unauthorized_retries_exactly_once() {
    let server = MockServer::start().await;
    // initial mint plus the forced re-mint
    mount_token(&server, "tok", 2).await;

    Mock::given(method("PUT"))
        .and(path("/api/docs/invoice/cancel"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "statusMessage": "Invalid access token"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || {
        let client = new_client(&uri);
        client.cancel_invoice(
            &CallContext::new(),
            &DocumentRequest::new("RO37311090", "FCT", "0001"),
        )
    })
    .await;

    match result {
        Err(OblioError::Api(err)) => {
            assert_eq!(err.status, 401);
            assert_eq!(err.message, "Invalid access token");
        }
        other => panic!("expected unauthorized API error, got {:?}", other),
    }

    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_explicit_token_is_not_retried() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 0).await;

    Mock::given(method("GET"))
        .and(path("/api/nomenclature/companies"))
        .and(header("Authorization", "Bearer explicit"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || {
        let client = new_client(&uri);
        let req = GetCompaniesRequest {
            access_token: Some("explicit".to_string()),
        };
        client.get_companies(&CallContext::new(), &req)
    })
    .await;

    let err = result.expect_err("expected unauthorized error");
    assert!(err.is_unauthorized());
    assert_eq!(err.status_code(), Some(401));

    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_explicit_token_bypasses_cache() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 0).await;

    Mock::given(method("GET"))
        .and(path("/api/nomenclature/companies"))
        .and(header("Authorization", "Bearer explicit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "statusMessage": "Success",
            "data": [{"cif": "RO37311090", "company": "OBLIO SOFTWARE SRL", "useStock": "1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let uri = server.uri();
    let client_store: Arc<dyn TokenStore> = store.clone();
    let response = blocking(move || {
        let client = new_client(&uri).with_token_store(client_store);
        let req = GetCompaniesRequest {
            access_token: Some("explicit".to_string()),
        };
        client.get_companies(&CallContext::new(), &req)
    })
    .await
    .expect("get_companies failed");

    assert_eq!(response.data[0].company, "OBLIO SOFTWARE SRL");
    assert!(response.data[0].use_stock.get());
    // explicit tokens are never cached
    assert!(store.get().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validation_failure_sends_nothing() {
    let server = MockServer::start().await;

    let uri = server.uri();
    let result = blocking(move || {
        let client = new_client(&uri);
        client.delete_invoice(&CallContext::new(), &DocumentRequest::new("", "FCT", "0001"))
    })
    .await;

    assert!(matches!(result, Err(OblioError::InvalidArgument(_))));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no request should reach the server");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plain_text_error_body() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    Mock::given(method("DELETE"))
        .and(path("/api/docs/proforma"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || {
        let client = new_client(&uri);
        client.delete_proforma(
            &CallContext::new(),
            &DocumentRequest::new("RO37311090", "PRF", "0002"),
        )
    })
    .await;

    match result {
        Err(OblioError::Api(err)) => {
            assert_eq!(err.status, 500);
            assert_eq!(err.message, "internal failure");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/docs/notice"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || {
        let client = new_client(&uri);
        client.get_notice(
            &CallContext::new(),
            &DocumentRequest::new("RO37311090", "AVZ", "0003"),
        )
    })
    .await;

    assert!(matches!(result, Err(OblioError::Decode(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deadline_aborts_slow_call() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/nomenclature/series"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": 200, "data": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || {
        let client = new_client(&uri);
        let ctx = CallContext::new().with_timeout(Duration::from_millis(500));
        client.get_series(&ctx, &CompanyRequest::new("RO37311090"))
    })
    .await;

    let err = result.expect_err("expected timeout");
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Timeout));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invoice_list_query_encoding() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/docs/invoice/list"))
        .and(query_param("cif", "1234567"))
        .and(query_param("client[cif]", "client-cif"))
        .and(query_param("draft", "1"))
        .and(query_param("issuedAfter", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "statusMessage": "Success",
            "data": [{
                "id": "10000",
                "draft": "1",
                "collected": true,
                "seriesName": "SC",
                "number": "0001",
                "issueDate": "2023-01-31",
                "dueDate": null,
                "precision": 2,
                "total": "119.00"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = blocking(move || {
        let client = new_client(&uri);
        let req = GetInvoicesRequest {
            cif: "1234567".to_string(),
            draft: Bool(true),
            client: ClientFilter {
                cif: "client-cif".to_string(),
                ..Default::default()
            },
            issued_after: Date::new(2024, 1, 1).unwrap(),
            ..Default::default()
        };
        client.get_invoices(&CallContext::new(), &req)
    })
    .await
    .expect("get_invoices failed");

    let invoice = &response.data[0];
    assert_eq!(invoice.id, "10000");
    assert!(invoice.draft.get());
    assert!(invoice.collected.get());
    assert!(invoice.due_date.is_zero());
    assert_eq!(invoice.precision.get(), 2);

    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_calls_mint_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authorize/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("shared"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/nomenclature/languages"))
        .and(header("Authorization", "Bearer shared"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "statusMessage": "Success",
            "data": [{"code": "EN", "name": "Engleza"}]
        })))
        .expect(8)
        .mount(&server)
        .await;

    let uri = server.uri();
    let results = blocking(move || {
        let client = Arc::new(new_client(&uri));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let client = Arc::clone(&client);
                thread::spawn(move || {
                    client.get_languages(&CallContext::new(), &CompanyRequest::new("RO37311090"))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect::<Vec<_>>()
    })
    .await;

    for result in results {
        let response = result.expect("get_languages failed");
        assert_eq!(response.data[0].code, "EN");
    }

    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancel_aborts_in_flight_call() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/nomenclature/series"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": 200, "data": []}))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let (result, elapsed) = blocking(move || {
        let client = new_client(&uri);
        let ctx = CallContext::new();
        let canceller = ctx.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            canceller.cancel();
        });

        let start = Instant::now();
        let result = client.get_series(&ctx, &CompanyRequest::new("RO37311090"));
        let elapsed = start.elapsed();
        handle.join().expect("canceller panicked");
        (result, elapsed)
    })
    .await;

    let err = result.expect_err("expected cancellation");
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Cancelled));
    assert!(elapsed < Duration::from_secs(2), "returned after {:?}", elapsed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancel_while_waiting_for_another_mint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authorize/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("slow"))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let (first, second, elapsed) = blocking(move || {
        let client = Arc::new(new_client(&uri));

        let first_ctx = CallContext::new();
        let first_cancel = first_ctx.clone();
        let minting = {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                client.get_series(&first_ctx, &CompanyRequest::new("RO37311090"))
            })
        };

        // let the first call take the token lock
        thread::sleep(Duration::from_millis(200));

        let ctx = CallContext::new();
        let canceller = ctx.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            canceller.cancel();
        });

        let start = Instant::now();
        let second = client.get_series(&ctx, &CompanyRequest::new("RO37311090"));
        let elapsed = start.elapsed();
        handle.join().expect("canceller panicked");

        first_cancel.cancel();
        let first = minting.join().expect("first caller panicked");
        (first, second, elapsed)
    })
    .await;

    let err = second.expect_err("expected cancellation");
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Cancelled));
    assert!(elapsed < Duration::from_secs(2), "returned after {:?}", elapsed);

    let err = first.expect_err("first call was cancelled too");
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Cancelled));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_access_token_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authorize/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/nomenclature/management"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200, "data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || {
        let client = new_client(&uri);
        client.get_management(&CallContext::new(), &CompanyRequest::new("RO37311090"))
    })
    .await;

    assert!(matches!(result, Err(OblioError::Decode(_))));
    server.verify().await;
}
