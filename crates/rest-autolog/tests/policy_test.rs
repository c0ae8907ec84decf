use std::io;

use http::{Request, Response, StatusCode};
use rest_autolog::{
    AutologError, ClientOptions, FieldValue, LoggingPolicy, MSG_CALL_FAILED, MSG_CALL_FINISHED, MSG_PARSE_FAILED,
    new_logging_client,
};
use test_log::test;
use tower::{BoxError, Layer, ServiceExt, service_fn};
use tracing::Level;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::{API_VERSION, RESOURCE_GROUPS_PATH, RecordingSink, STORAGE_ACCOUNT_PATH};

const HOST: &str = "https://management.azure.com";

fn respond_with(
    status: u16,
) -> impl tower::Service<Request<()>, Response = Response<()>, Error = BoxError> + Clone {
    service_fn(move |_req: Request<()>| async move {
        Ok::<_, BoxError>(Response::builder().status(status).body(()).unwrap())
    })
}

#[test(tokio::test)]
async fn test_successful_call_is_logged_as_info() {
    let sink = RecordingSink::shared();
    let svc = LoggingPolicy::new(sink.clone()).layer(respond_with(200));

    let request = Request::get(format!(
        "{HOST}{STORAGE_ACCOUNT_PATH}?api-version={API_VERSION}&$expand=keys"
    ))
    .body(())
    .unwrap();
    let response = svc.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let record = sink.single();
    assert_eq!(record.level, Level::INFO);
    assert_eq!(record.message, MSG_CALL_FINISHED);
    assert_eq!(record.entry.code, FieldValue::Number(200));
    assert_eq!(record.entry.method, "GET storageaccounts - READ");
    assert_eq!(record.entry.service, "management.azure.com");
    assert_eq!(
        record.entry.url,
        format!("{HOST}{STORAGE_ACCOUNT_PATH}?api-version={API_VERSION}")
    );
    assert_eq!(record.entry.error, "na");
}

#[test(tokio::test)]
async fn test_non_success_status_passes_through() {
    let sink = RecordingSink::shared();
    let svc = LoggingPolicy::new(sink.clone()).layer(respond_with(500));

    let request = Request::post(format!(
        "{HOST}{RESOURCE_GROUPS_PATH}?api-version={API_VERSION}"
    ))
    .body(())
    .unwrap();
    let response = svc.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let record = sink.single();
    assert_eq!(record.level, Level::ERROR);
    assert_eq!(record.message, MSG_CALL_FINISHED);
    assert_eq!(record.entry.code, FieldValue::Number(500));
    assert_eq!(record.entry.method, "POST resourcegroups");
    assert_eq!(record.entry.error, "500 Internal Server Error");
}

#[test(tokio::test)]
async fn test_inner_error_is_logged_and_returned() {
    let sink = RecordingSink::shared();
    let failing = service_fn(|_req: Request<()>| async {
        Err::<Response<()>, BoxError>(
            io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer").into(),
        )
    });
    let svc = LoggingPolicy::new(sink.clone()).layer(failing);

    let request = Request::get(format!(
        "{HOST}{RESOURCE_GROUPS_PATH}?api-version={API_VERSION}"
    ))
    .body(())
    .unwrap();
    let err = svc.oneshot(request).await.unwrap_err();
    let err = err.downcast_ref::<io::Error>().unwrap();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);

    let record = sink.single();
    assert_eq!(record.level, Level::ERROR);
    assert_eq!(record.message, MSG_CALL_FAILED);
    assert_eq!(record.entry.code, FieldValue::na());
    assert_eq!(record.entry.time_ms, FieldValue::na());
    assert_eq!(record.entry.method, "GET resourcegroups - LIST");
    assert_eq!(record.entry.service, "management.azure.com");
    assert_eq!(record.entry.error, "connection reset by peer");
}

#[test(tokio::test)]
async fn test_relative_uri_is_logged_and_returned_as_parse_error() {
    let sink = RecordingSink::shared();
    let svc = LoggingPolicy::new(sink.clone()).layer(respond_with(204));

    let request = Request::get("/subscriptions/sub_id?api-version=v")
        .body(())
        .unwrap();
    let err = svc.oneshot(request).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AutologError>(),
        Some(AutologError::UrlParse(url::ParseError::RelativeUrlWithoutBase))
    ));

    let record = sink.single();
    assert_eq!(record.level, Level::ERROR);
    assert_eq!(record.message, MSG_PARSE_FAILED);
    assert_eq!(record.entry.code, FieldValue::na());
    assert_eq!(record.entry.time_ms, FieldValue::na());
    assert_eq!(record.entry.method, "na");
    assert_eq!(record.entry.service, "na");
    assert_eq!(record.entry.url, "/subscriptions/sub_id?api-version=v");
    assert_eq!(record.entry.error, err.to_string());
}

#[test(tokio::test)]
async fn test_policy_from_options_logs_each_call_once() {
    let sink = RecordingSink::shared();
    let options = ClientOptions::default().with_sink(sink.clone());
    let policy = options.logging_policy();

    for path in [RESOURCE_GROUPS_PATH, STORAGE_ACCOUNT_PATH] {
        let svc = policy.clone().layer(respond_with(200));
        let request = Request::get(format!("{HOST}{path}?api-version={API_VERSION}"))
            .body(())
            .unwrap();
        svc.oneshot(request).await.unwrap();
    }

    let labels: Vec<_> = sink.records().into_iter().map(|r| r.entry.method).collect();
    assert_eq!(
        labels,
        ["GET resourcegroups - LIST", "GET storageaccounts - READ"]
    );
}

#[test(tokio::test)]
async fn test_both_hooks_agree_on_the_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let url = format!(
        "{}{}?api-version={}&$filter=tagName",
        server.uri(),
        STORAGE_ACCOUNT_PATH,
        API_VERSION
    );

    let pipeline_sink = RecordingSink::shared();
    let reqwest_client = reqwest::Client::new();
    let transport = service_fn(move |req: Request<String>| {
        let client = reqwest_client.clone();
        async move {
            let response = client.execute(reqwest::Request::try_from(req)?).await?;
            Ok::<_, BoxError>(
                Response::builder()
                    .status(response.status())
                    .body(())
                    .unwrap(),
            )
        }
    });
    let svc = LoggingPolicy::new(pipeline_sink.clone()).layer(transport);
    svc.oneshot(Request::get(url.as_str()).body(String::new()).unwrap())
        .await
        .unwrap();

    let hook_sink = RecordingSink::shared();
    let client = new_logging_client(&ClientOptions::default().with_sink(hook_sink.clone())).unwrap();
    client.send(client.get(url.as_str())).await.unwrap();

    let from_pipeline = pipeline_sink.single();
    let from_hook = hook_sink.single();

    assert_eq!(from_pipeline.level, Level::ERROR);
    assert_eq!(from_pipeline.level, from_hook.level);
    assert_eq!(from_pipeline.message, from_hook.message);
    assert_eq!(from_pipeline.entry.code, from_hook.entry.code);
    assert_eq!(from_pipeline.entry.method, "GET storageaccounts - READ");
    assert_eq!(from_pipeline.entry.method, from_hook.entry.method);
    assert_eq!(from_pipeline.entry.service, from_hook.entry.service);
    assert_eq!(from_pipeline.entry.error, from_hook.entry.error);
    assert!(from_pipeline.entry.url.ends_with(&from_hook.entry.url));

    let keys = |record: &common::Record| -> Vec<&'static str> {
        record.entry.fields().into_iter().map(|(key, _)| key).collect()
    };
    assert_eq!(keys(&from_pipeline), keys(&from_hook));
}
