// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use oauth2_probe::{
	auth::Secret,
	authority::{AuthorityQuirks, EndpointConvention, ResourceParameter},
	console::{BufferSink, Style},
	options::{RequestOptions, TargetUri, uri_authority},
	probe::{Probe, RunOutcome},
	reqwest::Method,
	url::Url,
};

const APP_ID: &str = "probe-app";
const APP_SECRET: &str = "probe-secret";
const TOKEN_BODY: &str =
	"{\"access_token\":\"probe-token\",\"token_type\":\"bearer\",\"expires_in\":3599}";
const AAD_V1_TOKEN_BODY: &str = r#"{"token_type":"Bearer","expires_in":"3599","ext_expires_in":"3599","expires_on":"1700003599","not_before":"1700000000","resource":"probe-api","access_token":"aad-token"}"#;

fn probe() -> Probe {
	Probe::new(Some(Duration::from_secs(10))).expect("Probe should build with reqwest clients.")
}

fn plain_url(server: &MockServer, path: &str) -> String {
	format!("http://{}{path}", server.address())
}

fn options(target: &str, authority: &str) -> RequestOptions {
	let target: TargetUri = target.parse().expect("Target URI fixture should parse.");

	RequestOptions::new(APP_ID, Secret::new(APP_SECRET), target.url.clone())
		.with_target(target)
		.with_authority(authority)
}

async fn mock_token_endpoint<'a>(server: &'a MockServer, path: &str) -> httpmock::Mock<'a> {
	let path = path.to_owned();

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(path)
				.body_includes("grant_type=client_credentials")
				.body_includes(format!("client_id={APP_ID}"))
				.body_includes(format!("client_secret={APP_SECRET}"));
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await
}

#[tokio::test]
async fn successful_get_renders_headers_and_body() {
	let server = MockServer::start_async().await;
	let token = mock_token_endpoint(&server, "/tenant/oauth2/token").await;
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/data").header("authorization", "Bearer probe-token");
			then.status(200)
				.header("x-test", "1")
				.header("content-type", "application/json")
				.body("{\"ok\":true}");
		})
		.await;
	let options = options(&plain_url(&server, "/data"), &plain_url(&server, "/tenant"));
	let mut sink = BufferSink::default();
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::Completed { status: 200 });

	token.assert_async().await;
	target.assert_async().await;

	let acquired = sink
		.find("Acquired Bearer Token for AppId probe-app")
		.expect("Token line should be emitted.");

	assert_eq!(acquired.style, Style::Success);

	let sending = sink.find("Sending request to ").expect("Sending line should be emitted.");

	assert_eq!(sending.text, format!("Sending request to {}", options.target_input));
	assert_eq!(sending.style, Style::Neutral);

	let status = sink.find("Response Code: ").expect("Status line should be emitted.");

	assert_eq!(status.text, "Response Code: 200 (OK)");
	assert_eq!(status.style, Style::Success);
	assert_eq!(
		sink.find("X-Test = ").map(|line| (line.text.as_str(), line.style)),
		Some(("X-Test = 1", Style::Success))
	);
	assert_eq!(
		sink.find("Content-Type = ").map(|line| line.text.as_str()),
		Some("Content-Type = application/json")
	);

	let body = sink.lines().last().expect("Body line should be emitted last.");

	assert_eq!(body.text, "{\"ok\":true}");
	assert_eq!(body.style, Style::Neutral);
}

#[tokio::test]
async fn resource_defaults_to_target_authority() {
	let server = MockServer::start_async().await;
	let target_url = plain_url(&server, "/data");
	let resource = uri_authority(&Url::parse(&target_url).expect("Target URI should parse."));
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/common/oauth2/token")
				.body_includes(format!("resource={}", resource.replace(':', "%3A")));
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/data");
			then.status(204);
		})
		.await;
	let mut sink = BufferSink::default();
	let options = options(&target_url, &plain_url(&server, "/common"));
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::Completed { status: 204 });

	token.assert_async().await;
	target.assert_async().await;
}

#[tokio::test]
async fn post_with_server_error_renders_failure_style() {
	let server = MockServer::start_async().await;
	let _token = mock_token_endpoint(&server, "/tenant/oauth2/token").await;
	let target = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/data")
				.header("authorization", "Bearer probe-token")
				.header("content-type", "application/json")
				.body("{\"a\":1}");
			then.status(500).header("x-error", "boom").body("upstream exploded");
		})
		.await;
	let options = options(&plain_url(&server, "/data"), &plain_url(&server, "/tenant"))
		.with_method(Method::POST)
		.with_body("{\"a\":1}");
	let mut sink = BufferSink::default();
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::Completed { status: 500 });
	assert_eq!(outcome.exit_status(false), 0);
	assert_eq!(outcome.exit_status(true), 1);

	target.assert_async().await;

	let status = sink.find("Response Code: ").expect("Status line should be emitted.");

	assert_eq!(status.text, "Response Code: 500 (Internal Server Error)");
	assert_eq!(status.style, Style::Failure);
	assert_eq!(sink.find("X-Error = ").map(|line| line.style), Some(Style::Failure));
	assert_eq!(sink.lines().last().map(|line| line.text.as_str()), Some("upstream exploded"));
}

#[tokio::test]
async fn token_transport_failure_never_reaches_target() {
	let target_server = MockServer::start_async().await;
	let target = target_server
		.mock_async(|when, then| {
			when.path("/data");
			then.status(200);
		})
		.await;
	let mut sink = BufferSink::default();
	let options = options(&plain_url(&target_server, "/data"), "http://127.0.0.1:1/tenant");
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::TokenFailed);

	target.assert_calls_async(0).await;

	let failure =
		sink.find("Failed to get bearer token: ").expect("Token failure line should be emitted.");

	assert_eq!(failure.style, Style::Failure);
	assert!(failure.text.len() > "Failed to get bearer token: ".len());
	assert!(!sink.contains("Sending request to"));
	assert_eq!(sink.lines().len(), 1);
}

#[tokio::test]
async fn rejected_credentials_surface_the_authority_reason() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/tenant/oauth2/token");
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_client\",\"error_description\":\"AADSTS7000215: Invalid client secret provided.\"}",
			);
		})
		.await;
	let target = server
		.mock_async(|when, then| {
			when.path("/data");
			then.status(200);
		})
		.await;
	let mut sink = BufferSink::default();
	let options = options(&plain_url(&server, "/data"), &plain_url(&server, "/tenant"));
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::TokenFailed);

	token.assert_async().await;
	target.assert_calls_async(0).await;

	assert!(sink.contains("invalid_client: AADSTS7000215: Invalid client secret provided."));
	assert!(!sink.contains("Sending request to"));
}

#[tokio::test]
async fn unreachable_target_renders_request_failure() {
	let server = MockServer::start_async().await;
	let _token = mock_token_endpoint(&server, "/tenant/oauth2/token").await;
	let mut sink = BufferSink::default();
	let options = options("http://127.0.0.1:1", &plain_url(&server, "/tenant"));
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::RequestFailed);
	assert_eq!(
		sink.find("Sending request to ").map(|line| line.text.as_str()),
		Some("Sending request to http://127.0.0.1:1")
	);

	let failure = sink.find("Failed: ").expect("Request failure line should be emitted.");

	assert_eq!(failure.style, Style::Failure);
	assert!(sink.find("Response Code: ").is_none());
}

#[tokio::test]
async fn discovery_authority_resolves_token_endpoint() {
	let server = MockServer::start_async().await;
	let discovery_body = format!(
		"{{\"issuer\":\"{}\",\"token_endpoint\":\"{}\"}}",
		plain_url(&server, "/realms/demo"),
		plain_url(&server, "/realms/demo/protocol/openid-connect/token")
	);
	let discovery = server
		.mock_async(|when, then| {
			when.method(GET).path("/realms/demo/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(discovery_body);
		})
		.await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/realms/demo/protocol/openid-connect/token")
				.body_includes("audience=probe-api")
				.body_excludes("resource=");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/data").header("authorization", "Bearer probe-token");
			then.status(200).body("ok");
		})
		.await;
	let options = options(&plain_url(&server, "/data"), &plain_url(&server, "/realms/demo"))
		.with_target_resource("probe-api")
		.with_quirks(AuthorityQuirks {
			endpoint_convention: EndpointConvention::Discovery,
			resource_parameter: ResourceParameter::Audience,
			..AuthorityQuirks::default()
		});
	let mut sink = BufferSink::default();
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::Completed { status: 200 });

	discovery.assert_async().await;
	token.assert_async().await;
	target.assert_async().await;
}

#[tokio::test]
async fn azure_ad_v1_token_response_is_accepted() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/common/oauth2/token").body_includes("resource=probe-api");
			then.status(200)
				.header("content-type", "application/json; charset=utf-8")
				.body(AAD_V1_TOKEN_BODY);
		})
		.await;
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/data").header("authorization", "Bearer aad-token");
			then.status(200).body("ok");
		})
		.await;
	let options = options(&plain_url(&server, "/data"), &plain_url(&server, "/common"))
		.with_target_resource("probe-api");
	let mut sink = BufferSink::default();
	let outcome = probe().run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::Completed { status: 200 });

	token.assert_async().await;
	target.assert_async().await;

	assert!(sink.contains("Acquired Bearer Token for AppId probe-app"));
}
