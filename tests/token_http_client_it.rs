// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	io,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_probe::{
	auth::Secret,
	console::{BufferSink, Style},
	error::{TokenAcquisitionError, clearest_message},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TokenAcquirer, TokenRequest,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{Response, header::CONTENT_TYPE},
		},
	},
	options::RequestOptions,
	probe::{Probe, RunOutcome},
	request::RequestExecutor,
	url::Url,
};

#[derive(Debug)]
struct FakeTransportError {
	cause: io::Error,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Fake transport failed.")
	}
}
impl StdError for FakeTransportError {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		Some(&self.cause)
	}
}

#[derive(Clone, Debug)]
enum Behavior {
	ConnectionReset,
	Respond { status: u16, body: &'static str },
}

#[derive(Clone, Debug, Default)]
struct Recorded {
	uri: String,
	body: String,
}

#[derive(Clone)]
struct FakeHttpClient {
	behavior: Behavior,
	recorded: Arc<Mutex<Vec<Recorded>>>,
}
impl FakeHttpClient {
	fn new(behavior: Behavior) -> Self {
		Self { behavior, recorded: Arc::default() }
	}

	fn recorded(&self) -> Vec<Recorded> {
		self.recorded.lock().clone()
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, behavior: self.behavior.clone(), recorded: self.recorded.clone() }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	behavior: Behavior,
	recorded: Arc<Mutex<Vec<Recorded>>>,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		assert!(
			self.slot.take().is_none(),
			"ResponseMetadataSlot must be clear before dispatching a request."
		);

		self.recorded.lock().push(Recorded {
			uri: request.uri().to_string(),
			body: String::from_utf8_lossy(request.body()).into_owned(),
		});

		let result = match &self.behavior {
			Behavior::ConnectionReset => Err(HttpClientError::Reqwest(Box::new(FakeTransportError {
				cause: io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by fake peer"),
			}))),
			Behavior::Respond { status, body } => {
				self.slot.store(ResponseMetadata { status: Some(*status) });

				Ok(Response::builder()
					.status(*status)
					.header(CONTENT_TYPE, "application/json")
					.body(body.as_bytes().to_vec())
					.expect("Fake response should build."))
			},
		};

		Box::pin(async move { result })
	}
}

fn token_request() -> TokenRequest {
	TokenRequest::new(
		"fake-app",
		Secret::new("fake-secret"),
		"api.example.com",
		"https://login.example.com/tenant",
	)
}

#[tokio::test]
async fn transport_failure_surfaces_innermost_cause() {
	let client = FakeHttpClient::new(Behavior::ConnectionReset);
	let acquirer = TokenAcquirer::<FakeHttpClient>::with_http_client(client.clone());
	let err = acquirer.acquire(&token_request()).await.expect_err("Fake transport should fail.");

	assert!(matches!(err, TokenAcquisitionError::Transport { .. }));
	assert_eq!(clearest_message(&err), "connection reset by fake peer");
	assert_eq!(client.recorded().len(), 1);
}

#[tokio::test]
async fn token_request_targets_derived_endpoint_with_form_body() {
	let client = FakeHttpClient::new(Behavior::Respond {
		status: 200,
		body: "{\"access_token\":\"fake-token\",\"token_type\":\"bearer\"}",
	});
	let acquirer = TokenAcquirer::<FakeHttpClient>::with_http_client(client.clone());
	let token = acquirer.acquire(&token_request()).await.expect("Fake exchange should succeed.");

	assert_eq!(token.authorization_value(), "Bearer fake-token");
	assert!(token.expires_at.is_none());

	let recorded = client.recorded();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].uri, "https://login.example.com/tenant/oauth2/token");
	assert!(recorded[0].body.contains("grant_type=client_credentials"));
	assert!(recorded[0].body.contains("resource=api.example.com"));
	assert!(recorded[0].body.contains("client_id=fake-app"));
}

#[tokio::test]
async fn rejected_status_is_reported_from_metadata() {
	let client = FakeHttpClient::new(Behavior::Respond {
		status: 401,
		body: "{\"error\":\"invalid_client\"}",
	});
	let acquirer = TokenAcquirer::<FakeHttpClient>::with_http_client(client);
	let err = acquirer.acquire(&token_request()).await.expect_err("Rejection should fail.");

	match err {
		TokenAcquisitionError::Rejected { reason, status } => {
			assert_eq!(reason, "invalid_client");
			assert_eq!(status, Some(401));
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn probe_stops_after_token_failure() {
	let client = FakeHttpClient::new(Behavior::ConnectionReset);
	let probe = Probe::with_parts(
		TokenAcquirer::<FakeHttpClient>::with_http_client(client.clone()),
		RequestExecutor::new(None).expect("Executor should build."),
	);
	let target = Url::parse("https://api.example.com/data").expect("Target fixture should parse.");
	let options = RequestOptions::new("fake-app", Secret::new("fake-secret"), target)
		.with_authority("https://login.example.com/tenant");
	let mut sink = BufferSink::default();
	let outcome = probe.run(&options, &mut sink).await;

	assert_eq!(outcome, RunOutcome::TokenFailed);
	assert_eq!(sink.lines().len(), 1);

	let line = &sink.lines()[0];

	assert_eq!(line.text, "Failed to get bearer token: connection reset by fake peer");
	assert_eq!(line.style, Style::Failure);
	assert!(client.recorded()[0].body.contains("resource=api.example.com"));
}
