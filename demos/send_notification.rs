//! Demonstrates logging in once with account credentials and sending two notifications with the
//! default reqwest transport against a local mock of the identity and push services.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use c2dm::{C2dm, ClientConfig, Notification};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/accounts/ClientLogin").body_includes("service=ac2dm");
			then.status(200).body("SID=demo-sid\nLSID=demo-lsid\nAuth=demo-token\n");
		})
		.await;
	let push_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/c2dm/send")
				.header("authorization", "GoogleLogin auth=demo-token");
			then.status(200).body("id=0:1700000000000000%demo\n");
		})
		.await;
	let config = ClientConfig::builder()
		.account("push-sender@example.com")
		.secret("demo-password")
		.source("acme-demo-1")
		.identity_endpoint(Url::parse(&server.url("/accounts/ClientLogin"))?)
		.push_endpoint(Url::parse(&server.url("/c2dm/send"))?)
		.build()?;
	let client = C2dm::new(config)?;
	let first = client
		.send(&Notification::new("demo-device", "news").with_data("headline", "Hello"))
		.await?;
	let second = client.send_notification("demo-device", "news", [("headline", "Again")]).await?;
	let token = client.get_token().await?;

	println!("Delivered messages {first} and {second}.");
	println!("Persist this token to skip the next login: {}.", token.expose());

	login_mock.assert_async().await;
	push_mock.assert_calls_async(2).await;

	Ok(())
}
