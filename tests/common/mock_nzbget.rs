//! Mock NZBGet XML-RPC server built on wiremock

use acquire_bridge::dispatch::xmlrpc::{self, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wrap a single `<value>` body in a `methodResponse`
pub fn rpc_response(value_xml: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value>{}</value></param></params></methodResponse>",
        value_xml
    ))
}

/// Mock for one XML-RPC method
pub fn rpc_method(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/xmlrpc"))
        .and(body_string_contains(format!(
            "<methodName>{}</methodName>",
            name
        )))
}

/// Start a server that accepts the probe and reports `version`
///
/// Callers mount their own `append`/`appendurl` mocks.
pub async fn start_nzbget(version: &str) -> MockServer {
    let server = MockServer::start().await;
    rpc_method("writelog")
        .respond_with(rpc_response("<boolean>1</boolean>"))
        .mount(&server)
        .await;
    rpc_method("version")
        .respond_with(rpc_response(&format!("<string>{}</string>", version)))
        .mount(&server)
        .await;
    server
}

/// `host:port` of a mock server, as NzbGetConfig expects it
pub fn host_of(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

/// Decoded XML-RPC calls the server received, in order
pub async fn received_calls(server: &MockServer) -> Vec<(String, Vec<Value>)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == "/xmlrpc")
        .filter_map(|req| xmlrpc::decode_call(&String::from_utf8_lossy(&req.body)).ok())
        .collect()
}

/// Method names the server received, in order
pub async fn received_methods(server: &MockServer) -> Vec<String> {
    received_calls(server)
        .await
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}
