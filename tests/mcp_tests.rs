//! Tests for the MCP dispatcher. None of these touch the network: they
//! exercise request routing, argument validation, and the outcomes the
//! client decides locally.

use std::collections::HashMap;

use serde_json::{json, Value};

use explorer_mcp_server::config::Config;
use explorer_mcp_server::explorer::{ExplorerClient, Network};
use explorer_mcp_server::mcp::handler::handle_mcp_request;
use explorer_mcp_server::mcp::protocol::{error_codes, Request};
use explorer_mcp_server::AppState;

const ADDRESS: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

fn test_state() -> AppState {
    // Sonic usable, Base and Ethereum not
    let mut api_keys = HashMap::new();
    api_keys.insert(Network::Sonic, "test-key".to_string());
    api_keys.insert(Network::Base, String::new());
    api_keys.insert(Network::Ethereum, String::new());
    let config = Config {
        port: 8080,
        api_keys: api_keys.clone(),
        default_network: Network::Sonic,
    };
    let explorer = ExplorerClient::new(api_keys, Network::Sonic);
    AppState { config, explorer }
}

fn request(method: &str, params: Value) -> Request {
    Request {
        jsonrpc: "2.0".to_string(),
        id: json!(1),
        method: method.to_string(),
        params: Some(params),
    }
}

fn tool_call(name: &str, arguments: Value) -> Request {
    request("tools/call", json!({ "name": name, "arguments": arguments }))
}

#[tokio::test]
async fn initialize_reports_server_info_and_tool_capability() {
    let resp = handle_mcp_request(request("initialize", json!({})), test_state())
        .await
        .unwrap();
    let result = resp.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], "explorer_mcp");
    assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
}

#[tokio::test]
async fn tools_list_declares_every_tool() {
    let resp = handle_mcp_request(request("tools/list", json!({})), test_state())
        .await
        .unwrap();
    let result = resp.result.unwrap();
    let names: Vec<&str> = result["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    for expected in [
        "get_balance",
        "get_transactions",
        "get_token_transfers",
        "get_contract_abi",
        "get_gas_oracle",
        "get_ens_name",
        "list_networks",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }
}

#[tokio::test]
async fn notifications_get_no_response() {
    let req = Request {
        jsonrpc: "2.0".to_string(),
        id: Value::Null,
        method: "tools/list".to_string(),
        params: None,
    };
    assert!(handle_mcp_request(req, test_state()).await.is_none());
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let resp = handle_mcp_request(request("bogus/method", json!({})), test_state())
        .await
        .unwrap();
    assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn unknown_tool_is_method_not_found() {
    let resp = handle_mcp_request(tool_call("steal_keys", json!({})), test_state())
        .await
        .unwrap();
    assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn tool_call_without_params_is_invalid() {
    let req = Request {
        jsonrpc: "2.0".to_string(),
        id: json!(7),
        method: "tools/call".to_string(),
        params: None,
    };
    let resp = handle_mcp_request(req, test_state()).await.unwrap();
    assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
}

#[tokio::test]
async fn malformed_address_is_invalid_params() {
    let resp = handle_mcp_request(
        tool_call("get_balance", json!({ "address": "not-an-address" })),
        test_state(),
    )
    .await
    .unwrap();
    let err = resp.error.unwrap();
    assert_eq!(err.code, error_codes::INVALID_PARAMS);
    assert!(err.message.contains("not-an-address"));
}

#[tokio::test]
async fn unusable_network_error_names_the_usable_ones() {
    let resp = handle_mcp_request(
        tool_call(
            "get_balance",
            json!({ "address": ADDRESS, "network": "base" }),
        ),
        test_state(),
    )
    .await
    .unwrap();
    let err = resp.error.unwrap();
    assert_eq!(err.code, error_codes::INVALID_PARAMS);
    assert!(err.message.contains("base"));
    assert!(err.message.contains("sonic"));
}

#[tokio::test]
async fn unknown_network_tag_is_rejected() {
    let resp = handle_mcp_request(
        tool_call(
            "get_balance",
            json!({ "address": ADDRESS, "network": "dogecoin" }),
        ),
        test_state(),
    )
    .await
    .unwrap();
    let err = resp.error.unwrap();
    assert_eq!(err.code, error_codes::INVALID_PARAMS);
    assert!(err.message.contains("dogecoin"));
}

#[tokio::test]
async fn out_of_range_limit_is_rejected_at_the_boundary() {
    for limit in [0, 101] {
        let resp = handle_mcp_request(
            tool_call(
                "get_transactions",
                json!({ "address": ADDRESS, "limit": limit }),
            ),
            test_state(),
        )
        .await
        .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS, "limit {limit}");
        assert!(err.message.contains("between 1 and 100"));
    }
}

#[tokio::test]
async fn ens_off_mainnet_is_a_successful_not_supported_result() {
    let resp = handle_mcp_request(
        tool_call("get_ens_name", json!({ "address": ADDRESS })),
        test_state(),
    )
    .await
    .unwrap();
    let result = resp.result.unwrap();
    assert_eq!(result["outcome"], "not_supported");
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("not supported on Sonic"));
}

#[tokio::test]
async fn direct_method_aliases_are_rewritten_into_tool_calls() {
    let resp = handle_mcp_request(
        request("get_ens_name", json!({ "address": ADDRESS, "network": "sonic" })),
        test_state(),
    )
    .await
    .unwrap();
    let result = resp.result.unwrap();
    assert_eq!(result["outcome"], "not_supported");
}

#[tokio::test]
async fn list_networks_reports_registry_and_usability() {
    let resp = handle_mcp_request(tool_call("list_networks", json!({})), test_state())
        .await
        .unwrap();
    let result = resp.result.unwrap();
    let networks = result["networks"].as_array().unwrap();
    assert_eq!(networks.len(), 3);

    let sonic = networks
        .iter()
        .find(|n| n["network"] == "sonic")
        .unwrap();
    assert_eq!(sonic["usable"], true);
    assert_eq!(sonic["default"], true);
    assert_eq!(sonic["supports_ens"], false);

    let ethereum = networks
        .iter()
        .find(|n| n["network"] == "ethereum")
        .unwrap();
    assert_eq!(ethereum["usable"], false);
    assert_eq!(ethereum["supports_ens"], true);
    assert_eq!(ethereum["symbol"], "ETH");
}
