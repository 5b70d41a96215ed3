//! Tests for the explorer client against a mocked Etherscan-family API.
//!
//! Every mock matches on a test-unique `apikey` so parallel tests never
//! shadow each other's responses on the shared mock server.

use std::collections::HashMap;

use mockito::{mock, Matcher};

use explorer_mcp_server::explorer::models::{EnsLookup, ExplorerError, CONTRACT_CREATION};
use explorer_mcp_server::explorer::{ExplorerClient, Network};

const ADDRESS: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

fn mocked_client(network: Network, api_key: &str) -> ExplorerClient {
    let mut credentials = HashMap::new();
    credentials.insert(network, api_key.to_string());
    ExplorerClient::new(credentials, network)
        .with_api_url(network, format!("{}/api", mockito::server_url()))
}

fn explorer_mock(action: &str, api_key: &str, body: &str) -> mockito::Mock {
    mock("GET", "/api")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), action.into()),
            Matcher::UrlEncoded("apikey".into(), api_key.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

#[tokio::test]
async fn balance_is_formatted_with_native_decimals() {
    let _m = explorer_mock(
        "balance",
        "key-balance",
        r#"{"status":"1","message":"OK","result":"1500000000000000000"}"#,
    );
    let client = mocked_client(Network::Sonic, "key-balance");

    let balance = client.get_balance(ADDRESS, None).await.unwrap();
    assert_eq!(balance.wei, "1500000000000000000");
    assert_eq!(balance.formatted, "1.5");
    assert_eq!(balance.symbol, "S");
    assert_eq!(balance.network, Network::Sonic);
    // Canonical checksummed casing, regardless of input casing
    assert_eq!(balance.address, "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
}

#[tokio::test]
async fn transactions_are_truncated_to_limit() {
    let body = r#"{"status":"1","message":"OK","result":[
        {"hash":"0xa1","from":"0xf1","to":"0xt1","value":"1000000000000000000","timeStamp":"1700000002","blockNumber":"102"},
        {"hash":"0xa2","from":"0xf2","to":"0xt2","value":"2000000000000000000","timeStamp":"1700000001","blockNumber":"101"},
        {"hash":"0xa3","from":"0xf3","to":"0xt3","value":"3000000000000000000","timeStamp":"1700000000","blockNumber":"100"}
    ]}"#;
    let _m = explorer_mock("txlist", "key-truncate", body);
    let client = mocked_client(Network::Sonic, "key-truncate");

    let records = client.get_transactions(ADDRESS, 2, None).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hash, "0xa1");
    assert_eq!(records[0].value, "1");
    assert_eq!(records[0].timestamp, 1700000002);
    assert_eq!(records[0].block_number, 102);
    assert_eq!(records[1].hash, "0xa2");
}

#[tokio::test]
async fn empty_recipient_becomes_contract_creation_sentinel() {
    let body = r#"{"status":"1","message":"OK","result":[
        {"hash":"0xc1","from":"0xf1","to":"","value":"0","timeStamp":"1700000000","blockNumber":"100"}
    ]}"#;
    let _m = explorer_mock("txlist", "key-sentinel", body);
    let client = mocked_client(Network::Base, "key-sentinel");

    let records = client.get_transactions(ADDRESS, 10, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to, CONTRACT_CREATION);
}

#[tokio::test]
async fn no_transactions_is_an_empty_success() {
    // The family reports "no rows" as a failure status with an empty array.
    let body = r#"{"status":"0","message":"No transactions found","result":[]}"#;
    let _m = explorer_mock("txlist", "key-empty", body);
    let client = mocked_client(Network::Sonic, "key-empty");

    let records = client.get_transactions(ADDRESS, 10, None).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn failure_status_without_rows_is_an_upstream_error() {
    let body = r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#;
    let _m = explorer_mock("txlist", "key-ratelimit", body);
    let client = mocked_client(Network::Sonic, "key-ratelimit");

    let err = client.get_transactions(ADDRESS, 10, None).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Upstream(_)));
    assert!(err.to_string().contains("Max rate limit reached"));
}

#[tokio::test]
async fn token_transfers_use_per_row_decimals() {
    let body = r#"{"status":"1","message":"OK","result":[
        {"hash":"0xd1","from":"0xf1","to":"0xt1","value":"1000000000000000000","timeStamp":"1700000001","blockNumber":"101",
         "contractAddress":"0xc0ffee","tokenName":"Wrapped Ether","tokenSymbol":"WETH","tokenDecimal":"18"},
        {"hash":"0xd2","from":"0xf2","to":"0xt2","value":"500000","timeStamp":"1700000000","blockNumber":"100",
         "contractAddress":"0xdecaf0","tokenName":"USD Coin","tokenSymbol":"USDC","tokenDecimal":"6"}
    ]}"#;
    let _m = explorer_mock("tokentx", "key-tokens", body);
    let client = mocked_client(Network::Ethereum, "key-tokens");

    let transfers = client.get_token_transfers(ADDRESS, 10, None).await.unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].value, "1");
    assert_eq!(transfers[0].token_symbol, "WETH");
    assert_eq!(transfers[1].value, "0.5");
    assert_eq!(transfers[1].token, "0xdecaf0");
}

#[tokio::test]
async fn missing_token_decimal_is_a_hard_error() {
    let body = r#"{"status":"1","message":"OK","result":[
        {"hash":"0xe1","from":"0xf1","to":"0xt1","value":"500000","timeStamp":"1700000000","blockNumber":"100",
         "contractAddress":"0xc0ffee","tokenName":"Mystery","tokenSymbol":"MYS","tokenDecimal":""}
    ]}"#;
    let _m = explorer_mock("tokentx", "key-baddecimal", body);
    let client = mocked_client(Network::Sonic, "key-baddecimal");

    let err = client
        .get_token_transfers(ADDRESS, 10, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExplorerError::Upstream(_)));
    assert!(err.to_string().contains("tokenDecimal"));
}

#[tokio::test]
async fn oversized_token_decimal_is_a_hard_error() {
    // u32::MAX + 19: must fail, not wrap to 18 decimals
    let body = r#"{"status":"1","message":"OK","result":[
        {"hash":"0xe2","from":"0xf1","to":"0xt1","value":"1000000000000000000","timeStamp":"1700000000","blockNumber":"100",
         "contractAddress":"0xc0ffee","tokenName":"Mystery","tokenSymbol":"MYS","tokenDecimal":"4294967314"}
    ]}"#;
    let _m = explorer_mock("tokentx", "key-hugedecimal", body);
    let client = mocked_client(Network::Sonic, "key-hugedecimal");

    let err = client
        .get_token_transfers(ADDRESS, 10, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExplorerError::Upstream(_)));
    assert!(err.to_string().contains("tokenDecimal"));
}

#[tokio::test]
async fn gas_oracle_reshapes_three_tiers() {
    let body = r#"{"status":"1","message":"OK","result":
        {"SafeGasPrice":"10","ProposeGasPrice":"12","FastGasPrice":"15","suggestBaseFee":"9.5"}}"#;
    let _m = explorer_mock("gasoracle", "key-gas", body);
    let client = mocked_client(Network::Base, "key-gas");

    let gas = client.get_gas_oracle(None).await.unwrap();
    assert_eq!(gas.safe, "10");
    assert_eq!(gas.propose, "12");
    assert_eq!(gas.fast, "15");
}

#[tokio::test]
async fn gas_oracle_failure_carries_upstream_message() {
    let body = r#"{"status":"0","message":"Max rate limit reached"}"#;
    let _m = explorer_mock("gasoracle", "key-gasfail", body);
    let client = mocked_client(Network::Sonic, "key-gasfail");

    let err = client.get_gas_oracle(None).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Upstream(_)));
    assert!(err.to_string().contains("Max rate limit reached"));
}

#[tokio::test]
async fn contract_abi_returns_raw_text() {
    let body = r#"{"status":"1","message":"OK","result":"[{\"type\":\"function\",\"name\":\"transfer\"}]"}"#;
    let _m = explorer_mock("getabi", "key-abi", body);
    let client = mocked_client(Network::Sonic, "key-abi");

    let abi = client.get_contract_abi(ADDRESS, None).await.unwrap();
    assert!(abi.contains("transfer"));
}

#[tokio::test]
async fn unverified_contract_is_an_error_not_empty_success() {
    let body =
        r#"{"status":"0","message":"NOTOK","result":"Contract source code not verified"}"#;
    let _m = explorer_mock("getabi", "key-unverified", body);
    let client = mocked_client(Network::Sonic, "key-unverified");

    let err = client.get_contract_abi(ADDRESS, None).await.unwrap_err();
    assert!(err.to_string().contains("Contract source code not verified"));
}

#[tokio::test]
async fn ens_name_found_on_ethereum() {
    let body = r#"{"status":"1","message":"OK","result":"vitalik.eth"}"#;
    let _m = explorer_mock("ensname", "key-ens", body);
    let client = mocked_client(Network::Ethereum, "key-ens");

    let lookup = client.get_ens_name(ADDRESS, None).await.unwrap();
    assert_eq!(lookup, EnsLookup::Found("vitalik.eth".to_string()));
}

#[tokio::test]
async fn ens_no_data_maps_to_not_found() {
    let body = r#"{"status":"0","message":"No data found"}"#;
    let _m = explorer_mock("ensname", "key-ensmiss", body);
    let client = mocked_client(Network::Ethereum, "key-ensmiss");

    let lookup = client.get_ens_name(ADDRESS, None).await.unwrap();
    assert_eq!(lookup, EnsLookup::NotFound);
}

#[tokio::test]
async fn ens_is_not_supported_off_mainnet_without_a_request() {
    // No mock registered: a request would fail, so success proves nothing
    // left the process.
    let client = mocked_client(Network::Sonic, "key-enssonic");

    let lookup = client.get_ens_name(ADDRESS, None).await.unwrap();
    assert_eq!(lookup, EnsLookup::NotSupported(Network::Sonic));
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    // No mock registered and no endpoint override: the usability check must
    // reject the call before any HTTP is attempted.
    let mut credentials = HashMap::new();
    credentials.insert(Network::Sonic, "key".to_string());
    credentials.insert(Network::Base, String::new());
    let client = ExplorerClient::new(credentials, Network::Sonic);

    let err = client
        .get_balance(ADDRESS, Some(Network::Base))
        .await
        .unwrap_err();
    match err {
        ExplorerError::NetworkUnavailable { network, usable } => {
            assert_eq!(network, Network::Base);
            assert!(usable.contains("sonic"));
        }
        other => panic!("expected NetworkUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_address_is_rejected_without_a_request() {
    let client = mocked_client(Network::Sonic, "key-badaddr");

    for bad in ["deadbeef", "0x1234", "0xZZda6bf26964af9d7eed9e03e53415d37aa96045"] {
        let err = client.get_balance(bad, None).await.unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidAddress { .. }), "{bad}");
    }
}

#[tokio::test]
async fn concurrent_operations_on_distinct_networks_do_not_interfere() {
    let balance_body = r#"{"status":"1","message":"OK","result":"2000000000000000000"}"#;
    let gas_body = r#"{"status":"1","message":"OK","result":
        {"SafeGasPrice":"1","ProposeGasPrice":"2","FastGasPrice":"3"}}"#;
    let _m1 = explorer_mock("balance", "key-concurrent", balance_body);
    let _m2 = explorer_mock("gasoracle", "key-concurrent", gas_body);

    let mut credentials = HashMap::new();
    credentials.insert(Network::Sonic, "key-concurrent".to_string());
    credentials.insert(Network::Base, "key-concurrent".to_string());
    let client = ExplorerClient::new(credentials, Network::Sonic)
        .with_api_url(Network::Sonic, format!("{}/api", mockito::server_url()))
        .with_api_url(Network::Base, format!("{}/api", mockito::server_url()));

    let (balance, gas) = tokio::join!(
        client.get_balance(ADDRESS, Some(Network::Sonic)),
        client.get_gas_oracle(Some(Network::Base)),
    );

    let balance = balance.unwrap();
    assert_eq!(balance.formatted, "2");
    assert_eq!(balance.network, Network::Sonic);
    let gas = gas.unwrap();
    assert_eq!(gas.fast, "3");
}
