use std::collections::BTreeMap;

use alloy_primitives::{address, Bytes, U256};
use anyhow::Result;
use serde_json::json;
use wallet_monitor::balance::{JsonRpcTransport, RpcTransport};
use wallet_monitor::error::RpcError;
use wallet_monitor::models::NetworkId;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer, network: NetworkId) -> JsonRpcTransport {
    let mut endpoints = BTreeMap::new();
    endpoints.insert(network, server.uri());
    JsonRpcTransport::new(endpoints)
}

#[tokio::test]
async fn get_balance_decodes_hex_quantity() -> Result<()> {
    let server = MockServer::start().await;
    let holder = address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "eth_getBalance",
            "params": [holder, "latest"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0xde0b6b3a7640000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server, NetworkId::BASE);
    let balance = transport.native_balance(NetworkId::BASE, holder).await?;
    assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));

    Ok(())
}

#[tokio::test]
async fn eth_call_returns_raw_bytes() -> Result<()> {
    let server = MockServer::start().await;
    let usdc = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
    let word = format!("0x{:064x}", 2_500_000u64);

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": word
        })))
        .mount(&server)
        .await;

    let transport = transport_for(&server, NetworkId::BASE);
    let output = transport
        .call(NetworkId::BASE, usdc, Bytes::from_static(&[0x70, 0xa0, 0x82, 0x31]))
        .await?;
    assert_eq!(output.len(), 32);
    assert_eq!(U256::from_be_slice(&output), U256::from(2_500_000u64));

    Ok(())
}

#[tokio::test]
async fn rpc_error_object_is_surfaced() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "method not found" }
        })))
        .mount(&server)
        .await;

    let transport = transport_for(&server, NetworkId::OPTIMISM);
    let err = transport.block_number(NetworkId::OPTIMISM).await.unwrap_err();
    match err {
        RpcError::Rpc { code, message } => {
            assert_eq!(code, -32601);
            assert_eq!(message, "method not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn http_failure_maps_to_status_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let transport = transport_for(&server, NetworkId::ETHEREUM);
    let err = transport.block_number(NetworkId::ETHEREUM).await.unwrap_err();
    assert!(matches!(err, RpcError::Status { status: 502, .. }));

    Ok(())
}

#[tokio::test]
async fn block_number_parses_quantity() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_blockNumber" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x1234"
        })))
        .mount(&server)
        .await;

    let transport = transport_for(&server, NetworkId::ARBITRUM);
    assert_eq!(transport.block_number(NetworkId::ARBITRUM).await?, 0x1234);

    Ok(())
}

#[tokio::test]
async fn requests_go_to_the_named_network_only() -> Result<()> {
    let server = MockServer::start().await;
    let transport = transport_for(&server, NetworkId::BASE);

    let err = transport
        .native_balance(NetworkId::ETHEREUM, address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::UnknownNetwork(NetworkId::ETHEREUM)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}
