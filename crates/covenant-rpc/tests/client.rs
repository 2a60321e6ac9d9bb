//! RpcClient against a scripted transport

use std::sync::Arc;

use covenant_primitives::H256;
use covenant_rpc::{EthRpc, MockTransport, RpcClient, RpcError};
use serde_json::json;

const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

#[tokio::test]
async fn test_receipt_round_trip() {
    let transport = MockTransport::new();
    transport.set_response(
        "eth_getTransactionReceipt",
        json!({
            "transactionHash": TX_HASH,
            "blockNumber": "0x2",
            "status": "0x1",
            "gasUsed": "0x7a120",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "logs": []
        }),
    );
    let client = RpcClient::with_transport(transport.clone());

    let hash = H256::from_hex(TX_HASH).unwrap();
    let receipt = client.get_transaction_receipt(&hash).await.unwrap().unwrap();
    assert_eq!(receipt.transaction_hash, hash);
    assert_eq!(receipt.block_number, 2);
    assert_eq!(receipt.gas_used, 500_000);
    assert!(receipt.contract_address.is_some());

    let requests = transport.requests();
    assert_eq!(requests[0].1, vec![json!(TX_HASH)]);
}

#[tokio::test]
async fn test_malformed_receipt_is_invalid_response() {
    let transport = MockTransport::new();
    transport.set_response(
        "eth_getTransactionReceipt",
        json!({
            "transactionHash": TX_HASH,
            "blockNumber": "0x2",
            "status": "0x1",
            "gasUsed": "not hex",
        }),
    );
    let client = RpcClient::with_transport(transport);
    let err = client
        .get_transaction_receipt(&H256::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::InvalidResponse(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_shared_across_tasks() {
    let client: Arc<dyn EthRpc> = Arc::new(RpcClient::new_mock());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.chain_id().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }
}
