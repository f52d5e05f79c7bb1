mod common;

use std::io::Read;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use alloy::primitives::{Bytes, B256};
use serde_json::{json, Value};
use tiny_http::{Response, Server, StatusCode};

use safe_staging_adapters::abi::{
    selector_of, CHECK_SIGNATURES_SELECTOR, NONCE_SELECTOR, TRANSACTION_HASH_SELECTOR,
};
use safe_staging_adapters::{MemoryStoreAdapter, RpcChainAdapter};
use safe_staging_core::{ChainPort, PortError, StagingError, StagingGateway};

use common::{proposal, safe_address, sample_txn, CHAIN_ID};

const HASH: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

type Reply = (u16, String);

/// Node answering each `eth_call` by the selector of its calldata. Every
/// request body is recorded.
fn spawn_node<F>(reply: F) -> (String, Arc<Mutex<Vec<Value>>>)
where
    F: Fn([u8; 4]) -> Reply + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);

    thread::spawn(move || {
        for mut req in server.incoming_requests() {
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let selector = request["params"][0]["data"]
                .as_str()
                .and_then(|d| d.parse::<Bytes>().ok())
                .and_then(|d| selector_of(&d))
                .unwrap_or_default();
            if let Ok(mut g) = recorded.lock() {
                g.push(request.clone());
            }

            let (code, payload) = reply(selector);
            let response = Response::from_string(payload).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
    });

    (addr, seen)
}

fn result(id: &Value, hex: &str) -> String {
    json!({"jsonrpc": "2.0", "id": id, "result": hex}).to_string()
}

fn error(code: i64, message: &str) -> String {
    json!({"jsonrpc": "2.0", "id": 1, "error": {"code": code, "message": message}}).to_string()
}

fn word(n: u64) -> String {
    format!("0x{n:064x}")
}

/// Healthy Safe at nonce 7 that rejects every signature set.
fn safe_node(selector: [u8; 4]) -> Reply {
    let id = json!(1);
    match selector {
        NONCE_SELECTOR => (200, result(&id, &word(7))),
        TRANSACTION_HASH_SELECTOR => (200, result(&id, HASH)),
        CHECK_SIGNATURES_SELECTOR => (200, error(3, "execution reverted: GS026")),
        _ => (200, error(-32601, "method not found")),
    }
}

fn adapter(addr: &str) -> RpcChainAdapter {
    RpcChainAdapter::new(addr, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn reads_nonce_through_eth_call() {
    let (addr, seen) = spawn_node(safe_node);
    let rpc = adapter(&addr);

    assert_eq!(rpc.nonce(safe_address()).await.expect("nonce"), 7);

    let seen = seen.lock().expect("requests").clone();
    assert_eq!(seen.len(), 1);
    let req = &seen[0];
    assert_eq!(req["method"], "eth_call");
    assert_eq!(req["params"][1], "latest");
    let to: alloy::primitives::Address = req["params"][0]["to"]
        .as_str()
        .expect("to")
        .parse()
        .expect("address");
    assert_eq!(to, safe_address());
}

#[tokio::test]
async fn decodes_transaction_hash() {
    let (addr, _) = spawn_node(safe_node);
    let hash = adapter(&addr)
        .transaction_hash(safe_address(), &sample_txn(7))
        .await
        .expect("hash");
    assert_eq!(hash, HASH.parse::<B256>().expect("hash literal"));
}

#[tokio::test]
async fn revert_means_signatures_rejected() {
    let (addr, _) = spawn_node(safe_node);
    let blob = proposal(0, 2).concatenated_signatures();
    let ok = adapter(&addr)
        .check_signatures(safe_address(), B256::ZERO, &blob, 2)
        .await
        .expect("revert is an answer, not a failure");
    assert!(!ok);
}

#[tokio::test]
async fn successful_check_returns_true() {
    let (addr, _) = spawn_node(|selector| match selector {
        CHECK_SIGNATURES_SELECTOR => (200, result(&json!(1), "0x")),
        _ => (200, error(-32601, "method not found")),
    });
    let blob = proposal(0, 1).concatenated_signatures();
    let ok = adapter(&addr)
        .check_signatures(safe_address(), B256::ZERO, &blob, 1)
        .await
        .expect("check");
    assert!(ok);
}

#[tokio::test]
async fn revert_in_message_only_is_still_a_revert() {
    let (addr, _) = spawn_node(|_| (200, error(-32000, "Execution Reverted")));
    let err = adapter(&addr)
        .transaction_hash(safe_address(), &sample_txn(0))
        .await
        .expect_err("reverted");
    assert!(matches!(err, PortError::Reverted(_)));
}

#[tokio::test]
async fn other_node_errors_are_rpc_failures() {
    let (addr, _) = spawn_node(|_| (200, error(-32005, "rate limited")));
    let rpc = adapter(&addr);

    let err = rpc.nonce(safe_address()).await.expect_err("rpc error");
    assert!(matches!(err, PortError::Rpc { code: -32005, .. }));

    let blob = proposal(0, 1).concatenated_signatures();
    let err = rpc
        .check_signatures(safe_address(), B256::ZERO, &blob, 1)
        .await
        .expect_err("not a rejection");
    assert!(matches!(err, PortError::Rpc { .. }));
}

#[tokio::test]
async fn malformed_results_fail_to_decode() {
    let (addr, _) = spawn_node(|selector| match selector {
        NONCE_SELECTOR => (200, result(&json!(1), "0x1234")),
        _ => (200, result(&json!(1), "not hex")),
    });
    let rpc = adapter(&addr);

    let err = rpc.nonce(safe_address()).await.expect_err("short word");
    assert!(matches!(err, PortError::Decode(_)));
    let err = rpc
        .transaction_hash(safe_address(), &sample_txn(0))
        .await
        .expect_err("bad hex");
    assert!(matches!(err, PortError::Decode(_)));
}

#[tokio::test]
async fn nonce_beyond_u64_is_a_decode_error() {
    let (addr, _) = spawn_node(|_| {
        let huge = format!("0x{}{}", "1", "0".repeat(63));
        (200, result(&json!(1), &huge))
    });
    let err = adapter(&addr)
        .nonce(safe_address())
        .await
        .expect_err("overflow");
    assert!(matches!(err, PortError::Decode(_)));
}

#[tokio::test]
async fn http_failure_without_json_is_transport() {
    let (addr, _) = spawn_node(|_| (502, "bad gateway".to_owned()));
    let err = adapter(&addr)
        .nonce(safe_address())
        .await
        .expect_err("gateway down");
    assert!(matches!(err, PortError::Transport(_)));
}

#[tokio::test]
async fn unreachable_node_is_transport() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let err = adapter(&format!("http://127.0.0.1:{port}"))
        .nonce(safe_address())
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, PortError::Transport(_)));
}

/// Node that answers correctly but only after `delay`.
fn slow_node(delay: Duration) -> String {
    let (addr, _) = spawn_node(move |selector| {
        thread::sleep(delay);
        safe_node(selector)
    });
    addr
}

#[tokio::test]
async fn slow_node_times_out_as_transport() {
    let addr = slow_node(Duration::from_millis(500));
    let rpc = RpcChainAdapter::new(addr, Duration::from_millis(50)).expect("client");

    let err = rpc.nonce(safe_address()).await.expect_err("timed out");
    assert!(matches!(err, PortError::Transport(_)), "{err}");
}

#[tokio::test]
async fn slow_node_fails_submission_without_staging() {
    let addr = slow_node(Duration::from_millis(500));
    let rpc = RpcChainAdapter::new(addr, Duration::from_millis(50)).expect("client");
    let gateway = StagingGateway::new(MemoryStoreAdapter::new()).with_chain(CHAIN_ID, rpc);

    let err = gateway
        .submit(CHAIN_ID, safe_address(), proposal(7, 1))
        .await
        .expect_err("node too slow");
    assert!(matches!(err, StagingError::InternalChainError(PortError::Transport(_))));
    assert!(gateway.list(CHAIN_ID, safe_address()).is_empty());
}
