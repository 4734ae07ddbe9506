mod common;

use common::{ScriptedGateway, StalledGateway, finish, send, tool_results};
use hive_agents::{Agent, AgentRegistry, InvokeOutput, InvokeRequest};
use hive_common::{EngineConfig, HiveError};
use hive_llm::AssistantTurn;
use hive_tools::CallContext;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn registry_with(agents: &[Arc<Agent>]) -> AgentRegistry {
    let registry = AgentRegistry::default();
    for agent in agents {
        assert!(registry.add_agent(agent.clone()).await);
    }
    registry
}

fn scripted(name: &str, script: Vec<AssistantTurn>) -> (Arc<Agent>, Arc<ScriptedGateway>) {
    let gateway = ScriptedGateway::new(script);
    let agent = Agent::builder(name, gateway.clone()).build().unwrap();
    (agent, gateway)
}

#[tokio::test]
async fn test_delegation_round_trip() {
    let (supervisor, _) = scripted(
        "supervisor",
        vec![
            send("c1", "os_worker", "list the files"),
            finish("c2", "3 files found"),
        ],
    );
    let (worker, _) = scripted("os_worker", vec![finish("w1", "3 files")]);
    let _registry = registry_with(&[supervisor.clone(), worker.clone()]).await;

    let output = supervisor.invoke(InvokeRequest::new("count files")).await.unwrap();

    assert_eq!(output, InvokeOutput::Finished("3 files found".into()));
    assert_eq!(
        tool_results(&supervisor.history())[0],
        "[os_worker] → supervisor:\n3 files"
    );
    assert_eq!(
        worker.history()[0].text(),
        "Message: [task] supervisor: list the files"
    );
}

#[tokio::test]
async fn test_reply_to_caller_is_refused_as_cycle() {
    let (supervisor, supervisor_gateway) = scripted(
        "supervisor",
        vec![send("c1", "os_worker", "do it"), finish("c2", "done")],
    );
    let (worker, _) = scripted(
        "os_worker",
        vec![
            send("w1", "supervisor", "which folder?"),
            finish("w2", "guessed the folder"),
        ],
    );
    let _registry = registry_with(&[supervisor.clone(), worker.clone()]).await;

    let output = supervisor.invoke(InvokeRequest::new("go")).await.unwrap();
    assert_eq!(output.text(), "done");

    let worker_results = tool_results(&worker.history());
    assert!(worker_results[0].starts_with("send_message error"));
    assert!(worker_results[0].contains("Call cycle"));
    // The supervisor was never re-entered
    assert_eq!(supervisor_gateway.calls(), 2);
}

#[tokio::test]
async fn test_call_depth_is_limited() {
    let supervisor_gateway = ScriptedGateway::new(vec![
        send("c1", "planner", "plan it"),
        finish("c2", "done"),
    ]);
    let supervisor = Agent::builder("supervisor", supervisor_gateway)
        .engine_config(EngineConfig {
            max_call_depth: 2,
            ..Default::default()
        })
        .build()
        .unwrap();
    let (planner, _) = scripted(
        "planner",
        vec![send("p1", "os_worker", "run it"), finish("p2", "planned")],
    );
    let (worker, worker_gateway) = scripted("os_worker", vec![finish("w1", "ran")]);
    let _registry = registry_with(&[supervisor.clone(), planner.clone(), worker]).await;

    supervisor.invoke(InvokeRequest::new("go")).await.unwrap();

    let planner_results = tool_results(&planner.history());
    assert!(planner_results[0].contains("Call depth 3 exceeds the limit of 2"));
    assert_eq!(worker_gateway.calls(), 0);
}

#[tokio::test]
async fn test_self_send_never_reaches_gateway_twice() {
    let (worker, gateway) = scripted(
        "os_worker",
        vec![send("w1", "os_worker", "note to self"), finish("w2", "ok")],
    );
    let (supervisor, _) = scripted("supervisor", vec![]);
    let _registry = registry_with(&[worker.clone(), supervisor]).await;

    worker.invoke(InvokeRequest::new("go")).await.unwrap();

    assert_eq!(
        tool_results(&worker.history())[0],
        "[os_worker] Skipped self-message."
    );
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn test_workers_cannot_reach_workers() {
    let (worker, _) = scripted(
        "os_worker",
        vec![send("w1", "web_worker", "fetch this"), finish("w2", "gave up")],
    );
    let (other, other_gateway) = scripted("web_worker", vec![]);
    let (supervisor, _) = scripted("supervisor", vec![]);
    let _registry = registry_with(&[worker.clone(), other, supervisor]).await;

    let output = worker.invoke(InvokeRequest::new("go")).await.unwrap();

    assert_eq!(output.text(), "gave up");
    let result = &tool_results(&worker.history())[0];
    assert!(result.starts_with("send_message error"));
    assert!(result.contains("supervisor"));
    assert_eq!(other_gateway.calls(), 0);
}

#[tokio::test]
async fn test_cancellation_reaches_nested_send() {
    let (supervisor, _) = scripted(
        "supervisor",
        vec![send("c1", "os_worker", "take forever"), finish("c2", "never")],
    );
    let worker = Agent::builder("os_worker", Arc::new(StalledGateway))
        .build()
        .unwrap();
    let _registry = registry_with(&[supervisor.clone(), worker.clone()]).await;

    let token = CancellationToken::new();
    let ctx = CallContext::with_cancellation(8, token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        supervisor.invoke_in(InvokeRequest::new("go"), &ctx),
    )
    .await
    .expect("cancellation did not propagate")
    .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, HiveError::Cancelled));
    // The pending send was abandoned before its result was recorded
    assert_eq!(supervisor.history().len(), 2);
    assert_eq!(worker.history().len(), 1);
}
