//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试 (wire format)
//! - generator -> broadcaster -> session e2e 测试
//! - 真实 WebSocket 客户端 e2e 测试

#[cfg(test)]
mod contract_tests {
    use contracts::{BatchMessage, Sample, SeriesBatch, StreamerConfig};

    #[test]
    fn test_wire_format_snapshot() {
        let message = BatchMessage {
            batches: vec![
                SeriesBatch::new("b", vec![Sample::new(0.5, 1_700_000_000_000_000_000)]),
                SeriesBatch::new("a", vec![]),
            ],
        };

        // Join order, not alphabetical order.
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"b":[{"data":0.5,"timestamp":1700000000000000000}],"a":[]}"#
        );
    }

    #[test]
    fn test_default_config_validates() {
        let config = StreamerConfig::default();
        assert!(config_loader::validate(&config).is_ok());
        assert_eq!(config.series_names(), vec!["a", "b", "c"]);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use broadcaster::Broadcaster;
    use contracts::{BatchMessage, ContractError, MessageSink, Sample, StreamerConfig};
    use generator::SourcePool;
    use session::{Session, SessionConfig, SessionOutcome, SessionState};
    use tokio_util::sync::CancellationToken;

    #[derive(Clone, Default)]
    struct CollectSink {
        messages: Arc<Mutex<Vec<BatchMessage>>>,
    }

    impl MessageSink for CollectSink {
        fn name(&self) -> &str {
            "collect"
        }

        async fn write(&mut self, message: &BatchMessage) -> Result<(), ContractError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    fn fast_config() -> StreamerConfig {
        let mut config = StreamerConfig::default();
        config.server.flush_interval = Duration::from_millis(20);
        config.server.queue_capacity = 1000;
        config.set_sample_interval(Duration::from_millis(1));
        config
    }

    /// End-to-end: SourcePool -> Broadcaster -> Session
    ///
    /// 验证完整的数据流：
    /// 1. 每个 series 由 TickerSource 生成
    /// 2. Broadcaster 扇出到 session 队列
    /// 3. Session 按 tick 合并为 BatchMessage
    #[tokio::test]
    async fn test_e2e_generated_pipeline() {
        let config = fast_config();
        let pool = SourcePool::from_series(&config.series, config.server.queue_capacity);
        let (broadcasters, tasks): (Vec<_>, Vec<_>) = pool
            .start_all()
            .unwrap()
            .into_iter()
            .map(|(series, queue)| Broadcaster::spawn(series, queue))
            .unzip();

        let sink = CollectSink::default();
        let token = CancellationToken::new();
        let session = Session::join(
            &broadcasters,
            sink.clone(),
            SessionConfig::from(&config.server),
        );
        let run = tokio::spawn(session.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(250)).await;
        token.cancel();
        let report = run.await.unwrap();

        assert_eq!(report.outcome, SessionOutcome::Disconnected);
        assert_eq!(report.state, SessionState::Terminated);
        assert!(report.flushes > 0);

        let messages = sink.messages.lock().unwrap().clone();
        assert_eq!(messages.len() as u64, report.flushes);
        let mut last = [0u64; 3];
        for message in &messages {
            assert!(!message.is_empty());
            for (i, name) in ["a", "b", "c"].iter().enumerate() {
                let samples = message.series(name).unwrap();
                for sample in samples {
                    assert!(sample.timestamp >= last[i], "series {name} out of order");
                    last[i] = sample.timestamp;
                    assert!(sample.value.abs() <= 2.0);
                }
            }
        }

        for broadcaster in &broadcasters {
            assert_eq!(broadcaster.subscriber_count(), 0);
        }

        pool.stop_all();
        for task in tasks {
            tokio::time::timeout(Duration::from_secs(1), task)
                .await
                .unwrap()
                .unwrap();
        }
    }

    /// Stopping the sources and shutting the broadcasters down ends live sessions
    #[tokio::test]
    async fn test_e2e_shutdown_closes_sessions() {
        let config = fast_config();
        let pool = SourcePool::from_series(&config.series, config.server.queue_capacity);
        let broadcasters: Vec<Arc<Broadcaster<Sample>>> = pool
            .start_all()
            .unwrap()
            .into_iter()
            .map(|(series, queue)| Broadcaster::spawn(series, queue).0)
            .collect();

        let run = tokio::spawn(
            Session::join(
                &broadcasters,
                CollectSink::default(),
                SessionConfig::from(&config.server),
            )
            .run(CancellationToken::new()),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        for broadcaster in &broadcasters {
            broadcaster.shutdown();
        }
        pool.stop_all();

        let report = tokio::time::timeout(Duration::from_secs(1), run)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(report.outcome, SessionOutcome::QueueClosed { .. }));
    }
}

#[cfg(test)]
mod websocket_tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use broadcaster::Broadcaster;
    use contracts::{Sample, StreamerConfig};
    use futures::StreamExt;
    use generator::SourcePool;
    use serde_json::Value;
    use server::AppState;
    use session::SessionConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_util::sync::CancellationToken;

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct Harness {
        addr: SocketAddr,
        state: AppState,
        broadcasters: Vec<Arc<Broadcaster<Sample>>>,
        shutdown: CancellationToken,
        server: JoinHandle<server::Result<()>>,
        _pool: SourcePool,
    }

    async fn start() -> Harness {
        let mut config = StreamerConfig::default();
        config.server.flush_interval = Duration::from_millis(20);
        config.server.queue_capacity = 1000;
        config.set_sample_interval(Duration::from_millis(1));

        let pool = SourcePool::from_series(&config.series, config.server.queue_capacity);
        let broadcasters: Vec<_> = pool
            .start_all()
            .unwrap()
            .into_iter()
            .map(|(series, queue)| Broadcaster::spawn(series, queue).0)
            .collect();

        let state = AppState::new(broadcasters.clone(), SessionConfig::from(&config.server));
        let listener = server::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(server::serve(
            listener,
            state.clone(),
            shutdown.clone().cancelled_owned(),
        ));

        Harness {
            addr,
            state,
            broadcasters,
            shutdown,
            server,
            _pool: pool,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        timeout(TIMEOUT, async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached");
    }

    #[tokio::test]
    async fn test_websocket_client_receives_batches() {
        let harness = start().await;
        let (mut ws, _) = connect_async(format!("ws://{}/", harness.addr))
            .await
            .unwrap();

        let mut seen = 0;
        while seen < 3 {
            let frame = timeout(TIMEOUT, ws.next())
                .await
                .expect("timeout waiting for message")
                .expect("stream closed")
                .expect("ws error");
            let Message::Text(text) = frame else {
                continue;
            };

            let json: Value = serde_json::from_str(&text).unwrap();
            let object = json.as_object().unwrap();
            assert_eq!(object.len(), 3);
            for key in ["a", "b", "c"] {
                for sample in object[key].as_array().unwrap() {
                    assert!(sample["data"].is_f64());
                    assert!(sample["timestamp"].is_u64());
                }
            }
            seen += 1;
        }

        assert_eq!(harness.state.connections(), 1);
        assert!(harness.broadcasters.iter().all(|b| b.subscriber_count() == 1));

        ws.close(None).await.unwrap();

        let state = harness.state.clone();
        wait_until(move || state.connections() == 0).await;
        assert!(harness.broadcasters.iter().all(|b| b.subscriber_count() == 0));
        assert_eq!(harness.state.session_summary().total_sessions, 1);

        harness.shutdown.cancel();
        timeout(TIMEOUT, harness.server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_abrupt_disconnect_releases_subscriptions() {
        let harness = start().await;
        let (ws, _) = connect_async(format!("ws://{}/", harness.addr))
            .await
            .unwrap();

        let state = harness.state.clone();
        wait_until(move || state.connections() == 1).await;
        drop(ws);

        let state = harness.state.clone();
        wait_until(move || state.connections() == 0).await;
        assert!(harness.broadcasters.iter().all(|b| b.subscriber_count() == 0));
        for broadcaster in &harness.broadcasters {
            assert_eq!(broadcaster.metrics().unsubscribed(), 1);
        }

        harness.shutdown.cancel();
    }

    #[tokio::test]
    async fn test_server_shutdown_ends_sessions() {
        let harness = start().await;
        let (mut ws, _) = connect_async(format!("ws://{}/", harness.addr))
            .await
            .unwrap();

        let state = harness.state.clone();
        wait_until(move || state.connections() == 1).await;

        harness.shutdown.cancel();

        // The client sees the stream end (close frame or EOF).
        timeout(TIMEOUT, async {
            while let Some(Ok(frame)) = ws.next().await {
                if frame.is_close() {
                    break;
                }
            }
        })
        .await
        .unwrap();

        timeout(TIMEOUT, harness.server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        // The connection task finishes on its own after the close frame.
        let state = harness.state.clone();
        wait_until(move || state.connections() == 0).await;
        assert_eq!(
            harness.state.session_summary().outcome_counts.get("disconnected"),
            Some(&1)
        );
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let harness = start().await;

        let mut stream = TcpStream::connect(harness.addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        timeout(TIMEOUT, stream.read_to_string(&mut response))
            .await
            .unwrap()
            .unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("ok"));

        harness.shutdown.cancel();
    }
}
