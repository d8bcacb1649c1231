//! Common test utilities for store integration tests.
//!
//! `TestServer` runs a RESP server on a background tokio runtime, backed by
//! sixteen `MemoryStore` databases, so the blocking `Client` can be tested
//! over a real TCP socket.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use futures::{SinkExt, StreamExt};
use redmap_protocol::{Command, RespCodec, RespValue};
use redmap_store::{MemoryStore, StoreConfig};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

pub const DATABASES: usize = 16;

type Databases = Arc<Mutex<Vec<MemoryStore>>>;

pub struct TestServer {
    pub addr: SocketAddr,
    dbs: Databases,
    generation: Arc<AtomicU64>,
}

impl TestServer {
    /// Bind to an ephemeral port and start serving.
    pub fn start() -> Self {
        let dbs: Databases = Arc::new(Mutex::new(vec![MemoryStore::new(); DATABASES]));
        let generation = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::channel();

        let server_dbs = dbs.clone();
        let server_generation = generation.clone();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .build()
                .expect("Failed to build runtime");

            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind");
                tx.send(listener.local_addr().expect("No local address"))
                    .expect("Test dropped before server started");

                while let Ok((socket, _)) = listener.accept().await {
                    tokio::spawn(serve(
                        socket,
                        server_dbs.clone(),
                        server_generation.clone(),
                    ));
                }
            });
        });

        let addr = rx.recv().expect("Server failed to start");
        Self {
            addr,
            dbs,
            generation,
        }
    }

    /// Client configuration pointing at this server.
    pub fn config(&self, db: u32) -> StoreConfig {
        StoreConfig::new(self.addr.ip().to_string(), self.addr.port(), db)
    }

    /// Inspect or seed database `db` directly.
    pub fn with_db<R>(&self, db: usize, f: impl FnOnce(&mut MemoryStore) -> R) -> R {
        let mut dbs = self.dbs.lock().expect("Database lock poisoned");
        f(&mut dbs[db])
    }

    /// Close every open connection the next time it sends a command.
    pub fn disconnect_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

async fn serve(socket: TcpStream, dbs: Databases, generation: Arc<AtomicU64>) {
    let opened_at = generation.load(Ordering::SeqCst);
    let mut framed = Framed::new(socket, RespCodec::new());
    let mut db = 0usize;

    while let Some(Ok(frame)) = framed.next().await {
        if generation.load(Ordering::SeqCst) != opened_at {
            return;
        }

        let reply = match Command::from_value(frame) {
            Ok(Command::Select { db: index }) if (index as usize) < DATABASES => {
                db = index as usize;
                RespValue::status("OK")
            }
            Ok(Command::Select { .. }) => RespValue::error("ERR DB index is out of range"),
            Ok(command) => dbs.lock().expect("Database lock poisoned")[db].apply(command),
            Err(err) => RespValue::error(format!("ERR {err}")),
        };

        if framed.send(reply).await.is_err() {
            break;
        }
    }
}
