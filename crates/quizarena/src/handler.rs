//! Per-connection handler: bridges one socket to the coordinator loop.
//!
//! Each accepted connection gets its own reader task running this
//! handler plus a writer task draining its outbound channel. The
//! handler holds no business state; it decodes inbound frames into
//! commands and forwards them, and its drop guard injects exactly one
//! disconnect message however the handler exits.

use quizarena_protocol::{ClientCommand, Codec};
use quizarena_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::server::LoopMsg;

/// Drop guard that tells the coordinator loop the connection is gone.
struct DisconnectGuard {
    conn_id: ConnectionId,
    loop_tx: UnboundedSender<LoopMsg>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let _ = self.loop_tx.send(LoopMsg::Disconnected(self.conn_id));
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    codec: C,
    loop_tx: UnboundedSender<LoopMsg>,
) {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    if loop_tx.send(LoopMsg::Connected(conn_id, out_tx)).is_err() {
        // Coordinator loop is gone; the server is shutting down.
        return;
    }
    let _guard = DisconnectGuard {
        conn_id,
        loop_tx: loop_tx.clone(),
    };

    // Writer: drains outbound events until the coordinator drops the
    // sender on disconnect.
    let writer_conn = conn.clone();
    let writer = tokio::spawn(async move {
        while let Some(bytes) = out_rx.recv().await {
            if let Err(e) = writer_conn.send(&bytes).await {
                tracing::debug!(
                    %conn_id, error = %e, "outbound send failed"
                );
                break;
            }
        }
    });

    // Reader: decode inbound frames into commands for the loop.
    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                match codec.decode::<ClientCommand>(&data) {
                    Ok(command) => {
                        if loop_tx
                            .send(LoopMsg::Command(conn_id, command))
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        // Undecodable frames are dropped, not fatal.
                        tracing::warn!(
                            %conn_id, error = %e,
                            "undecodable frame dropped"
                        );
                    }
                }
            }
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        }
    }

    writer.abort();
    // _guard drops here, injecting the one Disconnected message.
}
