//! Lazy row streams.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use rusqlite::Connection;
use tokio::sync::mpsc;

use crate::error::Error;
use crate::store::StoreHandle;

/// Rows buffered between the producing scan and the consumer. The bounded
/// channel is what makes the stream lazy: the scan suspends once the buffer
/// fills and resumes as the consumer drains it.
const STREAM_BUFFER: usize = 256;

/// A finite, single-pass stream of query rows.
///
/// Rows arrive in the backing store's natural scan order. Dropping the
/// stream cancels the underlying scan at its next row. The stream is not
/// restartable; re-issue the query for another pass.
pub struct RowStream<T> {
    rx: mpsc::Receiver<Result<T, Error>>,
}

impl<T> RowStream<T> {
    /// Receive the next row, or `None` once the scan is exhausted.
    pub async fn recv(&mut self) -> Option<Result<T, Error>> {
        self.rx.recv().await
    }

    /// Drain the remaining rows into a vector, failing on the first error.
    pub async fn try_collect(mut self) -> Result<Vec<T>, Error> {
        let mut rows = Vec::new();
        while let Some(item) = self.rx.recv().await {
            rows.push(item?);
        }
        Ok(rows)
    }
}

impl<T> Stream for RowStream<T> {
    type Item = Result<T, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Spawn a blocking scan whose rows feed a [`RowStream`].
///
/// `produce` runs on the blocking pool holding the handle's connection for
/// the duration of the scan, emitting rows through the callback; a `false`
/// return from the callback means the consumer went away and the scan must
/// stop. Must be called from within a tokio runtime.
pub(crate) fn spawn_row_stream<T, F>(handle: &StoreHandle, produce: F) -> RowStream<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection, &mut dyn FnMut(T) -> bool) -> Result<(), Error> + Send + 'static,
{
    let conn = handle.conn_arc();
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    tokio::task::spawn_blocking(move || {
        let mut guard = conn.lock();
        let Some(conn) = guard.as_mut() else {
            let _ = tx.blocking_send(Err(Error::Released));
            return;
        };

        let result = {
            let mut emit = |item: T| tx.blocking_send(Ok(item)).is_ok();
            produce(conn, &mut emit)
        };
        if let Err(err) = result {
            let _ = tx.blocking_send(Err(err));
        }
    });

    RowStream { rx }
}
