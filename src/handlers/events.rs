use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::Stream;

use crate::auth::{AuthSession, CurrentUser};
use crate::error::{AppError, AppResult};
use crate::live::{Collection, LiveQuery, Snapshot, SubscriptionHandle};
use crate::state::AppState;

/// Live snapshot feed for one collection over Server-Sent Events. The
/// client receives the full ordered snapshot as a `snapshot` event
/// immediately and after every relevant write; dropping the connection
/// releases the subscription.
pub async fn stream(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(collection): Path<String>,
) -> AppResult<Sse<SnapshotStream>> {
    let collection = Collection::parse(&collection)
        .ok_or_else(|| AppError::NotFound(format!("Unknown collection: {}", collection)))?;

    let session = AuthSession::for_user(&user.0);
    // Every delivery is a complete snapshot, so a slow client only ever
    // needs the newest one; the watch channel coalesces the rest.
    let (tx, rx) = watch::channel(Snapshot::new());

    let handle = state.subscriptions.subscribe(
        &session,
        LiveQuery::collection(collection),
        move |snapshot| {
            let _ = tx.send(snapshot);
        },
    );

    tracing::debug!(
        collection = collection.as_str(),
        user_id = %user.0,
        "Opened live event stream"
    );

    let stream = SnapshotStream {
        inner: WatchStream::from_changes(rx),
        _session: session,
        _handle: handle,
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Adapts the subscription's snapshot channel into an SSE event stream
/// while owning the pieces that keep the subscription alive.
pub struct SnapshotStream {
    inner: WatchStream<Snapshot>,
    _session: AuthSession,
    _handle: SubscriptionHandle,
}

impl Stream for SnapshotStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(snapshot)) => {
                let data =
                    serde_json::to_string(&snapshot).unwrap_or_else(|_| "[]".to_string());
                Poll::Ready(Some(Ok(Event::default().event("snapshot").data(data))))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
