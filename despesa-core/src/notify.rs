use tracing::{info, warn};

use crate::models::request::Request;

/// Dispatches a fire-and-forget notification for a completed transition.
///
/// The notification runs on a spawned task after the transaction has
/// committed: a delivery failure is logged and never rolls back the
/// transition it reports on.
pub fn dispatch_transition_notification(request: &Request) {
    let request = request.clone();
    tokio::spawn(async move {
        if let Err(e) = send_status_notification(&request).await {
            warn!(
                "Failed to notify requester {} about request {}: {}",
                request.requester_id, request.id, e
            );
        }
    });
}

/// Mock notification sender.
///
/// In production, this would hand the message to an email or messaging
/// integration; the workflow core only cares that the call is
/// fire-and-forget.
async fn send_status_notification(request: &Request) -> Result<(), anyhow::Error> {
    let label = request.kind.status_label(request.status);

    info!(
        "Mock Notification: request {} ({}) for requester {} is now \"{}\"",
        request.id, request.kind, request.requester_id, label
    );

    // Simulate async delivery delay
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    Ok(())
}
