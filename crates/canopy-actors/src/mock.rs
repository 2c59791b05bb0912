//! # Mock Framework & Testing Guide
//!
//! `MockClient<T>` hands out a real `ResourceClient<T>` whose requests are answered
//! from a queue of expectations instead of a running actor. Use it to test an actor
//! or a service whose dependencies are other actors.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **State** | None (scripted replies) | Real store |
//! | **Determinism** | Fully scripted | Subject to scheduler |
//! | **Use Case** | Logic *around* a client | The actor itself, or the full system |
//! | **Error Injection** | `return_err` | Requires reaching the failing state |
//!
//! ## Testing Strategies
//!
//! 1. **Single actor**: spawn one `ResourceActor` with a `()` or mocked context.
//! 2. **Actor with mocked dependencies**: spawn the actor under test and pass
//!    `MockClient::client()` handles as its context (see `tests/order_actor_test.rs`
//!    in the `canopy` crate).
//! 3. **Full system**: start every actor and drive it through the services.
//!
//! ## Failure Injection
//!
//! ```rust
//! use canopy_actors::mock::MockClient;
//! use canopy_actors::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Tree { id: u32 }
//! #[derive(Debug)] struct TreeCreate;
//! #[derive(Debug)] struct TreeUpdate;
//! #[derive(Debug)] enum TreeAction {}
//! #[derive(Debug, thiserror::Error)] #[error("Err")] struct TreeError;
//!
//! #[async_trait]
//! impl ActorEntity for Tree {
//!     type Id = u32; type Create = TreeCreate; type Update = TreeUpdate;
//!     type Action = TreeAction; type ActionResult = (); type Context = (); type Error = TreeError;
//!     fn from_create_params(id: u32, _: TreeCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
//!     async fn on_update(&mut self, _: TreeUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: TreeAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Tree>::new();
//!     let client = mock.client();
//!
//!     mock.expect_get(1).return_err(FrameworkError::ActorClosed);
//!
//!     let result = client.get(1).await;
//!     assert!(matches!(result, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! ## Channel-level helpers
//!
//! [`create_mock_client`] returns a client plus the raw receiver, and
//! [`expect_create`], [`expect_get`] and [`expect_action`] pull the next request off
//! it, so a test can inspect the payload before replying.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted reply. Requests are matched against expectations in FIFO order.
enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn push<T: ActorEntity>(queue: &Queue<T>, expectation: Expectation<T>) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(expectation);
}

/// A mock client with expectation tracking for fluent testing.
///
/// An unexpected request (wrong kind, wrong id, or none queued) panics the
/// background task; the caller then sees `FrameworkError::ActorDropped`.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "get called with unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "update called with unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Delete { id, respond_to },
                        Some(Expectation::Delete { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "delete called with unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, action, respond_to },
                        Some(Expectation::Action { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "action {action:?} sent to unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn expect<R>(
        &self,
        script: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + 'static,
    ) -> Expect<T, R> {
        Expect {
            queue: self.expectations.clone(),
            script: Box::new(script),
        }
    }

    /// Expects a `get` of `id`.
    pub fn expect_get(&mut self, id: T::Id) -> Expect<T, Option<T>> {
        self.expect(move |response| Expectation::Get { id, response })
    }

    /// Expects a `list`.
    pub fn expect_list(&mut self) -> Expect<T, Vec<T>> {
        self.expect(|response| Expectation::List { response })
    }

    /// Expects a `create`; the payload is not inspected.
    pub fn expect_create(&mut self) -> Expect<T, T::Id> {
        self.expect(|response| Expectation::Create { response })
    }

    /// Expects an `update` of `id`.
    pub fn expect_update(&mut self, id: T::Id) -> Expect<T, T> {
        self.expect(move |response| Expectation::Update { id, response })
    }

    /// Expects a `delete` of `id`.
    pub fn expect_delete(&mut self, id: T::Id) -> Expect<T, ()> {
        self.expect(move |response| Expectation::Delete { id, response })
    }

    /// Expects an action on `id`; the action itself is not inspected.
    pub fn expect_action(&mut self, id: T::Id) -> Expect<T, T::ActionResult> {
        self.expect(move |response| Expectation::Action { id, response })
    }

    /// Panics unless every queued expectation was consumed.
    pub fn verify(&self) {
        let remaining = self
            .expectations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// A pending expectation. Nothing is queued until `return_ok` or `return_err`
/// supplies the reply.
pub struct Expect<T: ActorEntity, R> {
    queue: Queue<T>,
    script: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T>>,
}

impl<T: ActorEntity, R> Expect<T, R> {
    pub fn return_ok(self, value: R) {
        self.reply(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.reply(Err(error));
    }

    fn reply(self, response: Result<R, FrameworkError>) {
        push(&self.queue, (self.script)(response));
    }
}

// =============================================================================
// CHANNEL-LEVEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// The test plays the actor: it pulls requests with the `expect_*` helpers below,
/// asserts on the payload and answers through the returned responder.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next message, if it is a Create request.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Create,
    tokio::sync::oneshot::Sender<Result<T::Id, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next message, if it is a Get request.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    tokio::sync::oneshot::Sender<Result<Option<T>, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next message, if it is an Action request.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    tokio::sync::oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Coupon {
        id: u32,
        code: String,
        uses: u32,
    }

    #[derive(Debug)]
    struct CouponCreate {
        code: String,
    }

    #[derive(Debug)]
    struct CouponUpdate;

    #[derive(Debug)]
    enum CouponAction {
        Redeem,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("Coupon error")]
    struct CouponError;

    #[async_trait]
    impl ActorEntity for Coupon {
        type Id = u32;
        type Create = CouponCreate;
        type Update = CouponUpdate;
        type Action = CouponAction;
        type ActionResult = u32;
        type Context = ();
        type Error = CouponError;

        fn from_create_params(id: u32, params: CouponCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                code: params.code,
                uses: 0,
            })
        }

        async fn on_update(&mut self, _: CouponUpdate, _: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn handle_action(&mut self, action: CouponAction, _: &()) -> Result<u32, Self::Error> {
            match action {
                CouponAction::Redeem => {
                    self.uses += 1;
                    Ok(self.uses)
                }
            }
        }
    }

    fn coupon(id: u32, code: &str) -> Coupon {
        Coupon {
            id,
            code: code.to_string(),
            uses: 0,
        }
    }

    #[tokio::test]
    async fn test_channel_level_mock() {
        let (client, mut receiver) = create_mock_client::<Coupon>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(CouponCreate {
                    code: "SPRING10".to_string(),
                })
                .await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.code, "SPRING10");
        responder.send(Ok(7)).unwrap();

        assert_eq!(create_task.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Coupon>::new();
        mock.expect_create().return_ok(1);
        mock.expect_get(1).return_ok(Some(coupon(1, "SPRING10")));
        mock.expect_list()
            .return_ok(vec![coupon(1, "SPRING10"), coupon(2, "TREES5")]);
        mock.expect_action(1).return_ok(1);
        mock.expect_update(2).return_ok(coupon(2, "TREES5"));
        mock.expect_delete(2).return_ok(());

        let client = mock.client();
        let id = client
            .create(CouponCreate {
                code: "SPRING10".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(client.get(1).await.unwrap().unwrap().code, "SPRING10");
        assert_eq!(client.list().await.unwrap().len(), 2);
        assert_eq!(client.perform_action(1, CouponAction::Redeem).await.unwrap(), 1);
        assert_eq!(client.update(2, CouponUpdate).await.unwrap().code, "TREES5");
        client.delete(2).await.unwrap();

        mock.verify();
    }

    #[tokio::test]
    async fn test_unexpected_request_drops_the_reply() {
        let mock = MockClient::<Coupon>::new();
        let client = mock.client();

        let result = client.get(3).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }
}
