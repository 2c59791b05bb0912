use canopy::catalog_actor::CatalogError;
use canopy::clients::{CouponClient, OrderClient, UserClient, VariantClient};
use canopy::coupon_actor::CouponError;
use canopy::model::{
    AttributeId, Coupon, CouponId, CouponKind, OrderCreate, OrderLine, OrderStatus, ProductId,
    ProductVariant, StockLevel, User, UserId, VariantId,
};
use canopy::order_actor::{OrderContext, OrderError};
use canopy_actors::mock::MockClient;
use canopy_actors::{ActorClient, FrameworkError};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn user(id: u32) -> User {
    User {
        id: UserId(id),
        name: "Asha".to_string(),
        phone: "+919800000001".to_string(),
        email: None,
        phone_verified_at: Some(Utc::now()),
        is_active: true,
        created_at: Utc::now(),
    }
}

fn variant(id: u32, product: u32, price: Decimal) -> ProductVariant {
    ProductVariant {
        id: VariantId(id),
        product_id: ProductId(product),
        size_id: AttributeId::new(1),
        color_id: AttributeId::new(1),
        planter_id: AttributeId::new(1),
        sku: format!("SNAKE-S-GRN-CER-{id}"),
        price,
        compare_at_price: None,
        stock: 10,
        reserved: 0,
        is_active: true,
    }
}

fn coupon(code: &str) -> Coupon {
    Coupon {
        id: CouponId(7),
        code: code.to_string(),
        kind: CouponKind::Percent(10),
        max_discount: None,
        min_order_amount: None,
        usage_limit: None,
        used_count: 0,
        per_user_limit: None,
        starts_at: None,
        expires_at: None,
        is_active: true,
        created_at: Utc::now(),
        redemptions: HashMap::new(),
    }
}

fn level(stock: u32, reserved: u32) -> StockLevel {
    StockLevel {
        stock,
        reserved,
        available: stock - reserved,
    }
}

struct Mocks {
    users: MockClient<User>,
    variants: MockClient<ProductVariant>,
    coupons: MockClient<Coupon>,
}

impl Mocks {
    fn new() -> Self {
        Self {
            users: MockClient::new(),
            variants: MockClient::new(),
            coupons: MockClient::new(),
        }
    }

    fn context(&self) -> OrderContext {
        OrderContext {
            users: UserClient::new(self.users.client()),
            variants: VariantClient::new(self.variants.client()),
            coupons: CouponClient::new(self.coupons.client()),
        }
    }

    fn verify(&self) {
        self.users.verify();
        self.variants.verify();
        self.coupons.verify();
    }
}

/// Real Order actor with mocked User, Variant and Coupon dependencies.
///
/// Pattern 2: Actor + Mocks
/// - Real Order actor (pricing, reservation and redemption in on_create)
/// - Mocked clients for everything it depends on
#[tokio::test]
async fn test_order_is_priced_reserved_and_discounted() {
    let mut mocks = Mocks::new();

    // on_create: user, then each variant, then reservations, then the coupon
    mocks.users.expect_get(UserId(1)).return_ok(Some(user(1)));
    mocks
        .variants
        .expect_get(VariantId(3))
        .return_ok(Some(variant(3, 1, dec!(499.00))));
    mocks
        .variants
        .expect_get(VariantId(4))
        .return_ok(Some(variant(4, 2, dec!(250.50))));
    mocks.variants.expect_action(VariantId(3)).return_ok(level(10, 2));
    mocks.variants.expect_action(VariantId(4)).return_ok(level(10, 1));
    mocks.coupons.expect_list().return_ok(vec![coupon("GREEN10")]);
    mocks.coupons.expect_action(CouponId(7)).return_ok(dec!(124.85));

    let (order_actor, order_generic_client) = canopy::order_actor::new(8);
    let order_client = order_generic_client;
    let actor_handle = tokio::spawn(order_actor.run(mocks.context()));

    let id = order_client
        .place_order(OrderCreate {
            user_id: UserId(1),
            lines: vec![
                OrderLine { variant_id: VariantId(3), quantity: 1 },
                OrderLine { variant_id: VariantId(4), quantity: 1 },
                OrderLine { variant_id: VariantId(3), quantity: 1 },
            ],
            coupon_code: Some(" green10 ".to_string()),
            shipping_address: Some("12 MG Road, Pune".to_string()),
        })
        .await
        .expect("order should be placed");

    let order = order_client.get(id).await.unwrap().expect("order stored");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2, "duplicate lines are merged");
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].line_total, dec!(998.00));
    assert_eq!(order.subtotal, dec!(1248.50));
    assert_eq!(order.coupon_code.as_deref(), Some("GREEN10"));
    assert_eq!(order.coupon_id, Some(CouponId(7)));
    assert_eq!(order.discount, dec!(124.85));
    assert_eq!(order.total, dec!(1123.65));
    assert_eq!(order.product_ids(), vec![ProductId(1), ProductId(2)]);

    mocks.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_reservation_releases_earlier_lines() {
    let mut mocks = Mocks::new();

    mocks.users.expect_get(UserId(1)).return_ok(Some(user(1)));
    mocks
        .variants
        .expect_get(VariantId(3))
        .return_ok(Some(variant(3, 1, dec!(100))));
    mocks
        .variants
        .expect_get(VariantId(4))
        .return_ok(Some(variant(4, 1, dec!(100))));
    // first line reserved, second out of stock, first released again
    mocks.variants.expect_action(VariantId(3)).return_ok(level(10, 2));
    mocks
        .variants
        .expect_action(VariantId(4))
        .return_err(FrameworkError::EntityError(Box::new(
            CatalogError::InsufficientStock {
                requested: 5,
                available: 1,
            },
        )));
    mocks.variants.expect_action(VariantId(3)).return_ok(level(10, 0));

    let (order_actor, order_generic_client) = canopy::order_actor::new(8);
    let order_client = order_generic_client;
    let actor_handle = tokio::spawn(order_actor.run(mocks.context()));

    let result = order_client
        .place_order(OrderCreate {
            user_id: UserId(1),
            lines: vec![
                OrderLine { variant_id: VariantId(3), quantity: 2 },
                OrderLine { variant_id: VariantId(4), quantity: 5 },
            ],
            coupon_code: None,
            shipping_address: None,
        })
        .await;

    match result {
        Err(OrderError::InsufficientStock {
            variant,
            requested,
            available,
        }) => {
            assert_eq!(variant, "variant_4");
            assert_eq!(requested, 5);
            assert_eq!(available, 1);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert!(order_client.list().await.unwrap().is_empty(), "nothing stored");

    mocks.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_unusable_coupon_rolls_back_reservations() {
    let mut mocks = Mocks::new();

    let mut expired = coupon("MONSOON");
    expired.expires_at = Some(Utc::now() - chrono::Duration::days(1));

    mocks.users.expect_get(UserId(1)).return_ok(Some(user(1)));
    mocks
        .variants
        .expect_get(VariantId(3))
        .return_ok(Some(variant(3, 1, dec!(100))));
    mocks.variants.expect_action(VariantId(3)).return_ok(level(10, 1));
    mocks.coupons.expect_list().return_ok(vec![expired]);
    mocks
        .coupons
        .expect_action(CouponId(7))
        .return_err(FrameworkError::EntityError(Box::new(CouponError::Expired(
            "MONSOON".to_string(),
        ))));
    mocks.variants.expect_action(VariantId(3)).return_ok(level(10, 0));

    let (order_actor, order_generic_client) = canopy::order_actor::new(8);
    let order_client = order_generic_client;
    let actor_handle = tokio::spawn(order_actor.run(mocks.context()));

    let result = order_client
        .place_order(OrderCreate {
            user_id: UserId(1),
            lines: vec![OrderLine { variant_id: VariantId(3), quantity: 1 }],
            coupon_code: Some("monsoon".to_string()),
            shipping_address: None,
        })
        .await;

    assert!(
        matches!(result, Err(OrderError::Coupon(CouponError::Expired(ref code))) if code == "MONSOON"),
        "unexpected result: {result:?}"
    );
    mocks.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_inactive_user_cannot_order() {
    let mut mocks = Mocks::new();
    let mut disabled = user(2);
    disabled.is_active = false;
    mocks.users.expect_get(UserId(2)).return_ok(Some(disabled));

    let (order_actor, order_generic_client) = canopy::order_actor::new(8);
    let order_client = order_generic_client;
    let actor_handle = tokio::spawn(order_actor.run(mocks.context()));

    let result = order_client
        .place_order(OrderCreate {
            user_id: UserId(2),
            lines: vec![OrderLine { variant_id: VariantId(3), quantity: 1 }],
            coupon_code: None,
            shipping_address: None,
        })
        .await;
    assert!(matches!(result, Err(OrderError::InvalidUser(ref id)) if id == "user_2"));
    mocks.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_cancel_releases_stock_and_coupon() {
    let mut mocks = Mocks::new();

    mocks.users.expect_get(UserId(1)).return_ok(Some(user(1)));
    mocks
        .variants
        .expect_get(VariantId(3))
        .return_ok(Some(variant(3, 1, dec!(200))));
    mocks.variants.expect_action(VariantId(3)).return_ok(level(10, 3));
    mocks.coupons.expect_list().return_ok(vec![coupon("GREEN10")]);
    mocks.coupons.expect_action(CouponId(7)).return_ok(dec!(60.00));
    // Cancel: release the reservation, then the redemption
    mocks.variants.expect_action(VariantId(3)).return_ok(level(10, 0));
    mocks.coupons.expect_action(CouponId(7)).return_ok(Decimal::ZERO);

    let (order_actor, order_generic_client) = canopy::order_actor::new(8);
    let order_client = order_generic_client;
    let actor_handle = tokio::spawn(order_actor.run(mocks.context()));

    let id = order_client
        .place_order(OrderCreate {
            user_id: UserId(1),
            lines: vec![OrderLine { variant_id: VariantId(3), quantity: 3 }],
            coupon_code: Some("GREEN10".to_string()),
            shipping_address: None,
        })
        .await
        .unwrap();

    let cancelled = order_client.cancel(id, Utc::now()).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    // A cancelled order cannot be shipped
    let shipped = order_client.ship(id, Utc::now()).await;
    assert!(matches!(shipped, Err(OrderError::InvalidTransition { .. })));

    mocks.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_oversized_quantities_are_rejected_and_actor_survives() {
    let mocks = Mocks::new();

    let (order_actor, order_generic_client) = canopy::order_actor::new(8);
    let order_client = order_generic_client;
    let actor_handle = tokio::spawn(order_actor.run(mocks.context()));

    // Rejected while building the order, before any dependency is called
    let result = order_client
        .place_order(OrderCreate {
            user_id: UserId(1),
            lines: vec![
                OrderLine { variant_id: VariantId(1), quantity: u32::MAX },
                OrderLine { variant_id: VariantId(1), quantity: 2 },
            ],
            coupon_code: None,
            shipping_address: None,
        })
        .await;
    assert!(
        matches!(result, Err(OrderError::Validation(_))),
        "unexpected result: {result:?}"
    );

    // The actor is still serving requests
    assert!(order_client.list().await.unwrap().is_empty());
    mocks.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}
