use canopy::auth::{SignUp, VerifyOtp};
use canopy::config::{AppConfig, Providers};
use canopy::geocoding::StaticGeocoder;
use canopy::lifecycle::Platform;
use canopy::model::{
    AttributeCreate, Audience, CampaignCreate, CampaignStatus, Channel, Coordinates, CouponCreate,
    CouponKind, LocationKind, NotificationCreate, NotificationStatus, OrderLine, OrderStatus,
    PlanCreate, PlanPrice, ProductCreate, TreeCreate, TreeInstanceStatus, UserId,
};
use canopy::notifications::{RecordingPushProvider, RecordingSmsSender};
use canopy::payments::FakePaymentGateway;
use canopy::services::{PlaceOrder, VariantChange};
use canopy::sponsorship_actor::SponsorshipError;
use chrono::{Months, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;

const CODE: &str = "123456";

struct Harness {
    platform: Platform,
    sms: Arc<RecordingSmsSender>,
    push: Arc<RecordingPushProvider>,
    geocoder: Arc<StaticGeocoder>,
}

fn start(push: RecordingPushProvider, geocoder: StaticGeocoder) -> Harness {
    let mut config = AppConfig::default();
    config.otp.fixed_code = Some(CODE.to_string());
    let sms = Arc::new(RecordingSmsSender::new());
    let push = Arc::new(push);
    let geocoder = Arc::new(geocoder);
    let providers = Providers {
        push: push.clone(),
        sms: sms.clone(),
        geocoder: geocoder.clone(),
        payments: Arc::new(FakePaymentGateway::new()),
    };
    Harness {
        platform: Platform::with_providers(&config, providers),
        sms,
        push,
        geocoder,
    }
}

/// Signs up and verifies a user, registering `device_token` for push.
async fn signed_in_user(platform: &Platform, name: &str, phone: &str, device_token: &str) -> UserId {
    let auth = &platform.services.auth;
    auth.sign_up(SignUp {
        name: Some(name.to_string()),
        phone: Some(phone.to_string()),
        email: None,
    })
    .await
    .expect("sign up");
    let session = auth
        .verify_otp(VerifyOtp {
            phone: Some(phone.to_string()),
            code: Some(CODE.to_string()),
            fcm_token: Some(device_token.to_string()),
            device_id: Some(format!("device-{name}")),
            platform: None,
        })
        .await
        .expect("verify otp");
    assert!(session.user.is_verified());
    assert_eq!(auth.authenticate(&session.token).await.unwrap(), session.user.id);
    session.user.id
}

fn attribute(name: &str, code: &str, delta: Option<rust_decimal::Decimal>) -> AttributeCreate {
    AttributeCreate {
        name: name.to_string(),
        slug: None,
        code: code.to_string(),
        price_delta: delta,
        hex: None,
    }
}

/// Full shop flow with every real actor: catalog matrix seeding, pricing,
/// coupon, order, payment and the follow-up push.
#[tokio::test]
async fn test_shop_flow_from_catalog_to_payment() {
    let Harness {
        platform,
        sms,
        push,
        ..
    } = start(RecordingPushProvider::new(), StaticGeocoder::new());
    let catalog = &platform.services.catalog;

    let product = catalog
        .create_product(ProductCreate {
            name: "Snake Plant".to_string(),
            slug: None,
            description: Some("Hardy and low light tolerant".to_string()),
            base_price: dec!(499),
            is_active: true,
        })
        .await
        .unwrap();
    assert_eq!(product.slug, "snake-plant");
    assert!(product.sku.starts_with("SPX-"));

    catalog.create_size(attribute("Small", "s", None)).await.unwrap();
    catalog
        .create_size(attribute("Large", "l", Some(dec!(100))))
        .await
        .unwrap();
    catalog.create_color(attribute("Green", "grn", None)).await.unwrap();
    catalog
        .create_planter(attribute("Ceramic", "cer", Some(dec!(50))))
        .await
        .unwrap();
    platform.jobs.flush().await;

    // Every size x color x planter combination exists, priced and out of stock
    let detail = catalog.product_detail("snake-plant").await.unwrap();
    assert_eq!(detail.variants.len(), 2);
    let small = detail.variants[0].clone();
    let large = detail.variants[1].clone();
    assert_eq!(small.price, dec!(549));
    assert_eq!(large.price, dec!(649));
    assert_eq!(small.sku, format!("{}-S-GRN-CER", product.sku));
    assert_eq!(detail.product.selling_price, Some(dec!(549)));
    assert!(!detail.product.in_stock);

    // Seeding again finds nothing to add
    assert_eq!(catalog.seed_variant_matrix(product.id).await.unwrap(), 0);

    catalog
        .update_variant(
            small.id,
            VariantChange {
                compare_at_price: Some(dec!(699)),
                stock_delta: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    platform.jobs.flush().await;
    let listed = catalog.list_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].in_stock);
    assert_eq!(listed[0].selling_price, Some(dec!(549)));
    assert_eq!(listed[0].original_price, Some(dec!(699)));

    platform
        .services
        .coupons
        .create_coupon(CouponCreate {
            code: "green10".to_string(),
            kind: CouponKind::Percent(10),
            max_discount: None,
            min_order_amount: Some(dec!(500)),
            usage_limit: Some(100),
            per_user_limit: Some(1),
            starts_at: None,
            expires_at: None,
            is_active: true,
        })
        .await
        .unwrap();

    let user = signed_in_user(&platform, "asha", "+91 98000 00001", "tok-asha").await;
    assert_eq!(sms.last_code_for("+919800000001").as_deref(), Some(CODE));

    let orders = &platform.services.orders;
    let quote = orders.check_coupon(user, "GREEN10", dec!(1098)).await.unwrap();
    assert!(quote.valid);
    assert_eq!(quote.discount, dec!(109.80));
    let too_small = orders.check_coupon(user, "GREEN10", dec!(100)).await.unwrap();
    assert!(!too_small.valid);
    assert_eq!(too_small.discount, dec!(0));

    let order = orders
        .place_order(
            user,
            PlaceOrder {
                items: vec![OrderLine {
                    variant_id: small.id,
                    quantity: 2,
                }],
                coupon_code: Some("green10".to_string()),
                shipping_address: Some("12 MG Road, Pune".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(order.subtotal, dec!(1098));
    assert_eq!(order.discount, dec!(109.80));
    assert_eq!(order.total, dec!(988.20));
    let reserved = platform.clients.variants.require(small.id).await.unwrap();
    assert_eq!((reserved.stock, reserved.reserved), (10, 2));

    // The coupon is limited to one use per user
    let second = orders
        .place_order(
            user,
            PlaceOrder {
                items: vec![OrderLine {
                    variant_id: small.id,
                    quantity: 1,
                }],
                coupon_code: Some("GREEN10".to_string()),
                shipping_address: None,
            },
        )
        .await;
    assert!(second.is_err());
    let unchanged = platform.clients.variants.require(small.id).await.unwrap();
    assert_eq!(unchanged.reserved, 2, "failed order releases its reservation");

    let checkout = &platform.services.checkout;
    let intent = checkout.checkout(user, order.id).await.unwrap();
    assert_eq!(intent.amount, dec!(988.20));
    assert_eq!(intent.currency, "inr");
    let again = checkout.checkout(user, order.id).await.unwrap();
    assert_eq!(again.id, intent.id, "an open intent is reused");

    let paid = checkout.confirm(user, order.id, &intent.id).await.unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.payment_reference.as_deref(), Some(intent.id.as_str()));
    let confirmed_twice = checkout.confirm(user, order.id, &intent.id).await.unwrap();
    assert_eq!(confirmed_twice.status, OrderStatus::Paid);

    let sold = platform.clients.variants.require(small.id).await.unwrap();
    assert_eq!((sold.stock, sold.reserved), (8, 0));

    platform.jobs.flush().await;
    let pushes = push.sent();
    assert!(pushes
        .iter()
        .any(|(token, message)| token == "tok-asha" && message.title == "Payment received"));

    let shipped = orders.ship(order.id).await.unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert!(orders.cancel(order.id).await.is_err(), "shipped orders stay shipped");

    platform.shutdown().await.expect("Failed to shutdown platform");
}

/// Locations are geocoded in the background; trees are planted there and
/// adopted; campaigns collect donations.
#[tokio::test]
async fn test_sponsorship_flow_with_geocoded_locations() {
    let bengaluru_at = Coordinates {
        lat: 12.9716,
        lng: 77.5946,
    };
    let Harness {
        platform,
        push,
        geocoder,
        ..
    } = start(
        RecordingPushProvider::new(),
        StaticGeocoder::new().with("Bengaluru, Karnataka, India", bengaluru_at),
    );

    let locations = &platform.services.locations;
    let india = locations
        .create("India".to_string(), LocationKind::Country, None)
        .await
        .unwrap();
    let karnataka = locations
        .create("Karnataka".to_string(), LocationKind::State, Some(india.id))
        .await
        .unwrap();
    let bengaluru = locations
        .create("Bengaluru".to_string(), LocationKind::City, Some(karnataka.id))
        .await
        .unwrap();
    platform.jobs.flush().await;

    assert_eq!(
        locations.address_of(bengaluru.id).await.unwrap(),
        "Bengaluru, Karnataka, India"
    );
    let all = locations.list().await.unwrap();
    let city = all.iter().find(|l| l.id == bengaluru.id).unwrap();
    assert_eq!(city.coordinates, Some(bengaluru_at));
    assert!(city.geocoded_at.is_some());
    let country = all.iter().find(|l| l.id == india.id).unwrap();
    assert_eq!(country.coordinates, None, "no match leaves coordinates empty");
    assert!(geocoder.lookups().contains(&"India".to_string()));

    let sponsorship = &platform.services.sponsorship;
    let neem = sponsorship
        .create_tree(TreeCreate {
            name: "Neem".to_string(),
            slug: None,
            scientific_name: Some("Azadirachta indica".to_string()),
            description: None,
        })
        .await
        .unwrap();
    let first = sponsorship
        .plant_tree(neem.id, Some(bengaluru.id), Some(Utc::now()))
        .await
        .unwrap();
    let second = sponsorship.plant_tree(neem.id, None, None).await.unwrap();
    assert!(first.code.starts_with(&neem.sku));
    assert_ne!(first.code, second.code);
    assert_eq!(first.status, TreeInstanceStatus::Available);

    let plan = sponsorship
        .create_plan(PlanCreate {
            name: "Guardian".to_string(),
            slug: None,
            description: None,
            prices: vec![
                PlanPrice {
                    duration_months: 12,
                    amount: dec!(1200),
                },
                PlanPrice {
                    duration_months: 24,
                    amount: dec!(2100),
                },
            ],
        })
        .await
        .unwrap();

    let user = signed_in_user(&platform, "ravi", "+919800000002", "tok-ravi").await;
    let adopted = sponsorship.adopt(first.id, user, plan.id, 12).await.unwrap();
    assert_eq!(adopted.status, TreeInstanceStatus::Adopted);
    let adoption = adopted.adoption.clone().expect("adoption recorded");
    assert_eq!(adoption.user_id, user);
    assert_eq!(adoption.amount, dec!(1200));
    assert_eq!(
        adoption.expires_at,
        adoption.started_at.checked_add_months(Months::new(12)).unwrap()
    );

    let twice = sponsorship.adopt(first.id, user, plan.id, 12).await;
    assert!(matches!(twice, Err(SponsorshipError::AlreadyAdopted(_))));
    let unpriced = sponsorship.adopt(second.id, user, plan.id, 6).await;
    assert!(matches!(
        unpriced,
        Err(SponsorshipError::NoPriceForDuration { months: 6, .. })
    ));

    let campaign = sponsorship
        .create_campaign(CampaignCreate {
            title: "Green Bengaluru".to_string(),
            slug: None,
            description: None,
            goal_amount: dec!(100000),
            starts_at: Utc::now(),
            ends_at: None,
        })
        .await
        .unwrap();
    assert_eq!(campaign.status, CampaignStatus::Draft);
    let early = sponsorship.donate(campaign.id, Some(user), dec!(500)).await;
    assert!(matches!(early, Err(SponsorshipError::CampaignNotActive(_))));

    sponsorship.publish_campaign(campaign.id).await.unwrap();
    sponsorship
        .donate(campaign.id, Some(user), dec!(500))
        .await
        .unwrap();
    let after = sponsorship.donate(campaign.id, None, dec!(250)).await.unwrap();
    assert_eq!(after.raised_amount, dec!(750));
    assert_eq!(after.donor_count, 2);
    assert_eq!(sponsorship.active_campaigns().await.unwrap().len(), 1);

    platform.jobs.flush().await;
    let titles: Vec<String> = push
        .sent()
        .into_iter()
        .filter(|(token, _)| token == "tok-ravi")
        .map(|(_, message)| message.title)
        .collect();
    assert!(titles.contains(&"Your tree is adopted".to_string()));
    assert!(titles.contains(&"Thank you for your donation".to_string()));

    platform.shutdown().await.expect("Failed to shutdown platform");
}

/// Admin broadcast fan-out: unregistered tokens are pruned and counted.
#[tokio::test]
async fn test_broadcast_prunes_unregistered_tokens() {
    let Harness { platform, push, .. } = start(
        RecordingPushProvider::new().with_invalid("tok-stale"),
        StaticGeocoder::new(),
    );
    let meera = signed_in_user(&platform, "meera", "+919800000003", "tok-meera").await;
    let arjun = signed_in_user(&platform, "arjun", "+919800000004", "tok-stale").await;

    let queued = platform
        .services
        .notifications
        .broadcast(NotificationCreate {
            title: "Monsoon sale".to_string(),
            body: "20% off all planters this week".to_string(),
            audience: Audience::AllUsers,
            channels: vec![Channel::Push],
        })
        .await
        .unwrap();
    assert_eq!(queued.status, NotificationStatus::Queued);

    platform.jobs.flush().await;
    let sent = platform.services.notifications.list().await.unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].status, NotificationStatus::Sent);
    assert_eq!(sent[0].delivered, 1);
    assert_eq!(sent[0].failed, 1);
    assert_eq!(sent[0].pruned_tokens, 1);
    assert!(sent[0].sent_at.is_some());

    let fcm = &platform.clients.fcm_tokens;
    assert_eq!(fcm.tokens_for(meera).await.unwrap().len(), 1);
    assert!(fcm.tokens_for(arjun).await.unwrap().is_empty());
    assert_eq!(
        push.sent()
            .iter()
            .filter(|(_, message)| message.title == "Monsoon sale")
            .count(),
        1
    );

    // Running the job again does not send twice
    platform
        .jobs
        .run_now(canopy::jobs::Job::DispatchAdminNotification(queued.id))
        .await
        .unwrap();
    assert_eq!(
        push.sent()
            .iter()
            .filter(|(_, message)| message.title == "Monsoon sale")
            .count(),
        1
    );

    platform.shutdown().await.expect("Failed to shutdown platform");
}

/// Cancelling returns stock: a paid order restocks what it sold, a pending one
/// releases its reservation.
#[tokio::test]
async fn test_cancelled_orders_give_stock_back() {
    let Harness { platform, .. } = start(RecordingPushProvider::new(), StaticGeocoder::new());
    let catalog = &platform.services.catalog;

    let product = catalog
        .create_product(ProductCreate {
            name: "Areca Palm".to_string(),
            slug: None,
            description: None,
            base_price: dec!(300),
            is_active: true,
        })
        .await
        .unwrap();
    catalog.create_size(attribute("Medium", "m", None)).await.unwrap();
    catalog.create_color(attribute("Green", "grn", None)).await.unwrap();
    catalog.create_planter(attribute("Clay", "cla", None)).await.unwrap();
    platform.jobs.flush().await;

    let detail = catalog.product_detail(&product.slug).await.unwrap();
    assert_eq!(detail.variants.len(), 1);
    let variant = detail.variants[0].id;
    catalog
        .update_variant(
            variant,
            VariantChange {
                stock_delta: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let user = signed_in_user(&platform, "ravi", "+919800000003", "tok-ravi").await;
    let orders = &platform.services.orders;
    let checkout = &platform.services.checkout;
    let place = |quantity| PlaceOrder {
        items: vec![OrderLine {
            variant_id: variant,
            quantity,
        }],
        coupon_code: None,
        shipping_address: None,
    };
    let level = || async {
        let v = platform.clients.variants.require(variant).await.unwrap();
        (v.stock, v.reserved)
    };

    // Paid, then cancelled
    let paid = orders.place_order(user, place(3)).await.unwrap();
    assert_eq!(level().await, (5, 3));
    let intent = checkout.checkout(user, paid.id).await.unwrap();
    checkout.confirm(user, paid.id, &intent.id).await.unwrap();
    assert_eq!(level().await, (2, 0));

    let cancelled = orders.cancel(paid.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(level().await, (5, 0));

    // Pending, then cancelled
    let pending = orders.place_order(user, place(2)).await.unwrap();
    let intent = checkout.checkout(user, pending.id).await.unwrap();
    assert_eq!(level().await, (5, 2));
    orders.cancel(pending.id).await.unwrap();
    assert_eq!(level().await, (5, 0));
    assert!(
        checkout.confirm(user, pending.id, &intent.id).await.is_err(),
        "a cancelled order cannot be paid"
    );

    platform.shutdown().await.expect("Failed to shutdown platform");
}
