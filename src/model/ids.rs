//! Type-safe identifiers.
//!
//! Every resource gets its own `u32` newtype so a `ProductId` can never be passed
//! where an `OrderId` is expected. Ids display as `prefix_N` in logs and serialize
//! as plain numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

resource_id!(UserId, "user");
resource_id!(ProductId, "product");
resource_id!(VariantId, "variant");
resource_id!(OrderId, "order");
resource_id!(CouponId, "coupon");
resource_id!(CampaignId, "campaign");
resource_id!(DonationId, "donation");
resource_id!(TreeId, "tree");
resource_id!(TreeInstanceId, "tree_instance");
resource_id!(PlanId, "plan");
resource_id!(LocationId, "location");
resource_id!(
    /// Identifies an admin-authored notification.
    NotificationId,
    "notification"
);
resource_id!(
    /// Identifies one registered push token row.
    FcmTokenId,
    "fcm_token"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_prefix_and_serialize_as_numbers() {
        assert_eq!(ProductId(7).to_string(), "product_7");
        assert_eq!(TreeInstanceId::from(12).to_string(), "tree_instance_12");
        assert_eq!(serde_json::to_string(&OrderId(3)).unwrap(), "3");
        assert_eq!(serde_json::from_str::<UserId>("42").unwrap(), UserId(42));
    }
}
