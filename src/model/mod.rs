//! Pure data structures: the stored records and their create/update payloads.
//!
//! The [`ActorEntity`](canopy_actors::ActorEntity) implementations live next to each
//! actor (`user_actor`, `catalog_actor`, ...).

pub mod catalog;
pub mod coupon;
pub mod ids;
pub mod location;
pub mod notification;
pub mod order;
pub mod sponsorship;
pub mod user;

pub use catalog::*;
pub use coupon::*;
pub use ids::*;
pub use location::*;
pub use notification::*;
pub use order::*;
pub use sponsorship::*;
pub use user::*;
