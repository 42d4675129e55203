// Protected handlers: every route here sits behind jwt_auth_middleware, which
// rejects the request before the handler runs when the token is missing or
// invalid, and inserts the caller as an `AuthUser` extension otherwise.

pub mod contact;
pub mod holiday;
pub mod utils;

pub use contact::delete as contact_delete;
pub use contact::get as contact_get;
pub use contact::missing_id as contact_missing_id;
pub use contact::patch as contact_patch;
pub use contact::put as contact_put;

pub use holiday::delete as holiday_delete;
pub use holiday::get as holiday_get;
pub use holiday::missing_id as holiday_missing_id;
pub use holiday::patch as holiday_patch;
pub use holiday::put as holiday_put;
