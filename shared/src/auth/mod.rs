pub mod claims;
pub mod cookies;
pub mod gate;
pub mod ids;
pub mod password;
pub mod token;
pub mod validate;

pub use claims::{AuthClaims, InviteClaims, StateBoard, StateClaims, StateColumn, StateTask, TaskLocation};
pub use gate::{authorize, read_invite, read_state, Role};
pub use ids::{IdGenerator, UuidGenerator};
pub use password::{BcryptHasher, HashError, Hasher};
pub use token::{TokenCodec, TokenError};
