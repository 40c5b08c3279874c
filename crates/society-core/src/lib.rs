//! SocietySync Core — domain models, the identity gateway contract and
//! error types shared by every crate in the workspace.

pub mod error;
pub mod gateway;
pub mod models;
pub mod validation;

pub use error::{FieldErrors, GatewayError, GatewayResult, SocietyError, SocietyResult};
pub use gateway::{Account, IdentityGateway, SignIn};
pub use models::forms::{
    ChangePasswordForm, LoginCredentials, PasswordResetRequest, ProfileUpdate, SignupForm,
    UserUpdate,
};
pub use models::identity::{Identity, ProfileDocument};
pub use models::role::{Gender, Role, UserStatus, UserType};
