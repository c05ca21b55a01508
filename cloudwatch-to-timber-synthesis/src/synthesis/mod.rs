//! Template synthesis (deterministic resource generation)

pub mod templates;

pub use templates::{
    build_access_role, build_forwarder_function, build_invoke_permission,
    build_subscription_filter,
};
