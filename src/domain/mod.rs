// Domain layer: models and ports. The external system owns every entity; these types only
// describe roles, credentials and check outcomes.

pub mod endpoints;
pub mod model;
pub mod ports;
